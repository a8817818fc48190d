//! Board representation and placement enumeration (spec §3, §4.2).
//!
//! Cells are packed into `u32` keys (`y * W + x`, spec §9 design notes)
//! rather than carried around as `"x,y"` strings. The free set is ordered
//! row-major (`y` outer, `x` inner) and each free cell is assigned a dense
//! column index `0..N` used throughout the exact-cover matrix.

use std::collections::HashMap;

use crate::error::SolveError;
use crate::geometry;
use crate::problem::{Coord, Placement, TileType};

/// Packs `(x, y)` into a dense key for hashing/bitset use.
#[inline]
fn cell_key(w: i32, x: i32, y: i32) -> u32 {
    (y * w + x) as u32
}

/// The board: dimensions, holes, and the derived free set / column index.
#[derive(Debug, Clone)]
pub struct Board {
    pub w: i32,
    pub h: i32,
    holes: std::collections::HashSet<u32>,
    /// Free cells, row-major. `free_cells[col]` is the cell at column `col`.
    pub free_cells: Vec<Coord>,
    /// Cell key -> column index, for cells in the free set only.
    col_of: HashMap<u32, u32>,
}

impl Board {
    pub fn new(w: u32, h: u32, holes: &[Coord]) -> Result<Self, SolveError> {
        if w == 0 || h == 0 {
            return Err(SolveError::InvalidBoard(
                "width and height must be positive".into(),
            ));
        }
        let (w, h) = (w as i32, h as i32);

        let mut hole_set = std::collections::HashSet::with_capacity(holes.len());
        for &(x, y) in holes {
            if x < 0 || y < 0 || x >= w || y >= h {
                return Err(SolveError::InvalidBoard(format!(
                    "hole ({x},{y}) is out of bounds for a {w}x{h} board"
                )));
            }
            hole_set.insert(cell_key(w, x, y));
        }

        let mut free_cells = Vec::with_capacity((w * h) as usize - hole_set.len());
        let mut col_of = HashMap::with_capacity(free_cells.capacity());
        for y in 0..h {
            for x in 0..w {
                let key = cell_key(w, x, y);
                if !hole_set.contains(&key) {
                    col_of.insert(key, free_cells.len() as u32);
                    free_cells.push((x, y));
                }
            }
        }

        Ok(Board {
            w,
            h,
            holes: hole_set,
            free_cells,
            col_of,
        })
    }

    /// `N`: the number of free cells.
    pub fn n(&self) -> usize {
        self.free_cells.len()
    }

    /// Column index of a cell, or `None` if it's a hole or out of bounds.
    pub fn col_of(&self, cell: Coord) -> Option<u32> {
        let (x, y) = cell;
        if x < 0 || y < 0 || x >= self.w || y >= self.h {
            return None;
        }
        self.col_of.get(&cell_key(self.w, x, y)).copied()
    }

    pub fn is_hole(&self, x: i32, y: i32) -> bool {
        self.holes.contains(&cell_key(self.w, x, y))
    }
}

/// One row of the exact-cover matrix: a placement of one tile-type
/// orientation at one board position.
#[derive(Debug, Clone)]
pub struct PlacementRow {
    pub pid: u32,
    pub ti: usize,
    /// Column indices this row covers, in no particular order.
    pub cols: Vec<u32>,
    /// Absolute board cells this row covers, sorted `(y, x)`.
    pub cells: Vec<Coord>,
}

impl PlacementRow {
    pub fn to_placement(&self) -> Placement {
        Placement {
            ti: self.ti,
            cells: self.cells.clone(),
        }
    }
}

/// All enumerated placements plus the reverse `column -> rows` index.
pub struct PlacementTable {
    pub rows: Vec<PlacementRow>,
    /// `by_col[c]` lists the row indices (by position in `rows`, which
    /// equals `pid`) whose cells include column `c`.
    pub by_col: Vec<Vec<u32>>,
}

/// Enumerates every placement of every tile type's every orientation at
/// every board position whose cells lie entirely in the free set.
pub fn build_placements(
    board: &Board,
    tile_types: &[TileType],
) -> Result<PlacementTable, SolveError> {
    let mut rows = Vec::new();
    let mut by_col: Vec<Vec<u32>> = vec![Vec::new(); board.n()];

    for (ti, tt) in tile_types.iter().enumerate() {
        // A tile type with zero stock can never be placed; skip enumerating
        // it entirely rather than building placements nobody can use.
        if tt.count == Some(0) {
            continue;
        }

        for orientation in geometry::orientations(&tt.base, tt.allow_rotate, tt.allow_reflect) {
            let (width, height) = geometry::bounding_box(&orientation);
            if width > board.w || height > board.h {
                continue;
            }

            for oy in 0..=(board.h - height) {
                for ox in 0..=(board.w - width) {
                    let mut cols = Vec::with_capacity(orientation.len());
                    let mut cells = Vec::with_capacity(orientation.len());
                    let mut valid = true;

                    for &(cx, cy) in &orientation {
                        let abs = (cx + ox, cy + oy);
                        match board.col_of(abs) {
                            Some(col) => {
                                cols.push(col);
                                cells.push(abs);
                            }
                            None => {
                                valid = false;
                                break;
                            }
                        }
                    }

                    if !valid {
                        continue;
                    }

                    cells.sort_by_key(|&(x, y)| (y, x));
                    let pid = rows.len() as u32;

                    for &col in &cols {
                        let entry = by_col.get_mut(col as usize).ok_or_else(|| {
                            SolveError::Invariant(format!(
                                "placement {pid} referenced out-of-range column {col}"
                            ))
                        })?;
                        entry.push(pid);
                    }

                    rows.push(PlacementRow {
                        pid,
                        ti,
                        cols,
                        cells,
                    });
                }
            }
        }
    }

    Ok(PlacementTable { rows, by_col })
}
