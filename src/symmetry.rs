//! Board symmetry group (spec §4.4).
//!
//! Starts from D4 for a square board (`W == H`) or the Klein four-group for
//! a rectangle, then retains only the transforms under which the free-cell
//! set is invariant. The retained subgroup is what [`crate::canonical`]
//! canonicalizes layouts against.

use crate::board::Board;
use crate::problem::Coord;

/// A coordinate transform of the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    Rot90,
    Rot180,
    Rot270,
    FlipH,
    FlipV,
    FlipDiag,
    FlipAnti,
}

impl Transform {
    /// Applies the transform to a cell on a `w x h` board. `Rot90`/`Rot270`/
    /// `FlipDiag`/`FlipAnti` are only meaningful when `w == h`; callers only
    /// ever reach for them on square boards (see [`candidates`]).
    pub fn apply(&self, (x, y): Coord, w: i32, h: i32) -> Coord {
        match self {
            Transform::Identity => (x, y),
            Transform::Rot180 => (w - 1 - x, h - 1 - y),
            Transform::FlipH => (w - 1 - x, y),
            Transform::FlipV => (x, h - 1 - y),
            Transform::Rot90 => (h - 1 - y, x),
            Transform::Rot270 => (y, w - 1 - x),
            Transform::FlipDiag => (y, x),
            Transform::FlipAnti => (h - 1 - y, w - 1 - x),
        }
    }
}

/// The starting candidate set before retention filtering: D4 for a square,
/// Klein-4 (identity, horizontal flip, vertical flip, and their composition
/// -- the 180-degree rotation, needed for group closure) for a rectangle.
fn candidates(board: &Board) -> Vec<Transform> {
    if board.w == board.h {
        vec![
            Transform::Identity,
            Transform::Rot90,
            Transform::Rot180,
            Transform::Rot270,
            Transform::FlipH,
            Transform::FlipV,
            Transform::FlipDiag,
            Transform::FlipAnti,
        ]
    } else {
        vec![
            Transform::Identity,
            Transform::FlipH,
            Transform::FlipV,
            Transform::Rot180,
        ]
    }
}

/// A transform is retained iff it maps every free cell back into the free
/// set. Since the transform is a bijection of the whole grid and the free
/// set has fixed size, mapping free cells into the free set is equivalent to
/// mapping holes onto holes exactly.
fn preserves_free_set(board: &Board, t: Transform) -> bool {
    board
        .free_cells
        .iter()
        .all(|&cell| board.col_of(t.apply(cell, board.w, board.h)).is_some())
}

/// The retained symmetry subgroup for this board's free-cell set. Always
/// contains at least the identity.
pub fn board_symmetries(board: &Board) -> Vec<Transform> {
    candidates(board)
        .into_iter()
        .filter(|&t| preserves_free_set(board, t))
        .collect()
}
