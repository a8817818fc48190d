//! 2D rotation and normalization utilities (spec §4.1).
//!
//! A rectangular tile shape has at most 8 distinct orientations (the
//! dihedral group D4: 4 rotations, each optionally reflected). Unlike a cube
//! (24 orientations, no reflection without leaving 3-space), a flat tile
//! genuinely gains new orientations from mirroring, so `allowReflect` is a
//! real per-tile-type switch rather than always-on.

use crate::problem::Coord;

/// Rotates `(x, y)` by 90 degrees: `(x, y) -> (-y, x)`.
fn rotate90(cells: &[Coord]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| (-y, x)).collect()
}

/// Reflects `(x, y)` across the y-axis: `(x, y) -> (-x, y)`.
fn reflect(cells: &[Coord]) -> Vec<Coord> {
    cells.iter().map(|&(x, y)| (-x, y)).collect()
}

/// Translates cells so the minimum x and y are both zero, then sorts by
/// `(y, x)`.
///
/// Normalizing an already-normalized shape is a fixed point, and two shapes
/// that differ only by translation normalize to the same result — both
/// properties fall directly out of subtracting the minimum and sorting.
pub fn normalize(cells: &[Coord]) -> Vec<Coord> {
    let min_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
    let min_y = cells.iter().map(|&(_, y)| y).min().unwrap_or(0);
    let mut out: Vec<Coord> = cells.iter().map(|&(x, y)| (x - min_x, y - min_y)).collect();
    out.sort_by_key(|&(x, y)| (y, x));
    out
}

/// Computes the distinct normalized orientations of `base` under the
/// requested rotation/reflection freedoms.
///
/// Always includes the identity orientation. Deduplicates by the normalized
/// cell sequence, so a symmetric tile (e.g. a 2x2 square) yields fewer than
/// the full 4 or 8 candidate orientations.
pub fn orientations(base: &[Coord], allow_rotate: bool, allow_reflect: bool) -> Vec<Vec<Coord>> {
    let mut candidates: Vec<Vec<Coord>> = vec![base.to_vec()];

    if allow_rotate {
        let mut current = base.to_vec();
        for _ in 0..3 {
            current = rotate90(&current);
            candidates.push(current.clone());
        }
    }

    if allow_reflect {
        let mirrored: Vec<Vec<Coord>> = candidates.iter().map(|c| reflect(c)).collect();
        candidates.extend(mirrored);
    }

    let mut normalized: Vec<Vec<Coord>> = candidates.iter().map(|c| normalize(c)).collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// Bounding-box size `(width, height)` of an already-normalized orientation.
pub fn bounding_box(cells: &[Coord]) -> (i32, i32) {
    let max_x = cells.iter().map(|&(x, _)| x).max().unwrap_or(0);
    let max_y = cells.iter().map(|&(_, y)| y).max().unwrap_or(0);
    (max_x + 1, max_y + 1)
}
