//! Canonicalizer & cross-solution dedup (spec §4.6).
//!
//! For each retained board-symmetry transform, every placement's cells are
//! mapped through it, re-sorted, and the placement list itself re-sorted
//! lexicographically by cell sequence (tile-type index as tiebreaker), then
//! serialized. The canonical form is the lexicographically smallest
//! serialization over the whole retained group. Only transforms that
//! preserve the free set participate — spec §9's open question about the
//! source's guarded early `continue` is resolved in favor of strict
//! invariance, so asymmetric holes never contribute a partial/approximate
//! canonicalization.

use rustc_hash::FxHashSet;

use crate::board::Board;
use crate::problem::{Coord, Placement};
use crate::symmetry::{self, Transform};

fn serialize_under(board: &Board, t: Transform, layout: &[Placement]) -> String {
    let mut rows: Vec<(Vec<Coord>, usize)> = layout
        .iter()
        .map(|p| {
            let mut cells: Vec<Coord> = p
                .cells
                .iter()
                .map(|&c| t.apply(c, board.w, board.h))
                .collect();
            cells.sort_by_key(|&(x, y)| (y, x));
            (cells, p.ti)
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut out = String::new();
    for (cells, ti) in &rows {
        out.push_str(&ti.to_string());
        out.push(':');
        for &(x, y) in cells {
            out.push_str(&x.to_string());
            out.push(',');
            out.push_str(&y.to_string());
            out.push(';');
        }
        out.push('|');
    }
    out
}

/// Computes the canonical form of a completed layout under the board's
/// retained symmetry group.
pub fn canonical_form(board: &Board, symmetries: &[Transform], layout: &[Placement]) -> String {
    symmetries
        .iter()
        .map(|&t| serialize_under(board, t, layout))
        .min()
        .expect("symmetry group always contains at least the identity")
}

/// Tracks distinct canonical layouts seen so far during enumeration.
pub struct Dedup<'a> {
    board: &'a Board,
    symmetries: Vec<Transform>,
    seen: FxHashSet<String>,
}

impl<'a> Dedup<'a> {
    pub fn new(board: &'a Board) -> Self {
        Dedup {
            board,
            symmetries: symmetry::board_symmetries(board),
            seen: FxHashSet::default(),
        }
    }

    /// Inserts `layout`'s canonical form. Returns `true` if this is a newly
    /// seen canonical layout, `false` if it's a duplicate of one already
    /// recorded.
    pub fn insert(&mut self, layout: &[Placement]) -> bool {
        let key = canonical_form(self.board, &self.symmetries, layout);
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}
