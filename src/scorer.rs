//! Balance scorer (spec §4.7).
//!
//! Computes a nonnegative aesthetic-balance score for a completed layout:
//! tile-mix variance, horizontal/vertical orientation imbalance, seam-run
//! penalties, and four-corner joint crosses. Never mutates its input.

use std::collections::HashMap;

use crate::board::Board;
use crate::geometry;
use crate::problem::{BalanceWeights, Layout};

const EPSILON: f64 = 1e-9;

/// Builds an `H x W` grid of layout-placement indices, `-1` for holes.
fn placement_grid(board: &Board, layout: &Layout) -> Vec<Vec<i64>> {
    let mut grid = vec![vec![-1i64; board.w as usize]; board.h as usize];
    for (idx, placement) in layout.iter().enumerate() {
        for &(x, y) in &placement.cells {
            grid[y as usize][x as usize] = idx as i64;
        }
    }
    grid
}

/// Per-tile-type-name placement counts.
fn counts_by_name(layout: &Layout, names: &[String]) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for placement in layout {
        let name = names[placement.ti].clone();
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
}

/// `(horizontal, vertical)` placement tallies by bounding-box shape. A
/// placement whose bounding box is square counts toward neither.
fn orientation_tally(layout: &Layout) -> (u32, u32) {
    let (mut horiz, mut vert) = (0u32, 0u32);
    for placement in layout {
        let normalized = geometry::normalize(&placement.cells);
        let (w, h) = geometry::bounding_box(&normalized);
        if w > h {
            horiz += 1;
        } else if h > w {
            vert += 1;
        }
    }
    (horiz, vert)
}

/// Coefficient-of-variation squared (no target mix), or squared L2 distance
/// between normalized actual/target proportions (target mix given).
fn mix_error(
    counts: &HashMap<String, u32>,
    desired_mix: Option<&HashMap<String, f64>>,
) -> f64 {
    if let Some(target) = desired_mix {
        let target_total: f64 = target.values().sum();
        let actual_total: f64 = counts.values().map(|&c| c as f64).sum();
        if target_total <= 0.0 || actual_total <= 0.0 {
            return 0.0;
        }
        let mut names: Vec<&String> = target.keys().chain(counts.keys()).collect();
        names.sort();
        names.dedup();

        let mut sum_sq = 0.0;
        for name in names {
            let actual_p = *counts.get(name).unwrap_or(&0) as f64 / actual_total;
            let target_p = *target.get(name).unwrap_or(&0.0) / target_total;
            let diff = actual_p - target_p;
            sum_sq += diff * diff;
        }
        sum_sq
    } else {
        let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
        if values.is_empty() {
            return 0.0;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance / (mean * mean + EPSILON)
    }
}

fn orientation_error(horiz: u32, vert: u32) -> f64 {
    if horiz == 0 && vert == 0 {
        return 0.0;
    }
    (horiz as f64 - vert as f64).abs() / (horiz + vert) as f64
}

/// For each row and column, scans consecutive same-direction cells that
/// belong to different placements; any run longer than 1 adds `0.2 * run`.
fn seam_penalty(board: &Board, grid: &[Vec<i64>]) -> f64 {
    let mut penalty = 0.0;

    // Horizontal runs: consecutive cells in a row whose neighbor belongs to
    // a different placement.
    for y in 0..board.h as usize {
        let mut run = 0u32;
        for x in 1..board.w as usize {
            let left = grid[y][x - 1];
            let right = grid[y][x];
            if left != -1 && right != -1 && left != right {
                run += 1;
            } else {
                if run > 1 {
                    penalty += 0.2 * run as f64;
                }
                run = 0;
            }
        }
        if run > 1 {
            penalty += 0.2 * run as f64;
        }
    }

    // Vertical runs: same idea down a column.
    for x in 0..board.w as usize {
        let mut run = 0u32;
        for y in 1..board.h as usize {
            let above = grid[y - 1][x];
            let below = grid[y][x];
            if above != -1 && below != -1 && above != below {
                run += 1;
            } else {
                if run > 1 {
                    penalty += 0.2 * run as f64;
                }
                run = 0;
            }
        }
        if run > 1 {
            penalty += 0.2 * run as f64;
        }
    }

    penalty
}

/// Counts 2x2 windows whose four cells belong to 3 or more distinct
/// placements.
fn cross_joints(board: &Board, grid: &[Vec<i64>]) -> u32 {
    let mut crosses = 0;
    for y in 0..(board.h as usize).saturating_sub(1) {
        for x in 0..(board.w as usize).saturating_sub(1) {
            let mut ids: Vec<i64> = vec![grid[y][x], grid[y][x + 1], grid[y + 1][x], grid[y + 1][x + 1]];
            ids.retain(|&id| id != -1);
            ids.sort_unstable();
            ids.dedup();
            if ids.len() >= 3 {
                crosses += 1;
            }
        }
    }
    crosses
}

/// Computes the balance score for a completed layout. `tile_names[ti]` is
/// the tile type name for index `ti`.
pub fn score(
    board: &Board,
    layout: &Layout,
    tile_names: &[String],
    weights: &BalanceWeights,
    desired_mix: Option<&HashMap<String, f64>>,
) -> f64 {
    let counts = counts_by_name(layout, tile_names);
    let (horiz, vert) = orientation_tally(layout);
    let grid = placement_grid(board, layout);

    let mix_err = mix_error(&counts, desired_mix);
    let orient_err = orientation_error(horiz, vert);
    let seam = seam_penalty(board, &grid);
    let crosses = cross_joints(board, &grid) as f64 * 0.1;

    weights.tile_count_variance * mix_err
        + weights.orientation_balance * orient_err
        + weights.seam_penalty * seam
        + weights.cross_joints * crosses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Placement;

    fn weights() -> BalanceWeights {
        BalanceWeights {
            tile_count_variance: 1.0,
            orientation_balance: 1.0,
            seam_penalty: 1.0,
            cross_joints: 1.0,
        }
    }

    #[test]
    fn score_is_nonnegative_and_input_untouched() {
        let board = Board::new(4, 2, &[]).unwrap();
        let layout: Layout = vec![
            Placement {
                ti: 0,
                cells: vec![(0, 0), (1, 0), (2, 0)],
            },
            Placement {
                ti: 0,
                cells: vec![(3, 0), (3, 1)],
            },
            Placement {
                ti: 0,
                cells: vec![(0, 1), (1, 1), (2, 1)],
            },
        ];
        let before = layout.clone();
        let names = vec!["triomino".to_string()];
        let s = score(&board, &layout, &names, &weights(), None);
        assert!(s >= 0.0);
        assert_eq!(layout, before);
    }

    #[test]
    fn all_same_orientation_has_zero_orientation_error() {
        let (h, v) = orientation_tally(&vec![
            Placement {
                ti: 0,
                cells: vec![(0, 0), (1, 0), (2, 0)],
            },
            Placement {
                ti: 0,
                cells: vec![(0, 1), (1, 1), (2, 1)],
            },
        ]);
        assert_eq!(orientation_error(h, v), 0.0);
    }

    #[test]
    fn four_way_cross_joint_is_detected() {
        let board = Board::new(2, 2, &[]).unwrap();
        let layout: Layout = vec![
            Placement { ti: 0, cells: vec![(0, 0)] },
            Placement { ti: 0, cells: vec![(1, 0)] },
            Placement { ti: 0, cells: vec![(0, 1)] },
            Placement { ti: 0, cells: vec![(1, 1)] },
        ];
        let grid = placement_grid(&board, &layout);
        assert_eq!(cross_joints(&board, &grid), 1);
    }

    #[test]
    fn mix_error_zero_for_single_uniform_type() {
        let mut counts = HashMap::new();
        counts.insert("a".to_string(), 4u32);
        assert_eq!(mix_error(&counts, None), 0.0);
    }

    #[test]
    fn mix_error_matches_desired_mix_when_proportions_equal() {
        let mut counts = HashMap::new();
        counts.insert("a".to_string(), 2u32);
        counts.insert("b".to_string(), 2u32);
        let mut target = HashMap::new();
        target.insert("a".to_string(), 1.0);
        target.insert("b".to_string(), 1.0);
        assert!(mix_error(&counts, Some(&target)) < 1e-9);
    }
}
