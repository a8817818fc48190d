//! Top-level dispatch (spec §4.8): validates the request, runs the
//! pre-flight oracle, enumerates placements, then runs the exact-cover
//! search in either first-only or balanced mode.

use crate::board::{self, Board};
use crate::canonical::Dedup;
use crate::error::SolveError;
use crate::preflight;
use crate::problem::{BalanceMode, Layout, ProgressSink, SolveMessage, SolveRequest};
use crate::scorer;
use crate::search::{self, Mode};

const DEFAULT_SEED: u64 = 0x5151_c0de;

/// Runs one `Solve` request to completion, converting any internal failure
/// into [`SolveMessage::Error`] rather than propagating a `Result` — the
/// external interface has no error channel other than that message variant.
pub fn solve(request: &SolveRequest, progress: &mut dyn ProgressSink) -> SolveMessage {
    match try_solve(request, progress) {
        Ok(message) => message,
        Err(err) => SolveMessage::Error {
            message: err.to_string(),
        },
    }
}

fn try_solve(
    request: &SolveRequest,
    progress: &mut dyn ProgressSink,
) -> Result<SolveMessage, SolveError> {
    for tt in &request.tile_types {
        tt.validate()?;
    }

    let board = Board::new(request.w, request.h, &request.holes)?;

    let reasons = preflight::run(&board, &request.tile_types);
    if !reasons.is_empty() {
        return Ok(SolveMessage::Infeasible { reasons });
    }

    let table = board::build_placements(&board, &request.tile_types)?;
    let mode = BalanceMode::resolve(request.balance.clone(), request.cap)?;
    let seed = request.seed.unwrap_or(DEFAULT_SEED);
    let tile_names: Vec<String> = request.tile_types.iter().map(|t| t.name.clone()).collect();

    match mode {
        BalanceMode::FirstOnly => {
            let mut dedup = request
                .unique_by_board_symmetry
                .then(|| Dedup::new(&board));
            let mut results = search::run(
                &board,
                &table,
                &request.tile_types,
                Mode::FirstOnly,
                seed,
                dedup.as_mut(),
                progress,
            );
            Ok(match results.pop() {
                Some(layout) => SolveMessage::Result {
                    found: true,
                    layout: Some(layout),
                    score: None,
                },
                None => no_layout_found(),
            })
        }
        BalanceMode::Balanced {
            weights,
            desired_mix,
            max_solutions_to_evaluate,
        } => {
            let mut dedup = request
                .unique_by_board_symmetry
                .then(|| Dedup::new(&board));
            let layouts = search::run(
                &board,
                &table,
                &request.tile_types,
                Mode::Enumerate {
                    cap: max_solutions_to_evaluate,
                },
                seed,
                dedup.as_mut(),
                progress,
            );

            let best = pick_best(&board, layouts, &tile_names, &weights, desired_mix.as_ref());
            Ok(match best {
                Some((layout, score)) => SolveMessage::Result {
                    found: true,
                    layout: Some(layout),
                    score: Some(score),
                },
                None => no_layout_found(),
            })
        }
    }
}

/// The search exhausted with no layout after pre-flight passed (spec §4.5,
/// §7 "infeasible by search"). Reported as a single generic reason, the same
/// `infeasible` message kind pre-flight failures use (spec §6) — a host
/// dispatching on the `type` tag must not see this as a successful,
/// empty-handed `result`.
fn no_layout_found() -> SolveMessage {
    SolveMessage::Infeasible {
        reasons: vec!["no exact layout found".to_string()],
    }
}

/// Scores every retained layout and returns the lowest-scoring one, paired
/// with its score. `None` if `layouts` is empty.
fn pick_best(
    board: &Board,
    layouts: Vec<Layout>,
    tile_names: &[String],
    weights: &crate::problem::BalanceWeights,
    desired_mix: Option<&std::collections::HashMap<String, f64>>,
) -> Option<(Layout, f64)> {
    layouts
        .into_iter()
        .map(|layout| {
            let s = scorer::score(board, &layout, tile_names, weights, desired_mix);
            (layout, s)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).expect("scores are always finite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{BalanceSpec, TileType};

    fn domino() -> TileType {
        TileType {
            name: "domino".into(),
            base: vec![(0, 0), (1, 0)],
            allow_rotate: true,
            allow_reflect: false,
            count: None,
        }
    }

    #[test]
    fn infeasible_board_reports_reasons_without_searching() {
        let request = SolveRequest {
            w: 3,
            h: 3,
            holes: vec![],
            tile_types: vec![domino()],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: true,
                weights: None,
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: None,
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        assert!(matches!(message, SolveMessage::Infeasible { .. }));
    }

    #[test]
    fn first_only_two_by_two_finds_a_layout() {
        let request = SolveRequest {
            w: 2,
            h: 2,
            holes: vec![],
            tile_types: vec![domino()],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: true,
                weights: None,
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: None,
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        match message {
            SolveMessage::Result { found, layout, score } => {
                assert!(found);
                assert!(layout.is_some());
                assert!(score.is_none());
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn balanced_mode_requires_a_cap_from_somewhere() {
        let request = SolveRequest {
            w: 2,
            h: 2,
            holes: vec![],
            tile_types: vec![domino()],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: false,
                weights: Some(crate::problem::BalanceWeights {
                    tile_count_variance: 1.0,
                    orientation_balance: 1.0,
                    seam_penalty: 1.0,
                    cross_joints: 1.0,
                }),
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: None,
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        assert!(matches!(message, SolveMessage::Error { .. }));
    }

    #[test]
    fn balanced_mode_falls_back_to_top_level_cap() {
        let request = SolveRequest {
            w: 2,
            h: 2,
            holes: vec![],
            tile_types: vec![domino()],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: false,
                weights: Some(crate::problem::BalanceWeights {
                    tile_count_variance: 1.0,
                    orientation_balance: 1.0,
                    seam_penalty: 1.0,
                    cross_joints: 1.0,
                }),
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: Some(4),
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        match message {
            SolveMessage::Result { found, score, .. } => {
                assert!(found);
                assert!(score.is_some());
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn six_by_four_mixed_catalog_tiles_with_triominoes_only() {
        let request = SolveRequest {
            w: 6,
            h: 4,
            holes: vec![],
            tile_types: vec![
                TileType {
                    name: "triomino".into(),
                    base: vec![(0, 0), (1, 0), (2, 0)],
                    allow_rotate: true,
                    allow_reflect: false,
                    count: None,
                },
                TileType {
                    name: "domino".into(),
                    base: vec![(0, 0), (1, 0)],
                    allow_rotate: true,
                    allow_reflect: false,
                    count: Some(0),
                },
            ],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: true,
                weights: None,
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: None,
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        match message {
            SolveMessage::Result { found, layout, score } => {
                assert!(found);
                let layout = layout.expect("found implies a layout");
                assert_eq!(layout.len(), 8);
                assert!(layout.iter().all(|p| p.ti == 0));
                assert!(score.is_none());
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn search_exhaustion_after_preflight_pass_reports_infeasible() {
        // Two isolated free cells, each with a differently-colored checkerboard
        // partner so global parity balances, but too far apart for any domino
        // to ever cover both: pre-flight passes every check, yet no placement
        // touching either cell exists, so the search exhausts empty-handed.
        let request = SolveRequest {
            w: 5,
            h: 1,
            holes: vec![(1, 0), (2, 0), (4, 0)],
            tile_types: vec![domino()],
            unique_by_board_symmetry: false,
            balance: BalanceSpec {
                no_balance: true,
                weights: None,
                desired_mix: None,
                max_solutions_to_evaluate: None,
            },
            cap: None,
            seed: Some(1),
        };
        let message = solve(&request, &mut ());
        match message {
            SolveMessage::Infeasible { reasons } => {
                assert_eq!(reasons, vec!["no exact layout found".to_string()]);
            }
            other => panic!("expected Infeasible, got {other:?}"),
        }
    }
}
