//! Wire-level request/response types for the `Solve` message (spec §6) plus
//! the domain types shared across the pipeline (tile types, placements,
//! layouts, progress events).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SolveError;

/// A single cell coordinate, `(x, y)`.
pub type Coord = (i32, i32);

/// One tile type in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileType {
    /// Identifier used for mix accounting; not required to be unique, but
    /// usually is.
    pub name: String,
    /// The shape in some canonical position. Non-empty, distinct cells.
    pub base: Vec<Coord>,
    /// Whether 90-degree rotations are distinct orientations to enumerate.
    #[serde(default)]
    pub allow_rotate: bool,
    /// Whether a mirror flip is also enumerated.
    #[serde(default)]
    pub allow_reflect: bool,
    /// Stock limit; `None` denotes unbounded stock.
    #[serde(default)]
    pub count: Option<u32>,
}

impl TileType {
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.base.is_empty() {
            return Err(SolveError::InvalidTileType {
                name: self.name.clone(),
                reason: "base shape is empty".into(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for &cell in &self.base {
            if !seen.insert(cell) {
                return Err(SolveError::InvalidTileType {
                    name: self.name.clone(),
                    reason: format!("duplicate cell {cell:?} in base shape"),
                });
            }
        }
        Ok(())
    }

    /// Number of cells this tile type covers (all orientations share it).
    pub fn area(&self) -> usize {
        self.base.len()
    }

    /// Whether this type has any stock available at all.
    pub fn has_stock(&self) -> bool {
        self.count != Some(0)
    }
}

/// One concrete positioning of one tile orientation on the board.
///
/// This is the public, serializable shape used in [`SolveMessage::Result`].
/// The search engine uses a richer internal row representation
/// (see `board::PlacementRow`) and converts to this type only for completed
/// layouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub ti: usize,
    pub cells: Vec<Coord>,
}

/// An ordered list of placements whose cells partition the free set.
pub type Layout = Vec<Placement>;

/// Per-term weights for the balance scorer (spec §4.7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceWeights {
    pub tile_count_variance: f64,
    pub orientation_balance: f64,
    pub seam_penalty: f64,
    pub cross_joints: f64,
}

/// Wire-level shape of the `balance` field: either `{ noBalance: true }` or
/// the full balanced-mode configuration. Parsed into [`BalanceMode`] at the
/// system boundary rather than carried around loosely through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSpec {
    #[serde(default)]
    pub no_balance: bool,
    #[serde(default)]
    pub weights: Option<BalanceWeights>,
    #[serde(default)]
    pub desired_mix: Option<HashMap<String, f64>>,
    #[serde(default)]
    pub max_solutions_to_evaluate: Option<usize>,
}

/// The validated, internal counterpart of [`BalanceSpec`].
#[derive(Debug, Clone)]
pub enum BalanceMode {
    /// First-only mode: run search with cap 1, no scoring.
    FirstOnly,
    /// Balanced mode: enumerate up to `max_solutions_to_evaluate` distinct
    /// canonical layouts and return the lowest-scoring one.
    Balanced {
        weights: BalanceWeights,
        desired_mix: Option<HashMap<String, f64>>,
        max_solutions_to_evaluate: usize,
    },
}

impl BalanceMode {
    /// Resolves a wire-level [`BalanceSpec`] into a validated [`BalanceMode`].
    ///
    /// `fallback_cap` is the request's top-level `cap` field, used as the
    /// solution cap in balanced mode when `balance.maxSolutionsToEvaluate`
    /// itself is absent (spec §6: "cap: fallback solution cap if
    /// `balance.maxSolutionsToEvaluate` is absent").
    pub fn resolve(spec: BalanceSpec, fallback_cap: Option<usize>) -> Result<Self, SolveError> {
        if spec.no_balance {
            return Ok(BalanceMode::FirstOnly);
        }
        let weights = spec
            .weights
            .ok_or_else(|| SolveError::InvalidRequest("balanced mode requires `weights`".into()))?;
        let max_solutions_to_evaluate = spec
            .max_solutions_to_evaluate
            .or(fallback_cap)
            .ok_or_else(|| {
                SolveError::InvalidRequest(
                    "balanced mode requires `maxSolutionsToEvaluate` or a top-level `cap`".into(),
                )
            })?;
        if max_solutions_to_evaluate == 0 {
            return Err(SolveError::InvalidRequest(
                "solution cap must be at least 1".into(),
            ));
        }
        Ok(BalanceMode::Balanced {
            weights,
            desired_mix: spec.desired_mix,
            max_solutions_to_evaluate,
        })
    }
}

/// The full `Solve` request payload (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub holes: Vec<Coord>,
    pub tile_types: Vec<TileType>,
    #[serde(default)]
    pub unique_by_board_symmetry: bool,
    pub balance: BalanceSpec,
    /// Fallback solution cap if `balance.maxSolutionsToEvaluate` is absent.
    #[serde(default)]
    pub cap: Option<usize>,
    /// Optional PRNG seed for reproducible tie-breaking (spec §9 design
    /// notes: seeding must be exposed for reproducibility in tests). Not
    /// part of the original wire schema; a pure addition at the Rust
    /// boundary, defaulted so existing payloads still deserialize.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One of the four terminal/progress messages a solve call can emit (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SolveMessage {
    Infeasible {
        reasons: Vec<String>,
    },
    Result {
        found: bool,
        layout: Option<Layout>,
        score: Option<f64>,
    },
    Error {
        message: String,
    },
    Progress {
        nodes: u64,
        found: u32,
    },
}

/// A single progress tick: `nodes` decision nodes explored so far, `found`
/// distinct layouts retained so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub nodes: u64,
    pub found: u32,
}

impl From<ProgressEvent> for SolveMessage {
    fn from(event: ProgressEvent) -> Self {
        SolveMessage::Progress {
            nodes: event.nodes,
            found: event.found,
        }
    }
}

/// Destination for progress events emitted during a solve (spec §5).
///
/// Implemented for `()` (no-op), for `Vec<ProgressEvent>` so tests can assert
/// the monotonicity invariant (spec §8) directly against a recorded
/// sequence, and for [`ClosureSink`] to adapt an arbitrary closure.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl ProgressSink for () {
    fn emit(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn emit(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

/// Adapts a plain `FnMut(ProgressEvent)` closure into a [`ProgressSink`].
pub struct ClosureSink<F>(pub F);

impl<F> ProgressSink for ClosureSink<F>
where
    F: FnMut(ProgressEvent),
{
    fn emit(&mut self, event: ProgressEvent) {
        (self.0)(event)
    }
}
