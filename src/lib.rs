//! Patio Tiling Planner Core
//!
//! Given a board (a rectangle with optional holes) and a catalog of tile
//! types, either finds the first layout that exactly covers the board or
//! enumerates a bounded number of distinct layouts (up to board symmetry)
//! and returns the one with the lowest aesthetic-balance score.

pub mod board;
pub mod canonical;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod preflight;
pub mod problem;
pub mod scorer;
pub mod search;
pub mod symmetry;

pub use driver::solve;
pub use error::{SolveError, SolveResult};
pub use problem::{
    BalanceMode, BalanceSpec, BalanceWeights, ClosureSink, Coord, Layout, Placement,
    ProgressEvent, ProgressSink, SolveMessage, SolveRequest, TileType,
};
