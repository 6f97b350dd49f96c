//! Push-optimal Sokoban solver.
//!
//! Parse a level with [`parse`], then call [`solve`] to run an A* search
//! over box configurations. The result distinguishes a found solution, a
//! proof that none exists, and a search that gave up early.

pub mod bits;
pub mod deadlocks;
pub mod heuristic;
pub mod hungarian;
pub mod level;
pub mod levels;
pub mod pqueue;
pub mod reachable;
pub mod solution;
pub mod solver;
pub mod state;
pub mod zobrist;

pub use level::{Level, LevelError, parse};
pub use solution::{Move, MoveKind, PushAction, Solution};
pub use solver::{
    AbortReason, NoObserver, Observer, SolveOpts, SolveResult, Solver, solve, solve_with_observer,
};
