#![warn(clippy::pedantic)]
#![allow(
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::cast_possible_truncation
)]

//! A three phase reduction solver for the 4x4x4 cube.
//!
//! Phase 1 reduces the cube (centers solved, every edge paired), phase 2
//! solves the result as a 3x3x3 and phase 3 corrects the permutation parity
//! that only exists on even-layered cubes.

pub mod canonical_fsm;
pub mod centers;
pub mod config;
pub mod coord;
pub mod cube;
pub mod moves;
pub mod pairing;
pub mod parity;
pub mod pruning;
pub mod scramble;
pub mod search;
pub mod solver;
pub mod tables;
pub mod three_by_three;

use std::sync::OnceLock;

pub use config::SolverConfig;
pub use cube::{Face, FaceletCube, FaceletError};
pub use moves::{Alg, Layer, Move, MoveParseError};
pub use scramble::RandomState;
pub use search::SearchError;
pub use solver::{SolveError, Solver};
pub use tables::Tables;

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Build the process wide tables. Only the first call does any work; every
/// later call returns the same tables.
pub fn init() -> &'static Tables {
    TABLES.get_or_init(Tables::new)
}

/// Solve the cube obtained by applying `scramble` to the solved cube.
///
/// # Errors
///
/// See [`Solver::solve`].
pub fn solve(scramble: &str) -> Result<Alg, SolveError> {
    Solver::new(init()).solve(scramble)
}

/// Solve a cube given as a 96 character facelet string.
///
/// # Errors
///
/// See [`Solver::solution`].
pub fn solution(facelets: &str) -> Result<Alg, SolveError> {
    Solver::new(init()).solution(facelets)
}

/// Generate and solve a random cube.
///
/// # Errors
///
/// See [`Solver::random_state`].
pub fn random_state(rng: &mut fastrand::Rng) -> Result<RandomState, SolveError> {
    Solver::new(init()).random_state(rng)
}
