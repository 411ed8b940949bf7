//! Sequencing of the three phases.

use crate::{
    config::SolverConfig,
    cube::{FaceletCube, FaceletError},
    moves::{Alg, Move, MoveParseError},
    parity::{oll_parity_fix, pll_parity_fix},
    scramble::{RandomState, random_scramble},
    search::{Phase, SearchError},
    start, success,
    tables::Tables,
    three_by_three::CubieCube,
    working,
};
use log::{debug, info};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error(transparent)]
    Facelet(#[from] FaceletError),
    #[error(transparent)]
    MoveParse(#[from] MoveParseError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("The cube is still unsolved after the parity correction")]
    UnresolvedParity,
}

/// Where a solve is. Every state carries the cube after the moves found so
/// far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveState {
    Raw {
        cube: FaceletCube,
    },
    /// Centers solved, edges paired and the dedge flip even.
    Phase1Reduced {
        cube: FaceletCube,
        moves: Vec<Move>,
    },
    /// Solved as a 3x3x3, up to two exchanged dedges.
    Phase2Solved {
        cube: FaceletCube,
        moves: Vec<Move>,
    },
    ParityChecked {
        cube: FaceletCube,
        moves: Vec<Move>,
    },
    Done(Alg),
}

/// A solver over a borrowed set of tables. Solvers are cheap, and any
/// number of them may share the tables across threads.
#[derive(Clone, Copy, Debug)]
pub struct Solver<'t> {
    tables: &'t Tables,
    config: SolverConfig,
}

impl<'t> Solver<'t> {
    #[must_use]
    pub fn new(tables: &'t Tables) -> Self {
        Self::with_config(tables, SolverConfig::default())
    }

    #[must_use]
    pub fn with_config(tables: &'t Tables, config: SolverConfig) -> Self {
        Self { tables, config }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve the cube that `scramble` produces from solved.
    ///
    /// # Errors
    ///
    /// Fails on malformed moves, or with a defect class error if a phase
    /// goes wrong.
    pub fn solve(&self, scramble: &str) -> Result<Alg, SolveError> {
        let scramble: Alg = scramble.parse()?;
        self.solve_cube(FaceletCube::from_alg(&scramble))
    }

    /// Solve a cube given by its 96 facelets.
    ///
    /// # Errors
    ///
    /// Fails on malformed or unreachable facelets, or with a defect class
    /// error if a phase goes wrong.
    pub fn solution(&self, facelets: &str) -> Result<Alg, SolveError> {
        self.solve_cube(facelets.parse()?)
    }

    /// Generate a random cube from `scramble_length` random moves and solve
    /// it.
    ///
    /// # Errors
    ///
    /// Only with a defect class error.
    pub fn random_state(&self, rng: &mut fastrand::Rng) -> Result<RandomState, SolveError> {
        let scramble = random_scramble(rng, self.config.scramble_length);
        let cube = FaceletCube::from_alg(&scramble);
        let solution = self.solve_cube(cube)?;
        Ok(RandomState {
            scramble,
            facelets: cube.to_string(),
            solution,
        })
    }

    /// Run every phase on `cube`.
    ///
    /// # Errors
    ///
    /// See [`Solver::step`].
    pub fn solve_cube(&self, cube: FaceletCube) -> Result<Alg, SolveError> {
        let start = Instant::now();
        let mut state = SolveState::Raw { cube };
        loop {
            state = match self.step(state)? {
                SolveState::Done(solution) => {
                    info!(
                        success!("Solved in {} moves in {:.3}s"),
                        solution.len(),
                        start.elapsed().as_secs_f64()
                    );
                    return Ok(solution);
                }
                next => next,
            };
        }
    }

    /// Advance a solve by one phase.
    ///
    /// # Errors
    ///
    /// Fails if a search is exhausted, if the reduced cube cannot be read, or
    /// if parity correction leaves the cube unsolved. None of these happen
    /// for a valid cube.
    pub fn step(&self, state: SolveState) -> Result<SolveState, SolveError> {
        let max_depth = self.config.max_phase_depth;
        Ok(match state {
            SolveState::Raw { mut cube } => {
                info!(start!("Phase 1: reducing"));
                let mut moves = vec![];
                for stage in self.tables.centers.stages() {
                    let stage_moves = stage.solve(&cube, max_depth)?;
                    debug!(working!("{}: {} moves"), stage.name(), stage_moves.len());
                    cube = cube.apply_moves(&stage_moves);
                    moves.extend(stage_moves);
                }

                let pairing_moves = self.tables.pairing.pair(cube.wing_positions()?, max_depth)?;
                debug!(working!("Edge pairing: {} moves"), pairing_moves.len());
                cube = cube.apply_moves(&pairing_moves);
                moves.extend(pairing_moves);

                let fix = oll_parity_fix(&cube)?;
                if !fix.is_empty() {
                    debug!(working!("Correcting OLL parity"));
                    cube = cube.apply_moves(&fix);
                    moves.extend(fix);
                }
                SolveState::Phase1Reduced { cube, moves }
            }
            SolveState::Phase1Reduced { cube, mut moves } => {
                info!(start!("Phase 2: solving as a 3x3x3"));
                let three_moves = self
                    .tables
                    .three_by_three
                    .solve(&CubieCube::from_cube(&cube)?, max_depth)?;
                let cube = cube.apply_moves(&three_moves);
                moves.extend(three_moves);
                SolveState::Phase2Solved { cube, moves }
            }
            SolveState::Phase2Solved { cube, mut moves } => {
                info!(start!("Phase 3: checking parity"));
                let fix = pll_parity_fix(&cube)?;
                if !fix.is_empty() {
                    debug!(working!("Correcting PLL parity"));
                }
                let cube = cube.apply_moves(&fix);
                if !cube.is_solved() {
                    return Err(SolveError::UnresolvedParity);
                }
                moves.extend(fix);
                SolveState::ParityChecked { cube, moves }
            }
            SolveState::ParityChecked { moves, .. } => SolveState::Done(Alg::new(moves).merged()),
            done @ SolveState::Done(_) => done,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> Solver<'static> {
        Solver::new(crate::init())
    }

    #[test_log::test]
    fn test_state_machine_order() {
        let solver = solver();
        let cube = FaceletCube::from_alg(&"Rw U2 r' F d2 B".parse().unwrap());
        let mut state = SolveState::Raw { cube };
        let mut names = vec![];
        while !matches!(state, SolveState::Done(_)) {
            state = solver.step(state).unwrap();
            names.push(match &state {
                SolveState::Raw { .. } => "raw",
                SolveState::Phase1Reduced { cube, .. } => {
                    assert!(CubieCube::from_cube(cube).is_ok());
                    "reduced"
                }
                SolveState::Phase2Solved { .. } => "solved",
                SolveState::ParityChecked { cube, .. } => {
                    assert!(cube.is_solved());
                    "checked"
                }
                SolveState::Done(_) => "done",
            });
        }
        assert_eq!(names, ["reduced", "solved", "checked", "done"]);
        let SolveState::Done(solution) = state else {
            unreachable!()
        };
        assert!(cube.apply_alg(&solution).is_solved());
    }

    #[test_log::test]
    fn test_unresolved_parity() {
        // A reduced cube whose 3x3x3 part is unsolved reaches phase 3 wrongly
        let cube = FaceletCube::from_alg(&"R U".parse().unwrap());
        let state = SolveState::Phase2Solved {
            cube,
            moves: vec![],
        };
        assert_eq!(solver().step(state), Err(SolveError::UnresolvedParity));
    }

    #[test_log::test]
    fn test_exhausted_depth() {
        let tables = crate::init();
        let config = SolverConfig {
            max_phase_depth: 2,
            ..SolverConfig::default()
        };
        let solver = Solver::with_config(tables, config);
        assert!(matches!(
            solver.solve("Rw U2 r' F d2 B l' D2 f u"),
            Err(SolveError::Search(SearchError::Exhausted { .. }))
        ));
    }
}
