use crate::{
    canonical_fsm::{CanonicalFSM, CanonicalFSMState},
    success, working,
};
use log::{Level, debug, log_enabled};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{phase} found no solution within {max_depth} moves")]
    Exhausted { phase: &'static str, max_depth: u8 },
}

/// A search problem over a coordinate space. Moves are numbered
/// `0..num_moves()` and tried in that order.
pub trait Phase {
    type State: Copy;

    fn name(&self) -> &'static str;

    fn num_moves(&self) -> usize;

    /// Moves in the same class must compose to another move of the class or
    /// to the identity. Commutation between classes is encoded in
    /// [`Phase::canonical_fsm`].
    fn move_class(&self, move_index: usize) -> usize;

    fn canonical_fsm(&self) -> &CanonicalFSM;

    fn apply(&self, state: Self::State, move_index: usize) -> Self::State;

    /// A lower bound on the number of moves to any goal state. It must be
    /// zero on every goal state.
    fn heuristic(&self, state: Self::State) -> u8;

    fn is_goal(&self, state: Self::State) -> bool {
        self.heuristic(state) == 0
    }
}

/// The return type of the IDA* recursion. Zero means that a solution was
/// found, hence `AdmissibleGoalHeuristic::SOLVED`.
#[derive(PartialEq, Copy, Clone)]
struct AdmissibleGoalHeuristic(u8);

impl AdmissibleGoalHeuristic {
    const SOLVED: Self = Self(0);
}

struct SearchMutable {
    path: Vec<usize>,
    solution: Option<Vec<usize>>,
    nodes_visited: u64,
}

/// One bounded depth first pass of [iterative deepening A*][IDA].
///
/// Branches whose heuristic exceeds the remaining budget are cut, the
/// canonical FSM skips redundant orderings of commuting moves, and pathmax
/// lets a large child heuristic prune its parent. The return value is a lower
/// bound on the distance from `state` to a goal.
///
/// [IDA]: https://en.wikipedia.org/wiki/Iterative_deepening_A*
fn search_for_solution<P: Phase>(
    phase: &P,
    mutable: &mut SearchMutable,
    state: P::State,
    current_fsm_state: CanonicalFSMState,
    mut permitted_cost: u8,
) -> AdmissibleGoalHeuristic {
    if log_enabled!(Level::Debug) {
        mutable.nodes_visited += 1;
    }

    let admissible_prune_cost = phase.heuristic(state);
    if admissible_prune_cost > permitted_cost {
        return AdmissibleGoalHeuristic(admissible_prune_cost);
    }
    if permitted_cost == 0 {
        if phase.is_goal(state) {
            mutable.solution = Some(mutable.path.clone());
            return AdmissibleGoalHeuristic::SOLVED;
        }
        return AdmissibleGoalHeuristic(1);
    }

    permitted_cost -= 1;
    let canonical_fsm = phase.canonical_fsm();
    for move_index in 0..phase.num_moves() {
        let Some(next_fsm_state) =
            canonical_fsm.next_state(current_fsm_state, phase.move_class(move_index))
        else {
            continue;
        };

        mutable.path.push(move_index);
        let child_admissible_goal_heuristic = search_for_solution(
            phase,
            mutable,
            phase.apply(state, move_index),
            next_fsm_state,
            permitted_cost,
        );
        if mutable.solution.is_some() {
            return AdmissibleGoalHeuristic::SOLVED;
        }
        mutable.path.pop();

        // Pathmax. Written with a plus two so that it cannot overflow.
        if child_admissible_goal_heuristic.0 > permitted_cost + 2 {
            return AdmissibleGoalHeuristic(child_admissible_goal_heuristic.0 - 1);
        }
    }

    AdmissibleGoalHeuristic(admissible_prune_cost.max(1))
}

/// Find the first shortest move sequence, as move indices of `phase`, taking
/// `start` to a goal state.
///
/// # Errors
///
/// Fails with [`SearchError::Exhausted`] if every solution is longer than
/// `max_depth`.
pub fn search<P: Phase>(
    phase: &P,
    start: P::State,
    max_depth: u8,
) -> Result<Vec<usize>, SearchError> {
    let search_start = Instant::now();
    let mut mutable = SearchMutable {
        path: Vec::with_capacity(usize::from(max_depth)),
        solution: None,
        nodes_visited: 0,
    };

    let exhausted = SearchError::Exhausted {
        phase: phase.name(),
        max_depth,
    };
    let mut depth = phase.heuristic(start);
    if depth > max_depth {
        return Err(exhausted);
    }
    loop {
        debug!(working!("{}: searching depth {}..."), phase.name(), depth);
        let depth_start = Instant::now();
        mutable.nodes_visited = 0;
        search_for_solution(
            phase,
            &mut mutable,
            start,
            CanonicalFSMState::default(),
            depth,
        );
        debug!(
            working!("{}: traversed {} nodes in {:.3}s"),
            phase.name(),
            mutable.nodes_visited,
            depth_start.elapsed().as_secs_f64()
        );
        if let Some(solution) = mutable.solution.take() {
            debug!(
                success!("{}: solution found in {:.3}s at depth {}"),
                phase.name(),
                search_start.elapsed().as_secs_f64(),
                depth
            );
            return Ok(solution);
        }
        if depth == max_depth {
            return Err(exhausted);
        }
        depth += 1;
    }
}
