//! A finite state machine over move classes that accepts exactly one ordering
//! of every run of commuting moves and never accepts a move class twice in a
//! row. The construction follows Lucas Garron's canonical FSM in twsearch:
//! https://github.com/cubing/twsearch/blob/main/src/rs/_internal/canonical_fsm/canonical_fsm.rs

use std::collections::HashMap;

const MAX_NUM_MOVE_CLASSES: usize = u64::BITS as usize;

// Bit N is set for move class N.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
struct MoveClassMask(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanonicalFSMState(usize);

const ILLEGAL: CanonicalFSMState = CanonicalFSMState(usize::MAX);

#[derive(Debug)]
pub struct CanonicalFSM {
    next_state_lookup: Vec<Vec<CanonicalFSMState>>,
}

impl CanonicalFSM {
    /// # Panics
    ///
    /// Panics if there are more move classes than fit in a `u64` mask. Every
    /// phase has far fewer.
    pub fn new(num_move_classes: usize, commutes: impl Fn(usize, usize) -> bool) -> Self {
        assert!(num_move_classes <= MAX_NUM_MOVE_CLASSES);

        let all = if num_move_classes == MAX_NUM_MOVE_CLASSES {
            u64::MAX
        } else {
            (1 << num_move_classes) - 1
        };
        let mut commuting = vec![MoveClassMask(all); num_move_classes];
        for i in 0..num_move_classes {
            for j in 0..num_move_classes {
                if i != j && !commutes(i, j) {
                    commuting[i].0 &= !(1 << j);
                    commuting[j].0 &= !(1 << i);
                }
            }
        }

        // A state is the set of classes played since the last move that did
        // not commute with them.
        let mut mask_to_state = HashMap::from([(MoveClassMask(0), CanonicalFSMState(0))]);
        let mut state_to_mask = vec![MoveClassMask(0)];
        let mut next_state_lookup = vec![];

        let mut queue_index = 0;
        while queue_index < state_to_mask.len() {
            let mask = state_to_mask[queue_index];
            queue_index += 1;

            let mut next_state = vec![ILLEGAL; num_move_classes];
            for (move_class, next) in next_state.iter_mut().enumerate() {
                // A higher class that commutes with this one was played, so
                // this one must have come first
                let out_of_order = (mask.0 & commuting[move_class].0) >> (move_class + 1) != 0;
                let repeated = (mask.0 >> move_class) & 1 != 0;
                if out_of_order || repeated {
                    continue;
                }

                let next_mask =
                    MoveClassMask((mask.0 & commuting[move_class].0) | (1 << move_class));
                *next = *mask_to_state.entry(next_mask).or_insert_with(|| {
                    state_to_mask.push(next_mask);
                    CanonicalFSMState(state_to_mask.len() - 1)
                });
            }
            next_state_lookup.push(next_state);
        }

        Self { next_state_lookup }
    }

    /// The state after playing a move of `move_class`, or `None` if the
    /// resulting sequence is not canonical.
    #[inline]
    pub fn next_state(
        &self,
        current_fsm_state: CanonicalFSMState,
        move_class: usize,
    ) -> Option<CanonicalFSMState> {
        match self.next_state_lookup[current_fsm_state.0][move_class] {
            ILLEGAL => None,
            state => Some(state),
        }
    }

    #[must_use]
    pub fn num_states(&self) -> usize {
        self.next_state_lookup.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four classes standing for U, D, R and L
    fn opposite_faces_commute(a: usize, b: usize) -> bool {
        a / 2 == b / 2
    }

    #[test_log::test]
    fn test_canonical_fsm_initially_all_legal() {
        let canonical_fsm = CanonicalFSM::new(4, opposite_faces_commute);
        for move_class in 0..4 {
            assert!(
                canonical_fsm
                    .next_state(CanonicalFSMState::default(), move_class)
                    .is_some()
            );
        }
    }

    #[test_log::test]
    fn test_canonical_fsm_prevents_self() {
        let canonical_fsm = CanonicalFSM::new(4, opposite_faces_commute);
        for move_class in 0..4 {
            let state = canonical_fsm
                .next_state(CanonicalFSMState::default(), move_class)
                .unwrap();
            assert!(canonical_fsm.next_state(state, move_class).is_none());
        }
    }

    #[test_log::test]
    fn test_canonical_fsm_orders_commuting_classes() {
        let canonical_fsm = CanonicalFSM::new(4, opposite_faces_commute);
        let after = |a: usize, b: usize| {
            canonical_fsm
                .next_state(CanonicalFSMState::default(), a)
                .and_then(|state| canonical_fsm.next_state(state, b))
                .is_some()
        };
        for a in 0..4 {
            for b in 0..4 {
                if a == b {
                    continue;
                }
                if opposite_faces_commute(a, b) {
                    // Exactly one of the two orders is allowed
                    assert!(after(a, b) ^ after(b, a));
                } else {
                    assert!(after(a, b) && after(b, a));
                }
            }
        }
    }

    #[test_log::test]
    fn test_canonical_fsm_blocks_repeat_across_commuting_move() {
        let canonical_fsm = CanonicalFSM::new(4, opposite_faces_commute);
        // U D U is U2 D and must be rejected; U R U is fine
        let u = canonical_fsm
            .next_state(CanonicalFSMState::default(), 0)
            .unwrap();
        let ud = canonical_fsm.next_state(u, 1).unwrap();
        assert!(canonical_fsm.next_state(ud, 0).is_none());
        let ur = canonical_fsm.next_state(u, 2).unwrap();
        assert!(canonical_fsm.next_state(ur, 0).is_some());
    }
}
