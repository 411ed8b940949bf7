use crate::working;
use log::debug;

/// Entries no breadth-first search reached.
pub const UNREACHED: u8 = u8::MAX;

/// An exact distance table over a dense coordinate, built by breadth-first
/// search outwards from a set of goal coordinates. The stored distance never
/// overestimates, which makes it an admissible IDA* heuristic.
#[derive(Debug)]
pub struct PruningTable {
    distances: Box<[u8]>,
    max_distance: u8,
}

impl PruningTable {
    /// Run the search over states of type `S`. `index` maps a state to its
    /// coordinate, which must be below `size`, and `apply` must be closed on
    /// the coordinate: states with equal coordinates must reach equal
    /// coordinates under every move. The move set must contain the inverse of
    /// each of its moves, so distances from the goals are distances to them.
    pub fn generate<S: Copy>(
        name: &str,
        size: usize,
        goals: impl IntoIterator<Item = S>,
        num_moves: usize,
        index: impl Fn(S) -> usize,
        apply: impl Fn(S, usize) -> S,
    ) -> Self {
        let mut distances = vec![UNREACHED; size].into_boxed_slice();
        let mut frontier = vec![];
        for goal in goals {
            let i = index(goal);
            if distances[i] == UNREACHED {
                distances[i] = 0;
                frontier.push(goal);
            }
        }

        let mut depth = 0;
        let mut next = vec![];
        while !frontier.is_empty() {
            debug!(
                working!("{} table depth {}: {} states"),
                name,
                depth,
                frontier.len()
            );
            for &state in &frontier {
                for move_index in 0..num_moves {
                    let child = apply(state, move_index);
                    let i = index(child);
                    if distances[i] == UNREACHED {
                        distances[i] = depth + 1;
                        next.push(child);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            depth += 1;
            std::mem::swap(&mut frontier, &mut next);
            next.clear();
        }

        Self {
            distances,
            max_distance: depth,
        }
    }

    /// The distance of a coordinate to the nearest goal.
    #[inline]
    #[must_use]
    pub fn distance(&self, index: usize) -> u8 {
        self.distances[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    #[must_use]
    pub fn max_distance(&self) -> u8 {
        self.max_distance
    }

    #[must_use]
    pub fn reached(&self) -> usize {
        self.distances.iter().filter(|&&d| d != UNREACHED).count()
    }

    #[must_use]
    pub fn distances(&self) -> &[u8] {
        &self.distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_cycle_distances() {
        // A ring of 10 states where moves step one forwards or backwards
        let table = PruningTable::generate(
            "ring",
            10,
            [0_usize],
            2,
            |s| s,
            |s, m| (s + [1, 9][m]) % 10,
        );
        assert_eq!(table.distances(), &[0, 1, 2, 3, 4, 5, 4, 3, 2, 1]);
        assert_eq!(table.max_distance(), 5);
        assert_eq!(table.reached(), 10);
    }

    #[test_log::test]
    fn test_unreachable_and_multiple_goals() {
        // Only even states are reachable by steps of two
        let table = PruningTable::generate("evens", 8, [0_usize, 4], 1, |s| s, |s, _| (s + 2) % 8);
        assert_eq!(table.distance(0), 0);
        assert_eq!(table.distance(4), 0);
        assert_eq!(table.distance(2), 1);
        assert_eq!(table.distance(6), 1);
        assert_eq!(table.distance(1), UNREACHED);
        assert_eq!(table.reached(), 4);
    }
}
