use crate::moves::{Alg, Move, NUM_MOVES};

/// A random cube together with the moves that produced it and a solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomState {
    pub scramble: Alg,
    pub facelets: String,
    pub solution: Alg,
}

/// `length` moves drawn uniformly and independently from all 36 moves.
#[must_use]
pub fn random_scramble(rng: &mut fastrand::Rng, length: usize) -> Alg {
    (0..length)
        .map(|_| Move::from_index(rng.usize(..NUM_MOVES)))
        .collect()
}
