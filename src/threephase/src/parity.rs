//! The two parities a reduced 4x4x4 can have that a 3x3x3 cannot: an odd
//! number of flipped dedges and an odd edge permutation.

use crate::{
    coord::is_odd,
    cube::{Face, FaceletCube, FaceletError},
    moves::{Layer, Move},
};

const U: Layer = Layer::outer(Face::U);
const F: Layer = Layer::outer(Face::F);
const B: Layer = Layer::outer(Face::B);
const SLICE_R: Layer = Layer::inner(Face::R);
const SLICE_L: Layer = Layer::inner(Face::L);
const SLICE_U: Layer = Layer::inner(Face::U);

/// `r2 B2 U2 l U2 r' U2 r U2 F2 r F2 l' B2 r2`: flips the UF dedge.
const OLL_PARITY: [(Layer, u8); 15] = [
    (SLICE_R, 2),
    (B, 2),
    (U, 2),
    (SLICE_L, 1),
    (U, 2),
    (SLICE_R, 3),
    (U, 2),
    (SLICE_R, 1),
    (U, 2),
    (F, 2),
    (SLICE_R, 1),
    (F, 2),
    (SLICE_L, 3),
    (B, 2),
    (SLICE_R, 2),
];

/// `r2 U2 r2 Uw2 r2 Uw2 U2`: exchanges the UF and UB dedges.
const PLL_PARITY: [(Layer, u8); 9] = [
    (SLICE_R, 2),
    (U, 2),
    (SLICE_R, 2),
    (U, 2),
    (SLICE_U, 2),
    (SLICE_R, 2),
    (U, 2),
    (SLICE_U, 2),
    (U, 2),
];

fn expand(moves: &[(Layer, u8)]) -> Vec<Move> {
    moves
        .iter()
        .map(|&(layer, power)| Move::new(layer, power))
        .collect()
}

/// The OLL parity sequence.
#[must_use]
pub fn oll_parity_alg() -> Vec<Move> {
    expand(&OLL_PARITY)
}

/// The PLL parity sequence.
#[must_use]
pub fn pll_parity_alg() -> Vec<Move> {
    expand(&PLL_PARITY)
}

/// Whether the dedges of a reduced cube have an odd total flip.
///
/// # Errors
///
/// Fails if the edges are not paired.
pub fn has_oll_parity(cube: &FaceletCube) -> Result<bool, FaceletError> {
    let (_, eo) = cube.reduced_edges()?;
    Ok(eo.iter().map(|&o| u32::from(o)).sum::<u32>() % 2 == 1)
}

/// Whether the corner and dedge permutations of a reduced cube differ in
/// parity. Once every other piece is solved this shows as the UF and UB
/// dedges exchanged.
///
/// # Errors
///
/// Fails if the corners are invalid or the edges are not paired.
pub fn has_pll_parity(cube: &FaceletCube) -> Result<bool, FaceletError> {
    let (cp, _) = cube.corners()?;
    let (ep, _) = cube.reduced_edges()?;
    Ok(is_odd(&cp) != is_odd(&ep))
}

/// The moves that remove OLL parity from a reduced cube, empty if there is
/// none.
///
/// # Errors
///
/// See [`has_oll_parity`].
pub fn oll_parity_fix(cube: &FaceletCube) -> Result<Vec<Move>, FaceletError> {
    Ok(if has_oll_parity(cube)? {
        oll_parity_alg()
    } else {
        vec![]
    })
}

/// The moves that remove PLL parity from a reduced cube, empty if there is
/// none.
///
/// # Errors
///
/// See [`has_pll_parity`].
pub fn pll_parity_fix(cube: &FaceletCube) -> Result<Vec<Move>, FaceletError> {
    Ok(if has_pll_parity(cube)? {
        pll_parity_alg()
    } else {
        vec![]
    })
}
