//! Phase 2: solving the reduced cube as a 3x3x3 with Kociemba's two step
//! algorithm. Step A reaches the subgroup `<U, D, R2, L2, F2, B2>` and step B
//! solves within it.
//!
//! Step B accepts the UF and UB edges exchanged as solved. A reduced cube
//! with permutation parity cannot be solved with outer turns, and this goal
//! leaves it one fixed sequence away from solved.

use crate::{
    canonical_fsm::CanonicalFSM,
    coord::{rank_combination, rank_orientation, rank_permutation},
    cube::{
        CORNER_FACELETS, EDGE_WINGS, Face, FaceletCube, FaceletError, NUM_CORNERS, NUM_EDGES,
        NUM_FACELETS, move_permutation,
    },
    moves::{Layer, Move},
    pruning::PruningTable,
    search::{Phase, SearchError, search},
    success,
};
use itertools::Itertools;
use log::{debug, info};
use std::time::Instant;

const NUM_TWISTS: usize = 2187;
const NUM_FLIPS: usize = 2048;
const NUM_SLICES: usize = 495;
const NUM_CORNER_PERMS: usize = 40320;
const NUM_EDGE8_PERMS: usize = 40320;
const NUM_SLICE_PERMS: usize = 24;

/// A 3x3x3 at the piece level. `cp[i]` is the corner in position `i` and
/// `co[i]` its twist, and likewise for edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CubieCube {
    pub cp: [u8; NUM_CORNERS],
    pub co: [u8; NUM_CORNERS],
    pub ep: [u8; NUM_EDGES],
    pub eo: [u8; NUM_EDGES],
}

impl CubieCube {
    pub const SOLVED: Self = Self {
        cp: [0, 1, 2, 3, 4, 5, 6, 7],
        co: [0; NUM_CORNERS],
        ep: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        eo: [0; NUM_EDGES],
    };

    /// Read the 3x3x3 a reduced cube stands for.
    ///
    /// # Errors
    ///
    /// Fails if the corners are invalid or the edges are not paired.
    pub fn from_cube(cube: &FaceletCube) -> Result<Self, FaceletError> {
        let (cp, co) = cube.corners()?;
        let (ep, eo) = cube.reduced_edges()?;
        Ok(Self { cp, co, ep, eo })
    }

    /// The action of an outer move, read off its facelet permutation.
    #[must_use]
    pub fn of_move(move_: Move) -> Self {
        let perm = move_permutation(move_);
        let mut inverse = [0; NUM_FACELETS];
        for (from, &to) in perm.iter().enumerate() {
            inverse[to as usize] = from as u8;
        }

        let mut cube = Self::SOLVED;
        for (corner, facelets) in CORNER_FACELETS.iter().enumerate() {
            // Follow the corner's U or D sticker
            let dest = perm[facelets[0] as usize];
            for (position, position_facelets) in CORNER_FACELETS.iter().enumerate() {
                if let Some(twist) = position_facelets.iter().position(|&f| f == dest) {
                    cube.cp[position] = corner as u8;
                    cube.co[position] = twist as u8;
                }
            }
        }
        for (position, wings) in EDGE_WINGS.iter().enumerate() {
            let source = inverse[wings[0][0] as usize];
            for (edge, edge_wings) in EDGE_WINGS.iter().enumerate() {
                for wing in edge_wings {
                    if let Some(flip) = wing.iter().position(|&f| f == source) {
                        cube.ep[position] = edge as u8;
                        cube.eo[position] = flip as u8;
                    }
                }
            }
        }
        cube
    }

    /// Apply `self` and then `other`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut product = Self::SOLVED;
        for i in 0..NUM_CORNERS {
            let from = other.cp[i] as usize;
            product.cp[i] = self.cp[from];
            product.co[i] = (self.co[from] + other.co[i]) % 3;
        }
        for i in 0..NUM_EDGES {
            let from = other.ep[i] as usize;
            product.ep[i] = self.ep[from];
            product.eo[i] = (self.eo[from] + other.eo[i]) % 2;
        }
        product
    }

    #[must_use]
    pub fn twist(&self) -> u16 {
        rank_orientation(&self.co, 3)
    }

    #[must_use]
    pub fn flip(&self) -> u16 {
        rank_orientation(&self.eo, 2)
    }

    /// Which positions hold the four E slice edges, zero when they are all in
    /// the slice.
    #[must_use]
    pub fn slice(&self) -> u16 {
        let mask = self
            .ep
            .iter()
            .enumerate()
            .filter(|&(_, &edge)| edge >= 8)
            .map(|(position, _)| 1 << (NUM_EDGES - 1 - position))
            .fold(0, |mask, bit| mask | bit);
        rank_combination(mask) as u16
    }

    #[must_use]
    pub fn corner_perm(&self) -> u16 {
        rank_permutation(&self.cp) as u16
    }

    /// The permutation of the U and D layer edges. Only meaningful in the
    /// step B subgroup.
    #[must_use]
    pub fn edge8_perm(&self) -> u16 {
        rank_permutation(&self.ep[..8]) as u16
    }

    #[must_use]
    pub fn slice_perm(&self) -> u16 {
        rank_permutation(&self.ep[8..]) as u16
    }
}

/// A coordinate transition table: entry `coord * num_moves + move_index`.
#[derive(Debug)]
pub struct MoveTable {
    transitions: Vec<u16>,
    num_moves: usize,
}

impl MoveTable {
    /// Fill the table by breadth-first search from the solved cube, keeping
    /// one cubie representative per coordinate value. `coord` must be
    /// closed under the moves.
    fn generate(size: usize, moves: &[CubieCube], coord: impl Fn(&CubieCube) -> u16) -> Self {
        let num_moves = moves.len();
        let mut transitions = vec![u16::MAX; size * num_moves];
        let mut seen = vec![false; size];
        let mut queue = vec![CubieCube::SOLVED];
        seen[usize::from(coord(&CubieCube::SOLVED))] = true;
        let mut queue_index = 0;
        while queue_index < queue.len() {
            let representative = queue[queue_index];
            queue_index += 1;
            let from = usize::from(coord(&representative));
            for (move_index, move_cube) in moves.iter().enumerate() {
                let child = representative.multiply(move_cube);
                let to = coord(&child);
                transitions[from * num_moves + move_index] = to;
                if !seen[usize::from(to)] {
                    seen[usize::from(to)] = true;
                    queue.push(child);
                }
            }
        }
        Self {
            transitions,
            num_moves,
        }
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, coord: u16, move_index: usize) -> u16 {
        self.transitions[usize::from(coord) * self.num_moves + move_index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len() / self.num_moves
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.transitions.contains(&u16::MAX)
    }
}

pub(crate) fn face_fsm() -> CanonicalFSM {
    let same_axis = |a: usize, b: usize| Face::ALL[a].axis() == Face::ALL[b].axis();
    CanonicalFSM::new(Face::ALL.len(), same_axis)
}

/// The UF and UB edges exchanged, everything else solved.
fn swapped_edge8_perm() -> u16 {
    rank_permutation(&[0, 3, 2, 1, 4, 5, 6, 7]) as u16
}

#[derive(Debug)]
pub struct ThreeByThreeTables {
    step_a_moves: Vec<Move>,
    step_a_cubies: Vec<CubieCube>,
    /// Step B moves as indices into the step A moves.
    step_b_moves: Vec<usize>,
    canonical_fsm: CanonicalFSM,
    twist_moves: MoveTable,
    flip_moves: MoveTable,
    slice_moves: MoveTable,
    corner_perm_moves: MoveTable,
    edge8_perm_moves: MoveTable,
    slice_perm_moves: MoveTable,
    twist_slice: PruningTable,
    flip_slice: PruningTable,
    corner_slice_perm: PruningTable,
    edge_slice_perm: PruningTable,
}

impl ThreeByThreeTables {
    #[must_use]
    pub fn new() -> Self {
        info!("Building 3x3x3 tables");
        let start = Instant::now();
        let step_a_moves: Vec<Move> = Face::ALL
            .into_iter()
            .cartesian_product(1..=3)
            .map(|(face, power)| Move::new(Layer::outer(face), power))
            .collect();
        let step_a_cubies: Vec<CubieCube> = step_a_moves
            .iter()
            .map(|&m| CubieCube::of_move(m))
            .collect();
        let step_b_moves: Vec<usize> = step_a_moves
            .iter()
            .positions(|m| m.layer().axis() == Face::U.axis() || m.power() == 2)
            .collect();
        let step_b_cubies: Vec<CubieCube> = step_b_moves
            .iter()
            .map(|&i| step_a_cubies[i])
            .collect();

        let twist_moves = MoveTable::generate(NUM_TWISTS, &step_a_cubies, CubieCube::twist);
        let flip_moves = MoveTable::generate(NUM_FLIPS, &step_a_cubies, CubieCube::flip);
        let slice_moves = MoveTable::generate(NUM_SLICES, &step_a_cubies, CubieCube::slice);
        let corner_perm_moves =
            MoveTable::generate(NUM_CORNER_PERMS, &step_b_cubies, CubieCube::corner_perm);
        let edge8_perm_moves =
            MoveTable::generate(NUM_EDGE8_PERMS, &step_b_cubies, CubieCube::edge8_perm);
        let slice_perm_moves =
            MoveTable::generate(NUM_SLICE_PERMS, &step_b_cubies, CubieCube::slice_perm);
        debug!(
            success!("Built the 3x3x3 move tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );

        let num_a = step_a_moves.len();
        let num_b = step_b_moves.len();
        let twist_slice = PruningTable::generate(
            "twist x slice",
            NUM_TWISTS * NUM_SLICES,
            [(0, 0)],
            num_a,
            |(t, s): (u16, u16)| usize::from(t) * NUM_SLICES + usize::from(s),
            |(t, s), m| (twist_moves.apply(t, m), slice_moves.apply(s, m)),
        );
        let flip_slice = PruningTable::generate(
            "flip x slice",
            NUM_FLIPS * NUM_SLICES,
            [(0, 0)],
            num_a,
            |(f, s): (u16, u16)| usize::from(f) * NUM_SLICES + usize::from(s),
            |(f, s), m| (flip_moves.apply(f, m), slice_moves.apply(s, m)),
        );
        let corner_slice_perm = PruningTable::generate(
            "corner x slice permutation",
            NUM_CORNER_PERMS * NUM_SLICE_PERMS,
            [(0, 0)],
            num_b,
            |(c, s): (u16, u16)| usize::from(c) * NUM_SLICE_PERMS + usize::from(s),
            |(c, s), m| (corner_perm_moves.apply(c, m), slice_perm_moves.apply(s, m)),
        );
        let edge_slice_perm = PruningTable::generate(
            "edge x slice permutation",
            NUM_EDGE8_PERMS * NUM_SLICE_PERMS,
            [(0, 0), (swapped_edge8_perm(), 0)],
            num_b,
            |(e, s): (u16, u16)| usize::from(e) * NUM_SLICE_PERMS + usize::from(s),
            |(e, s), m| (edge8_perm_moves.apply(e, m), slice_perm_moves.apply(s, m)),
        );
        debug!(
            success!("Built the 3x3x3 tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );

        Self {
            step_a_moves,
            step_a_cubies,
            step_b_moves,
            canonical_fsm: face_fsm(),
            twist_moves,
            flip_moves,
            slice_moves,
            corner_perm_moves,
            edge8_perm_moves,
            slice_perm_moves,
            twist_slice,
            flip_slice,
            corner_slice_perm,
            edge_slice_perm,
        }
    }

    /// Solve a reduced cube, up to the UF and UB edges being exchanged.
    ///
    /// # Errors
    ///
    /// Fails if either step needs more than `max_depth` moves.
    pub fn solve(&self, cube: &CubieCube, max_depth: u8) -> Result<Vec<Move>, SearchError> {
        let step_a = StepA { tables: self };
        let path_a = search(
            &step_a,
            (cube.twist(), cube.flip(), cube.slice()),
            max_depth,
        )?;
        let in_subgroup = path_a
            .iter()
            .fold(*cube, |cube, &m| cube.multiply(&self.step_a_cubies[m]));

        let step_b = StepB { tables: self };
        let path_b = search(
            &step_b,
            (
                in_subgroup.corner_perm(),
                in_subgroup.edge8_perm(),
                in_subgroup.slice_perm(),
            ),
            max_depth,
        )?;

        Ok(path_a
            .into_iter()
            .chain(path_b.into_iter().map(|m| self.step_b_moves[m]))
            .map(|m| self.step_a_moves[m])
            .collect())
    }
}

impl Default for ThreeByThreeTables {
    fn default() -> Self {
        Self::new()
    }
}

struct StepA<'a> {
    tables: &'a ThreeByThreeTables,
}

impl Phase for StepA<'_> {
    /// Twist, flip and slice.
    type State = (u16, u16, u16);

    fn name(&self) -> &'static str {
        "3x3x3 orientation"
    }

    fn num_moves(&self) -> usize {
        self.tables.step_a_moves.len()
    }

    fn move_class(&self, move_index: usize) -> usize {
        self.tables.step_a_moves[move_index].layer().face() as usize
    }

    fn canonical_fsm(&self) -> &CanonicalFSM {
        &self.tables.canonical_fsm
    }

    #[inline]
    fn apply(&self, (twist, flip, slice): Self::State, move_index: usize) -> Self::State {
        let tables = self.tables;
        (
            tables.twist_moves.apply(twist, move_index),
            tables.flip_moves.apply(flip, move_index),
            tables.slice_moves.apply(slice, move_index),
        )
    }

    #[inline]
    fn heuristic(&self, (twist, flip, slice): Self::State) -> u8 {
        let slice = usize::from(slice);
        let twist_slice = usize::from(twist) * NUM_SLICES + slice;
        let flip_slice = usize::from(flip) * NUM_SLICES + slice;
        let tables = self.tables;
        tables
            .twist_slice
            .distance(twist_slice)
            .max(tables.flip_slice.distance(flip_slice))
    }
}

struct StepB<'a> {
    tables: &'a ThreeByThreeTables,
}

impl Phase for StepB<'_> {
    /// Corner, U/D edge and slice edge permutations.
    type State = (u16, u16, u16);

    fn name(&self) -> &'static str {
        "3x3x3 permutation"
    }

    fn num_moves(&self) -> usize {
        self.tables.step_b_moves.len()
    }

    fn move_class(&self, move_index: usize) -> usize {
        let tables = self.tables;
        let move_ = tables.step_a_moves[tables.step_b_moves[move_index]];
        move_.layer().face() as usize
    }

    fn canonical_fsm(&self) -> &CanonicalFSM {
        &self.tables.canonical_fsm
    }

    #[inline]
    fn apply(&self, (cp, ep, sp): Self::State, move_index: usize) -> Self::State {
        let tables = self.tables;
        (
            tables.corner_perm_moves.apply(cp, move_index),
            tables.edge8_perm_moves.apply(ep, move_index),
            tables.slice_perm_moves.apply(sp, move_index),
        )
    }

    #[inline]
    fn heuristic(&self, (cp, ep, sp): Self::State) -> u8 {
        let sp = usize::from(sp);
        let corner_slice = usize::from(cp) * NUM_SLICE_PERMS + sp;
        let edge_slice = usize::from(ep) * NUM_SLICE_PERMS + sp;
        let tables = self.tables;
        tables
            .corner_slice_perm
            .distance(corner_slice)
            .max(tables.edge_slice_perm.distance(edge_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Alg;

    fn tables() -> &'static ThreeByThreeTables {
        &crate::init().three_by_three
    }

    fn cubie(alg: &str) -> CubieCube {
        CubieCube::from_cube(&FaceletCube::from_alg(&alg.parse::<Alg>().unwrap())).unwrap()
    }

    #[test_log::test]
    fn test_move_cubies_match_facelets() {
        for move_ in Move::all().filter(|m| !m.layer().is_inner()) {
            let expected = CubieCube::from_cube(&FaceletCube::SOLVED.apply_move(move_)).unwrap();
            assert_eq!(CubieCube::of_move(move_), expected, "{move_}");
        }
    }

    #[test_log::test]
    fn test_multiply_matches_facelets() {
        let alg: Alg = "R U2 F' L D B2 R' F".parse().unwrap();
        let product = alg
            .moves()
            .iter()
            .map(|&m| CubieCube::of_move(m))
            .fold(CubieCube::SOLVED, |cube, m| cube.multiply(&m));
        assert_eq!(product, cubie("R U2 F' L D B2 R' F"));
    }

    #[test_log::test]
    fn test_solved_coordinates() {
        let solved = CubieCube::SOLVED;
        assert_eq!(
            [solved.twist(), solved.flip(), solved.slice()],
            [0, 0, 0]
        );
        assert_eq!(
            [
                solved.corner_perm(),
                solved.edge8_perm(),
                solved.slice_perm()
            ],
            [0, 0, 0]
        );
    }

    #[test_log::test]
    fn test_move_tables_are_complete() {
        let tables = tables();
        for (table, size) in [
            (&tables.twist_moves, NUM_TWISTS),
            (&tables.flip_moves, NUM_FLIPS),
            (&tables.slice_moves, NUM_SLICES),
            (&tables.corner_perm_moves, NUM_CORNER_PERMS),
            (&tables.edge8_perm_moves, NUM_EDGE8_PERMS),
            (&tables.slice_perm_moves, NUM_SLICE_PERMS),
        ] {
            assert_eq!(table.len(), size);
            assert!(table.is_complete());
        }
    }

    #[test_log::test]
    fn test_move_tables_are_inverse_consistent() {
        let tables = tables();
        let inverse_of = |moves: &[Move], i: usize| {
            let inverse = moves[i].inverse();
            moves.iter().position(|&m| m == inverse).unwrap()
        };
        let step_b: Vec<Move> = tables
            .step_b_moves
            .iter()
            .map(|&i| tables.step_a_moves[i])
            .collect();
        for (table, moves) in [
            (&tables.twist_moves, &tables.step_a_moves),
            (&tables.flip_moves, &tables.step_a_moves),
            (&tables.slice_moves, &tables.step_a_moves),
            (&tables.corner_perm_moves, &step_b),
            (&tables.edge8_perm_moves, &step_b),
            (&tables.slice_perm_moves, &step_b),
        ] {
            for coord in 0..table.len() as u16 {
                for m in 0..moves.len() {
                    let back = table.apply(table.apply(coord, m), inverse_of(moves, m));
                    assert_eq!(back, coord);
                }
            }
        }
    }

    #[test_log::test]
    fn test_move_tables_match_cubies() {
        let tables = tables();
        let start = cubie("F R' U2 B D' L");
        for (m, move_cube) in tables.step_a_cubies.iter().enumerate() {
            let child = start.multiply(move_cube);
            assert_eq!(tables.twist_moves.apply(start.twist(), m), child.twist());
            assert_eq!(tables.flip_moves.apply(start.flip(), m), child.flip());
            assert_eq!(tables.slice_moves.apply(start.slice(), m), child.slice());
        }
    }

    #[test_log::test]
    fn test_pruning_tables() {
        let tables = tables();
        for table in [
            &tables.twist_slice,
            &tables.flip_slice,
            &tables.corner_slice_perm,
            &tables.edge_slice_perm,
        ] {
            assert_eq!(table.reached(), table.len());
        }
        let distances = tables.edge_slice_perm.distances();
        assert_eq!(distances.iter().filter(|&&d| d == 0).count(), 2);
    }

    /// Every cubie state within `depth` of the given moves from solved, with
    /// its exact distance.
    fn neighborhood(moves: &[CubieCube], depth: u8) -> Vec<(CubieCube, u8)> {
        let mut seen = std::collections::HashSet::from([CubieCube::SOLVED]);
        let mut found = vec![];
        let mut frontier = vec![CubieCube::SOLVED];
        for distance in 1..=depth {
            let mut next = vec![];
            for cube in &frontier {
                for move_cube in moves {
                    let child = cube.multiply(move_cube);
                    if seen.insert(child) {
                        found.push((child, distance));
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        found
    }

    #[test_log::test]
    fn test_heuristics_are_admissible() {
        let tables = tables();
        let step_a = StepA { tables };
        for (cube, distance) in neighborhood(&tables.step_a_cubies, 3) {
            let h = step_a.heuristic((cube.twist(), cube.flip(), cube.slice()));
            assert!(h <= distance);
        }
        let step_b = StepB { tables };
        let step_b_cubies: Vec<CubieCube> = tables
            .step_b_moves
            .iter()
            .map(|&m| tables.step_a_cubies[m])
            .collect();
        for (cube, distance) in neighborhood(&step_b_cubies, 4) {
            let h = step_b.heuristic((cube.corner_perm(), cube.edge8_perm(), cube.slice_perm()));
            assert!(h <= distance);
            assert!(h > 0);
        }
    }

    #[test_log::test]
    fn test_solves_reduced_cubes() {
        let tables = tables();
        let algs = [
            "R U R' U'",
            "R U F2 D L' B",
            "F R' U2 B D' L R2 U F' D2 B L' U'",
        ];
        for alg in algs {
            let start = cubie(alg);
            let moves = tables.solve(&start, 20).unwrap();
            assert!(moves.iter().all(|m| !m.layer().is_inner()));
            let end = moves
                .iter()
                .fold(start, |cube, &m| cube.multiply(&CubieCube::of_move(m)));
            assert_eq!(end, CubieCube::SOLVED, "{alg}");
        }
    }

    #[test_log::test]
    fn test_accepts_exchanged_edges() {
        // Only reachable on a 4x4x4: the PLL parity case
        let cube = FaceletCube::from_alg(&"r2 U2 r2 Uw2 r2 Uw2 U2".parse::<Alg>().unwrap());
        let start = CubieCube::from_cube(&cube).unwrap();
        assert_eq!(tables().solve(&start, 20), Ok(vec![]));
    }
}
