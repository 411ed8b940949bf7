//! Edge pairing, the second half of phase 1.
//!
//! With the centers solved, dedges are paired greedily: every step searches
//! for the shortest sequence of generators that pairs at least one more
//! dedge while keeping the paired ones paired and the centers solved. The
//! generators are the U and D layers, the u and d slices, and short `R Y R'`
//! triggers that swap a U or D layer wing into and out of the R face.
//!
//! The last two dedges have their own step. Outer turns bring the two mixed
//! edge positions to FR and FL, where `d R F' U R' F d'` exchanges one wing
//! between them.

use crate::{
    canonical_fsm::CanonicalFSM,
    cube::{
        EDGE_WINGS, Face, NUM_EDGES, NUM_FACELETS, NUM_WINGS, WING_SLOT_OF_FACELET,
        move_permutation,
    },
    moves::{Layer, Move},
    pruning::PruningTable,
    search::{Phase, SearchError, search},
    success,
    three_by_three::face_fsm,
    working,
};
use log::{debug, info};
use std::time::Instant;

const NUM_GENERATORS: usize = 24;
const NUM_CLASSES: usize = 8;
const NUM_SLOTS: usize = NUM_WINGS;

/// FR and FL, the edge positions the last two dedges are paired in.
const LAST_TWO_EDGES: [u8; 2] = [8, 9];

/// `d R F' U R' F d'`. Exchanges one wing of FR with one wing of FL, moves
/// other dedges only as whole pieces, and leaves the centers solved.
const LAST_TWO: [(Layer, u8); 7] = [
    (Layer::inner(Face::D), 1),
    (Layer::outer(Face::R), 1),
    (Layer::outer(Face::F), 3),
    (Layer::outer(Face::U), 1),
    (Layer::outer(Face::R), 3),
    (Layer::outer(Face::F), 1),
    (Layer::inner(Face::D), 3),
];

/// A short move sequence that leaves the centers solved, up to the u and d
/// slice turns it carries.
#[derive(Clone, Debug)]
pub struct Generator {
    moves: Vec<Move>,
    wing_perm: [u8; NUM_SLOTS],
    slice_turns: [u8; 2],
    class: usize,
}

impl Generator {
    fn new(moves: Vec<Move>, class: usize) -> Self {
        let mut facelet_perm: [u8; NUM_FACELETS] = std::array::from_fn(|i| i as u8);
        let mut slice_turns = [0; 2];
        for &move_ in &moves {
            let perm = move_permutation(move_);
            facelet_perm = facelet_perm.map(|f| perm[f as usize]);
            let layer = move_.layer();
            if layer == Layer::inner(Face::U) {
                slice_turns[0] = (slice_turns[0] + move_.power()) % 4;
            } else if layer == Layer::inner(Face::D) {
                slice_turns[1] = (slice_turns[1] + move_.power()) % 4;
            }
        }
        let wing_perm = std::array::from_fn(|slot| {
            let [a, _] = EDGE_WINGS[slot / 2][slot % 2];
            WING_SLOT_OF_FACELET[facelet_perm[a as usize] as usize]
        });
        Self {
            moves,
            wing_perm,
            slice_turns,
            class,
        }
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[inline]
    fn apply(&self, state: PairingState) -> PairingState {
        PairingState {
            wings: state.wings.map(|slot| self.wing_perm[slot as usize]),
            slice_turns: [
                (state.slice_turns[0] + self.slice_turns[0]) % 4,
                (state.slice_turns[1] + self.slice_turns[1]) % 4,
            ],
        }
    }
}

fn generators() -> Vec<Generator> {
    let mut generators = Vec::with_capacity(NUM_GENERATORS);
    for (class, layer) in [
        Layer::outer(Face::U),
        Layer::outer(Face::D),
        Layer::inner(Face::U),
        Layer::inner(Face::D),
    ]
    .into_iter()
    .enumerate()
    {
        for power in 1..=3 {
            generators.push(Generator::new(vec![Move::new(layer, power)], class));
        }
    }
    let r = Layer::outer(Face::R);
    for (class, (r_power, face)) in [(1, Face::U), (1, Face::D), (3, Face::U), (3, Face::D)]
        .into_iter()
        .enumerate()
    {
        for power in 1..=3 {
            let moves = vec![
                Move::new(r, r_power),
                Move::new(Layer::outer(face), power),
                Move::new(r, 4 - r_power),
            ];
            generators.push(Generator::new(moves, 4 + class));
        }
    }
    generators
}

/// The 18 outer turns, classed by face. They move dedges only as whole
/// pieces.
fn outer_moves() -> Vec<Generator> {
    Face::ALL
        .into_iter()
        .flat_map(|face| {
            (1..=3).map(move |power| {
                Generator::new(vec![Move::new(Layer::outer(face), power)], face as usize)
            })
        })
        .collect()
}

/// Where every wing is, plus how far the u and d slices are turned away
/// from solved centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairingState {
    pub wings: [u8; NUM_WINGS],
    pub slice_turns: [u8; 2],
}

impl PairingState {
    #[must_use]
    pub fn new(wings: [u8; NUM_WINGS]) -> Self {
        Self {
            wings,
            slice_turns: [0; 2],
        }
    }
}

fn pair_index(a: u8, b: u8) -> usize {
    usize::from(a) * NUM_SLOTS + usize::from(b)
}

fn edge_pair_index(a: u8, b: u8) -> usize {
    usize::from(a) * NUM_EDGES + usize::from(b)
}

#[derive(Debug)]
pub struct PairingTables {
    generators: Vec<Generator>,
    canonical_fsm: CanonicalFSM,
    pair_table: PruningTable,
    outer_moves: Vec<Generator>,
    outer_fsm: CanonicalFSM,
    last_two: Generator,
    setup_table: PruningTable,
}

impl PairingTables {
    #[must_use]
    pub fn new() -> Self {
        info!("Building pairing tables");
        let start = Instant::now();
        let generators = generators();

        let representatives: Vec<&Generator> = (0..NUM_CLASSES)
            .filter_map(|class| generators.iter().find(|g| g.class == class))
            .collect();
        let canonical_fsm = CanonicalFSM::new(NUM_CLASSES, |a, b| {
            let a = &representatives[a].wing_perm;
            let b = &representatives[b].wing_perm;
            (0..NUM_SLOTS).all(|s| b[a[s] as usize] == a[b[s] as usize])
        });

        let pair_goals = (0..NUM_EDGES as u8).flat_map(|e| {
            let [a, b] = [2 * e, 2 * e + 1];
            [(a, b), (b, a)]
        });
        let pair_table = PruningTable::generate(
            "pair",
            NUM_SLOTS * NUM_SLOTS,
            pair_goals,
            generators.len(),
            |(a, b): (u8, u8)| pair_index(a, b),
            |(a, b), g| {
                let perm = &generators[g].wing_perm;
                (perm[a as usize], perm[b as usize])
            },
        );

        // Edge positions of the two wings of one of the last two dedges, which
        // are the two edge positions holding mixed wings
        let outer_moves = outer_moves();
        let [fr, fl] = LAST_TWO_EDGES;
        let setup_table = PruningTable::generate(
            "last two setup",
            NUM_EDGES * NUM_EDGES,
            [(fr, fl), (fl, fr)],
            outer_moves.len(),
            |(a, b): (u8, u8)| edge_pair_index(a, b),
            |(a, b), m| {
                let perm = &outer_moves[m].wing_perm;
                (perm[2 * a as usize] / 2, perm[2 * b as usize] / 2)
            },
        );
        let last_two = Generator::new(
            LAST_TWO
                .iter()
                .map(|&(layer, power)| Move::new(layer, power))
                .collect(),
            NUM_CLASSES,
        );
        debug!(
            success!("Built the pairing tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );

        Self {
            generators,
            canonical_fsm,
            pair_table,
            outer_moves,
            outer_fsm: face_fsm(),
            last_two,
            setup_table,
        }
    }

    #[must_use]
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    #[must_use]
    pub fn pair_table(&self) -> &PruningTable {
        &self.pair_table
    }

    #[must_use]
    pub fn setup_table(&self) -> &PruningTable {
        &self.setup_table
    }

    /// Generators needed to pair dedge `dedge` on its own, ignoring centers.
    #[inline]
    #[must_use]
    pub fn pair_distance(&self, state: &PairingState, dedge: usize) -> u8 {
        let [a, b] = [state.wings[2 * dedge], state.wings[2 * dedge + 1]];
        self.pair_table.distance(pair_index(a, b))
    }

    #[must_use]
    pub fn is_paired(&self, state: &PairingState, dedge: usize) -> bool {
        self.pair_distance(state, dedge) == 0
    }

    /// Pair every dedge of the wing arrangement `wings`, as returned by
    /// [`FaceletCube::wing_positions`](crate::FaceletCube::wing_positions),
    /// on a cube with solved centers. Centers are solved again afterwards.
    ///
    /// # Errors
    ///
    /// Fails if a step needs more than `max_depth` generators.
    pub fn pair(&self, wings: [u8; NUM_WINGS], max_depth: u8) -> Result<Vec<Move>, SearchError> {
        let mut state = PairingState::new(wings);
        let mut moves = vec![];
        loop {
            let unpaired: Vec<usize> = (0..NUM_EDGES)
                .filter(|&dedge| !self.is_paired(&state, dedge))
                .collect();
            if unpaired.is_empty() {
                return Ok(moves);
            }
            debug!(working!("Pairing: {} dedges left"), unpaired.len());

            if let [first, _] = unpaired[..] {
                let (state, last_two_moves) = self.pair_last_two(state, first, max_depth)?;
                if !(0..NUM_EDGES).all(|dedge| self.is_paired(&state, dedge)) {
                    return Err(SearchError::Exhausted {
                        phase: "last two dedges",
                        max_depth,
                    });
                }
                moves.extend(last_two_moves);
                return Ok(moves);
            }

            let kept = (0..NUM_EDGES)
                .filter(|dedge| !unpaired.contains(dedge))
                .fold(0_u16, |mask, dedge| mask | 1 << dedge);
            let step = PairingStep { tables: self, kept };
            for generator in search(&step, state, max_depth)? {
                state = self.generators[generator].apply(state);
                moves.extend_from_slice(&self.generators[generator].moves);
            }
        }
    }

    /// Pair the last two dedges, one of which is `first`. Every other dedge is
    /// paired and the slices are at rest.
    fn pair_last_two(
        &self,
        mut state: PairingState,
        first: usize,
        max_depth: u8,
    ) -> Result<(PairingState, Vec<Move>), SearchError> {
        let setup = LastTwoSetup { tables: self };
        let start = [state.wings[2 * first], state.wings[2 * first + 1]];
        let mut moves = vec![];
        for m in search(&setup, start, max_depth)? {
            state = self.outer_moves[m].apply(state);
            moves.extend_from_slice(&self.outer_moves[m].moves);
        }
        state = self.last_two.apply(state);
        moves.extend_from_slice(&self.last_two.moves);
        Ok((state, moves))
    }
}

impl Default for PairingTables {
    fn default() -> Self {
        Self::new()
    }
}

/// One greedy pairing step: keep the dedges in `kept` paired and pair at
/// least one more.
struct PairingStep<'a> {
    tables: &'a PairingTables,
    kept: u16,
}

impl Phase for PairingStep<'_> {
    type State = PairingState;

    fn name(&self) -> &'static str {
        "edge pairing"
    }

    fn num_moves(&self) -> usize {
        self.tables.generators.len()
    }

    fn move_class(&self, move_index: usize) -> usize {
        self.tables.generators[move_index].class
    }

    fn canonical_fsm(&self) -> &CanonicalFSM {
        &self.tables.canonical_fsm
    }

    #[inline]
    fn apply(&self, state: PairingState, move_index: usize) -> PairingState {
        self.tables.generators[move_index].apply(state)
    }

    fn heuristic(&self, state: PairingState) -> u8 {
        let mut heuristic = state.slice_turns.iter().filter(|&&t| t != 0).count() as u8;
        let mut closest_unpaired = u8::MAX;
        for dedge in 0..NUM_EDGES {
            let distance = self.tables.pair_distance(&state, dedge);
            if self.kept & 1 << dedge != 0 {
                heuristic = heuristic.max(distance);
            } else {
                closest_unpaired = closest_unpaired.min(distance);
            }
        }
        heuristic.max(closest_unpaired)
    }
}

/// Outer turns that bring the wing slots of one of the last two dedges to
/// FR and FL. Outer turns keep every paired dedge paired.
struct LastTwoSetup<'a> {
    tables: &'a PairingTables,
}

impl Phase for LastTwoSetup<'_> {
    type State = [u8; 2];

    fn name(&self) -> &'static str {
        "last two dedges"
    }

    fn num_moves(&self) -> usize {
        self.tables.outer_moves.len()
    }

    fn move_class(&self, move_index: usize) -> usize {
        self.tables.outer_moves[move_index].class
    }

    fn canonical_fsm(&self) -> &CanonicalFSM {
        &self.tables.outer_fsm
    }

    fn apply(&self, slots: [u8; 2], move_index: usize) -> [u8; 2] {
        let perm = &self.tables.outer_moves[move_index].wing_perm;
        slots.map(|slot| perm[slot as usize])
    }

    fn heuristic(&self, [a, b]: [u8; 2]) -> u8 {
        let index = edge_pair_index(a / 2, b / 2);
        self.tables.setup_table.distance(index)
    }
}
