//! The center half of phase 1. Centers are solved in three stages, each
//! with an exact pruning table:
//!
//! 1. Bring the U and D centers onto the U and D faces using every move.
//! 2. Bring the L and R centers onto the L and R faces without disturbing
//!    the first stage.
//! 3. Put every center on its own face using half turns of the inner slices.
//!
//! States are bitmasks over the 24 center slots (four per face, in face
//! order), moved by byte indexed permutation tables.

use crate::{
    canonical_fsm::CanonicalFSM,
    coord::{BINOMIAL, compress, rank_combination},
    cube::{
        CENTER_FACELETS, Face, FaceletCube, NUM_CENTERS, NUM_FACELETS, move_permutation,
        moves_commute,
    },
    moves::{Layer, Move, NUM_LAYERS},
    pruning::PruningTable,
    search::{Phase, SearchError, search},
    success,
};
use log::{debug, info};
use std::time::Instant;

const CENTER_SLOT_OF_FACELET: [u8; NUM_FACELETS] = {
    let mut arr = [u8::MAX; NUM_FACELETS];
    let mut slot = 0;
    while slot < NUM_CENTERS {
        arr[CENTER_FACELETS[slot] as usize] = slot as u8;
        slot += 1;
    }
    arr
};

const UD_SLOTS: [u8; 8] = [0, 1, 2, 3, 12, 13, 14, 15];
const RL_SLOTS: [u8; 8] = [4, 5, 6, 7, 16, 17, 18, 19];
const FB_SLOTS: [u8; 8] = [8, 9, 10, 11, 20, 21, 22, 23];
const SIDE_SLOTS: [u8; 16] = [4, 5, 6, 7, 8, 9, 10, 11, 16, 17, 18, 19, 20, 21, 22, 23];

const fn face_mask(face: Face) -> u32 {
    0b1111 << (face as u32 * 4)
}

/// A move's action on a center mask, split into one lookup per byte.
#[derive(Clone, Debug)]
pub struct MaskMove([[u32; 256]; 3]);

impl MaskMove {
    #[must_use]
    pub fn new(move_: Move) -> Self {
        let perm = move_permutation(move_);
        let slot_perm: [u8; NUM_CENTERS] = std::array::from_fn(|k| {
            CENTER_SLOT_OF_FACELET[perm[CENTER_FACELETS[k] as usize] as usize]
        });
        let mut tables = [[0; 256]; 3];
        for (byte, table) in tables.iter_mut().enumerate() {
            for (value, entry) in table.iter_mut().enumerate() {
                for bit in 0..8 {
                    if (value >> bit) & 1 != 0 {
                        *entry |= 1 << slot_perm[byte * 8 + bit];
                    }
                }
            }
        }
        Self(tables)
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, mask: u32) -> u32 {
        self.0[0][(mask & 0xff) as usize]
            | self.0[1][((mask >> 8) & 0xff) as usize]
            | self.0[2][(mask >> 16) as usize]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CenterStageKind {
    /// U and D centers onto the U and D faces.
    StageUd,
    /// L and R centers onto the L and R faces.
    StageLr,
    /// Every center onto its own face.
    Solve,
}

impl CenterStageKind {
    fn name(self) -> &'static str {
        match self {
            CenterStageKind::StageUd => "U/D center staging",
            CenterStageKind::StageLr => "L/R center staging",
            CenterStageKind::Solve => "center solving",
        }
    }

    fn allows(self, move_: Move) -> bool {
        let layer = move_.layer();
        match self {
            CenterStageKind::StageUd => true,
            // Inner quarter turns off the U/D axis would break the U/D stage
            CenterStageKind::StageLr => {
                !layer.is_inner() || layer.axis() == Face::U.axis() || move_.power() == 2
            }
            CenterStageKind::Solve => !layer.is_inner() || move_.power() == 2,
        }
    }

    fn table_size(self) -> usize {
        match self {
            CenterStageKind::StageUd => BINOMIAL[24][8] as usize,
            CenterStageKind::StageLr => BINOMIAL[16][8] as usize,
            CenterStageKind::Solve => (BINOMIAL[8][4] as usize).pow(3),
        }
    }

    fn goal(self) -> CenterState {
        match self {
            CenterStageKind::StageUd => [face_mask(Face::U) | face_mask(Face::D), 0, 0],
            CenterStageKind::StageLr => [face_mask(Face::R) | face_mask(Face::L), 0, 0],
            CenterStageKind::Solve => [face_mask(Face::U), face_mask(Face::R), face_mask(Face::F)],
        }
    }

    fn state_of(self, cube: &FaceletCube) -> CenterState {
        match self {
            CenterStageKind::StageUd => [
                cube.center_mask(Face::U) | cube.center_mask(Face::D),
                0,
                0,
            ],
            CenterStageKind::StageLr => [
                cube.center_mask(Face::R) | cube.center_mask(Face::L),
                0,
                0,
            ],
            CenterStageKind::Solve => [
                cube.center_mask(Face::U),
                cube.center_mask(Face::R),
                cube.center_mask(Face::F),
            ],
        }
    }

    fn index(self, state: CenterState) -> usize {
        match self {
            CenterStageKind::StageUd => rank_combination(state[0]) as usize,
            CenterStageKind::StageLr => rank_combination(compress(state[0], &SIDE_SLOTS)) as usize,
            CenterStageKind::Solve => {
                let ud = rank_combination(compress(state[0], &UD_SLOTS)) as usize;
                let rl = rank_combination(compress(state[1], &RL_SLOTS)) as usize;
                let fb = rank_combination(compress(state[2], &FB_SLOTS)) as usize;
                (ud * 70 + rl) * 70 + fb
            }
        }
    }
}

/// Center masks: one mask for the staging stages, three (U, R and F colors)
/// for the solving stage. Unused masks stay zero.
pub type CenterState = [u32; 3];

#[derive(Debug)]
pub struct CenterStage {
    kind: CenterStageKind,
    moves: Vec<Move>,
    mask_moves: Vec<MaskMove>,
    canonical_fsm: CanonicalFSM,
    pruning_table: PruningTable,
}

impl CenterStage {
    #[must_use]
    pub fn new(kind: CenterStageKind) -> Self {
        let start = Instant::now();
        let moves: Vec<Move> = Move::all().filter(|&m| kind.allows(m)).collect();
        let mask_moves: Vec<MaskMove> = moves.iter().map(|&m| MaskMove::new(m)).collect();
        let canonical_fsm = CanonicalFSM::new(NUM_LAYERS, |a, b| {
            moves_commute(
                Move::new(Layer::from_index(a), 1),
                Move::new(Layer::from_index(b), 1),
            )
        });
        let apply = |state: CenterState, move_index: usize| {
            state.map(|mask| mask_moves[move_index].apply(mask))
        };
        let pruning_table = PruningTable::generate(
            kind.name(),
            kind.table_size(),
            [kind.goal()],
            moves.len(),
            |state| kind.index(state),
            apply,
        );
        debug!(
            success!("Built the {} table ({} states, depth {}) in {:.3}s"),
            kind.name(),
            pruning_table.reached(),
            pruning_table.max_distance(),
            start.elapsed().as_secs_f64()
        );
        Self {
            kind,
            moves,
            mask_moves,
            canonical_fsm,
            pruning_table,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CenterStageKind {
        self.kind
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn pruning_table(&self) -> &PruningTable {
        &self.pruning_table
    }

    #[must_use]
    pub fn state_of(&self, cube: &FaceletCube) -> CenterState {
        self.kind.state_of(cube)
    }

    /// Find the moves that finish this stage on `cube`.
    ///
    /// # Errors
    ///
    /// Fails if the stage needs more than `max_depth` moves, which only
    /// happens if an earlier stage was skipped.
    pub fn solve(&self, cube: &FaceletCube, max_depth: u8) -> Result<Vec<Move>, SearchError> {
        let path = search(self, self.state_of(cube), max_depth)?;
        Ok(path.into_iter().map(|i| self.moves[i]).collect())
    }
}

impl Phase for CenterStage {
    type State = CenterState;

    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn num_moves(&self) -> usize {
        self.moves.len()
    }

    fn move_class(&self, move_index: usize) -> usize {
        self.moves[move_index].layer().index()
    }

    fn canonical_fsm(&self) -> &CanonicalFSM {
        &self.canonical_fsm
    }

    #[inline]
    fn apply(&self, state: CenterState, move_index: usize) -> CenterState {
        let mask_move = &self.mask_moves[move_index];
        state.map(|mask| mask_move.apply(mask))
    }

    #[inline]
    fn heuristic(&self, state: CenterState) -> u8 {
        self.pruning_table.distance(self.kind.index(state))
    }

    fn is_goal(&self, state: CenterState) -> bool {
        state == self.kind.goal()
    }
}

/// The three center stages, built once.
#[derive(Debug)]
pub struct CenterTables {
    pub stage_ud: CenterStage,
    pub stage_lr: CenterStage,
    pub solve: CenterStage,
}

impl CenterTables {
    #[must_use]
    pub fn new() -> Self {
        info!("Building center tables");
        Self {
            stage_ud: CenterStage::new(CenterStageKind::StageUd),
            stage_lr: CenterStage::new(CenterStageKind::StageLr),
            solve: CenterStage::new(CenterStageKind::Solve),
        }
    }

    /// The stages in the order they run.
    #[must_use]
    pub fn stages(&self) -> [&CenterStage; 3] {
        [&self.stage_ud, &self.stage_lr, &self.solve]
    }
}

impl Default for CenterTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Alg;

    fn cube(alg: &str) -> FaceletCube {
        FaceletCube::from_alg(&alg.parse::<Alg>().unwrap())
    }

    #[test_log::test]
    fn test_move_sets() {
        let tables = &crate::init().centers;
        assert_eq!(tables.stage_ud.moves().len(), 36);
        assert_eq!(tables.stage_lr.moves().len(), 28);
        assert_eq!(tables.solve.moves().len(), 24);
    }

    #[test_log::test]
    fn test_tables_are_exhaustive() {
        let tables = &crate::init().centers;
        for (stage, max_distance) in tables.stages().into_iter().zip([8, 7, 11]) {
            let table = stage.pruning_table();
            assert_eq!(table.reached(), table.len(), "{}", stage.name());
            assert_eq!(table.max_distance(), max_distance, "{}", stage.name());
            assert_eq!(table.distance(stage.kind.index(stage.kind.goal())), 0);
            let zeros = table.distances().iter().filter(|&&d| d == 0).count();
            assert_eq!(zeros, 1);
        }
    }

    #[test_log::test]
    fn test_mask_moves_match_facelets() {
        let scrambled = cube("Rw U2 f' l D2 b Fw r2 u'");
        for move_ in Move::all() {
            let mask_move = MaskMove::new(move_);
            let after = scrambled.apply_move(move_);
            for face in Face::ALL {
                assert_eq!(
                    mask_move.apply(scrambled.center_mask(face)),
                    after.center_mask(face)
                );
            }
            let undo = MaskMove::new(move_.inverse());
            let mask = scrambled.center_mask(Face::F);
            assert_eq!(undo.apply(mask_move.apply(mask)), mask);
        }
    }

    #[test_log::test]
    fn test_stage_moves_preserve_earlier_stages() {
        let tables = &crate::init().centers;
        let staged_ud = face_mask(Face::U) | face_mask(Face::D);
        for (i, _) in tables.stage_lr.moves().iter().enumerate() {
            assert_eq!(tables.stage_lr.mask_moves[i].apply(staged_ud), staged_ud);
        }
        let staged_rl = face_mask(Face::R) | face_mask(Face::L);
        for (i, _) in tables.solve.moves().iter().enumerate() {
            assert_eq!(tables.solve.mask_moves[i].apply(staged_ud), staged_ud);
            assert_eq!(tables.solve.mask_moves[i].apply(staged_rl), staged_rl);
        }
    }

    #[test_log::test]
    fn test_heuristic_is_consistent() {
        // Consistency plus zero on the goal implies admissibility
        let tables = &crate::init().centers;
        let mut rng = fastrand::Rng::with_seed(7);
        for stage in tables.stages() {
            let mut state = stage.kind.goal();
            for _ in 0..200 {
                let h = stage.heuristic(state);
                for move_index in 0..stage.num_moves() {
                    let child = stage.heuristic(stage.apply(state, move_index));
                    assert!(child.abs_diff(h) <= 1, "{}", stage.name());
                }
                state = stage.apply(state, rng.usize(..stage.num_moves()));
            }
        }
    }

    #[test_log::test]
    fn test_heuristic_is_admissible_near_goal() {
        // Every state two moves from the goal must have distance at most two
        let tables = &crate::init().centers;
        for stage in tables.stages() {
            let goal = stage.kind.goal();
            for a in 0..stage.num_moves() {
                let one = stage.apply(goal, a);
                assert!(stage.heuristic(one) <= 1);
                for b in 0..stage.num_moves() {
                    assert!(stage.heuristic(stage.apply(one, b)) <= 2);
                }
            }
        }
    }

    #[test_log::test]
    fn test_stages_solve_centers() {
        let tables = &crate::init().centers;
        let mut state = cube("Rw U2 f' l D2 b Fw r2 u' Lw2 d B' r");
        for stage in tables.stages() {
            let moves = stage.solve(&state, 20).unwrap();
            state = state.apply_moves(&moves);
            assert!(stage.is_goal(stage.state_of(&state)));
        }
        for face in Face::ALL {
            assert_eq!(state.center_mask(face), face_mask(face));
        }
    }
}
