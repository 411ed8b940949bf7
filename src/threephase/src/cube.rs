//! The facelet level model of the 4x4x4. Everything else in the crate is
//! derived from, and tested against, the permutations in this module.

use crate::moves::{Alg, Layer, Move, NUM_MOVES};
use std::{fmt, str::FromStr, sync::LazyLock};
use thiserror::Error;

pub const NUM_FACELETS: usize = 96;
pub const NUM_CENTERS: usize = 24;
pub const NUM_WINGS: usize = 24;
pub const NUM_CORNERS: usize = 8;
pub const NUM_EDGES: usize = 12;

/// A face of the cube. Faces double as sticker colors: the color of a face's
/// centers in the solved state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            'U' => Face::U,
            'R' => Face::R,
            'F' => Face::F,
            'D' => Face::D,
            'L' => Face::L,
            'B' => Face::B,
            _ => return None,
        })
    }

    /// 0 for x (R and L), 1 for y (U and D), 2 for z (F and B).
    #[must_use]
    pub fn axis(self) -> usize {
        match self {
            Face::R | Face::L => 0,
            Face::U | Face::D => 1,
            Face::F | Face::B => 2,
        }
    }

    fn sign(self) -> i8 {
        match self {
            Face::U | Face::R | Face::F => 1,
            Face::D | Face::L | Face::B => -1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceletError {
    #[error("Malformed facelet string: {0}")]
    MalformedInput(String),
    #[error("The facelets do not describe a reachable cube: {0}")]
    InvalidCube(String),
}

/// The center facelets, four per face in raster order.
pub const CENTER_FACELETS: [u8; NUM_CENTERS] = [
    5, 6, 9, 10, 21, 22, 25, 26, 37, 38, 41, 42, 53, 54, 57, 58, 69, 70, 73, 74, 85, 86, 89, 90,
];

/// Corners URF UFL ULB UBR DFR DLF DBL DRB, each listed clockwise starting
/// from its U or D facelet.
pub const CORNER_FACELETS: [[u8; 3]; NUM_CORNERS] = [
    [15, 16, 35],
    [12, 32, 67],
    [0, 64, 83],
    [3, 80, 19],
    [51, 47, 28],
    [48, 79, 44],
    [60, 95, 76],
    [63, 31, 92],
];

pub const CORNER_COLORS: [[Face; 3]; NUM_CORNERS] = {
    use Face::{B, D, F, L, R, U};
    [
        [U, R, F],
        [U, F, L],
        [U, L, B],
        [U, B, R],
        [D, F, R],
        [D, L, F],
        [D, B, L],
        [D, R, B],
    ]
};

/// The two wing slots of each edge UR UF UL UB DR DF DL DB FR FL BL BR. Wing
/// slot `2 * e + i` is `EDGE_WINGS[e][i]`, given as its facelet on the edge's
/// first face followed by its facelet on the second.
pub const EDGE_WINGS: [[[u8; 2]; 2]; NUM_EDGES] = [
    [[7, 18], [11, 17]],
    [[13, 33], [14, 34]],
    [[4, 65], [8, 66]],
    [[1, 82], [2, 81]],
    [[55, 29], [59, 30]],
    [[49, 45], [50, 46]],
    [[52, 78], [56, 77]],
    [[61, 94], [62, 93]],
    [[39, 20], [43, 24]],
    [[36, 71], [40, 75]],
    [[87, 68], [91, 72]],
    [[84, 23], [88, 27]],
];

pub const EDGE_COLORS: [[Face; 2]; NUM_EDGES] = {
    use Face::{B, D, F, L, R, U};
    [
        [U, R],
        [U, F],
        [U, L],
        [U, B],
        [D, R],
        [D, F],
        [D, L],
        [D, B],
        [F, R],
        [F, L],
        [B, L],
        [B, R],
    ]
};

/// The wing slot each wing facelet belongs to, `u8::MAX` elsewhere.
pub const WING_SLOT_OF_FACELET: [u8; NUM_FACELETS] = {
    let mut arr = [u8::MAX; NUM_FACELETS];
    let mut slot = 0;
    while slot < NUM_WINGS {
        let [a, b] = EDGE_WINGS[slot / 2][slot % 2];
        arr[a as usize] = slot as u8;
        arr[b as usize] = slot as u8;
        slot += 1;
    }
    arr
};

/// Position of a facelet in doubled coordinates. Cubies sit at odd
/// coordinates in -3..=3 and facelets stick out to +-4 along their normal.
fn facelet_position(index: usize) -> [i8; 3] {
    let row = (index % 16 / 4) as i8;
    let col = (index % 4) as i8;
    match Face::ALL[index / 16] {
        Face::U => [-3 + 2 * col, 4, -3 + 2 * row],
        Face::R => [4, 3 - 2 * row, 3 - 2 * col],
        Face::F => [-3 + 2 * col, 3 - 2 * row, 4],
        Face::D => [-3 + 2 * col, -4, 3 - 2 * row],
        Face::L => [-4, 3 - 2 * row, -3 + 2 * col],
        Face::B => [3 - 2 * col, 3 - 2 * row, -4],
    }
}

/// Rotate counterclockwise about the positive `axis` by `quarter_turns`.
fn rotate([mut x, mut y, mut z]: [i8; 3], axis: usize, quarter_turns: i8) -> [i8; 3] {
    for _ in 0..quarter_turns {
        match axis {
            0 => (y, z) = (-z, y),
            1 => (z, x) = (-x, z),
            _ => (x, y) = (-y, x),
        }
    }
    [x, y, z]
}

/// `perm[i]` is where the facelet at `i` goes.
fn facelet_permutation(layer: Layer, power: u8) -> [u8; NUM_FACELETS] {
    let mut index_of = [[[u8::MAX; 9]; 9]; 9];
    for i in 0..NUM_FACELETS {
        let [x, y, z] = facelet_position(i).map(|v| (v + 4) as usize);
        index_of[x][y][z] = i as u8;
    }

    let axis = layer.axis();
    let sign = layer.face().sign();
    let depth = if layer.is_inner() { 1 } else { 3 };
    // Clockwise seen from the face is clockwise about its outward normal
    let quarter_turns = (-(power as i8) * sign).rem_euclid(4);

    let mut perm = [0; NUM_FACELETS];
    for (i, dest) in perm.iter_mut().enumerate() {
        let position = facelet_position(i);
        let cubie = position.map(|v| v.clamp(-3, 3));
        let [x, y, z] = if cubie[axis] == sign * depth {
            rotate(position, axis, quarter_turns)
        } else {
            position
        }
        .map(|v| (v + 4) as usize);
        *dest = index_of[x][y][z];
    }
    perm
}

static FACELET_MOVES: LazyLock<[[u8; NUM_FACELETS]; NUM_MOVES]> = LazyLock::new(|| {
    let mut moves = [[0; NUM_FACELETS]; NUM_MOVES];
    for (move_, perm) in Move::all().zip(&mut moves) {
        *perm = facelet_permutation(move_.layer(), move_.power());
    }
    moves
});

/// For each wing slot, whether a wing that is solved into slot 0 reads its
/// colors in order when placed there. Wings cannot be flipped in place, so
/// this splits the slots into two handedness classes.
static WING_HANDEDNESS: LazyLock<[bool; NUM_WINGS]> = LazyLock::new(|| {
    let mut handedness = [false; NUM_WINGS];
    let mut seen = vec![false; NUM_FACELETS * NUM_FACELETS];
    let [a, b] = EDGE_WINGS[0][0];
    let mut frontier = vec![(a, b)];
    seen[a as usize * NUM_FACELETS + b as usize] = true;
    while let Some((a, b)) = frontier.pop() {
        let slot = WING_SLOT_OF_FACELET[a as usize] as usize;
        handedness[slot] = EDGE_WINGS[slot / 2][slot % 2][0] == a;
        for perm in FACELET_MOVES.iter() {
            let next = (perm[a as usize], perm[b as usize]);
            let key = next.0 as usize * NUM_FACELETS + next.1 as usize;
            if !seen[key] {
                seen[key] = true;
                frontier.push(next);
            }
        }
    }
    handedness
});

/// The facelet permutation of a move.
#[must_use]
pub fn move_permutation(move_: Move) -> &'static [u8; NUM_FACELETS] {
    &FACELET_MOVES[move_.index()]
}

/// Whether two moves commute as permutations of the facelets.
#[must_use]
pub fn moves_commute(a: Move, b: Move) -> bool {
    let (a, b) = (move_permutation(a), move_permutation(b));
    (0..NUM_FACELETS).all(|i| a[b[i] as usize] == b[a[i] as usize])
}

/// A full 4x4x4 state: 96 stickers in U R F D L B face order, each face a
/// row-major 4x4 raster.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceletCube {
    facelets: [Face; NUM_FACELETS],
}

impl FaceletCube {
    pub const SOLVED: Self = {
        let mut facelets = [Face::U; NUM_FACELETS];
        let mut i = 0;
        while i < NUM_FACELETS {
            facelets[i] = Face::ALL[i / 16];
            i += 1;
        }
        Self { facelets }
    };

    #[must_use]
    pub fn from_alg(alg: &Alg) -> Self {
        Self::SOLVED.apply_alg(alg)
    }

    #[must_use]
    pub fn facelets(&self) -> &[Face; NUM_FACELETS] {
        &self.facelets
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    #[must_use]
    pub fn apply_move(&self, move_: Move) -> Self {
        let perm = move_permutation(move_);
        let mut facelets = self.facelets;
        for (&facelet, &dest) in self.facelets.iter().zip(perm) {
            facelets[dest as usize] = facelet;
        }
        Self { facelets }
    }

    #[must_use]
    pub fn apply_alg(&self, alg: &Alg) -> Self {
        self.apply_moves(alg.moves())
    }

    #[must_use]
    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        moves
            .iter()
            .fold(*self, |cube, &move_| cube.apply_move(move_))
    }

    /// Bit `k` is set when center slot `k` holds a `color` center.
    #[must_use]
    pub fn center_mask(&self, color: Face) -> u32 {
        CENTER_FACELETS
            .iter()
            .enumerate()
            .filter(|&(_, &facelet)| self.facelets[facelet as usize] == color)
            .fold(0, |mask, (k, _)| mask | 1 << k)
    }

    /// The slot holding each wing. Wing `w` is the wing solved in slot `w`.
    ///
    /// # Errors
    ///
    /// Fails if a slot holds colors that no wing has or if a wing appears
    /// twice.
    pub fn wing_positions(&self) -> Result<[u8; NUM_WINGS], FaceletError> {
        let handedness = &*WING_HANDEDNESS;
        let mut positions = [u8::MAX; NUM_WINGS];
        for slot in 0..NUM_WINGS {
            let (edge, in_order) = self.edge_at(EDGE_WINGS[slot / 2][slot % 2])?;
            let wing = if (handedness[slot] == handedness[2 * edge]) == in_order {
                2 * edge
            } else {
                2 * edge + 1
            };
            if positions[wing] != u8::MAX {
                return Err(FaceletError::InvalidCube(format!(
                    "the wing of edge {}{} with this handedness appears twice",
                    EDGE_COLORS[edge][0].symbol(),
                    EDGE_COLORS[edge][1].symbol()
                )));
            }
            positions[wing] = slot as u8;
        }
        Ok(positions)
    }

    /// Corner permutation and orientation in the usual 3x3x3 convention:
    /// `cp[i]` is the corner in position `i` and `co[i]` its clockwise twist.
    ///
    /// # Errors
    ///
    /// Fails on impossible corner stickers, repeated corners or a twisted
    /// corner.
    pub fn corners(&self) -> Result<([u8; NUM_CORNERS], [u8; NUM_CORNERS]), FaceletError> {
        let mut cp = [0; NUM_CORNERS];
        let mut co = [0; NUM_CORNERS];
        let mut seen = 0_u8;
        for (i, facelets) in CORNER_FACELETS.iter().enumerate() {
            let colors = facelets.map(|f| self.facelets[f as usize]);
            let invalid = || {
                FaceletError::InvalidCube(format!(
                    "corner stickers {}{}{} do not form a corner",
                    colors[0].symbol(),
                    colors[1].symbol(),
                    colors[2].symbol()
                ))
            };
            let ori = colors
                .iter()
                .position(|&c| c == Face::U || c == Face::D)
                .ok_or_else(invalid)?;
            let (c1, c2) = (colors[(ori + 1) % 3], colors[(ori + 2) % 3]);
            let corner = CORNER_COLORS
                .iter()
                .position(|cc| cc[1] == c1 && cc[2] == c2)
                .ok_or_else(invalid)?;
            if seen & 1 << corner != 0 {
                return Err(FaceletError::InvalidCube(
                    "a corner appears twice".to_owned(),
                ));
            }
            seen |= 1 << corner;
            cp[i] = corner as u8;
            co[i] = ori as u8;
        }
        if co.iter().map(|&o| u32::from(o)).sum::<u32>() % 3 != 0 {
            return Err(FaceletError::InvalidCube("a corner is twisted".to_owned()));
        }
        Ok((cp, co))
    }

    /// Edge permutation and orientation of the 3x3x3 this cube reduces to.
    ///
    /// # Errors
    ///
    /// Fails unless both wings of every edge position read as the same edge
    /// with the same orientation, and the twelve readings are distinct.
    pub fn reduced_edges(&self) -> Result<([u8; NUM_EDGES], [u8; NUM_EDGES]), FaceletError> {
        let mut ep = [0; NUM_EDGES];
        let mut eo = [0; NUM_EDGES];
        let mut seen = 0_u16;
        for (i, wings) in EDGE_WINGS.iter().enumerate() {
            let (edge, in_order) = self.edge_at(wings[0])?;
            if self.edge_at(wings[1])? != (edge, in_order) {
                return Err(FaceletError::InvalidCube(format!(
                    "the edge at {}{} is not paired",
                    EDGE_COLORS[i][0].symbol(),
                    EDGE_COLORS[i][1].symbol()
                )));
            }
            if seen & 1 << edge != 0 {
                return Err(FaceletError::InvalidCube(
                    "the edges do not reduce to a 3x3x3".to_owned(),
                ));
            }
            seen |= 1 << edge;
            ep[i] = edge as u8;
            eo[i] = u8::from(!in_order);
        }
        Ok((ep, eo))
    }

    /// Check that the stickers describe a reachable cube. Centers of one
    /// color are interchangeable, so only corners and wings constrain it.
    ///
    /// # Errors
    ///
    /// See [`Self::corners`] and [`Self::wing_positions`].
    pub fn verify(&self) -> Result<(), FaceletError> {
        self.corners()?;
        self.wing_positions()?;
        Ok(())
    }

    fn edge_at(&self, [a, b]: [u8; 2]) -> Result<(usize, bool), FaceletError> {
        let colors = [self.facelets[a as usize], self.facelets[b as usize]];
        EDGE_COLORS
            .iter()
            .enumerate()
            .find_map(|(edge, &edge_colors)| {
                if edge_colors == colors {
                    Some((edge, true))
                } else if edge_colors == [colors[1], colors[0]] {
                    Some((edge, false))
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                FaceletError::InvalidCube(format!(
                    "edge stickers {}{} do not form an edge",
                    colors[0].symbol(),
                    colors[1].symbol()
                ))
            })
    }
}

impl Default for FaceletCube {
    fn default() -> Self {
        Self::SOLVED
    }
}

impl FromStr for FaceletCube {
    type Err = FaceletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != NUM_FACELETS {
            return Err(FaceletError::MalformedInput(format!(
                "expected {NUM_FACELETS} facelets but found {len}"
            )));
        }
        let mut facelets = [Face::U; NUM_FACELETS];
        let mut counts = [0_u8; 6];
        for (facelet, symbol) in facelets.iter_mut().zip(s.chars()) {
            let Some(face) = Face::from_symbol(symbol) else {
                return Err(FaceletError::MalformedInput(format!(
                    "unknown color `{symbol}`"
                )));
            };
            *facelet = face;
            counts[*facelet as usize] += 1;
        }
        if let Some(face) = Face::ALL.into_iter().find(|&f| counts[f as usize] != 16) {
            return Err(FaceletError::MalformedInput(format!(
                "color {} appears {} times instead of 16",
                face.symbol(),
                counts[face as usize]
            )));
        }
        let cube = Self { facelets };
        cube.verify()?;
        Ok(cube)
    }
}

impl fmt::Display for FaceletCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.facelets
            .iter()
            .try_for_each(|facelet| write!(f, "{}", facelet.symbol()))
    }
}

impl fmt::Debug for FaceletCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceletCube({self})")
    }
}
