use crate::cube::Face;
use itertools::Itertools;
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const NUM_LAYERS: usize = 12;
pub const NUM_MOVES: usize = NUM_LAYERS * 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Unrecognized move `{0}`")]
    MalformedMove(String),
}

/// One of the twelve turnable layers: an outer face or the inner slice right
/// next to it. An inner slice turns in the same direction as its face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer {
    face: Face,
    inner: bool,
}

impl Layer {
    #[must_use]
    pub const fn outer(face: Face) -> Self {
        Self { face, inner: false }
    }

    #[must_use]
    pub const fn inner(face: Face) -> Self {
        Self { face, inner: true }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self {
            face: Face::ALL[index / 2],
            inner: index % 2 == 1,
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.face as usize * 2 + usize::from(self.inner)
    }

    #[must_use]
    pub fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub fn is_inner(self) -> bool {
        self.inner
    }

    /// Layers on the same axis always commute.
    #[must_use]
    pub fn axis(self) -> usize {
        self.face.axis()
    }

    fn symbol(self) -> char {
        let c = self.face.symbol();
        if self.inner {
            c.to_ascii_lowercase()
        } else {
            c
        }
    }
}

/// A clockwise turn of a layer by `power` quarter turns, where `power` is one
/// of 1, 2 or 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    layer: Layer,
    power: u8,
}

impl Move {
    /// # Panics
    ///
    /// Panics if `power` is not a nonzero quarter turn count.
    #[must_use]
    pub fn new(layer: Layer, power: u8) -> Self {
        assert!(power % 4 != 0, "A move must turn its layer");
        Self {
            layer,
            power: power % 4,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self {
            layer: Layer::from_index(index / 3),
            power: (index % 3) as u8 + 1,
        }
    }

    /// Every move in index order: U U2 U' u u2 u' R R2 ...
    pub fn all() -> impl Iterator<Item = Move> {
        (0..NUM_MOVES).map(Self::from_index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.layer.index() * 3 + usize::from(self.power) - 1
    }

    #[must_use]
    pub fn layer(self) -> Layer {
        self.layer
    }

    #[must_use]
    pub fn power(self) -> u8 {
        self.power
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            layer: self.layer,
            power: 4 - self.power,
        }
    }

    fn suffix(self) -> &'static str {
        match self.power {
            1 => "",
            2 => "2",
            _ => "'",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.layer.symbol(), self.suffix())
    }
}

/// A move sequence. Wide turns are stored as their outer and inner layer
/// moves.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alg(Vec<Move>);

impl Alg {
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, move_: Move) {
        self.0.push(move_);
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        Self(self.0.iter().rev().map(|move_| move_.inverse()).collect())
    }

    /// Cancel and merge moves. A move combines with the most recent move on
    /// the same layer if only moves on the same axis lie between them, since
    /// those all commute. Layers that turn a full rotation disappear.
    #[must_use]
    pub fn merged(&self) -> Self {
        let mut out: Vec<Move> = Vec::with_capacity(self.0.len());
        for &move_ in &self.0 {
            let axis = move_.layer.axis();
            let same_layer = out
                .iter()
                .rev()
                .take_while(|prev| prev.layer.axis() == axis)
                .position(|prev| prev.layer == move_.layer)
                .map(|offset| out.len() - 1 - offset);
            match same_layer {
                Some(i) => {
                    let power = (out[i].power + move_.power) % 4;
                    if power == 0 {
                        out.remove(i);
                    } else {
                        out[i].power = power;
                    }
                }
                None => out.push(move_),
            }
        }
        Self(out)
    }
}

impl From<Vec<Move>> for Alg {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl FromIterator<Move> for Alg {
    fn from_iter<T: IntoIterator<Item = Move>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Move> for Alg {
    fn extend<T: IntoIterator<Item = Move>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Alg {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Alg {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut moves = vec![];
        for token in s.split_whitespace() {
            let malformed = || MoveParseError::MalformedMove(token.to_owned());
            let mut chars = token.chars();
            let symbol = chars.next().ok_or_else(malformed)?;
            let face = Face::from_symbol(symbol.to_ascii_uppercase()).ok_or_else(malformed)?;
            let mut rest = chars.as_str();
            let wide = symbol.is_ascii_uppercase() && rest.starts_with('w');
            if wide {
                rest = &rest[1..];
            }
            let power = match rest {
                "" => 1,
                "2" | "2'" => 2,
                "'" => 3,
                _ => return Err(malformed()),
            };
            if symbol.is_ascii_lowercase() {
                moves.push(Move::new(Layer::inner(face), power));
            } else {
                moves.push(Move::new(Layer::outer(face), power));
                if wide {
                    moves.push(Move::new(Layer::inner(face), power));
                }
            }
        }
        Ok(Self(moves))
    }
}

impl fmt::Display for Alg {
    /// Adjacent outer and inner turns of the same face by the same amount are
    /// written as one wide turn.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens = vec![];
        let mut moves = self.0.iter().peekable();
        while let Some(&move_) = moves.next() {
            let wide = moves
                .next_if(|next| {
                    next.layer.face == move_.layer.face
                        && next.layer.inner != move_.layer.inner
                        && next.power == move_.power
                })
                .is_some();
            tokens.push(if wide {
                format!("{}w{}", move_.layer.face.symbol(), move_.suffix())
            } else {
                move_.to_string()
            });
        }
        write!(f, "{}", tokens.iter().join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alg(s: &str) -> Alg {
        s.parse().unwrap()
    }

    #[test_log::test]
    fn test_move_index_round_trip() {
        for (i, move_) in Move::all().enumerate() {
            assert_eq!(move_.index(), i);
            assert_eq!(Move::from_index(i), move_);
            assert_eq!(move_.inverse().inverse(), move_);
        }
    }

    #[test_log::test]
    fn test_parse_notation() {
        let parsed = alg("R U2 r' Fw Bw2' d2");
        let printed: Vec<String> = parsed.moves().iter().map(ToString::to_string).collect();
        assert_eq!(printed, ["R", "U2", "r'", "F", "f", "B2", "b2", "d2"]);
    }

    #[test_log::test]
    fn test_parse_rejects_unknown_tokens() {
        for bad in ["X", "R3", "rw", "U''", "Rw3", "2R"] {
            assert_eq!(
                bad.parse::<Alg>(),
                Err(MoveParseError::MalformedMove(bad.to_owned()))
            );
        }
        assert_eq!(alg("  "), Alg::default());
    }

    #[test_log::test]
    fn test_display_wide() {
        assert_eq!(alg("Rw U Rw'").to_string(), "Rw U Rw'");
        assert_eq!(alg("r R2 u").to_string(), "r R2 u");
    }

    #[test_log::test]
    fn test_merge_cancels() {
        assert_eq!(alg("R U U' R'").merged(), Alg::default());
        assert_eq!(alg("R L R").merged(), alg("R2 L"));
        assert_eq!(alg("U d U'").merged(), alg("d"));
        assert_eq!(alg("U R U").merged(), alg("U R U"));
        assert_eq!(alg("F F F F").merged(), Alg::default());
        assert_eq!(alg("R U R' U'").merged(), alg("R U R' U'"));
    }

    #[test_log::test]
    fn test_inverse() {
        assert_eq!(alg("R U2 f'").inverse(), alg("f U2 R'"));
    }
}
