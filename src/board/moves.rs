/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::{Bitboard, Square};

/// Maximum number of pieces a player can have, and therefore the maximum
/// number of per-piece destination sets in a [`MoveList`].
pub const MAX_PIECES: usize = 12;

/// An alias for an [`arrayvec::ArrayVec`] holding one [`MoveSet`] per
/// friendly piece.
pub(crate) type MoveList = arrayvec::ArrayVec<MoveSet, MAX_PIECES>;

/// A move from one square to another.
///
/// Moves carry no side information; landing on an opposing piece is a
/// capture. In text, a move is written as `"D6 -> E7"` and parsed from the
/// same form or from terser variants such as `"D6-E7"` or `"d6xe7"`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    /// Square the piece moves from.
    pub from: Square,

    /// Square the piece moves to.
    pub to: Square,
}

impl Move {
    /// Constructs a new [`Move`] between the provided squares.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;

    /// Parses a move as two square coordinates separated by any non-empty
    /// run of separator characters (`-`, `>`, `x`, spaces).
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s
            .split(|ch: char| matches!(ch, '-' | '>' | 'x' | 'X' | ' ' | '\t'))
            .filter(|part| !part.is_empty());

        let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
            bail!("expected a move like \"A1-B2\", got {s:?}");
        };
        if parts.next().is_some() {
            bail!("trailing input after move in {s:?}");
        }

        Ok(Self::new(from.parse()?, to.parse()?))
    }
}

/// A set of moves sharing one source square, stored as a pair of bitboards.
///
/// `from` has exactly one bit set and `to` holds every destination reachable
/// from it; extracting destinations one bit at a time yields the individual
/// moves. The all-zero pair doubles as the "no move" sentinel used by the
/// search and the transposition table.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub(crate) struct MoveSet {
    pub(crate) from: Bitboard,
    pub(crate) to: Bitboard,
}

impl MoveSet {
    /// The "no move known" sentinel.
    pub(crate) const EMPTY: Self = Self {
        from: Bitboard::EMPTY,
        to: Bitboard::EMPTY,
    };

    #[inline(always)]
    pub(crate) const fn new(from: Bitboard, to: Bitboard) -> Self {
        Self { from, to }
    }

    /// Encodes a [`Move`] as a pair of single-bit boards.
    #[inline(always)]
    pub(crate) const fn from_move(mv: Move) -> Self {
        Self::new(mv.from.bitboard(), mv.to.bitboard())
    }

    /// Returns `true` if this is the "no move" sentinel.
    #[inline(always)]
    pub(crate) const fn is_empty(self) -> bool {
        self.from.is_empty() && self.to.is_empty()
    }

    /// Converts a single-destination set back into a [`Move`].
    ///
    /// Returns `None` for the empty sentinel.
    #[inline(always)]
    pub(crate) fn to_move(self) -> Option<Move> {
        if self.is_empty() {
            None
        } else {
            Some(Move::new(self.from.to_square(), self.to.to_square()))
        }
    }
}

/// Runs `f` for every individual `(from, to)` move in the list, expanding
/// each destination set one bit at a time, lowest destination first.
#[inline(always)]
pub(crate) fn for_each_move<F>(moves: &MoveList, mut f: F)
where
    F: FnMut(Bitboard, Bitboard),
{
    for move_set in moves {
        let mut destinations = move_set.to;
        while !destinations.is_empty() {
            f(move_set.from, destinations.pop_lsb());
        }
    }
}
