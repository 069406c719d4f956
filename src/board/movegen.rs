/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    moves::{for_each_move, MoveList, MoveSet},
    tables::{CIRCLES, DIRECTIONS, MAX_RADIUS},
    Bitboard, Board, Move, Player, Position, Square,
};

/// Generates the destination set of the friendly piece on `from`.
///
/// Along each of the four lines through `from`, the piece moves exactly as
/// many steps as there are pieces (of either colour) on that line, in either
/// sense. A step may jump friendly pieces but never an enemy piece, must end
/// on the board, and must not land on a friendly piece. Landing on an enemy
/// piece captures it.
pub(crate) fn destinations(from: Square, friends: Bitboard, enemies: Bitboard) -> Bitboard {
    debug_assert!(
        friends.contains(from),
        "no friendly piece on {from} to generate moves for"
    );

    let all_pieces = friends | enemies;

    // Halves of the board on either side of `from`, in square order. Each
    // line crosses a half in at most one square per radius.
    let positive = Bitboard::new(!0u64 << from.index());
    let negative = !positive;

    let circles = &CIRCLES[from.index()];
    let mut result = Bitboard::EMPTY;

    for line in DIRECTIONS[from.index()] {
        let distance = (line & all_pieces).population() as usize;

        let reach = circles[distance - 1];
        let ring = circles[distance.min(MAX_RADIUS)] ^ reach;

        for half in [positive, negative] {
            let landing = ring & line & half;
            let crossed = reach & line & half;

            if !landing.is_empty()
                && !enemies.intersects(crossed)
                && !friends.intersects(landing)
            {
                result |= landing;
            }
        }
    }

    result
}

/// Generates one [`MoveSet`] per friendly piece, lowest square first.
///
/// Pieces with no legal destination still get an entry with an empty
/// destination set.
pub(crate) fn generate_moves(friends: Bitboard, enemies: Bitboard) -> MoveList {
    let mut list = MoveList::new();

    let mut pieces = friends;
    while !pieces.is_empty() {
        let from = pieces.pop_lsb();
        list.push(MoveSet::new(
            from,
            destinations(from.to_square(), friends, enemies),
        ));
    }

    list
}

/// Returns `true` if the mover has no legal destination anywhere.
pub(crate) fn has_no_legal_moves(friends: Bitboard, enemies: Bitboard) -> bool {
    generate_moves(friends, enemies)
        .iter()
        .all(|move_set| move_set.to.is_empty())
}

/// Checks a single bitboard-encoded move against the movement rule.
pub(crate) fn is_move_set_legal(mv: MoveSet, friends: Bitboard, enemies: Bitboard) -> bool {
    friends.intersects(mv.from)
        && destinations(mv.from.to_square(), friends, enemies).intersects(mv.to)
}

/// Applies a move in place: the mover's piece jumps from `from` to `to`,
/// and any enemy piece on `to` is captured. No other bits change.
#[inline(always)]
pub(crate) fn apply_move_bits(
    from: Bitboard,
    to: Bitboard,
    mine: &mut Bitboard,
    theirs: &mut Bitboard,
) {
    *mine ^= from | to;
    *theirs &= !to;
}

impl Board {
    /// The board after `player` plays `mv`.
    ///
    /// The move is not checked for legality; validate with
    /// [`Position::is_legal`] first.
    pub fn with_move(mut self, mv: Move, player: Player) -> Self {
        let (mine, theirs) = match player {
            Player::White => (&mut self.white, &mut self.black),
            Player::Black => (&mut self.black, &mut self.white),
        };
        apply_move_bits(mv.from.bitboard(), mv.to.bitboard(), mine, theirs);
        self
    }
}

impl Position {
    /// The position after the mover plays `mv`: the board changes per
    /// [`Board::with_move`] and the turn passes to the opponent.
    ///
    /// The move is not checked for legality; validate with
    /// [`Position::is_legal`] first.
    pub fn with_move(self, mv: Move) -> Self {
        Self::new(
            self.board().with_move(mv, self.to_move()),
            self.to_move().opponent(),
        )
    }

    /// Lists every legal move for the player to move, ordered by source
    /// square and then by destination square.
    ///
    /// Returns an empty list for terminal positions.
    pub fn legal_moves(&self) -> Vec<Move> {
        let (friends, enemies) = self.split();
        let moves = generate_moves(friends, enemies);

        let mut result = Vec::with_capacity(moves.len() * 4);
        for_each_move(&moves, |from, to| {
            result.push(Move::new(from.to_square(), to.to_square()));
        });

        result
    }

    /// Returns `true` if `mv` is legal for the player to move.
    pub fn is_legal(&self, mv: Move) -> bool {
        let (friends, enemies) = self.split();
        is_move_set_legal(MoveSet::from_move(mv), friends, enemies)
    }

    /// Lists the squares the piece on `from` may move to.
    ///
    /// Returns an empty list if `from` does not hold a piece of the player
    /// to move.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let (friends, enemies) = self.split();
        if !friends.contains(from) {
            return Vec::new();
        }

        destinations(from, friends, enemies).squares().collect()
    }
}
