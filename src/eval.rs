/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::board::{has_no_legal_moves, is_connected, Bitboard};

/// A position or move score, from some player's perspective.
///
/// Non-decisive scores always stay strictly between `-WIN` and `WIN`.
pub type Score = i64;

/// The magnitude of a decisive (won or lost) position.
pub const WIN: Score = 1_000_000_000;

/// Weight of a piece inside each of the centre masks.
const CENTER_WEIGHT: Score = 10;

/// Flat bonus for being the side to move, so that symmetric positions do not
/// evaluate to zero.
const TEMPO: Score = 20;

/// Concentric centre regions: the 2x2, 4x4 and 6x6 blocks around the middle
/// of the board. A piece scores once per region it sits in, so standing
/// nearer the centre is worth more.
const CENTER_MASKS: [Bitboard; 3] = [
    Bitboard::new(0x0000001818000000),
    Bitboard::new(0x00003C3C3C3C0000),
    Bitboard::new(0x007E7E7E7E7E7E00),
];

/// Evaluates a position from the mover's perspective, deriving the
/// connectivity and mobility flags itself.
pub(crate) fn evaluate_leaf(friends: Bitboard, enemies: Bitboard) -> Score {
    evaluate_leaf_with(
        friends,
        enemies,
        is_connected(friends),
        is_connected(enemies),
        has_no_legal_moves(friends, enemies),
    )
}

/// Evaluates a position from the mover's perspective with the terminal
/// flags supplied by the caller.
///
/// Decisive and drawn positions short-circuit; everything else gets a
/// centralization score. The only way to connect all pieces runs through
/// the middle of the board, so centre control is the whole positional term.
pub(crate) fn evaluate_leaf_with(
    friends: Bitboard,
    enemies: Bitboard,
    friends_together: bool,
    enemies_together: bool,
    no_legal_moves: bool,
) -> Score {
    if friends_together && !enemies_together {
        return WIN;
    }
    if enemies_together && !friends_together {
        return -WIN;
    }
    if (friends_together && enemies_together) || no_legal_moves {
        return 0;
    }

    let mut score = TEMPO;
    for mask in CENTER_MASKS {
        score += CENTER_WEIGHT * (mask & friends).population() as Score;
        score -= CENTER_WEIGHT * (mask & enemies).population() as Score;
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Square};

    fn board(diagram: &str) -> Board {
        Board::from_diagram(diagram).unwrap()
    }

    #[test]
    fn centre_masks_are_nested_blocks() {
        assert_eq!(CENTER_MASKS[0].population(), 4);
        assert_eq!(CENTER_MASKS[1].population(), 16);
        assert_eq!(CENTER_MASKS[2].population(), 36);

        assert!(CENTER_MASKS[0].contains(Square::D4));
        assert!(CENTER_MASKS[0].contains(Square::E5));
        assert!(!CENTER_MASKS[0].contains(Square::C4));
        assert!(CENTER_MASKS[1].contains(Square::C3));
        assert!(!CENTER_MASKS[1].contains(Square::B3));
        assert!(CENTER_MASKS[2].contains(Square::B2));
        assert!(!CENTER_MASKS[2].contains(Square::A1));
    }

    #[test]
    fn connected_mover_wins() {
        let b = board(
            "........\n\
             ........\n\
             ...ww...\n\
             ...ww...\n\
             ........\n\
             .b....b.\n\
             ........\n\
             ........",
        );

        assert_eq!(evaluate_leaf(b.white, b.black), WIN);
        assert_eq!(evaluate_leaf(b.black, b.white), -WIN);
    }

    #[test]
    fn mutual_connection_is_a_draw() {
        let b = board(
            "........\n\
             ........\n\
             ...ww...\n\
             ...ww...\n\
             .bb.....\n\
             .bb.....\n\
             ........\n\
             ........",
        );

        assert_eq!(evaluate_leaf(b.white, b.black), 0);
        assert_eq!(evaluate_leaf(b.black, b.white), 0);
    }

    #[test]
    fn central_pieces_outscore_edge_pieces() {
        // White holds the very centre; Black sits on the rim.
        let b = board(
            "b......b\n\
             ........\n\
             ........\n\
             ...ww...\n\
             ........\n\
             ........\n\
             ........\n\
             b......b",
        );

        // Each central pawn scores in all three rings; rim pawns score in
        // none. Plus the tempo bonus for the mover.
        let expected = 2 * 3 * CENTER_WEIGHT + TEMPO;
        assert_eq!(evaluate_leaf(b.white, b.black), expected);
        assert_eq!(evaluate_leaf(b.black, b.white), -2 * 3 * CENTER_WEIGHT + TEMPO);
    }

    #[test]
    fn starting_position_favours_the_mover_only_by_tempo() {
        let b = Board::STANDARD;
        assert_eq!(evaluate_leaf(b.white, b.black), TEMPO);
        assert_eq!(evaluate_leaf(b.black, b.white), TEMPO);
    }
}
