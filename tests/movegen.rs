/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tabla::{perft, Board, GameOutcome, Move, Player, Position, Square};

/// Lone pieces at D6 (White) and E2 (Black), far enough apart that neither
/// is on a line through the other.
fn lone_pieces() -> Position {
    let board = Board::from_diagram(
        "........\n\
         ........\n\
         ...w....\n\
         ........\n\
         ........\n\
         ........\n\
         ....b...\n\
         ........",
    )
    .unwrap();
    Position::new(board, Player::White)
}

#[test]
fn perft_anchors_from_the_starting_position() {
    assert_eq!(perft(&Position::STANDARD, 0), 1);
    assert_eq!(perft(&Position::STANDARD, 1), 36);
    assert_eq!(perft(&Position::STANDARD, 2), 1_244);
}

#[test]
fn perft_depth_5_regression_anchor() {
    // Slow in debug builds, but this is the anchor that catches subtle
    // move-generation changes.
    assert_eq!(perft(&Position::STANDARD, 5), 55_963_132);
}

#[test]
fn lone_piece_counts_and_destinations() {
    let position = lone_pieces();

    assert_eq!(perft(&position, 1), 8);
    assert_eq!(perft(&position, 2), 64);

    let mut found = position.legal_destinations(Square::D6);
    found.sort();
    let mut expected = vec![
        Square::C7,
        Square::D7,
        Square::E7,
        Square::C6,
        Square::E6,
        Square::C5,
        Square::D5,
        Square::E5,
    ];
    expected.sort();
    assert_eq!(found, expected);

    assert_eq!(position.legal_destinations(Square::A1), Vec::new());
}

#[test]
fn moves_flip_the_player_to_move() {
    let position = Position::STANDARD;
    for mv in position.legal_moves() {
        assert_eq!(position.with_move(mv).to_move(), Player::Black);
    }
}

#[test]
fn moves_change_exactly_the_right_bits() {
    let position = Position::STANDARD;

    for mv in position.legal_moves() {
        let before = position.board();
        let after = position.with_move(mv).board();

        // Exactly the from bit clears and the to bit sets for the mover.
        let white_changed = before.white ^ after.white;
        assert_eq!(white_changed, mv.from.bitboard() | mv.to.bitboard());

        // The opponent can lose at most one piece, and only on `to`.
        let black_changed = before.black ^ after.black;
        assert!(black_changed.population() <= 1);
        assert_eq!(black_changed & !mv.to.bitboard(), tabla::Bitboard::EMPTY);
    }
}

#[test]
fn legality_agrees_with_enumeration_everywhere() {
    let positions = [Position::STANDARD, lone_pieces()];

    for position in positions {
        let legal: std::collections::BTreeSet<_> =
            position.legal_moves().into_iter().collect();

        // Every piece-to-anywhere candidate must agree with the list.
        let friends = position.board().pieces(position.to_move());
        for from in friends.squares() {
            for to in (0..64).map(Square::from_index) {
                let mv = Move::new(from, to);
                assert_eq!(
                    position.is_legal(mv),
                    legal.contains(&mv),
                    "disagreement on {mv}"
                );
            }
        }
    }
}

#[test]
fn outcome_matches_connectivity_and_mobility() {
    // Ongoing iff there are legal moves and neither side is connected.
    let ongoing = Position::STANDARD;
    assert_eq!(ongoing.outcome(), GameOutcome::Ongoing);
    assert!(!ongoing.legal_moves().is_empty());

    let white_connected = Board::from_diagram(
        "........\n\
         ........\n\
         ...ww...\n\
         ...ww...\n\
         ........\n\
         .b....b.\n\
         ........\n\
         ........",
    )
    .unwrap();
    assert_eq!(
        Position::new(white_connected, Player::White).outcome(),
        GameOutcome::WhiteWins
    );
    assert_eq!(
        Position::new(white_connected, Player::Black).outcome(),
        GameOutcome::WhiteWins
    );
}

#[test]
fn capture_connecting_the_opponent_draws() {
    // Black takes the stray white piece on D5. The capture gathers Black
    // into one group, but it also leaves White's remaining pieces
    // connected, so the game is drawn rather than won by the mover.
    let board = Board::from_diagram(
        "........\n\
         ........\n\
         ........\n\
         ...w....\n\
         ..b.....\n\
         .....b..\n\
         w.......\n\
         w.......",
    )
    .unwrap();
    let position = Position::new(board, Player::Black);
    assert_eq!(position.outcome(), GameOutcome::Ongoing);

    let capture = Move::new(Square::F3, Square::D5);
    assert!(position.is_legal(capture), "F3 must be able to take on D5");

    let after = position.with_move(capture);
    assert!(tabla::is_connected(after.board().black));
    assert!(tabla::is_connected(after.board().white));
    assert_eq!(after.outcome(), GameOutcome::Draw);
}
