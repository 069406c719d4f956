/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    movegen::{apply_move_bits, generate_moves},
    moves::for_each_move,
    Bitboard, Move, Position,
};

/// Counts the leaf nodes of the move tree at the provided depth.
///
/// This performs bulk counting: at depth 1 the destination-set populations
/// are summed instead of applying each move and recursing, which is where
/// most of the speed comes from. Depth 0 counts the position itself.
pub fn perft(position: &Position, depth: u32) -> u64 {
    let (friends, enemies) = position.split();
    count_moves(friends, enemies, depth)
}

/// Performs a splitperft: prints the subtree size under every legal move at
/// the root, then returns the total.
pub fn splitperft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let (friends, enemies) = position.split();
    let mut total = 0;

    for_each_move(&generate_moves(friends, enemies), |from, to| {
        let mut friends = friends;
        let mut enemies = enemies;
        apply_move_bits(from, to, &mut friends, &mut enemies);

        let nodes = count_moves(enemies, friends, depth - 1);
        println!("{}\t{nodes}", Move::new(from.to_square(), to.to_square()));
        total += nodes;
    });

    total
}

fn count_moves(friends: Bitboard, enemies: Bitboard, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(friends, enemies);

    if depth == 1 {
        return moves
            .iter()
            .map(|move_set| move_set.to.population() as u64)
            .sum();
    }

    let mut nodes = 0;
    for_each_move(&moves, |from, to| {
        let mut friends = friends;
        let mut enemies = enemies;
        apply_move_bits(from, to, &mut friends, &mut enemies);

        // The opponent moves next, so the roles swap.
        nodes += count_moves(enemies, friends, depth - 1);
    });

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Player};

    #[test]
    fn trivial_depths() {
        assert_eq!(perft(&Position::STANDARD, 0), 1);
        assert_eq!(perft(&Position::STANDARD, 1), 36);
    }

    #[test]
    fn two_lone_pieces() {
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
        let position = Position::new(board, Player::White);

        assert_eq!(perft(&position, 1), 8);
        assert_eq!(perft(&position, 2), 64);
    }
}
