/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    board::{Bitboard, MoveSet},
    eval::Score,
};

/// Type of node encountered during search.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub(crate) enum NodeType {
    /// No move raised alpha; the true value is at most the returned score.
    #[default]
    All,

    /// Alpha was raised and beta never exceeded; the score is exact.
    Pv,

    /// Beta was exceeded; the true value is at least the returned score.
    Cut,
}

/// A search result: the best move found (possibly the empty sentinel) and
/// its score from the mover's perspective.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub(crate) struct Recommendation {
    pub(crate) mv: MoveSet,
    pub(crate) score: Score,
}

/// An entry in the transposition table.
///
/// A freshly constructed entry carries the all-zero key, which can never
/// match a real lookup: the mover always has at least one piece at any
/// searched node.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub(crate) struct TTableEntry {
    friends: Bitboard,
    enemies: Bitboard,

    /// Best move and score found for this position.
    pub(crate) rec: Recommendation,

    /// Depth at which this entry was computed.
    pub(crate) depth: u32,

    /// Node type of this entry.
    pub(crate) node_type: NodeType,
}

impl TTableEntry {
    pub(crate) fn new(
        friends: Bitboard,
        enemies: Bitboard,
        rec: Recommendation,
        depth: u32,
        node_type: NodeType,
    ) -> Self {
        Self {
            friends,
            enemies,
            rec,
            depth,
            node_type,
        }
    }

    #[inline(always)]
    fn matches(&self, friends: Bitboard, enemies: Bitboard) -> bool {
        self.friends == friends && self.enemies == enemies
    }
}

/// Fixed-size transposition table, keyed by the mover's and the opponent's
/// bitboards.
///
/// Each position maps to exactly one slot; colliding entries fight it out
/// under [the replacement policy](Self::store). There is no probing chain.
pub(crate) struct TTable {
    slots: Vec<TTableEntry>,
}

impl TTable {
    /// Default log2 size; the table then holds `2 << 16` entries (about
    /// 6 MiB).
    pub(crate) const DEFAULT_LOG_SIZE: usize = 16;

    /// Creates a table with `2 << log_size` slots.
    pub(crate) fn with_log_size(log_size: usize) -> Self {
        Self {
            slots: vec![TTableEntry::default(); 2 << log_size],
        }
    }

    /// Zeroes every slot.
    pub(crate) fn reset(&mut self) {
        log::trace!("resetting transposition table ({} slots)", self.slots.len());
        self.slots.fill(TTableEntry::default());
    }

    #[inline(always)]
    fn index(&self, friends: Bitboard, enemies: Bitboard) -> usize {
        // The slot count is a power of two, so masking the mixed key is the
        // same as reducing it modulo the capacity.
        (mix(friends.inner()) ^ mix(enemies.inner())) as usize & (self.slots.len() - 1)
    }

    /// Looks up the entry for `(friends, enemies)`, returning a copy only on
    /// an exact key match.
    #[inline(always)]
    pub(crate) fn probe(&self, friends: Bitboard, enemies: Bitboard) -> Option<TTableEntry> {
        let entry = &self.slots[self.index(friends, enemies)];
        entry.matches(friends, enemies).then_some(*entry)
    }

    /// Stores `entry`, keeping whichever of the new entry and the current
    /// occupant is more valuable:
    ///
    /// - between two non-PV entries (and over an empty slot), the deeper one
    ///   wins;
    /// - a PV entry beats any non-PV occupant, and a deeper PV beats a
    ///   shallower PV;
    /// - a non-PV entry never evicts a PV occupant.
    ///
    /// PV entries are the only ones that can be returned without
    /// re-searching, and the principal variation is reconstructed from them,
    /// so they are worth protecting.
    pub(crate) fn store(&mut self, entry: TTableEntry) {
        let idx = self.index(entry.friends, entry.enemies);
        let slot = &mut self.slots[idx];

        let new_is_pv = entry.node_type == NodeType::Pv;
        let old_is_pv = slot.node_type == NodeType::Pv;

        let replace = if new_is_pv {
            !old_is_pv || entry.depth > slot.depth
        } else {
            !old_is_pv && entry.depth > slot.depth
        };

        if replace {
            *slot = entry;
        }
    }
}

impl Default for TTable {
    fn default() -> Self {
        Self::with_log_size(Self::DEFAULT_LOG_SIZE)
    }
}

/// SplitMix64-style avalanche, applied to each half of the key.
#[inline(always)]
fn mix(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}
