//! crates/inc_algo/src/leaderboard.rs
//! Competition ranking ("1, 2, 2, 4") over rollup totals.

use inc_core::determinism::cmp_total_desc_then_id;
use inc_core::money::Money;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub units: u32,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: u32,
    pub id: String,
    pub units: u32,
    pub total: Money,
}

/// Sort by total descending (ties by id ascending) and assign competition ranks.
/// Equal totals share a rank; the next distinct total skips accordingly.
pub fn rank_by_total(mut entries: Vec<LeaderboardEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| cmp_total_desc_then_id(a.total, &a.id, b.total, &b.id));
    let mut out: Vec<RankedEntry> = Vec::with_capacity(entries.len());
    for (pos, e) in entries.into_iter().enumerate() {
        let position = u32::try_from(pos + 1).unwrap_or(u32::MAX);
        let rank = match out.last() {
            Some(prev) if prev.total == e.total => prev.rank,
            _ => position,
        };
        out.push(RankedEntry { rank, id: e.id, units: e.units, total: e.total });
    }
    out
}
