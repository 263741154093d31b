// crates/inc_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure incentive algorithms over `inc_core` types. No I/O, no logging, no
//! shared state: every function maps inputs to outputs deterministically.

use inc_core::entities::{DeviceCategory, SlabKey};
use inc_core::ids::{SellerId, StoreId};
use inc_core::money::Money;
use serde::{Deserialize, Serialize};

pub mod attach_rate;
pub mod bonus;
pub mod gate_kicker;
pub mod leaderboard;
pub mod rollup;
pub mod slab_table;

pub use attach_rate::lookup_attach_rate;
pub use bonus::apply_bonuses;
pub use gate_kicker::{evaluate, evaluate_buckets, TierBreakdown};
pub use leaderboard::{rank_by_total, LeaderboardEntry, RankedEntry};
pub use rollup::{
    rollup_org, rollup_store, Membership, OrgChildSummary, OrgResult, RollupTotals, SlabSum,
    StoreResult, StoreSummary,
};
pub use slab_table::SlabTable;

// ----------------------------- Errors ------------------------------------------------------------

/// Malformed slab configuration or a price no band covers. Always aborts the
/// whole calculation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("slab table is empty")]
    EmptyTable,
    #[error("slab {slab}: min_price must not be negative")]
    NegativeMin { slab: String },
    #[error("slab {slab}: max_price is below min_price")]
    InvertedBand { slab: String },
    #[error("slab {slab}: incentive_per_unit must be > 0")]
    NonPositiveIncentive { slab: String },
    #[error("slab {slab}: incentive_per_unit exceeds {max}")]
    IncentiveTooLarge { slab: String, max: Money },
    #[error("slab {slab}: volume_kicker_units is below gate_units")]
    KickerBelowGate { slab: String },
    #[error("slab {slab}: open-ended band must be the highest band")]
    OpenBandNotLast { slab: String },
    #[error("gap between slab {prev} and slab {next}")]
    Gap { prev: String, next: String },
    #[error("slab {prev} overlaps slab {next}")]
    Overlap { prev: String, next: String },
    #[error("negative device price {0}")]
    NegativePrice(Money),
    #[error("no slab covers device price {0}")]
    Unresolvable(Money),
    #[error("unknown slab key {0}")]
    UnknownSlab(SlabKey),
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

// ----------------------------- Per-subject results -----------------------------------------------

/// Whose sales an `IncentiveResult` covers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    Seller(SellerId),
    /// Pooled store units in aggregate mode.
    Store(StoreId),
}

impl Subject {
    pub fn id_str(&self) -> &str {
        match self {
            Subject::Seller(s) => s.as_str(),
            Subject::Store(s) => s.as_str(),
        }
    }
}

/// One evaluated slab bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabLine {
    pub slab: SlabKey,
    pub label: String,
    pub incentive_per_unit: Money,
    pub effective_gate: u32,
    pub effective_kicker: u32,
    pub tiers: TierBreakdown,
}

/// Flat category bonus earned by a subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusLine {
    pub category: DeviceCategory,
    pub units: u32,
    pub amount_per_unit: Money,
    pub amount: Money,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveTotals {
    pub units: u32,
    pub gated_units: u32,
    pub standard_units: u32,
    pub boosted_units: u32,
    pub slab_amount: Money,
    pub bonus_amount: Money,
    pub total: Money,
}

/// Seller-level (or pooled store-level) incentive breakdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveResult {
    pub subject: Subject,
    /// Threshold multiplier used for every slab (1 in per-seller mode).
    pub scale: u32,
    pub kicker_rate_pct: u32,
    /// Ascending by slab key.
    pub slabs: Vec<SlabLine>,
    /// Ascending by category.
    pub bonuses: Vec<BonusLine>,
    pub totals: IncentiveTotals,
}

impl IncentiveResult {
    /// Recompute `totals` from `slabs` and `bonuses`.
    pub(crate) fn refresh_totals(&mut self) {
        let mut t = IncentiveTotals::default();
        for line in &self.slabs {
            t.units += line.tiers.units;
            t.gated_units += line.tiers.gated_units;
            t.standard_units += line.tiers.standard_units;
            t.boosted_units += line.tiers.boosted_units;
            t.slab_amount += line.tiers.total;
        }
        t.bonus_amount = self.bonuses.iter().map(|b| b.amount).sum();
        t.total = t.slab_amount + t.bonus_amount;
        self.totals = t;
    }
}
