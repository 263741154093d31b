//! crates/inc_algo/src/gate_kicker.rs
//! Gate / volume-kicker tier split for one slab bucket, and evaluation of a
//! subject's per-slab unit counts into an `IncentiveResult`.
//!
//! Tiers, with `G = gate × scale` and `K = kicker × scale`:
//! - units `1..=G`       → 0 %
//! - units `G+1..=K`     → 100 % of `incentive_per_unit`
//! - units beyond `K`    → `kicker_rate_pct` % (120 by default)
//!
//! Boundary units belong to the lower tier. Buckets are never pooled across slabs.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use inc_core::entities::{SlabDefinition, SlabKey};
use inc_core::money::Money;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, IncentiveResult, IncentiveTotals, SlabLine, Subject};

/// Unit counts and amounts per tier. `gated_amount` is always zero and kept
/// so the three tier amounts sum to `total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub units: u32,
    pub gated_units: u32,
    pub standard_units: u32,
    pub boosted_units: u32,
    pub gated_amount: Money,
    pub standard_amount: Money,
    pub boosted_amount: Money,
    pub total: Money,
}

impl core::ops::AddAssign for TierBreakdown {
    fn add_assign(&mut self, rhs: TierBreakdown) {
        self.units += rhs.units;
        self.gated_units += rhs.gated_units;
        self.standard_units += rhs.standard_units;
        self.boosted_units += rhs.boosted_units;
        self.gated_amount += rhs.gated_amount;
        self.standard_amount += rhs.standard_amount;
        self.boosted_amount += rhs.boosted_amount;
        self.total += rhs.total;
    }
}

/// Effective `(gate, kicker)` thresholds for a slab at `scale`.
#[inline]
pub fn effective_thresholds(slab: &SlabDefinition, scale: NonZeroU32) -> (u32, u32) {
    (
        slab.gate_units.saturating_mul(scale.get()),
        slab.volume_kicker_units.saturating_mul(scale.get()),
    )
}

/// Split `units` sold in one slab into the three rate tiers.
pub fn evaluate(
    units: u32,
    slab: &SlabDefinition,
    scale: NonZeroU32,
    kicker_rate_pct: u32,
) -> TierBreakdown {
    let (gate, kicker) = effective_thresholds(slab, scale);
    let kicker = kicker.max(gate);

    let gated_units = units.min(gate);
    let standard_units = units.min(kicker) - gated_units;
    let boosted_units = units - gated_units - standard_units;

    let standard_amount = slab.incentive_per_unit.times(standard_units);
    // Rounded once per tier on the exact product.
    let boosted_amount = slab.incentive_per_unit.times(boosted_units).scale_pct(kicker_rate_pct);

    TierBreakdown {
        units,
        gated_units,
        standard_units,
        boosted_units,
        gated_amount: Money::ZERO,
        standard_amount,
        boosted_amount,
        total: standard_amount + boosted_amount,
    }
}

/// Evaluate every slab bucket of one subject. Bonuses are applied separately.
pub fn evaluate_buckets(
    subject: Subject,
    buckets: &BTreeMap<SlabKey, u32>,
    table: &crate::SlabTable,
    scale: NonZeroU32,
    kicker_rate_pct: u32,
) -> Result<IncentiveResult, ConfigurationError> {
    let mut slabs = Vec::with_capacity(buckets.len());
    for (&key, &units) in buckets {
        let slab = table.get(key).ok_or(ConfigurationError::UnknownSlab(key))?;
        let (effective_gate, effective_kicker) = effective_thresholds(slab, scale);
        slabs.push(SlabLine {
            slab: key,
            label: slab.label(),
            incentive_per_unit: slab.incentive_per_unit,
            effective_gate,
            effective_kicker,
            tiers: evaluate(units, slab, scale, kicker_rate_pct),
        });
    }
    let mut out = IncentiveResult {
        subject,
        scale: scale.get(),
        kicker_rate_pct,
        slabs,
        bonuses: Vec::new(),
        totals: IncentiveTotals::default(),
    };
    out.refresh_totals();
    Ok(out)
}
