//! crates/inc_algo/src/rollup.rs
//! Store and org rollups. A rollup is a pure sum of already-evaluated results:
//! totals, tier breakdowns and unit counts. Gates are never re-applied here.
//!
//! Every leaderboard and org view is built from these two functions.

use std::collections::BTreeMap;

use inc_core::entities::{AttachPct, AttachRateRecord, DeviceCategory, SlabKey};
use inc_core::ids::{OrgUnitId, StoreId};
use inc_core::money::Money;
use inc_core::org::OrgRole;
use inc_core::variables::CalcMode;
use serde::{Deserialize, Serialize};

use crate::gate_kicker::TierBreakdown;
use crate::{BonusLine, IncentiveResult};

// ---------------- Types -------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabSum {
    pub slab: SlabKey,
    pub label: String,
    pub tiers: TierBreakdown,
}

/// Summed totals over any number of results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupTotals {
    /// Number of seller (or pooled) results summed.
    pub contributors: u32,
    pub units: u32,
    pub gated_units: u32,
    pub standard_units: u32,
    pub boosted_units: u32,
    pub slab_amount: Money,
    pub bonus_amount: Money,
    pub total: Money,
    pub by_slab: Vec<SlabSum>,
    pub by_category: Vec<BonusLine>,
}

#[derive(Default)]
struct Accumulator {
    contributors: u32,
    slab_amount: Money,
    bonus_amount: Money,
    by_slab: BTreeMap<SlabKey, SlabSum>,
    by_category: BTreeMap<DeviceCategory, BonusLine>,
}

impl Accumulator {
    fn add_slab(&mut self, key: SlabKey, label: &str, tiers: &TierBreakdown) {
        self.by_slab
            .entry(key)
            .or_insert_with(|| SlabSum { slab: key, label: label.to_owned(), tiers: TierBreakdown::default() })
            .tiers += *tiers;
    }

    fn add_bonus(&mut self, b: &BonusLine) {
        let line = self.by_category.entry(b.category.clone()).or_insert_with(|| BonusLine {
            category: b.category.clone(),
            units: 0,
            amount_per_unit: b.amount_per_unit,
            amount: Money::ZERO,
        });
        line.units += b.units;
        line.amount += b.amount;
    }

    fn add_result(&mut self, r: &IncentiveResult) {
        self.contributors += 1;
        for s in &r.slabs {
            self.add_slab(s.slab, &s.label, &s.tiers);
        }
        for b in &r.bonuses {
            self.add_bonus(b);
        }
        self.slab_amount += r.totals.slab_amount;
        self.bonus_amount += r.totals.bonus_amount;
    }

    fn add_totals(&mut self, t: &RollupTotals) {
        self.contributors += t.contributors;
        for s in &t.by_slab {
            self.add_slab(s.slab, &s.label, &s.tiers);
        }
        for b in &t.by_category {
            self.add_bonus(b);
        }
        self.slab_amount += t.slab_amount;
        self.bonus_amount += t.bonus_amount;
    }

    fn finish(self) -> RollupTotals {
        let mut out = RollupTotals {
            contributors: self.contributors,
            slab_amount: self.slab_amount,
            bonus_amount: self.bonus_amount,
            total: self.slab_amount + self.bonus_amount,
            ..RollupTotals::default()
        };
        for s in self.by_slab.values() {
            out.units += s.tiers.units;
            out.gated_units += s.tiers.gated_units;
            out.standard_units += s.tiers.standard_units;
            out.boosted_units += s.tiers.boosted_units;
        }
        out.by_slab = self.by_slab.into_values().collect();
        out.by_category = self.by_category.into_values().collect();
        out
    }
}

impl RollupTotals {
    pub fn from_results<'a, I: IntoIterator<Item = &'a IncentiveResult>>(results: I) -> Self {
        let mut acc = Accumulator::default();
        for r in results {
            acc.add_result(r);
        }
        acc.finish()
    }

    pub fn merged<'a, I: IntoIterator<Item = &'a RollupTotals>>(parts: I) -> Self {
        let mut acc = Accumulator::default();
        for t in parts {
            acc.add_totals(t);
        }
        acc.finish()
    }
}

/// Store-level rollup with its attach rate for the period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreResult {
    pub store_id: StoreId,
    pub mode: CalcMode,
    pub number_of_sellers: u32,
    /// Per-seller results, or the single pooled result in aggregate mode.
    pub results: Vec<IncentiveResult>,
    pub totals: RollupTotals,
    /// `None` renders as N/A.
    pub attach_rate: Option<AttachRateRecord>,
    /// At least one accepted sale in the period.
    pub active: bool,
}

impl StoreResult {
    pub fn with_attach_rate(mut self, rec: Option<AttachRateRecord>) -> Self {
        self.attach_rate = rec;
        self
    }
}

/// Which stores an org unit covers: its own (ASE/ABM) or grouped by child manager (ZSE/ZSM).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Membership {
    Direct(Vec<StoreId>),
    Managers(BTreeMap<OrgUnitId, Vec<StoreId>>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub store_id: StoreId,
    pub active: bool,
    pub units: u32,
    pub total: Money,
    pub attach_percentage: Option<AttachPct>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgChildSummary {
    pub org_unit: OrgUnitId,
    pub stores_assigned: u32,
    pub stores_active: u32,
    pub units: u32,
    pub total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgResult {
    pub org_unit: OrgUnitId,
    pub role: OrgRole,
    pub stores_assigned: u32,
    pub stores_active: u32,
    /// Empty for store-owning roles.
    pub children: Vec<OrgChildSummary>,
    pub stores: Vec<StoreSummary>,
    pub totals: RollupTotals,
}

// ---------------- Rollups -----------------------------------------------------------------------

/// Sum seller results (or the pooled result) into a store result. The attach
/// rate is attached separately by the caller.
pub fn rollup_store(
    store_id: StoreId,
    mode: CalcMode,
    number_of_sellers: u32,
    mut results: Vec<IncentiveResult>,
) -> StoreResult {
    results.sort_by(|a, b| a.subject.cmp(&b.subject));
    let totals = RollupTotals::from_results(&results);
    StoreResult {
        store_id,
        mode,
        number_of_sellers,
        active: totals.units > 0,
        results,
        totals,
        attach_rate: None,
    }
}

fn summarize(id: &StoreId, stores: &BTreeMap<StoreId, StoreResult>) -> StoreSummary {
    match stores.get(id) {
        Some(s) => StoreSummary {
            store_id: id.clone(),
            active: s.active,
            units: s.totals.units,
            total: s.totals.total,
            attach_percentage: s.attach_rate.as_ref().map(|r| r.attach_percentage),
        },
        // Assigned but nothing computed: contributes zero.
        None => StoreSummary {
            store_id: id.clone(),
            active: false,
            units: 0,
            total: Money::ZERO,
            attach_percentage: None,
        },
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Walk a two-level membership and sum store results into an org result.
pub fn rollup_org(
    org_unit: OrgUnitId,
    role: OrgRole,
    membership: &Membership,
    stores: &BTreeMap<StoreId, StoreResult>,
) -> OrgResult {
    let mut children = Vec::new();
    let mut all_ids: Vec<&StoreId> = Vec::new();
    match membership {
        Membership::Direct(ids) => all_ids.extend(ids.iter()),
        Membership::Managers(groups) => {
            for (child, ids) in groups {
                let summaries: Vec<StoreSummary> = ids.iter().map(|id| summarize(id, stores)).collect();
                children.push(OrgChildSummary {
                    org_unit: child.clone(),
                    stores_assigned: count_u32(summaries.len()),
                    stores_active: count_u32(summaries.iter().filter(|s| s.active).count()),
                    units: summaries.iter().map(|s| s.units).sum(),
                    total: summaries.iter().map(|s| s.total).sum(),
                });
                all_ids.extend(ids.iter());
            }
        }
    }
    all_ids.sort();
    all_ids.dedup();

    let summaries: Vec<StoreSummary> = all_ids.iter().map(|id| summarize(id, stores)).collect();
    let totals = RollupTotals::merged(all_ids.iter().filter_map(|id| stores.get(*id)).map(|s| &s.totals));

    OrgResult {
        org_unit,
        role,
        stores_assigned: count_u32(summaries.len()),
        stores_active: count_u32(summaries.iter().filter(|s| s.active).count()),
        children,
        stores: summaries,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IncentiveTotals, SlabLine, Subject};
    use proptest::prelude::*;

    fn result(seller: &str, units: u32, standard: u32, amount: i64, bonus: i64) -> IncentiveResult {
        let tiers = TierBreakdown {
            units,
            gated_units: units - standard,
            standard_units: standard,
            boosted_units: 0,
            gated_amount: Money::ZERO,
            standard_amount: Money::new(amount),
            boosted_amount: Money::ZERO,
            total: Money::new(amount),
        };
        let mut r = IncentiveResult {
            subject: Subject::Seller(seller.parse().unwrap()),
            scale: 1,
            kicker_rate_pct: 120,
            slabs: vec![SlabLine {
                slab: SlabKey(Money::new(30001)),
                label: "30001-40000".into(),
                incentive_per_unit: Money::new(250),
                effective_gate: 3,
                effective_kicker: 8,
                tiers,
            }],
            bonuses: vec![],
            totals: IncentiveTotals::default(),
        };
        if bonus > 0 {
            r.bonuses.push(BonusLine {
                category: DeviceCategory::new("foldable"),
                units: 1,
                amount_per_unit: Money::new(bonus),
                amount: Money::new(bonus),
            });
        }
        r.refresh_totals();
        r
    }

    fn sid(s: &str) -> StoreId {
        s.parse().unwrap()
    }

    #[test]
    fn store_rollup_sums_without_regating() {
        let rs = vec![result("B", 4, 1, 250, 500), result("A", 3, 0, 0, 0)];
        let s = rollup_store(sid("S1"), CalcMode::PerSeller, 2, rs);
        assert_eq!(s.results[0].subject.id_str(), "A");
        assert_eq!(s.totals.units, 7);
        // Pooled 7 units would pass a gate of 3; sums keep the per-seller split.
        assert_eq!(s.totals.gated_units, 6);
        assert_eq!(s.totals.total, Money::new(750));
        assert_eq!(s.totals.by_slab.len(), 1);
        assert_eq!(s.totals.by_category[0].amount, Money::new(500));
        assert!(s.active);
        assert!(s.attach_rate.is_none());
    }

    #[test]
    fn empty_store_is_inactive_zero() {
        let s = rollup_store(sid("S9"), CalcMode::PerSeller, 1, vec![]);
        assert!(!s.active);
        assert_eq!(s.totals.total, Money::ZERO);
        assert_eq!(s.totals.contributors, 0);
    }

    #[test]
    fn org_rollup_counts_assigned_and_active() {
        let mut stores = BTreeMap::new();
        stores.insert(sid("S1"), rollup_store(sid("S1"), CalcMode::PerSeller, 1, vec![result("A", 5, 2, 500, 0)]));
        stores.insert(sid("S2"), rollup_store(sid("S2"), CalcMode::PerSeller, 1, vec![]));
        let mut groups = BTreeMap::new();
        groups.insert("ASE1".parse().unwrap(), vec![sid("S1"), sid("S2")]);
        groups.insert("ASE2".parse().unwrap(), vec![sid("S3")]);
        let org = rollup_org("ZSE1".parse().unwrap(), OrgRole::Zse, &Membership::Managers(groups), &stores);
        assert_eq!(org.stores_assigned, 3);
        assert_eq!(org.stores_active, 1);
        assert_eq!(org.totals.total, Money::new(500));
        assert_eq!(org.children.len(), 2);
        assert_eq!(org.children[0].stores_assigned, 2);
        assert_eq!(org.children[0].stores_active, 1);
        assert_eq!(org.children[1].total, Money::ZERO);
        let ids: Vec<&str> = org.stores.iter().map(|s| s.store_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }

    #[test]
    fn direct_membership_has_no_children() {
        let stores = BTreeMap::new();
        let org = rollup_org("ASE1".parse().unwrap(), OrgRole::Ase, &Membership::Direct(vec![sid("S1")]), &stores);
        assert!(org.children.is_empty());
        assert_eq!(org.stores_assigned, 1);
        assert_eq!(org.stores_active, 0);
    }

    proptest! {
        #[test]
        fn store_total_is_sum_of_seller_totals(parts in prop::collection::vec((1u32..20, 0i64..5_000, 0i64..1_000), 0..12)) {
            let results: Vec<IncentiveResult> = parts
                .iter()
                .enumerate()
                .map(|(i, &(u, amt, bonus))| result(&format!("S{i}"), u, u, amt, bonus))
                .collect();
            let expected: Money = results.iter().map(|r| r.totals.total).sum();
            let units: u32 = results.iter().map(|r| r.totals.units).sum();
            let s = rollup_store(sid("X"), CalcMode::PerSeller, 1, results);
            prop_assert_eq!(s.totals.total, expected);
            prop_assert_eq!(s.totals.units, units);
        }
    }
}
