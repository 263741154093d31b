//! crates/inc_pipeline/src/engine.rs
//! Public calculation entry points. Each call captures one snapshot, runs the
//! pure stages over it, and returns the result with its warnings.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::NaiveDate;
use inc_algo::{
    evaluate_buckets, lookup_attach_rate, rank_by_total, rollup_org, rollup_store, IncentiveResult,
    LeaderboardEntry, Membership, OrgResult, RankedEntry, RollupTotals, StoreResult, Subject,
};
use inc_core::entities::{AttachRateRecord, SaleRecord};
use inc_core::ids::{OrgUnitId, SellerId, StoreId};
use inc_core::org::{OrgDirectory, OrgRole, OrgUnit, StoreInfo};
use inc_core::period::Period;
use inc_core::variables::{CalcMode, EngineConfig};
use tracing::{info, info_span, warn};

use crate::evaluate::{evaluate_pooled, evaluate_sellers};
use crate::slab_cache::SlabCache;
use crate::snapshot::{CalculationSnapshot, SaleScope};
use crate::source::IncentiveSource;
use crate::{CalcOutcome, Calculated, EngineError};

/// What a leaderboard ranks. Every scope is built from the same store rollups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaderboardScope {
    Sellers,
    Stores,
    OrgUnits(OrgRole),
}

impl core::fmt::Display for LeaderboardScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LeaderboardScope::Sellers => f.write_str("sellers"),
            LeaderboardScope::Stores => f.write_str("stores"),
            LeaderboardScope::OrgUnits(role) => write!(f, "org:{role}"),
        }
    }
}

pub struct Engine<S> {
    source: S,
    slabs: Arc<SlabCache>,
}

impl<S: IncentiveSource> Engine<S> {
    pub fn new(source: S) -> Self {
        Engine { source, slabs: Arc::new(SlabCache::new()) }
    }

    /// Share one slab cache between engines (one per process in practice).
    pub fn with_shared_cache(source: S, slabs: Arc<SlabCache>) -> Self {
        Engine { source, slabs }
    }

    pub fn slab_cache(&self) -> &Arc<SlabCache> {
        &self.slabs
    }

    /// Call after an administrator edits the slab table.
    pub fn invalidate_slabs(&self) {
        self.slabs.invalidate();
    }

    // ----- Seller ---------------------------------------------------------------------------------

    /// Per-seller mode over all of the seller's accepted sales in `period`.
    pub fn calculate_seller(&self, seller_id: &SellerId, period: Period) -> CalcOutcome<IncentiveResult> {
        let _span = info_span!("calculate_seller", seller = %seller_id, %period).entered();

        let dir = self.source.directory()?;
        let scope = SaleScope::all().seller(seller_id.clone());
        let snap = CalculationSnapshot::capture(&self.source, &self.slabs, period, &scope, &[])?;
        if dir.seller_store(seller_id).is_none() && snap.sales.records.is_empty() {
            return Err(EngineError::not_found("seller", seller_id));
        }

        let sales: Vec<&SaleRecord> = snap.sales.records.iter().collect();
        let result = match evaluate_sellers(&sales, &snap.table, &snap.config)?.remove(seller_id) {
            Some(r) => r,
            None => evaluate_buckets(
                Subject::Seller(seller_id.clone()),
                &BTreeMap::new(),
                &snap.table,
                NonZeroU32::MIN,
                snap.config.kicker_rate_pct,
            )?,
        };
        info!(units = result.totals.units, total = %result.totals.total, "seller calculated");
        Ok(finish(&snap, result))
    }

    // ----- Store ----------------------------------------------------------------------------------

    /// Store rollup in the requested mode, with the attach rate in force on the last day of `period`.
    pub fn calculate_store(&self, store_id: &StoreId, period: Period, mode: CalcMode) -> CalcOutcome<StoreResult> {
        let _span = info_span!("calculate_store", store = %store_id, %period, %mode).entered();

        let dir = self.source.directory()?;
        if dir.store(store_id).is_none() {
            return Err(EngineError::not_found("store", store_id));
        }
        let scope = SaleScope::all().store(store_id.clone());
        let stores = [store_id.clone()];
        let snap = CalculationSnapshot::capture(&self.source, &self.slabs, period, &scope, &stores)?;

        let result = store_result(&snap, &dir, store_id, mode)?;
        info!(
            units = result.totals.units,
            total = %result.totals.total,
            active = result.active,
            "store calculated"
        );
        Ok(finish(&snap, result))
    }

    // ----- Org ------------------------------------------------------------------------------------

    /// Two-level rollup for an ASE/ABM (own stores) or ZSE/ZSM (stores of child managers).
    /// Stores are evaluated in per-seller mode.
    pub fn calculate_org_rollup(&self, org_unit: &OrgUnitId, period: Period) -> CalcOutcome<OrgResult> {
        let _span = info_span!("calculate_org_rollup", org_unit = %org_unit, %period).entered();

        let dir = self.source.directory()?;
        let unit = dir.unit(org_unit).ok_or_else(|| EngineError::not_found("org unit", org_unit))?;
        let store_ids: Vec<StoreId> = dir.stores_of(org_unit).into_iter().cloned().collect();

        let scope = SaleScope::all().stores(store_ids.iter().cloned());
        let snap = CalculationSnapshot::capture(&self.source, &self.slabs, period, &scope, &store_ids)?;
        let stores = store_results(&snap, &dir, &store_ids)?;

        let result = rollup_org(unit.id.clone(), unit.role, &membership_of(&dir, unit), &stores);
        info!(
            role = %unit.role,
            stores_assigned = result.stores_assigned,
            stores_active = result.stores_active,
            total = %result.totals.total,
            "org rollup calculated"
        );
        Ok(finish(&snap, result))
    }

    // ----- Leaderboards ---------------------------------------------------------------------------

    /// Competition-ranked totals for every subject in `scope`, across the whole directory.
    pub fn leaderboard(&self, scope: LeaderboardScope, period: Period) -> CalcOutcome<Vec<RankedEntry>> {
        let _span = info_span!("leaderboard", %scope, %period).entered();

        let dir = self.source.directory()?;
        let store_ids: Vec<StoreId> = dir.stores().map(|s| s.store_id.clone()).collect();
        let sale_scope = SaleScope::all().stores(store_ids.iter().cloned());
        let snap = CalculationSnapshot::capture(&self.source, &self.slabs, period, &sale_scope, &store_ids)?;
        let stores = store_results(&snap, &dir, &store_ids)?;

        let entries = match scope {
            LeaderboardScope::Sellers => seller_entries(&dir, &stores),
            LeaderboardScope::Stores => stores
                .values()
                .map(|s| entry(s.store_id.as_str(), &s.totals))
                .collect(),
            LeaderboardScope::OrgUnits(role) => dir
                .units()
                .filter(|u| u.role == role)
                .map(|u| {
                    let r = rollup_org(u.id.clone(), u.role, &membership_of(&dir, u), &stores);
                    entry(u.id.as_str(), &r.totals)
                })
                .collect(),
        };
        Ok(finish(&snap, rank_by_total(entries)))
    }

    // ----- Attach rate ----------------------------------------------------------------------------

    /// The record in force for `store_id` on `as_of`. `None` is not an error.
    pub fn attach_rate(&self, store_id: &StoreId, as_of: NaiveDate) -> Result<Option<AttachRateRecord>, EngineError> {
        let records = self.source.fetch_attach_rates(store_id)?;
        Ok(lookup_attach_rate(&records, store_id, as_of).cloned())
    }
}

impl<S> core::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine").field("slabs", &self.slabs).finish_non_exhaustive()
    }
}

// ----- Stage helpers -----------------------------------------------------------------------------

fn finish<T>(snap: &CalculationSnapshot, result: T) -> Calculated<T> {
    let warnings = snap.sales.warnings();
    if !warnings.is_empty() {
        warn!(
            rejected = snap.sales.issues.len(),
            duplicates = snap.sales.duplicates.len(),
            "sales skipped during normalization"
        );
    }
    Calculated { period: snap.period, slab_generation: snap.slab_generation, warnings, result }
}

/// Config override first, then the directory's declared or listed count. Never below 1.
fn seller_count(config: &EngineConfig, dir: &OrgDirectory, store_id: &StoreId) -> u32 {
    config
        .store_seller_counts
        .get(store_id)
        .copied()
        .or_else(|| dir.store(store_id).map(StoreInfo::seller_count))
        .unwrap_or(1)
        .max(1)
}

fn store_result(
    snap: &CalculationSnapshot,
    dir: &OrgDirectory,
    store_id: &StoreId,
    mode: CalcMode,
) -> Result<StoreResult, EngineError> {
    let n = seller_count(&snap.config, dir, store_id);
    let sales: Vec<&SaleRecord> = snap.sales_at(store_id).collect();
    let results = match mode {
        CalcMode::PerSeller => evaluate_sellers(&sales, &snap.table, &snap.config)?.into_values().collect(),
        CalcMode::PerStoreAggregate => {
            let scale = NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
            vec![evaluate_pooled(store_id, &sales, scale, &snap.table, &snap.config)?]
        }
    };
    let attach = lookup_attach_rate(&snap.attach_rates, store_id, snap.period.end()).cloned();
    Ok(rollup_store(store_id.clone(), mode, n, results).with_attach_rate(attach))
}

fn store_results(
    snap: &CalculationSnapshot,
    dir: &OrgDirectory,
    store_ids: &[StoreId],
) -> Result<BTreeMap<StoreId, StoreResult>, EngineError> {
    let mut out = BTreeMap::new();
    for id in store_ids {
        out.insert(id.clone(), store_result(snap, dir, id, CalcMode::PerSeller)?);
    }
    Ok(out)
}

fn membership_of(dir: &OrgDirectory, unit: &OrgUnit) -> Membership {
    let owned = |id: &OrgUnitId| dir.direct_stores(id).into_iter().cloned().collect::<Vec<_>>();
    if unit.role.owns_stores() {
        Membership::Direct(owned(&unit.id))
    } else {
        Membership::Managers(
            dir.children(&unit.id)
                .into_iter()
                .map(|c| (c.id.clone(), owned(&c.id)))
                .collect(),
        )
    }
}

fn entry(id: &str, totals: &RollupTotals) -> LeaderboardEntry {
    LeaderboardEntry { id: id.to_owned(), units: totals.units, total: totals.total }
}

/// Seller totals summed over every store they sold at; listed sellers without sales rank at zero.
fn seller_entries(dir: &OrgDirectory, stores: &BTreeMap<StoreId, StoreResult>) -> Vec<LeaderboardEntry> {
    let mut by_seller: BTreeMap<&str, Vec<&IncentiveResult>> = BTreeMap::new();
    for id in dir.sellers() {
        by_seller.entry(id.as_str()).or_default();
    }
    for r in stores.values().flat_map(|s| s.results.iter()) {
        if let Subject::Seller(id) = &r.subject {
            by_seller.entry(id.as_str()).or_default().push(r);
        }
    }
    by_seller
        .into_iter()
        .map(|(id, results)| entry(id, &RollupTotals::from_results(results)))
        .collect()
}
