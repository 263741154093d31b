//! crates/inc_pipeline/src/snapshot.rs
//! Everything one calculation reads, fetched up front. Evaluation runs over
//! this snapshot only and never calls back into a source.
//!
//! Sales are normalized over the whole period feed so a `unit_identifier` is
//! counted once no matter which seller or store a calculation asks about. The
//! result is then narrowed to the calculation's [`SaleScope`].

use std::collections::BTreeSet;
use std::sync::Arc;

use inc_algo::{ConfigurationError, SlabTable};
use inc_core::entities::{AttachRateRecord, RawSale, SaleRecord};
use inc_core::ids::{SellerId, StoreId};
use inc_core::period::Period;
use inc_core::variables::{validate_config, EngineConfig};
use tracing::debug;

use crate::normalize::{normalize, EntityRef, NormalizedSales};
use crate::slab_cache::SlabCache;
use crate::source::{AttachRateSource, SalesSource, SlabSource};
use crate::EngineError;

// ----- Scope -------------------------------------------------------------------------------------

/// Which sellers and stores a calculation reports on. `None` for an id set
/// means unrestricted; an empty set matches nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaleScope {
    sellers: Option<BTreeSet<SellerId>>,
    stores: Option<BTreeSet<StoreId>>,
}

impl SaleScope {
    pub fn all() -> Self {
        SaleScope::default()
    }

    pub fn seller(mut self, id: SellerId) -> Self {
        self.sellers.get_or_insert_with(BTreeSet::new).insert(id);
        self
    }

    pub fn store(mut self, id: StoreId) -> Self {
        self.stores.get_or_insert_with(BTreeSet::new).insert(id);
        self
    }

    pub fn stores<I: IntoIterator<Item = StoreId>>(mut self, ids: I) -> Self {
        self.stores.get_or_insert_with(BTreeSet::new).extend(ids);
        self
    }

    pub fn contains(&self, sale: &SaleRecord) -> bool {
        self.sellers.as_ref().map_or(true, |set| set.contains(&sale.seller_id))
            && self.stores.as_ref().map_or(true, |set| set.contains(&sale.store_id))
    }

    /// Raw ids are compared as text; malformed ids never match a restricted scope.
    pub fn touches(&self, raw: &RawSale) -> bool {
        self.sellers
            .as_ref()
            .map_or(true, |set| set.iter().any(|s| s.as_str() == raw.seller_id))
            && self
                .stores
                .as_ref()
                .map_or(true, |set| set.iter().any(|s| s.as_str() == raw.store_id))
    }
}

// ----- Snapshot ----------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CalculationSnapshot {
    pub period: Period,
    pub table: Arc<SlabTable>,
    pub slab_generation: u64,
    pub config: EngineConfig,
    /// Accepted records inside the scope, plus every issue and duplicate that involves one.
    pub sales: NormalizedSales,
    pub attach_rates: Vec<AttachRateRecord>,
}

impl CalculationSnapshot {
    /// Fetch slabs (through the cache), config, the period's sales, and attach
    /// rates for `stores`.
    pub fn capture<S>(
        source: &S,
        cache: &SlabCache,
        period: Period,
        scope: &SaleScope,
        stores: &[StoreId],
    ) -> Result<Self, EngineError>
    where
        S: SalesSource + SlabSource + AttachRateSource + ?Sized,
    {
        let (table, slab_generation) = cache.get_or_load(source)?;

        let config = source.fetch_config()?;
        validate_config(&config).map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))?;

        let raw = source.fetch_sales(period)?;
        let sales = restrict(normalize(&raw, period), &raw, scope);

        let mut attach_rates = Vec::new();
        for store in stores {
            attach_rates.extend(source.fetch_attach_rates(store)?);
        }

        debug!(
            fetched = raw.len(),
            accepted = sales.records.len(),
            rejected = sales.issues.len(),
            duplicates = sales.duplicates.len(),
            slab_generation,
            "snapshot captured"
        );

        Ok(CalculationSnapshot { period, table, slab_generation, config, sales, attach_rates })
    }

    /// Accepted sales recorded at `store`, caller order preserved.
    pub fn sales_at<'a>(&'a self, store: &'a StoreId) -> impl Iterator<Item = &'a SaleRecord> + 'a {
        self.sales.records.iter().filter(move |s| &s.store_id == store)
    }
}

/// Keep in-scope records. A duplicate stays visible to both sides: the scope
/// that kept the unit and the scope whose copy was dropped.
fn restrict(all: NormalizedSales, raw: &[RawSale], scope: &SaleScope) -> NormalizedSales {
    let touches = |index: usize| raw.get(index).is_some_and(|r| scope.touches(r));
    NormalizedSales {
        records: all.records.into_iter().filter(|r| scope.contains(r)).collect(),
        issues: all
            .issues
            .into_iter()
            .filter(|i| match &i.where_ {
                EntityRef::Sale { index, .. } => touches(*index),
            })
            .collect(),
        duplicates: all
            .duplicates
            .into_iter()
            .filter(|d| touches(d.kept_index) || touches(d.dropped_index))
            .collect(),
    }
}
