//! crates/inc_pipeline/src/evaluate.rs
//! Seller and pooled-store evaluation over an already bucketed snapshot.
//! Sellers are evaluated in parallel; results are collected into ordered maps
//! so output never depends on scheduling.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use inc_algo::{apply_bonuses, evaluate_buckets, ConfigurationError, IncentiveResult, SlabTable, Subject};
use inc_core::entities::SaleRecord;
use inc_core::ids::{SellerId, StoreId};
use inc_core::variables::EngineConfig;
use rayon::prelude::*;

use crate::aggregate::{aggregate, aggregate_pooled};

/// Per-seller mode: each seller's own sales, unscaled thresholds.
pub fn evaluate_sellers(
    sales: &[&SaleRecord],
    table: &SlabTable,
    config: &EngineConfig,
) -> Result<BTreeMap<SellerId, IncentiveResult>, ConfigurationError> {
    let buckets = aggregate(sales.iter().copied(), table)?;

    let mut by_seller: BTreeMap<&SellerId, Vec<&SaleRecord>> = BTreeMap::new();
    for s in sales {
        by_seller.entry(&s.seller_id).or_default().push(s);
    }

    buckets
        .par_iter()
        .map(|(seller, slabs)| -> Result<(SellerId, IncentiveResult), ConfigurationError> {
            let base = evaluate_buckets(
                Subject::Seller(seller.clone()),
                slabs,
                table,
                NonZeroU32::MIN,
                config.kicker_rate_pct,
            )?;
            let own = by_seller.get(seller).map(Vec::as_slice).unwrap_or_default();
            let result = apply_bonuses(base, own.iter().copied(), config);
            Ok((seller.clone(), result))
        })
        .collect()
}

/// Store aggregate mode: the store's sales pooled, thresholds scaled by `number_of_sellers`.
pub fn evaluate_pooled(
    store_id: &StoreId,
    sales: &[&SaleRecord],
    number_of_sellers: NonZeroU32,
    table: &SlabTable,
    config: &EngineConfig,
) -> Result<IncentiveResult, ConfigurationError> {
    let buckets = aggregate_pooled(sales.iter().copied(), table)?;
    let base = evaluate_buckets(
        Subject::Store(store_id.clone()),
        &buckets,
        table,
        number_of_sellers,
        config.kicker_rate_pct,
    )?;
    Ok(apply_bonuses(base, sales.iter().copied(), config))
}
