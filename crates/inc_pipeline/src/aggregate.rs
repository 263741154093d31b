//! crates/inc_pipeline/src/aggregate.rs
//! Bucket accepted sales into per-slab unit counts. Every sale must resolve
//! to exactly one slab; the first unresolvable price aborts the whole run.

use std::collections::BTreeMap;

use inc_algo::{ConfigurationError, SlabTable};
use inc_core::entities::{SaleRecord, SlabKey};
use inc_core::ids::SellerId;

pub type SlabBuckets = BTreeMap<SlabKey, u32>;

/// Per-seller slab buckets.
pub fn aggregate<'a, I>(sales: I, table: &SlabTable) -> Result<BTreeMap<SellerId, SlabBuckets>, ConfigurationError>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut out: BTreeMap<SellerId, SlabBuckets> = BTreeMap::new();
    for sale in sales {
        let key = table.resolve(sale.device_price)?.key();
        *out.entry(sale.seller_id.clone()).or_default().entry(key).or_insert(0) += 1;
    }
    Ok(out)
}

/// One bucket set for every sale given, regardless of seller (store aggregate mode).
pub fn aggregate_pooled<'a, I>(sales: I, table: &SlabTable) -> Result<SlabBuckets, ConfigurationError>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut out = SlabBuckets::new();
    for sale in sales {
        *out.entry(table.resolve(sale.device_price)?.key()).or_insert(0) += 1;
    }
    Ok(out)
}
