//! crates/inc_algo/src/bonus.rs
//! Flat per-unit device-category bonuses, added on top of slab tiers.
//! A unit still inside its slab gate earns its category bonus.

use std::collections::BTreeMap;

use inc_core::entities::{DeviceCategory, SaleRecord};
use inc_core::variables::EngineConfig;

use crate::{BonusLine, IncentiveResult};

/// Add one `BonusLine` per configured category present in `sales`.
/// Unconfigured categories contribute nothing. Existing bonus lines are replaced.
pub fn apply_bonuses<'a, I>(
    mut result: IncentiveResult,
    sales: I,
    config: &EngineConfig,
) -> IncentiveResult
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut counts: BTreeMap<&DeviceCategory, u32> = BTreeMap::new();
    for sale in sales {
        if config.bonus_categories.contains_key(&sale.device_category) {
            *counts.entry(&sale.device_category).or_insert(0) += 1;
        }
    }
    result.bonuses = counts
        .into_iter()
        .map(|(cat, units)| {
            let per_unit = config.bonus_for(cat);
            BonusLine {
                category: cat.clone(),
                units,
                amount_per_unit: per_unit,
                amount: per_unit.times(units),
            }
        })
        .collect();
    result.refresh_totals();
    result
}
