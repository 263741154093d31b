//! crates/inc_algo/src/slab_table.rs
//! Validated, immutable price-band table and price → slab resolution.
//!
//! Bands are sorted by `min_price` and must tile the integer price axis:
//! `next.min_price == prev.max_price + 1`, with only the top band open-ended.

use inc_core::entities::{SlabDefinition, SlabKey};
use inc_core::money::{Money, MAX_UNIT_AMOUNT};

use crate::ConfigurationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlabTable {
    slabs: Vec<SlabDefinition>,
}

impl SlabTable {
    /// Sort and validate. Any band-level defect is reported with the band label.
    pub fn new(mut slabs: Vec<SlabDefinition>) -> Result<Self, ConfigurationError> {
        if slabs.is_empty() {
            return Err(ConfigurationError::EmptyTable);
        }
        slabs.sort_by_key(|s| s.min_price);

        for s in &slabs {
            if s.min_price.is_negative() {
                return Err(ConfigurationError::NegativeMin { slab: s.label() });
            }
            if matches!(s.max_price, Some(max) if max < s.min_price) {
                return Err(ConfigurationError::InvertedBand { slab: s.label() });
            }
            if s.incentive_per_unit <= Money::ZERO {
                return Err(ConfigurationError::NonPositiveIncentive { slab: s.label() });
            }
            if s.incentive_per_unit > Money::new(MAX_UNIT_AMOUNT) {
                return Err(ConfigurationError::IncentiveTooLarge {
                    slab: s.label(),
                    max: Money::new(MAX_UNIT_AMOUNT),
                });
            }
            if s.volume_kicker_units < s.gate_units {
                return Err(ConfigurationError::KickerBelowGate { slab: s.label() });
            }
        }

        for pair in slabs.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(prev_max) = prev.max_price else {
                return Err(ConfigurationError::OpenBandNotLast { slab: prev.label() });
            };
            let Some(expected) = prev_max.get().checked_add(1).map(Money::new) else {
                return Err(ConfigurationError::Overlap { prev: prev.label(), next: next.label() });
            };
            if next.min_price > expected {
                return Err(ConfigurationError::Gap { prev: prev.label(), next: next.label() });
            }
            if next.min_price < expected {
                return Err(ConfigurationError::Overlap { prev: prev.label(), next: next.label() });
            }
        }

        Ok(SlabTable { slabs })
    }

    /// The unique band with `min_price <= price <= max_price` (or open top).
    pub fn resolve(&self, price: Money) -> Result<&SlabDefinition, ConfigurationError> {
        if price.is_negative() {
            return Err(ConfigurationError::NegativePrice(price));
        }
        let idx = self.slabs.partition_point(|s| s.min_price <= price);
        match idx.checked_sub(1).map(|i| &self.slabs[i]) {
            Some(s) if s.contains(price) => Ok(s),
            _ => Err(ConfigurationError::Unresolvable(price)),
        }
    }

    pub fn get(&self, key: SlabKey) -> Option<&SlabDefinition> {
        self.slabs
            .binary_search_by_key(&key, SlabDefinition::key)
            .ok()
            .map(|i| &self.slabs[i])
    }

    /// Bands in ascending price order.
    pub fn iter(&self) -> impl Iterator<Item = &SlabDefinition> {
        self.slabs.iter()
    }

    pub fn len(&self) -> usize {
        self.slabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slabs.is_empty()
    }
}
