//! Engine configuration variables with safe defaults and domain validation.
//!
//! `EngineConfig` is loaded from JSON by `inc_io`; the pipeline calls
//! `validate_config` before any calculation uses it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::DeviceCategory;
use crate::errors::CoreError;
use crate::ids::StoreId;
use crate::money::{Money, MAX_UNIT_AMOUNT};

/// Default boosted rate above the volume kicker, in percent of `incentive_per_unit`.
pub const DEFAULT_KICKER_RATE_PCT: u32 = 120;
pub const KICKER_RATE_PCT_MIN: u32 = 100;
pub const KICKER_RATE_PCT_MAX: u32 = 300;

/// Define a serde'd enum with explicit wire tokens.
macro_rules! serde_enum {
    ($(#[$m:meta])* $name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        $(#[$m])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_token(self) -> &'static str {
                match self { $($name::$variant => $token,)+ }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_token())
            }
        }
    };
}

serde_enum!(
    /// How gate and kicker thresholds are scaled. `PerSeller` uses a scale of 1;
    /// `PerStoreAggregate` pools the store's units per slab and scales by the
    /// store's seller count.
    CalcMode => {
        PerSeller = "per_seller",
        PerStoreAggregate = "per_store_aggregate",
    }
);

impl Default for CalcMode {
    fn default() -> Self {
        CalcMode::PerSeller
    }
}

fn default_kicker_rate_pct() -> u32 {
    DEFAULT_KICKER_RATE_PCT
}

/// Configuration set consumed by every calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_kicker_rate_pct")]
    pub kicker_rate_pct: u32,
    /// Flat per-unit bonus by (normalized) device category.
    #[serde(default)]
    pub bonus_categories: BTreeMap<DeviceCategory, Money>,
    /// Per-store seller-count overrides for aggregate mode.
    #[serde(default)]
    pub store_seller_counts: BTreeMap<StoreId, u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            kicker_rate_pct: DEFAULT_KICKER_RATE_PCT,
            bonus_categories: BTreeMap::new(),
            store_seller_counts: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Flat bonus for one unit of `category`; zero when not configured.
    pub fn bonus_for(&self, category: &DeviceCategory) -> Money {
        self.bonus_categories.get(category).copied().unwrap_or(Money::ZERO)
    }
}

/// Check numeric domains. Called once per run before the config is used.
pub fn validate_config(cfg: &EngineConfig) -> Result<(), CoreError> {
    if !(KICKER_RATE_PCT_MIN..=KICKER_RATE_PCT_MAX).contains(&cfg.kicker_rate_pct) {
        return Err(CoreError::DomainOutOfRange("kicker_rate_pct (100..=300)"));
    }
    if cfg.bonus_categories.values().any(|m| m.is_negative()) {
        return Err(CoreError::NegativeAmount("bonus_categories"));
    }
    if cfg.bonus_categories.values().any(|m| m.get() > MAX_UNIT_AMOUNT) {
        return Err(CoreError::DomainOutOfRange("bonus_categories (<= 10000000)"));
    }
    if cfg.bonus_categories.keys().any(DeviceCategory::is_empty) {
        return Err(CoreError::InvalidId("empty bonus category".into()));
    }
    if cfg.store_seller_counts.values().any(|&n| n == 0) {
        return Err(CoreError::DomainOutOfRange("store_seller_counts (>= 1)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_object() {
        let cfg: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.kicker_rate_pct, 120);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn bonus_keys_are_normalized() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"bonus_categories":{" Foldable":500}}"#).unwrap();
        assert_eq!(cfg.bonus_for(&DeviceCategory::new("FOLDABLE")), Money::new(500));
        assert_eq!(cfg.bonus_for(&DeviceCategory::new("tablet")), Money::ZERO);
    }

    #[test]
    fn domains() {
        let mut cfg = EngineConfig::default();
        cfg.kicker_rate_pct = 99;
        assert!(validate_config(&cfg).is_err());
        cfg.kicker_rate_pct = 300;
        assert!(validate_config(&cfg).is_ok());

        cfg.bonus_categories.insert(DeviceCategory::new("flagship"), Money::new(-1));
        assert_eq!(
            validate_config(&cfg),
            Err(CoreError::NegativeAmount("bonus_categories"))
        );
        cfg.bonus_categories.insert(DeviceCategory::new("flagship"), Money::new(MAX_UNIT_AMOUNT + 1));
        assert!(validate_config(&cfg).is_err());
        cfg.bonus_categories.insert(DeviceCategory::new("flagship"), Money::new(MAX_UNIT_AMOUNT));
        assert!(validate_config(&cfg).is_ok());
        cfg.bonus_categories.clear();

        cfg.store_seller_counts.insert("ST1".parse().unwrap(), 0);
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn mode_tokens() {
        assert_eq!(
            serde_json::to_string(&CalcMode::PerStoreAggregate).unwrap(),
            "\"per_store_aggregate\""
        );
        assert_eq!(CalcMode::PerSeller.to_string(), "per_seller");
        assert!(serde_json::from_str::<CalcMode>("\"store\"").is_err());
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(serde_json::from_str::<EngineConfig>(r#"{"kicker":120}"#).is_err());
    }
}
