//! crates/inc_core/src/entities.rs
//! Domain entities consumed by the engine: price slabs, raw and normalized sale
//! records, device categories, and attach-rate records. Pure data, no I/O.

use core::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::{Error as DeError, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::CoreError;
use crate::ids::{SellerId, StoreId, UnitIdentifier};
use crate::money::{percent_tenths_string, Money};

// ----- Slabs -------------------------------------------------------------------------------------

/// Stable key of a slab inside one table: its inclusive lower price bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlabKey(pub Money);

impl fmt::Display for SlabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One price band. Bounds are inclusive; `max_price = None` marks the open top band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlabDefinition {
    pub min_price: Money,
    #[serde(default)]
    pub max_price: Option<Money>,
    pub incentive_per_unit: Money,
    pub gate_units: u32,
    pub volume_kicker_units: u32,
}

impl SlabDefinition {
    #[inline]
    pub fn key(&self) -> SlabKey {
        SlabKey(self.min_price)
    }

    #[inline]
    pub fn contains(&self, price: Money) -> bool {
        self.min_price <= price && self.max_price.map_or(true, |max| price <= max)
    }

    /// Human label, e.g. `30001-40000` or `70001+`.
    pub fn label(&self) -> String {
        match self.max_price {
            Some(max) => format!("{}-{}", self.min_price, max),
            None => format!("{}+", self.min_price),
        }
    }
}

// ----- Device categories -------------------------------------------------------------------------

/// Device category, normalized to trimmed lowercase so `"Foldable "` and
/// `"foldable"` select the same bonus.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DeviceCategory(String);

impl DeviceCategory {
    pub fn new(raw: &str) -> Self {
        DeviceCategory(raw.trim().to_ascii_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for DeviceCategory {
    fn from(s: String) -> Self {
        DeviceCategory::new(&s)
    }
}

impl From<DeviceCategory> for String {
    fn from(c: DeviceCategory) -> String {
        c.0
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ----- Sales -------------------------------------------------------------------------------------

/// Sale tuple as yielded by the sales source. Nothing is trusted yet; the
/// normalizer turns this into a `SaleRecord` or a validation issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSale {
    pub seller_id: String,
    pub store_id: String,
    pub device_price: i64,
    #[serde(default)]
    pub device_category: String,
    #[serde(default)]
    pub plan_type: String,
    pub sale_date: NaiveDateTime,
    pub unit_identifier: String,
}

/// One sold protection plan, validated and immutable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub seller_id: SellerId,
    pub store_id: StoreId,
    pub device_price: Money,
    pub device_category: DeviceCategory,
    pub plan_type: String,
    pub sale_date: NaiveDateTime,
    pub unit_identifier: UnitIdentifier,
}

// ----- Attach rate -------------------------------------------------------------------------------

/// Attach percentage in tenths of a percent (0..=1000). On the wire it is a
/// plain decimal number such as `29` or `29.5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachPct(u16);

impl AttachPct {
    pub fn from_tenths(tenths: u16) -> Result<Self, CoreError> {
        if tenths <= 1000 {
            Ok(AttachPct(tenths))
        } else {
            Err(CoreError::InvalidPercentage(percent_tenths_string(tenths)))
        }
    }

    #[inline]
    pub fn tenths(self) -> u16 {
        self.0
    }
}

impl fmt::Display for AttachPct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&percent_tenths_string(self.0))
    }
}

impl Serialize for AttachPct {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if self.0 % 10 == 0 {
            s.serialize_u64(u64::from(self.0 / 10))
        } else {
            s.serialize_f64(f64::from(self.0) / 10.0)
        }
    }
}

impl<'de> Deserialize<'de> for AttachPct {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(d)?;
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(D::Error::invalid_value(Unexpected::Float(v), &"0..=100"));
        }
        let tenths = (v * 10.0).round();
        Ok(AttachPct(tenths as u16))
    }
}

/// Periodic attach-rate record for a store. Windows may overlap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachRateRecord {
    pub store_id: StoreId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub attach_percentage: AttachPct,
}

impl AttachRateRecord {
    #[inline]
    pub fn covers(&self, d: NaiveDate) -> bool {
        self.period_start <= d && d <= self.period_end
    }

    /// Window width in days (inclusive). Inverted windows report 0 and never cover a date.
    pub fn window_days(&self) -> i64 {
        ((self.period_end - self.period_start).num_days() + 1).max(0)
    }
}
