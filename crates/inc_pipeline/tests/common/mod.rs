//! Shared fixtures for the pipeline integration tests.
//!
//! Org layout:
//!   ZSE1 ─ ASE1 ─ S1 (A1, A2; declared 2 sellers), S2 (B1)
//!        └ ASE2 ─ S3 (C1), S4 (no sellers)
//!   ZSM1 ─ ABM1 ─ S1, S2
//!
//! December sales: A1 12 units and A2 8 units at S1 (₹35,000), C1 4 units at S3 (₹45,000).

#![allow(dead_code)]

use chrono::NaiveDate;
use inc_core::entities::{AttachRateRecord, RawSale, SlabDefinition};
use inc_core::money::Money;
use inc_core::org::OrgDirectory;
use inc_core::period::Period;
use inc_io::dataset::Dataset;

pub fn dec() -> Period {
    Period::month(2025, 12).unwrap()
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
}

fn band(min: i64, max: Option<i64>, per_unit: i64, gate: u32, kicker: u32) -> SlabDefinition {
    SlabDefinition {
        min_price: Money::new(min),
        max_price: max.map(Money::new),
        incentive_per_unit: Money::new(per_unit),
        gate_units: gate,
        volume_kicker_units: kicker,
    }
}

pub fn slabs() -> Vec<SlabDefinition> {
    vec![
        band(0, Some(30000), 100, 3, 8),
        band(30001, Some(40000), 250, 3, 8),
        band(40001, None, 400, 2, 5),
    ]
}

pub fn org() -> OrgDirectory {
    serde_json::from_str(
        r#"{
          "units": [
            {"id":"ZSE1","role":"ZSE"},
            {"id":"ASE1","role":"ASE","parent":"ZSE1"},
            {"id":"ASE2","role":"ASE","parent":"ZSE1"},
            {"id":"ZSM1","role":"ZSM"},
            {"id":"ABM1","role":"ABM","parent":"ZSM1"}
          ],
          "stores": [
            {"store_id":"S1","sellers":["A1","A2"],"number_of_sellers":2,"ase":"ASE1","abm":"ABM1"},
            {"store_id":"S2","sellers":["B1"],"ase":"ASE1","abm":"ABM1"},
            {"store_id":"S3","sellers":["C1"],"ase":"ASE2"},
            {"store_id":"S4","sellers":[],"ase":"ASE2"}
          ]
        }"#,
    )
    .unwrap()
}

pub fn sale(seller: &str, store: &str, price: i64, d: u32, unit: &str) -> RawSale {
    RawSale {
        seller_id: seller.into(),
        store_id: store.into(),
        device_price: price,
        device_category: String::new(),
        plan_type: "ADLD".into(),
        sale_date: day(d).and_hms_opt(11, 0, 0).unwrap(),
        unit_identifier: unit.into(),
    }
}

/// `n` distinct units, spread over the month.
pub fn units(seller: &str, store: &str, price: i64, n: u32) -> Vec<RawSale> {
    (0..n)
        .map(|i| sale(seller, store, price, i % 28 + 1, &format!("{seller}-{price}-{i}")))
        .collect()
}

pub fn december_sales() -> Vec<RawSale> {
    let mut out = units("A1", "S1", 35000, 12);
    out.extend(units("A2", "S1", 35000, 8));
    out.extend(units("C1", "S3", 45000, 4));
    out
}

pub fn attach_rates() -> Vec<AttachRateRecord> {
    serde_json::from_str(
        r#"[
          {"store_id":"S1","period_start":"2025-12-01","period_end":"2025-12-31","attach_percentage":30},
          {"store_id":"S1","period_start":"2025-12-01","period_end":"2025-12-07","attach_percentage":29},
          {"store_id":"S3","period_start":"2025-11-01","period_end":"2025-11-30","attach_percentage":41.5}
        ]"#,
    )
    .unwrap()
}

pub fn dataset() -> Dataset {
    Dataset::new(slabs(), org())
        .with_sales(december_sales())
        .with_attach_rates(attach_rates())
}
