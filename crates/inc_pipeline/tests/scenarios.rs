//! Slab scenarios end to end: per-store aggregate mode, per-seller mode,
//! tier boundaries, kicker rate, category bonuses and attach rates.

mod common;

use common::*;
use inc_algo::Subject;
use inc_core::entities::DeviceCategory;
use inc_core::ids::{SellerId, StoreId};
use inc_core::money::Money;
use inc_core::period::Period;
use inc_core::variables::{CalcMode, EngineConfig};
use inc_io::dataset::Dataset;
use inc_pipeline::Engine;

fn sid(s: &str) -> StoreId {
    s.parse().unwrap()
}

fn seller(s: &str) -> SellerId {
    s.parse().unwrap()
}

// -----------------------------------------------------------------------------
// Per-store aggregate mode (number_of_sellers = 2 → gate 6, kicker 16)
// -----------------------------------------------------------------------------

#[test]
fn aggregate_mode_ten_units_earns_1000() {
    let mut sales = units("A1", "S1", 35000, 6);
    sales.extend(units("A2", "S1", 35000, 4));
    let engine = Engine::new(Dataset::new(slabs(), org()).with_sales(sales));

    let out = engine.calculate_store(&sid("S1"), dec(), CalcMode::PerStoreAggregate).unwrap();
    let store = &out.result;
    assert_eq!(store.number_of_sellers, 2);
    assert_eq!(store.results.len(), 1);

    let pooled = &store.results[0];
    assert_eq!(pooled.subject, Subject::Store(sid("S1")));
    assert_eq!(pooled.scale, 2);
    let line = &pooled.slabs[0];
    assert_eq!((line.effective_gate, line.effective_kicker), (6, 16));
    assert_eq!(line.tiers.gated_units, 6);
    assert_eq!(line.tiers.standard_units, 4);
    assert_eq!(line.tiers.standard_amount, Money::new(1000));
    assert_eq!(store.totals.total, Money::new(1000));
}

#[test]
fn aggregate_mode_twenty_units_earns_3700() {
    let engine = Engine::new(Dataset::new(slabs(), org()).with_sales(units("A1", "S1", 35000, 20)));

    let out = engine.calculate_store(&sid("S1"), dec(), CalcMode::PerStoreAggregate).unwrap();
    let tiers = out.result.results[0].slabs[0].tiers;
    assert_eq!((tiers.gated_units, tiers.standard_units, tiers.boosted_units), (6, 10, 4));
    assert_eq!(tiers.standard_amount, Money::new(2500));
    assert_eq!(tiers.boosted_amount, Money::new(1200));
    assert_eq!(out.result.totals.total, Money::new(3700));
}

#[test]
fn config_override_changes_the_scale() {
    let mut config = EngineConfig::default();
    config.store_seller_counts.insert(sid("S1"), 1);
    let engine = Engine::new(
        Dataset::new(slabs(), org())
            .with_sales(units("A1", "S1", 35000, 10))
            .with_config(config),
    );
    let out = engine.calculate_store(&sid("S1"), dec(), CalcMode::PerStoreAggregate).unwrap();
    assert_eq!(out.result.number_of_sellers, 1);
    // gate 3, kicker 8: 5 standard + 2 boosted (2 × 250 × 1.2 = 600).
    assert_eq!(out.result.totals.total, Money::new(1250 + 600));
}

// -----------------------------------------------------------------------------
// Per-seller mode
// -----------------------------------------------------------------------------

#[test]
fn per_seller_store_sums_seller_results() {
    let engine = Engine::new(dataset());
    let out = engine.calculate_store(&sid("S1"), dec(), CalcMode::PerSeller).unwrap();
    let store = &out.result;

    let ids: Vec<&str> = store.results.iter().map(|r| r.subject.id_str()).collect();
    assert_eq!(ids, vec!["A1", "A2"]);
    assert_eq!(store.results[0].totals.total, Money::new(1250 + 1200));
    assert_eq!(store.results[1].totals.total, Money::new(1250));

    let summed: Money = store.results.iter().map(|r| r.totals.total).sum();
    assert_eq!(store.totals.total, summed);
    assert_eq!(store.totals.units, 20);
    assert_eq!(store.totals.contributors, 2);
    assert!(store.active);
}

#[test]
fn gate_and_kicker_boundaries_belong_to_lower_tier() {
    let mut sales = units("A1", "S1", 35000, 3);
    sales.extend(units("A2", "S1", 35000, 8));
    let engine = Engine::new(Dataset::new(slabs(), org()).with_sales(sales));

    let at_gate = engine.calculate_seller(&seller("A1"), dec()).unwrap().result;
    assert_eq!(at_gate.totals.gated_units, 3);
    assert_eq!(at_gate.totals.total, Money::ZERO);

    let at_kicker = engine.calculate_seller(&seller("A2"), dec()).unwrap().result;
    assert_eq!(at_kicker.totals.standard_units, 5);
    assert_eq!(at_kicker.totals.boosted_units, 0);
    assert_eq!(at_kicker.totals.total, Money::new(1250));
}

#[test]
fn slabs_are_never_pooled() {
    // 3 units in each of two bands: both buckets stay inside their gate.
    let mut sales = units("A1", "S1", 20000, 3);
    sales.extend(units("A1", "S1", 35000, 3));
    let engine = Engine::new(Dataset::new(slabs(), org()).with_sales(sales));
    let r = engine.calculate_seller(&seller("A1"), dec()).unwrap().result;
    assert_eq!(r.slabs.len(), 2);
    assert_eq!(r.totals.units, 6);
    assert_eq!(r.totals.total, Money::ZERO);
}

#[test]
fn kicker_rate_is_configurable() {
    let config = EngineConfig { kicker_rate_pct: 150, ..EngineConfig::default() };
    let engine = Engine::new(dataset().with_config(config));
    let r = engine.calculate_seller(&seller("A1"), dec()).unwrap().result;
    assert_eq!(r.kicker_rate_pct, 150);
    assert_eq!(r.totals.total, Money::new(1250 + 1500));
}

#[test]
fn category_bonus_applies_inside_the_gate() {
    let mut sales = units("B1", "S2", 35000, 2);
    for s in &mut sales {
        s.device_category = "Foldable".into();
    }
    sales.push(sale("B1", "S2", 35000, 9, "B1-bar"));
    let mut config = EngineConfig::default();
    config.bonus_categories.insert(DeviceCategory::new("foldable"), Money::new(500));
    let engine = Engine::new(Dataset::new(slabs(), org()).with_sales(sales).with_config(config));

    let r = engine.calculate_seller(&seller("B1"), dec()).unwrap().result;
    assert_eq!(r.totals.slab_amount, Money::ZERO);
    assert_eq!(r.bonuses.len(), 1);
    assert_eq!(r.bonuses[0].units, 2);
    assert_eq!(r.totals.bonus_amount, Money::new(1000));
    assert_eq!(r.totals.total, Money::new(1000));
}

// -----------------------------------------------------------------------------
// Attach rates
// -----------------------------------------------------------------------------

#[test]
fn narrowest_window_wins_on_december_5() {
    let engine = Engine::new(dataset());
    let rec = engine.attach_rate(&sid("S1"), day(5)).unwrap().unwrap();
    assert_eq!(rec.attach_percentage.tenths(), 290);
    assert_eq!(rec.period_end, day(7));

    let rec = engine.attach_rate(&sid("S1"), day(20)).unwrap().unwrap();
    assert_eq!(rec.attach_percentage.tenths(), 300);
}

#[test]
fn store_result_uses_rate_in_force_at_period_end() {
    let engine = Engine::new(dataset());

    let month = engine.calculate_store(&sid("S1"), dec(), CalcMode::PerSeller).unwrap();
    let rate = month.result.attach_rate.as_ref().map(|r| r.attach_percentage.tenths());
    assert_eq!(rate, Some(300));

    let first_week = Period::new(day(1), day(7)).unwrap();
    let week = engine.calculate_store(&sid("S1"), first_week, CalcMode::PerSeller).unwrap();
    let rate = week.result.attach_rate.as_ref().map(|r| r.attach_percentage.tenths());
    assert_eq!(rate, Some(290));
}

#[test]
fn missing_attach_rate_is_none() {
    let engine = Engine::new(dataset());
    let out = engine.calculate_store(&sid("S3"), dec(), CalcMode::PerSeller).unwrap();
    assert!(out.result.attach_rate.is_none());
    assert_eq!(out.result.totals.total, Money::new(800));
}
