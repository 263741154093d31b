//! Reports built from real engine results over a small December dataset.

use chrono::NaiveDate;
use inc_core::entities::{AttachRateRecord, RawSale, SlabDefinition};
use inc_core::money::Money;
use inc_core::org::{OrgDirectory, OrgRole};
use inc_core::period::Period;
use inc_core::variables::CalcMode;
use inc_io::dataset::Dataset;
use inc_pipeline::{Engine, LeaderboardScope};
use inc_report::{
    build_leaderboard_report, build_org_report, build_seller_report, build_store_report, render_json,
    render_json_bytes, render_text, ReportKind,
};

fn dec() -> Period {
    Period::month(2025, 12).unwrap()
}

fn slabs() -> Vec<SlabDefinition> {
    vec![
        SlabDefinition {
            min_price: Money::new(0),
            max_price: Some(Money::new(40000)),
            incentive_per_unit: Money::new(250),
            gate_units: 3,
            volume_kicker_units: 8,
        },
        SlabDefinition {
            min_price: Money::new(40001),
            max_price: None,
            incentive_per_unit: Money::new(400),
            gate_units: 2,
            volume_kicker_units: 5,
        },
    ]
}

fn org() -> OrgDirectory {
    serde_json::from_str(
        r#"{
          "units": [{"id":"ASE1","role":"ASE"}],
          "stores": [
            {"store_id":"S1","sellers":["A1"],"ase":"ASE1"},
            {"store_id":"S2","sellers":["B1"],"ase":"ASE1"}
          ]
        }"#,
    )
    .unwrap()
}

fn units(seller: &str, store: &str, price: i64, n: u32) -> Vec<RawSale> {
    (0..n)
        .map(|i| RawSale {
            seller_id: seller.into(),
            store_id: store.into(),
            device_price: price,
            device_category: String::new(),
            plan_type: "ADLD".into(),
            sale_date: NaiveDate::from_ymd_opt(2025, 12, i % 28 + 1).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            unit_identifier: format!("{seller}-{i}"),
        })
        .collect()
}

fn engine() -> Engine<Dataset> {
    // A1: 12 units at ₹35,000 → 5 standard (1250) + 4 boosted (1200).
    // B1: 4 units at ₹45,000 → 2 standard (800).
    let mut sales = units("A1", "S1", 35000, 12);
    sales.extend(units("B1", "S2", 45000, 4));
    let rates: Vec<AttachRateRecord> = serde_json::from_str(
        r#"[{"store_id":"S1","period_start":"2025-12-01","period_end":"2025-12-31","attach_percentage":29.5}]"#,
    )
    .unwrap();
    Engine::new(Dataset::new(slabs(), org()).with_sales(sales).with_attach_rates(rates))
}

#[test]
fn seller_report_lists_slabs_and_total() {
    let calc = engine().calculate_seller(&"A1".parse().unwrap(), dec()).unwrap();
    let m = build_seller_report(&calc).unwrap();

    assert_eq!(m.cover.kind, ReportKind::Seller);
    assert!(m.cover.result_id.starts_with("RES:"));
    assert_eq!(m.slabs.len(), 1);
    assert_eq!(m.slabs[0].slab, "0-40000");
    assert_eq!(m.slabs[0].amount, "₹2,450");
    let total = m.summary.iter().find(|r| r.label == "Total").unwrap();
    assert_eq!(total.value, "₹2,450");
}

#[test]
fn store_without_attach_record_renders_na() {
    let calc = engine().calculate_store(&"S2".parse().unwrap(), dec(), CalcMode::PerSeller).unwrap();
    let m = build_store_report(&calc).unwrap();

    let attach = m.summary.iter().find(|r| r.label == "Attach rate").unwrap();
    assert_eq!(attach.value, "N/A");
    let text = render_text(&m).unwrap();
    assert!(text.contains("Store incentive: S2"));
    assert!(text.contains("N/A"));
    assert!(text.contains("₹800"));
}

#[test]
fn org_report_shows_store_attach_rates() {
    let calc = engine().calculate_org_rollup(&"ASE1".parse().unwrap(), dec()).unwrap();
    let m = build_org_report(&calc).unwrap();

    assert_eq!(m.cover.detail.as_deref(), Some(OrgRole::Ase.as_str()));
    let stores: Vec<(&str, Option<&str>)> =
        m.stores.iter().map(|s| (s.id.as_str(), s.attach_rate.as_deref())).collect();
    assert_eq!(stores, vec![("S1", Some("29.5%")), ("S2", Some("N/A"))]);
    let total = m.summary.iter().find(|r| r.label == "Total").unwrap();
    assert_eq!(total.value, "₹3,250");
}

#[test]
fn leaderboard_report_keeps_rank_order() {
    let calc = engine().leaderboard(LeaderboardScope::Sellers, dec()).unwrap();
    let m = build_leaderboard_report(&calc, &LeaderboardScope::Sellers.to_string()).unwrap();

    let rows: Vec<(u32, &str, &str)> = m.ranking.iter().map(|r| (r.rank, r.id.as_str(), r.total.as_str())).collect();
    assert_eq!(rows, vec![(1, "A1", "₹2,450"), (2, "B1", "₹800")]);
    assert!(render_text(&m).unwrap().contains("Ranking"));
}

#[test]
fn json_rendering_is_stable() {
    let e = engine();
    let a = build_store_report(&e.calculate_store(&"S1".parse().unwrap(), dec(), CalcMode::PerSeller).unwrap()).unwrap();
    let b = build_store_report(&e.calculate_store(&"S1".parse().unwrap(), dec(), CalcMode::PerSeller).unwrap()).unwrap();

    assert_eq!(render_json_bytes(&a).unwrap(), render_json_bytes(&b).unwrap());
    let v = render_json(&a).unwrap();
    assert_eq!(v["cover"]["kind"], "store");
    assert_eq!(v["cover"]["result_id"], a.cover.result_id.as_str());
}
