//! End-to-end runs of the `incentive` binary over a manifest written to a temp dir.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn sales(seller: &str, store: &str, price: i64, n: u32) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "seller_id": seller,
                "store_id": store,
                "device_price": price,
                "plan_type": "ADLD",
                "sale_date": format!("2025-12-{:02}T11:00:00", i % 28 + 1),
                "unit_identifier": format!("{seller}-{i}"),
            })
        })
        .collect()
}

fn slabs() -> Value {
    json!([
        {"min_price": 0, "max_price": 30000, "incentive_per_unit": 100, "gate_units": 3, "volume_kicker_units": 8},
        {"min_price": 30001, "max_price": 40000, "incentive_per_unit": 250, "gate_units": 3, "volume_kicker_units": 8},
        {"min_price": 40001, "incentive_per_unit": 400, "gate_units": 2, "volume_kicker_units": 5}
    ])
}

/// S1: A1 and A2 (declared 2 sellers), 20 units by A1 at ₹35,000. S2: B1, no sales, no attach rate.
fn fixture(slabs: Value, extra_sales: Vec<Value>) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let mut all = sales("A1", "S1", 35000, 20);
    all.extend(extra_sales);

    write(dir.path(), "slabs.json", &slabs);
    write(dir.path(), "sales.json", &Value::Array(all));
    write(
        dir.path(),
        "org.json",
        &json!({
            "units": [{"id": "ASE1", "role": "ASE"}],
            "stores": [
                {"store_id": "S1", "sellers": ["A1", "A2"], "number_of_sellers": 2, "ase": "ASE1"},
                {"store_id": "S2", "sellers": ["B1"], "ase": "ASE1"}
            ]
        }),
    );
    write(
        dir.path(),
        "attach_rates.json",
        &json!([{"store_id": "S1", "period_start": "2025-12-01", "period_end": "2025-12-31", "attach_percentage": 30}]),
    );
    write(
        dir.path(),
        "manifest.json",
        &json!({
            "slabs_path": "slabs.json",
            "sales_path": "sales.json",
            "org_path": "org.json",
            "attach_rates_path": "attach_rates.json"
        }),
    );
    let manifest = dir.path().join("manifest.json");
    (dir, manifest)
}

fn write(dir: &Path, name: &str, v: &Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(v).unwrap()).unwrap();
}

fn incentive() -> Command {
    Command::cargo_bin("incentive").unwrap()
}

#[test]
fn aggregate_store_prints_report() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["store", "--id", "S1", "--period", "2025-12", "--mode", "aggregate", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Store incentive: S1"))
        .stdout(predicate::str::contains("₹3,700"))
        .stdout(predicate::str::contains("30.0%"));
}

#[test]
fn store_without_attach_rate_shows_na() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["store", "--id", "S2", "--period", "2025-12", "--mode", "per-seller", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("N/A"));
}

#[test]
fn seller_artifacts_are_written() {
    let (dir, manifest) = fixture(slabs(), vec![]);
    let out = dir.path().join("out");
    incentive()
        .args(["seller", "--id", "A1", "--period", "2025-12", "--quiet", "--render", "json", "text"])
        .arg("--manifest")
        .arg(&manifest)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // 5 standard units (1250) + 12 boosted units (12 × 300).
    let result: Value = serde_json::from_slice(&fs::read(out.join("result.json")).unwrap()).unwrap();
    assert_eq!(result["result"]["totals"]["total"], 4850);
    assert_eq!(result["slab_generation"], 1);

    let report: Value = serde_json::from_slice(&fs::read(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["cover"]["kind"], "seller");
    assert!(report["cover"]["result_id"].as_str().unwrap().starts_with("RES:"));
    assert!(fs::read_to_string(out.join("report.txt")).unwrap().contains("₹4,850"));
}

#[test]
fn leaderboard_ranks_sellers() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["leaderboard", "--scope", "sellers", "--period", "2025-12", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Leaderboard: sellers"))
        .stdout(predicate::str::is_match(r"1\s+A1").unwrap());
}

#[test]
fn unknown_store_exits_5() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["store", "--id", "S9", "--period", "2025-12", "--mode", "per-seller", "--manifest"])
        .arg(&manifest)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("store not found: S9"));
}

#[test]
fn gapped_slab_table_exits_3() {
    let mut bad = slabs();
    bad[1]["min_price"] = json!(30005);
    let (_dir, manifest) = fixture(bad, vec![]);
    incentive()
        .args(["validate", "--manifest"])
        .arg(&manifest)
        .assert()
        .code(3);
    incentive()
        .args(["seller", "--id", "A1", "--period", "2025-12", "--manifest"])
        .arg(&manifest)
        .assert()
        .code(3);
}

#[test]
fn store_without_mode_is_a_usage_error() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["store", "--id", "S1", "--period", "2025-12", "--manifest"])
        .arg(&manifest)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--mode"));
}

#[test]
fn missing_manifest_exits_4() {
    let dir = tempfile::tempdir().unwrap();
    incentive()
        .args(["validate", "--manifest"])
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(4);
}

#[test]
fn bad_period_is_a_usage_error() {
    let (_dir, manifest) = fixture(slabs(), vec![]);
    incentive()
        .args(["seller", "--id", "A1", "--period", "december", "--manifest"])
        .arg(&manifest)
        .assert()
        .code(2);
}

#[test]
fn validate_lists_skipped_sales() {
    let mut dup = sales("A1", "S1", 35000, 1);
    dup[0]["sale_date"] = json!("2025-12-20T09:00:00");
    let (_dir, manifest) = fixture(slabs(), dup);
    incentive()
        .args(["validate", "--period", "2025-12", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("inputs OK: 3 slabs, 21 sales, 2 stores"))
        .stdout(predicate::str::contains("20 sales accepted"))
        .stdout(predicate::str::contains("Sale.DuplicateUnit"));
}
