//! crates/inc_pipeline/src/normalize.rs
//! Sale normalization before any computation: typed ids, price and period
//! checks, then dedup on `unit_identifier` (first in caller order wins).
//! Rejected records are reported, never fatal. Output ordering is stable.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use inc_core::entities::{DeviceCategory, RawSale, SaleRecord};
use inc_core::ids::{SellerId, StoreId, UnitIdentifier};
use inc_core::money::Money;
use inc_core::period::Period;
use serde::Serialize;

/// Issue severity. `Error` excludes the record; `Warning` is informational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred: position in the fetched batch plus the raw identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRef {
    Sale { index: usize, unit_identifier: String },
}

/// One normalization finding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// A later copy of an already accepted `unit_identifier`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateSaleWarning {
    pub unit_identifier: UnitIdentifier,
    pub kept_index: usize,
    pub dropped_index: usize,
}

impl DuplicateSaleWarning {
    fn to_issue(&self) -> ValidationIssue {
        ValidationIssue {
            severity: Severity::Warning,
            code: "Sale.DuplicateUnit",
            message: format!(
                "unit {} already counted from sale #{}",
                self.unit_identifier, self.kept_index
            ),
            where_: EntityRef::Sale {
                index: self.dropped_index,
                unit_identifier: self.unit_identifier.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedSales {
    /// Accepted records, caller order preserved.
    pub records: Vec<SaleRecord>,
    pub issues: Vec<ValidationIssue>,
    pub duplicates: Vec<DuplicateSaleWarning>,
}

impl NormalizedSales {
    /// Rejections and duplicates as one stably sorted list.
    pub fn warnings(&self) -> Vec<ValidationIssue> {
        let mut all: Vec<ValidationIssue> = self.issues.clone();
        all.extend(self.duplicates.iter().map(DuplicateSaleWarning::to_issue));
        sort_issues_stably(&mut all);
        all
    }
}

/// Validate and dedup `raw` against `period`.
pub fn normalize(raw: &[RawSale], period: Period) -> NormalizedSales {
    let mut out = NormalizedSales::default();
    let mut seen: BTreeMap<UnitIdentifier, usize> = BTreeMap::new();

    for (index, sale) in raw.iter().enumerate() {
        let (record, mut issues) = check_sale(index, sale, period);
        out.issues.append(&mut issues);
        let Some(record) = record else { continue };

        match seen.entry(record.unit_identifier.clone()) {
            Entry::Vacant(v) => {
                v.insert(index);
                out.records.push(record);
            }
            Entry::Occupied(o) => out.duplicates.push(DuplicateSaleWarning {
                unit_identifier: record.unit_identifier,
                kept_index: *o.get(),
                dropped_index: index,
            }),
        }
    }

    sort_issues_stably(&mut out.issues);
    out
}

// ----- Per-record checks -------------------------------------------------------------------------

fn check_sale(index: usize, sale: &RawSale, period: Period) -> (Option<SaleRecord>, Vec<ValidationIssue>) {
    let mut issues = Vec::new();
    let issue = |code: &'static str, message: String| ValidationIssue {
        severity: Severity::Error,
        code,
        message,
        where_: EntityRef::Sale { index, unit_identifier: sale.unit_identifier.clone() },
    };

    let seller = SellerId::try_from(sale.seller_id.as_str())
        .map_err(|_| issues.push(issue("Sale.InvalidSeller", format!("seller id {:?}", sale.seller_id))))
        .ok();
    let store = StoreId::try_from(sale.store_id.as_str())
        .map_err(|_| issues.push(issue("Sale.InvalidStore", format!("store id {:?}", sale.store_id))))
        .ok();

    if sale.device_price <= 0 {
        issues.push(issue(
            "Sale.NonPositivePrice",
            format!("device price {} must be > 0", sale.device_price),
        ));
    }

    let unit = if sale.unit_identifier.trim().is_empty() {
        issues.push(issue("Sale.MissingUnitIdentifier", "unit identifier is empty".into()));
        None
    } else {
        UnitIdentifier::try_from(sale.unit_identifier.as_str())
            .map_err(|_| {
                issues.push(issue(
                    "Sale.InvalidUnitIdentifier",
                    format!("unit identifier {:?}", sale.unit_identifier),
                ))
            })
            .ok()
    };

    if !period.contains(sale.sale_date) {
        issues.push(issue(
            "Sale.OutOfPeriod",
            format!("sale date {} outside {period}", sale.sale_date),
        ));
    }

    match (seller, store, unit) {
        (Some(seller_id), Some(store_id), Some(unit_identifier)) if issues.is_empty() => (
            Some(SaleRecord {
                seller_id,
                store_id,
                device_price: Money::new(sale.device_price),
                device_category: DeviceCategory::new(&sale.device_category),
                plan_type: sale.plan_type.trim().to_owned(),
                sale_date: sale.sale_date,
                unit_identifier,
            }),
            issues,
        ),
        _ => (None, issues),
    }
}

/// Deterministic order (code, then where, then message) for byte-identical runs.
pub fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}
