//! crates/inc_report/src/structure.rs
//! Typed report model and the builders that map engine results onto it.
//!
//! Every section is prepared here as display text; renderers only lay it out.

use inc_algo::{IncentiveResult, OrgResult, RankedEntry, RollupTotals, SlabSum, StoreResult};
use inc_core::money::Money;
use inc_io::prelude::res_id_from_canonical;
use inc_pipeline::{Calculated, ValidationIssue};
use serde::Serialize;

use crate::{format_amount, format_attach, ReportError};

// ===== Model =====

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Seller,
    Store,
    Org,
    Leaderboard,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cover {
    pub title: String,
    pub kind: ReportKind,
    pub subject: String,
    pub period: String,
    /// Mode, role, or leaderboard scope, depending on `kind`.
    pub detail: Option<String>,
    pub slab_generation: u64,
    /// `RES:` id of the canonical source result.
    pub result_id: String,
}

/// Label/value line in the summary block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AmountRow {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlabRow {
    pub slab: String,
    pub units: u32,
    pub gated_units: u32,
    pub standard_units: u32,
    pub boosted_units: u32,
    pub amount: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BonusRow {
    pub category: String,
    pub units: u32,
    pub amount: String,
}

/// A store, seller, or child manager contributing to the subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoreRow {
    pub id: String,
    pub active: bool,
    pub units: u32,
    pub total: String,
    /// `"N/A"` when no attach-rate record is in force; `None` for non-store rows.
    pub attach_rate: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RankRow {
    pub rank: u32,
    pub id: String,
    pub units: u32,
    pub total: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WarningRow {
    pub severity: String,
    pub code: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    pub cover: Cover,
    pub summary: Vec<AmountRow>,
    pub slabs: Vec<SlabRow>,
    pub bonuses: Vec<BonusRow>,
    pub contributors: Vec<StoreRow>,
    pub stores: Vec<StoreRow>,
    pub ranking: Vec<RankRow>,
    pub warnings: Vec<WarningRow>,
}

// ===== Builders =====

pub fn build_seller_report(c: &Calculated<IncentiveResult>) -> Result<ReportModel, ReportError> {
    let r = &c.result;
    let mut m = skeleton(c, ReportKind::Seller, r.subject.id_str(), None)?;
    m.cover.title = format!("Seller incentive: {}", r.subject.id_str());
    m.summary = summary(
        r.totals.units,
        r.totals.gated_units,
        r.totals.standard_units,
        r.totals.boosted_units,
        r.totals.slab_amount,
        r.totals.bonus_amount,
        r.totals.total,
    );
    m.summary.push(row("Kicker rate", format!("{}%", r.kicker_rate_pct)));
    m.slabs = r
        .slabs
        .iter()
        .map(|l| SlabRow {
            slab: l.label.clone(),
            units: l.tiers.units,
            gated_units: l.tiers.gated_units,
            standard_units: l.tiers.standard_units,
            boosted_units: l.tiers.boosted_units,
            amount: format_amount(l.tiers.total),
        })
        .collect();
    m.bonuses = r
        .bonuses
        .iter()
        .map(|b| BonusRow { category: b.category.to_string(), units: b.units, amount: format_amount(b.amount) })
        .collect();
    Ok(m)
}

pub fn build_store_report(c: &Calculated<StoreResult>) -> Result<ReportModel, ReportError> {
    let r = &c.result;
    let detail = format!("{} (sellers: {})", r.mode, r.number_of_sellers);
    let mut m = skeleton(c, ReportKind::Store, r.store_id.as_str(), Some(detail))?;
    m.cover.title = format!("Store incentive: {}", r.store_id);

    let summed: Money = r.results.iter().map(|x| x.totals.total).sum();
    if summed != r.totals.total {
        return Err(ReportError::Inconsistent("store total differs from its results"));
    }

    fill_rollup(&mut m, &r.totals);
    m.summary.push(row("Active", if r.active { "yes" } else { "no" }.to_owned()));
    m.summary.push(row(
        "Attach rate",
        format_attach(r.attach_rate.as_ref().map(|a| a.attach_percentage)),
    ));
    m.contributors = r
        .results
        .iter()
        .map(|x| StoreRow {
            id: x.subject.id_str().to_owned(),
            active: x.totals.units > 0,
            units: x.totals.units,
            total: format_amount(x.totals.total),
            attach_rate: None,
        })
        .collect();
    Ok(m)
}

pub fn build_org_report(c: &Calculated<OrgResult>) -> Result<ReportModel, ReportError> {
    let r = &c.result;
    let mut m = skeleton(c, ReportKind::Org, r.org_unit.as_str(), Some(r.role.to_string()))?;
    m.cover.title = format!("{} rollup: {}", r.role, r.org_unit);

    fill_rollup(&mut m, &r.totals);
    m.summary.push(row("Stores assigned", r.stores_assigned.to_string()));
    m.summary.push(row("Stores active", r.stores_active.to_string()));
    m.contributors = r
        .children
        .iter()
        .map(|ch| StoreRow {
            id: ch.org_unit.to_string(),
            active: ch.stores_active > 0,
            units: ch.units,
            total: format_amount(ch.total),
            attach_rate: None,
        })
        .collect();
    m.stores = r
        .stores
        .iter()
        .map(|s| StoreRow {
            id: s.store_id.to_string(),
            active: s.active,
            units: s.units,
            total: format_amount(s.total),
            attach_rate: Some(format_attach(s.attach_percentage)),
        })
        .collect();
    Ok(m)
}

/// `scope` is the leaderboard's display name, e.g. `"sellers"` or `"org:ASE"`.
pub fn build_leaderboard_report(c: &Calculated<Vec<RankedEntry>>, scope: &str) -> Result<ReportModel, ReportError> {
    let mut m = skeleton(c, ReportKind::Leaderboard, scope, Some(scope.to_owned()))?;
    m.cover.title = format!("Leaderboard: {scope}");
    m.summary.push(row("Entries", c.result.len().to_string()));
    m.ranking = c
        .result
        .iter()
        .map(|e| RankRow { rank: e.rank, id: e.id.clone(), units: e.units, total: format_amount(e.total) })
        .collect();
    Ok(m)
}

// ===== Helpers =====

fn skeleton<T: Serialize>(
    c: &Calculated<T>,
    kind: ReportKind,
    subject: &str,
    detail: Option<String>,
) -> Result<ReportModel, ReportError> {
    Ok(ReportModel {
        cover: Cover {
            title: String::new(),
            kind,
            subject: subject.to_owned(),
            period: c.period.to_string(),
            detail,
            slab_generation: c.slab_generation,
            result_id: res_id_from_canonical(c)?,
        },
        summary: Vec::new(),
        slabs: Vec::new(),
        bonuses: Vec::new(),
        contributors: Vec::new(),
        stores: Vec::new(),
        ranking: Vec::new(),
        warnings: c.warnings.iter().map(warning_row).collect(),
    })
}

fn fill_rollup(m: &mut ReportModel, t: &RollupTotals) {
    m.summary = summary(
        t.units,
        t.gated_units,
        t.standard_units,
        t.boosted_units,
        t.slab_amount,
        t.bonus_amount,
        t.total,
    );
    m.summary.insert(0, row("Contributors", t.contributors.to_string()));
    m.slabs = t.by_slab.iter().map(slab_sum_row).collect();
    m.bonuses = t
        .by_category
        .iter()
        .map(|b| BonusRow { category: b.category.to_string(), units: b.units, amount: format_amount(b.amount) })
        .collect();
}

fn slab_sum_row(s: &SlabSum) -> SlabRow {
    SlabRow {
        slab: s.label.clone(),
        units: s.tiers.units,
        gated_units: s.tiers.gated_units,
        standard_units: s.tiers.standard_units,
        boosted_units: s.tiers.boosted_units,
        amount: format_amount(s.tiers.total),
    }
}

fn summary(
    units: u32,
    gated: u32,
    standard: u32,
    boosted: u32,
    slab_amount: Money,
    bonus_amount: Money,
    total: Money,
) -> Vec<AmountRow> {
    vec![
        row("Units", units.to_string()),
        row("Gated units", gated.to_string()),
        row("Standard units", standard.to_string()),
        row("Boosted units", boosted.to_string()),
        row("Slab incentive", format_amount(slab_amount)),
        row("Category bonus", format_amount(bonus_amount)),
        row("Total", format_amount(total)),
    ]
}

fn row(label: &str, value: String) -> AmountRow {
    AmountRow { label: label.to_owned(), value }
}

fn warning_row(w: &ValidationIssue) -> WarningRow {
    let severity = match w.severity {
        inc_pipeline::Severity::Error => "error",
        inc_pipeline::Severity::Warning => "warning",
    };
    WarningRow { severity: severity.to_owned(), code: w.code.to_owned(), message: w.message.clone() }
}
