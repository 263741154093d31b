//! crates/inc_report/src/render_text.rs
//! Plain-text rendering for terminals and logs. Sections with no rows are omitted.

use std::fmt::Write as _;

use crate::{ReportError, ReportModel, StoreRow};

pub fn render_text(m: &ReportModel) -> Result<String, ReportError> {
    let mut out = String::with_capacity(2048);
    write_report(&mut out, m).map_err(|_| ReportError::Render("text buffer write failed"))?;
    Ok(out)
}

fn write_report(out: &mut String, m: &ReportModel) -> std::fmt::Result {
    // ---- cover ----
    writeln!(out, "{}", m.cover.title)?;
    writeln!(out, "Period: {}", m.cover.period)?;
    if let Some(d) = &m.cover.detail {
        writeln!(out, "Detail: {d}")?;
    }
    writeln!(out, "Slab table generation: {}", m.cover.slab_generation)?;
    writeln!(out, "Result: {}", m.cover.result_id)?;

    // ---- summary ----
    if !m.summary.is_empty() {
        writeln!(out)?;
        writeln!(out, "Summary")?;
        let w = m.summary.iter().map(|r| r.label.len()).max().unwrap_or(0);
        for r in &m.summary {
            writeln!(out, "  {:<w$}  {}", r.label, r.value)?;
        }
    }

    // ---- slabs ----
    if !m.slabs.is_empty() {
        writeln!(out)?;
        writeln!(out, "Slabs")?;
        writeln!(
            out,
            "  {:<16} {:>6} {:>6} {:>8} {:>7} {:>12}",
            "band", "units", "gated", "standard", "boosted", "amount"
        )?;
        for s in &m.slabs {
            writeln!(
                out,
                "  {:<16} {:>6} {:>6} {:>8} {:>7} {:>12}",
                s.slab, s.units, s.gated_units, s.standard_units, s.boosted_units, s.amount
            )?;
        }
    }

    if !m.bonuses.is_empty() {
        writeln!(out)?;
        writeln!(out, "Category bonuses")?;
        for b in &m.bonuses {
            writeln!(out, "  {:<16} {:>6} {:>12}", b.category, b.units, b.amount)?;
        }
    }

    // ---- members ----
    if !m.contributors.is_empty() {
        writeln!(out)?;
        writeln!(out, "Contributors")?;
        member_rows(out, &m.contributors)?;
    }
    if !m.stores.is_empty() {
        writeln!(out)?;
        writeln!(out, "Stores")?;
        member_rows(out, &m.stores)?;
    }

    if !m.ranking.is_empty() {
        writeln!(out)?;
        writeln!(out, "Ranking")?;
        for r in &m.ranking {
            writeln!(out, "  {:>4}  {:<12} {:>6} {:>12}", r.rank, r.id, r.units, r.total)?;
        }
    }

    // ---- warnings ----
    if !m.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "Warnings ({})", m.warnings.len())?;
        for w in &m.warnings {
            writeln!(out, "  [{}] {}: {}", w.severity, w.code, w.message)?;
        }
    }
    Ok(())
}

fn member_rows(out: &mut String, rows: &[StoreRow]) -> std::fmt::Result {
    for r in rows {
        let state = if r.active { "active" } else { "idle" };
        write!(out, "  {:<12} {:<6} {:>6} {:>12}", r.id, state, r.units, r.total)?;
        match &r.attach_rate {
            Some(a) => writeln!(out, "  attach {a}")?,
            None => writeln!(out)?,
        }
    }
    Ok(())
}
