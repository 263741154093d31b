//! crates/inc_report/src/lib.rs
//! Offline report model and renderers for incentive results.
//!
//! Reports are built from the typed `Calculated<T>` values the engine returns.
//! All amounts arrive as whole rupees and all percentages as tenths, so the
//! builders only format; no arithmetic beyond integer sums happens here.

#![deny(unsafe_code)]

pub mod render_json;
pub mod render_text;
pub mod structure;

pub use render_json::{render_json, render_json_bytes};
pub use render_text::render_text;
pub use structure::{
    build_leaderboard_report, build_org_report, build_seller_report, build_store_report,
    AmountRow, BonusRow, Cover, RankRow, ReportKind, ReportModel, SlabRow, StoreRow, WarningRow,
};

// ===== Errors =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    /// Canonical serialization or hashing of the source result failed.
    Integrity(String),
    /// The model could not be written to the output buffer.
    Render(&'static str),
    /// Two parts of the source result disagree.
    Inconsistent(&'static str),
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReportError::Integrity(m) => write!(f, "integrity: {m}"),
            ReportError::Render(m) => write!(f, "render: {m}"),
            ReportError::Inconsistent(m) => write!(f, "inconsistent result: {m}"),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<inc_io::IoError> for ReportError {
    fn from(e: inc_io::IoError) -> Self {
        ReportError::Integrity(e.to_string())
    }
}

// ===== Formatting =====

/// Whole rupees with thousands separators, e.g. `3700` → `"₹3,700"`.
pub fn format_amount(amount: inc_core::money::Money) -> String {
    let v = amount.get();
    let digits = v.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if v < 0 {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

/// Attach percentage text, or `"N/A"` when no record was in force.
pub fn format_attach(p: Option<inc_core::entities::AttachPct>) -> String {
    match p {
        Some(p) => inc_core::money::percent_tenths_string(p.tenths()),
        None => "N/A".to_owned(),
    }
}
