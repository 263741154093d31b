//! crates/inc_report/src/render_json.rs
//! JSON rendering of a `ReportModel`. Output bytes are canonical (sorted keys,
//! compact) so two runs over the same result compare equal.

use inc_io::prelude::to_canonical_bytes;
use serde_json::Value;

use crate::{ReportError, ReportModel};

/// The model as a JSON value, sections keyed by name.
pub fn render_json(m: &ReportModel) -> Result<Value, ReportError> {
    serde_json::to_value(m).map_err(|_| ReportError::Render("report model is not representable as JSON"))
}

/// Canonical bytes, ready to write.
pub fn render_json_bytes(m: &ReportModel) -> Result<Vec<u8>, ReportError> {
    Ok(to_canonical_bytes(m)?)
}
