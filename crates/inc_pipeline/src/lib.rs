//! inc_pipeline: incentive engine orchestration.
//!
//! Fixed order per calculation:
//! FETCH (slabs via cache, config, the period's sales, attach rates) → NORMALIZE
//! (dedup across the whole period) → SCOPE → AGGREGATE
//! → EVALUATE (gate/kicker, parallel per seller) → BONUSES → ROLLUP → ATTACH RATE.
//!
//! Sources are injected through the traits in [`source`]; nothing here reads
//! files or global state. Results carry the normalization warnings and the
//! slab-table generation they were computed against.

#![forbid(unsafe_code)]

use inc_algo::ConfigurationError;
use inc_core::period::Period;
use serde::Serialize;

pub mod aggregate;
pub mod engine;
pub mod evaluate;
pub mod normalize;
pub mod slab_cache;
pub mod snapshot;
pub mod source;

pub use engine::{Engine, LeaderboardScope};
pub use normalize::{normalize, DuplicateSaleWarning, NormalizedSales, Severity, ValidationIssue};
pub use slab_cache::SlabCache;
pub use snapshot::{CalculationSnapshot, SaleScope};
pub use source::{AttachRateSource, OrgSource, SalesSource, SlabSource, SourceError};

// ----- Errors ------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("source error: {0}")]
    Source(#[from] SourceError),
}

impl EngineError {
    pub(crate) fn not_found(kind: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound { kind, id: id.to_string() }
    }
}

// ----- Outcomes ----------------------------------------------------------------------------------

/// A computed result plus what the run recovered from locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calculated<T> {
    pub period: Period,
    pub slab_generation: u64,
    /// Rejected and duplicate sales, stably ordered.
    pub warnings: Vec<ValidationIssue>,
    pub result: T,
}

pub type CalcOutcome<T> = Result<Calculated<T>, EngineError>;
