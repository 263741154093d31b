//! inc_core: core types, domains, ordering helpers, and integer money math.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`inc_io`, `inc_algo`, `inc_pipeline`, `inc_report`, `inc_cli`).
//!
//! - Identifier tokens: `SellerId`, `StoreId`, `OrgUnitId`, `UnitIdentifier`
//! - Whole-currency `Money` and half-up percentage scaling
//! - Calculation `Period` with inclusive calendar bounds
//! - Slabs, raw/normalized sale records, attach-rate records, org directory
//! - Engine configuration (`EngineConfig`, `CalcMode`) with domain validation

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidId(String),
        InvalidPeriod(String),
        InvalidPercentage(String),
        NegativeAmount(&'static str),
        DomainOutOfRange(&'static str),
        UnknownReference(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidId(s) => write!(f, "invalid id: {s}"),
                CoreError::InvalidPeriod(s) => write!(f, "invalid period: {s}"),
                CoreError::InvalidPercentage(s) => write!(f, "invalid percentage: {s}"),
                CoreError::NegativeAmount(k) => write!(f, "amount must not be negative: {k}"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::UnknownReference(s) => write!(f, "unknown reference: {s}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod determinism;
pub mod entities;
pub mod ids;
pub mod money;
pub mod org;
pub mod period;
pub mod variables;

pub use errors::CoreError;
pub use ids::{OrgUnitId, SellerId, StoreId, UnitIdentifier};
pub use money::Money;
pub use period::Period;
