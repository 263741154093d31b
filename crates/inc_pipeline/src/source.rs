//! crates/inc_pipeline/src/source.rs
//! Collaborator seams: where sales, slabs, org membership and attach rates
//! come from. The engine fetches everything it needs through these traits
//! before evaluation starts.

use inc_core::entities::{AttachRateRecord, RawSale, SlabDefinition};
use inc_core::ids::StoreId;
use inc_core::org::OrgDirectory;
use inc_core::period::Period;
use inc_core::variables::EngineConfig;
use inc_io::dataset::Dataset;

/// Failure inside a data source (unreachable store, corrupt feed, ...).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SourceError(pub String);

// ----- Traits ------------------------------------------------------------------------------------

pub trait SalesSource {
    /// Every raw sale dated within `period`, across all sellers and stores, in
    /// the source's stable order (dedup keeps the first). Rows dated outside
    /// `period` are not trusted: normalization reports them as `Sale.OutOfPeriod`.
    fn fetch_sales(&self, period: Period) -> Result<Vec<RawSale>, SourceError>;
}

/// Administrator-owned configuration: slab bands and engine variables.
pub trait SlabSource {
    fn fetch_slabs(&self) -> Result<Vec<SlabDefinition>, SourceError>;
    fn fetch_config(&self) -> Result<EngineConfig, SourceError>;
}

pub trait OrgSource {
    fn directory(&self) -> Result<OrgDirectory, SourceError>;
}

pub trait AttachRateSource {
    fn fetch_attach_rates(&self, store: &StoreId) -> Result<Vec<AttachRateRecord>, SourceError>;
}

/// Everything the engine consumes, as one bound.
pub trait IncentiveSource: SalesSource + SlabSource + OrgSource + AttachRateSource {}

impl<T> IncentiveSource for T where T: SalesSource + SlabSource + OrgSource + AttachRateSource + ?Sized {}

// ----- Dataset ------------------------------------------------------------------------------------

impl SalesSource for Dataset {
    fn fetch_sales(&self, period: Period) -> Result<Vec<RawSale>, SourceError> {
        Ok(self.sales.iter().filter(|s| period.contains(s.sale_date)).cloned().collect())
    }
}

impl SlabSource for Dataset {
    fn fetch_slabs(&self) -> Result<Vec<SlabDefinition>, SourceError> {
        Ok(self.slabs.clone())
    }

    fn fetch_config(&self) -> Result<EngineConfig, SourceError> {
        Ok(self.config.clone())
    }
}

impl OrgSource for Dataset {
    fn directory(&self) -> Result<OrgDirectory, SourceError> {
        Ok(self.org.clone())
    }
}

impl AttachRateSource for Dataset {
    fn fetch_attach_rates(&self, store: &StoreId) -> Result<Vec<AttachRateRecord>, SourceError> {
        Ok(self.attach_rates.iter().filter(|r| &r.store_id == store).cloned().collect())
    }
}
