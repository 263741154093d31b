//! crates/inc_io/src/dataset.rs
//! In-memory engine inputs. The pipeline's source traits are implemented for
//! `Dataset`, so a loaded manifest and a hand-built test fixture are served
//! the same way.

use inc_core::entities::{AttachRateRecord, RawSale, SlabDefinition};
use inc_core::org::OrgDirectory;
use inc_core::variables::EngineConfig;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub slabs: Vec<SlabDefinition>,
    /// Source order is the dedup order: earlier entries win.
    pub sales: Vec<RawSale>,
    pub org: OrgDirectory,
    pub attach_rates: Vec<AttachRateRecord>,
    pub config: EngineConfig,
}

impl Dataset {
    pub fn new(slabs: Vec<SlabDefinition>, org: OrgDirectory) -> Self {
        Dataset {
            slabs,
            sales: Vec::new(),
            org,
            attach_rates: Vec::new(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_sales(mut self, sales: Vec<RawSale>) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_attach_rates(mut self, recs: Vec<AttachRateRecord>) -> Self {
        self.attach_rates = recs;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }
}
