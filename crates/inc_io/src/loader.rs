//! Loader: read local JSON inputs (manifest → slabs → sales → org → attach
//! rates → config) into a `Dataset`, and record canonical digests of each.
//! No network I/O.

#![forbid(unsafe_code)]

use std::fs::File;
use std::io::Read;
use std::path::Path;

use inc_core::entities::{AttachRateRecord, RawSale, SlabDefinition};
use inc_core::org::OrgDirectory;
use inc_core::variables::{validate_config, EngineConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::dataset::Dataset;
use crate::hasher::sha256_canonical;
use crate::manifest as man;
use crate::IoError;

/// Upper bound on any single input file.
const MAX_INPUT_BYTES: u64 = 256 * 1024 * 1024;

/// SHA-256 (canonical JSON) of each loaded input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDigests {
    pub slabs_sha256: String,
    pub sales_sha256: String,
    pub org_sha256: String,
    pub attach_rates_sha256: Option<String>,
    pub config_sha256: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedContext {
    pub dataset: Dataset,
    pub digests: InputDigests,
}

/// Load everything a manifest names. Digests in the manifest, if any, are verified first.
pub fn load_all_from_manifest(path: &Path) -> Result<LoadedContext, IoError> {
    let resolved = man::load_verify_manifest(path)?;

    let slabs = load_slabs(&resolved.slabs_path)?;
    let sales = load_sales(&resolved.sales_path)?;
    let org = load_org(&resolved.org_path)?;
    let attach_rates = match &resolved.attach_rates_path {
        Some(p) => load_attach_rates(p)?,
        None => Vec::new(),
    };
    let config = match &resolved.config_path {
        Some(p) => load_config(p)?,
        None => EngineConfig::default(),
    };
    debug!(
        slabs = slabs.len(),
        sales = sales.len(),
        attach_rates = attach_rates.len(),
        "inputs loaded"
    );

    let digests = InputDigests {
        slabs_sha256: sha256_canonical(&slabs)?,
        sales_sha256: sha256_canonical(&sales)?,
        org_sha256: sha256_canonical(&org)?,
        attach_rates_sha256: match &resolved.attach_rates_path {
            Some(_) => Some(sha256_canonical(&attach_rates)?),
            None => None,
        },
        config_sha256: match &resolved.config_path {
            Some(_) => Some(sha256_canonical(&config)?),
            None => None,
        },
    };

    Ok(LoadedContext {
        dataset: Dataset { slabs, sales, org, attach_rates, config },
        digests,
    })
}

// ----------------------------- Targeted loaders -----------------------------

pub fn load_slabs(path: &Path) -> Result<Vec<SlabDefinition>, IoError> {
    read_json(path)
}

pub fn load_sales(path: &Path) -> Result<Vec<RawSale>, IoError> {
    read_json(path)
}

/// Org directory; role and reference rules are checked while parsing.
pub fn load_org(path: &Path) -> Result<OrgDirectory, IoError> {
    read_json(path)
}

pub fn load_attach_rates(path: &Path) -> Result<Vec<AttachRateRecord>, IoError> {
    read_json(path)
}

pub fn load_config(path: &Path) -> Result<EngineConfig, IoError> {
    let cfg: EngineConfig = read_json(path)?;
    validate_config(&cfg).map_err(|e| IoError::Invalid(format!("{}: {e}", path.display())))?;
    Ok(cfg)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, IoError> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Path(format!("{}: file exceeds size limit", path.display())));
    }
    serde_json::from_slice(&buf)
        .map_err(|e| IoError::Json { file: path.display().to_string(), msg: e.to_string() })
}
