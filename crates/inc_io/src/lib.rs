//! crates/inc_io/src/lib.rs
//! I/O crate for the incentive engine: manifest resolution, JSON loaders for
//! slabs / sales / org / attach rates / config, canonical JSON and SHA-256.
//!
//! All input is local files; any path with a URL scheme is rejected.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod dataset;
pub mod hasher;
pub mod loader;
pub mod manifest;

/// Unified error for inc_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON (de)serialization errors, with the file they came from.
    #[error("json error in {file}: {msg}")]
    Json { file: String, msg: String },

    #[error("manifest error: {0}")]
    Manifest(#[from] manifest::ManifestError),

    /// Input parsed but violates a domain rule (org roles, config domains).
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { file: "-".to_string(), msg: e.to_string() }
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    let t = s.trim();
    t.contains("://") || t.starts_with("http:") || t.starts_with("https:")
}

pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::dataset::Dataset;
    pub use crate::hasher::{res_id_from_canonical, sha256_hex};
    pub use crate::loader::{load_all_from_manifest, LoadedContext};
    pub use crate::{looks_like_url_strict, IoError, IoResult};
}
