// crates/inc_io/src/manifest.rs
//
// Manifest: the one file naming every engine input.
// • Paths are local only: any scheme ("://", "http:", "https:") is rejected.
// • Relative paths resolve against the manifest's directory.
// • `slabs`, `sales`, `org` are required; `attach_rates`, `config` are optional.
// • Digests (optional) are lowercase 64-hex over canonical JSON bytes and may
//   only be given for inputs that are present.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canonical_json::to_canonical_json_bytes;
use crate::hasher::{is_lower_hex_64, sha256_hex};
use crate::looks_like_url_strict;

/// External manifest accepted by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Optional, non-normative label.
    #[serde(default)]
    pub id: Option<String>,

    pub slabs_path: String,
    pub sales_path: String,
    pub org_path: String,

    #[serde(default)]
    pub attach_rates_path: Option<String>,
    #[serde(default)]
    pub config_path: Option<String>,

    #[serde(default)]
    pub inputs_sha256: Option<InputDigests>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDigests {
    #[serde(default)]
    pub slabs_path: Option<String>,
    #[serde(default)]
    pub sales_path: Option<String>,
    #[serde(default)]
    pub org_path: Option<String>,
    #[serde(default)]
    pub attach_rates_path: Option<String>,
    #[serde(default)]
    pub config_path: Option<String>,
}

/// Paths resolved against the manifest's directory.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub slabs_path: PathBuf,
    pub sales_path: PathBuf,
    pub org_path: PathBuf,
    pub attach_rates_path: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub digests: Option<InputDigests>,
}

#[derive(Debug)]
pub enum ManifestError {
    Empty(&'static str),
    UrlPath(&'static str, String),
    Io(&'static str, String),
    NotAFile(&'static str, String),
    Parse(String),
    DigestShape(&'static str, String),
    DigestMismatch(&'static str, String),
    DigestForMissing(&'static str),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ManifestError::*;
        match self {
            Empty(k) => write!(f, "field must not be empty: {k}"),
            UrlPath(k, v) => write!(f, "path must be offline (no scheme) for {k}: {v}"),
            Io(k, v) => write!(f, "cannot access {k}: {v}"),
            NotAFile(k, v) => write!(f, "path is not a file for {k}: {v}"),
            Parse(v) => write!(f, "cannot parse manifest: {v}"),
            DigestShape(k, v) => write!(f, "invalid sha256 format for {k}: {v}"),
            DigestMismatch(k, v) => write!(f, "sha256 mismatch for {k}: {v}"),
            DigestForMissing(k) => write!(f, "digest supplied for missing input: {k}"),
        }
    }
}

impl std::error::Error for ManifestError {}

// ---------- helpers ----------

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

fn required(label: &'static str, path: &str) -> Result<(), ManifestError> {
    if path.trim().is_empty() {
        return Err(ManifestError::Empty(label));
    }
    if looks_like_url_strict(path) {
        return Err(ManifestError::UrlPath(label, path.to_string()));
    }
    Ok(())
}

fn digest_shape(label: &'static str, d: &Option<String>, present: bool) -> Result<(), ManifestError> {
    if let Some(h) = d {
        if !present {
            return Err(ManifestError::DigestForMissing(label));
        }
        if !is_lower_hex_64(h) {
            return Err(ManifestError::DigestShape(label, h.clone()));
        }
    }
    Ok(())
}

// ---------- validation ----------

/// Shape and offline policy. No I/O.
pub fn validate_manifest(man: &Manifest) -> Result<(), ManifestError> {
    required("slabs_path", &man.slabs_path)?;
    required("sales_path", &man.sales_path)?;
    required("org_path", &man.org_path)?;
    if let Some(s) = &man.attach_rates_path {
        required("attach_rates_path", s)?;
    }
    if let Some(s) = &man.config_path {
        required("config_path", s)?;
    }

    if let Some(d) = &man.inputs_sha256 {
        digest_shape("slabs_path", &d.slabs_path, true)?;
        digest_shape("sales_path", &d.sales_path, true)?;
        digest_shape("org_path", &d.org_path, true)?;
        digest_shape("attach_rates_path", &d.attach_rates_path, man.attach_rates_path.is_some())?;
        digest_shape("config_path", &d.config_path, man.config_path.is_some())?;
    }
    Ok(())
}

// ---------- resolution ----------

/// Resolve under `base_dir` and check every named input is an existing file.
pub fn resolve_paths(base_dir: &Path, man: &Manifest) -> Result<ResolvedManifest, ManifestError> {
    let slabs = join_under(base_dir, &man.slabs_path);
    let sales = join_under(base_dir, &man.sales_path);
    let org = join_under(base_dir, &man.org_path);
    let attach = man.attach_rates_path.as_ref().map(|s| join_under(base_dir, s));
    let config = man.config_path.as_ref().map(|s| join_under(base_dir, s));

    must_exist_file("slabs_path", &slabs)?;
    must_exist_file("sales_path", &sales)?;
    must_exist_file("org_path", &org)?;
    if let Some(p) = &attach {
        must_exist_file("attach_rates_path", p)?;
    }
    if let Some(p) = &config {
        must_exist_file("config_path", p)?;
    }

    Ok(ResolvedManifest {
        slabs_path: slabs,
        sales_path: sales,
        org_path: org,
        attach_rates_path: attach,
        config_path: config,
        digests: man.inputs_sha256.clone(),
    })
}

fn must_exist_file(label: &'static str, p: &Path) -> Result<(), ManifestError> {
    let md = fs::metadata(p).map_err(|e| ManifestError::Io(label, format!("{} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(ManifestError::NotAFile(label, p.display().to_string()));
    }
    Ok(())
}

// ---------- digests ----------

/// SHA-256 of a JSON file's canonical bytes.
pub fn canonical_file_sha256(label: &'static str, p: &Path) -> Result<String, ManifestError> {
    let buf = fs::read(p).map_err(|e| ManifestError::Io(label, format!("{} ({e})", p.display())))?;
    let v: serde_json::Value = serde_json::from_slice(&buf)
        .map_err(|e| ManifestError::Io(label, format!("{} ({e})", p.display())))?;
    let canon = to_canonical_json_bytes(&v).map_err(|e| ManifestError::Io(label, e.to_string()))?;
    Ok(sha256_hex(&canon))
}

/// Verify provided digests; `Ok(())` when none were given.
pub fn verify_digests(resolved: &ResolvedManifest) -> Result<(), ManifestError> {
    let Some(d) = &resolved.digests else {
        return Ok(());
    };

    fn check_one(path: &Path, expect_hex: &str, label: &'static str) -> Result<(), ManifestError> {
        let got = canonical_file_sha256(label, path)?;
        if got != expect_hex {
            return Err(ManifestError::DigestMismatch(label, format!("expected={expect_hex} got={got}")));
        }
        Ok(())
    }

    if let Some(hex) = &d.slabs_path {
        check_one(&resolved.slabs_path, hex, "slabs_path")?;
    }
    if let Some(hex) = &d.sales_path {
        check_one(&resolved.sales_path, hex, "sales_path")?;
    }
    if let Some(hex) = &d.org_path {
        check_one(&resolved.org_path, hex, "org_path")?;
    }
    match (&resolved.attach_rates_path, &d.attach_rates_path) {
        (Some(p), Some(hex)) => check_one(p, hex, "attach_rates_path")?,
        (None, Some(_)) => return Err(ManifestError::DigestForMissing("attach_rates_path")),
        _ => {}
    }
    match (&resolved.config_path, &d.config_path) {
        (Some(p), Some(hex)) => check_one(p, hex, "config_path")?,
        (None, Some(_)) => return Err(ManifestError::DigestForMissing("config_path")),
        _ => {}
    }
    Ok(())
}

// ---------- top-level ----------

const MAX_MANIFEST_BYTES: u64 = 4 * 1024 * 1024;

/// Load, validate and resolve. Does not verify digests.
pub fn load_and_resolve_manifest(manifest_path: &Path) -> Result<ResolvedManifest, ManifestError> {
    let f = fs::File::open(manifest_path)
        .map_err(|e| ManifestError::Io("manifest", format!("{} ({e})", manifest_path.display())))?;
    let mut buf = Vec::new();
    f.take(MAX_MANIFEST_BYTES)
        .read_to_end(&mut buf)
        .map_err(|e| ManifestError::Io("manifest", format!("{} ({e})", manifest_path.display())))?;

    let man: Manifest = serde_json::from_slice(&buf)
        .map_err(|e| ManifestError::Parse(format!("{} ({e})", manifest_path.display())))?;
    validate_manifest(&man)?;

    let base = manifest_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    resolve_paths(&base, &man)
}

/// Load, validate, resolve, then verify digests.
pub fn load_verify_manifest(manifest_path: &Path) -> Result<ResolvedManifest, ManifestError> {
    let resolved = load_and_resolve_manifest(manifest_path)?;
    verify_digests(&resolved)?;
    Ok(resolved)
}
