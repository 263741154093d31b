// crates/inc_cli/src/main.rs
//
// Offline entry point: load manifest → engine call → canonical artifacts → report.
// Exit codes are stable for scripts:
//   0 ok, 2 validation (arguments, input shape), 3 configuration (slab table,
//   unresolvable price), 4 I/O, 5 unknown seller/store/org unit.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const CONFIGURATION: u8 = 3;
    pub const IO: u8 = 4;
    pub const NOT_FOUND: u8 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use inc_algo::SlabTable;
use inc_core::period::Period;
use inc_io::dataset::Dataset;
use inc_io::manifest::ManifestError;
use inc_io::prelude::{load_all_from_manifest, write_canonical_file, IoError, LoadedContext};
use inc_pipeline::{normalize, Calculated, Engine, EngineError, LeaderboardScope};
use inc_report::{
    build_leaderboard_report, build_org_report, build_seller_report, build_store_report, render_text,
    ReportError, ReportModel,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{Cli, Command, RenderArg, RunArgs};

#[derive(Debug)]
enum MainError {
    Validation(String),
    Configuration(String),
    Io(String),
    NotFound(String),
}

impl MainError {
    fn exit_code(&self) -> u8 {
        match self {
            MainError::Validation(_) => exitcodes::VALIDATION,
            MainError::Configuration(_) => exitcodes::CONFIGURATION,
            MainError::Io(_) => exitcodes::IO,
            MainError::NotFound(_) => exitcodes::NOT_FOUND,
        }
    }
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Configuration(m) => write!(f, "configuration: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::NotFound(m) => write!(f, "{m}"),
        }
    }
}

fn main() -> ExitCode {
    // clap exits with 2 on bad arguments, matching VALIDATION.
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match dispatch(cli.command) {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("incentive: error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// `--log-level` wins over RUST_LOG; default is `warn`. Logs go to stderr.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(l) => EnvFilter::try_new(l).map_err(drop),
        None => EnvFilter::try_from_default_env().map_err(drop),
    }
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cmd: Command) -> Result<(), MainError> {
    match cmd {
        Command::Validate { manifest, period } => validate(&manifest, period),
        Command::Seller { run, id } => {
            let engine = load_engine(&run.manifest)?;
            let id = id.parse().map_err(|e| MainError::Validation(format!("--id: {e}")))?;
            let calc = engine.calculate_seller(&id, run.period).map_err(map_engine_err)?;
            let model = build_seller_report(&calc).map_err(map_report_err)?;
            emit(&run, &calc, &model)
        }
        Command::Store { run, id, mode } => {
            let engine = load_engine(&run.manifest)?;
            let id = id.parse().map_err(|e| MainError::Validation(format!("--id: {e}")))?;
            let calc = engine.calculate_store(&id, run.period, mode.into()).map_err(map_engine_err)?;
            let model = build_store_report(&calc).map_err(map_report_err)?;
            emit(&run, &calc, &model)
        }
        Command::Org { run, id } => {
            let engine = load_engine(&run.manifest)?;
            let id = id.parse().map_err(|e| MainError::Validation(format!("--id: {e}")))?;
            let calc = engine.calculate_org_rollup(&id, run.period).map_err(map_engine_err)?;
            let model = build_org_report(&calc).map_err(map_report_err)?;
            emit(&run, &calc, &model)
        }
        Command::Leaderboard { run, scope } => {
            let engine = load_engine(&run.manifest)?;
            let scope = LeaderboardScope::from(scope);
            let calc = engine.leaderboard(scope, run.period).map_err(map_engine_err)?;
            let model = build_leaderboard_report(&calc, &scope.to_string()).map_err(map_report_err)?;
            emit(&run, &calc, &model)
        }
    }
}

// ----- Steps ---------------------------------------------------------------------------------------

fn load(manifest: &Path) -> Result<LoadedContext, MainError> {
    let ctx = load_all_from_manifest(manifest).map_err(map_io_err)?;
    debug!(
        slabs = %ctx.digests.slabs_sha256,
        sales = %ctx.digests.sales_sha256,
        org = %ctx.digests.org_sha256,
        "input digests"
    );
    Ok(ctx)
}

fn load_engine(manifest: &Path) -> Result<Engine<Dataset>, MainError> {
    Ok(Engine::new(load(manifest)?.dataset))
}

/// Input checks only: shapes, org references, config domains, slab table
/// coverage, and (with a period) which sales normalization would skip.
fn validate(manifest: &Path, period: Option<Period>) -> Result<(), MainError> {
    let ctx = load(manifest)?;
    let ds = &ctx.dataset;
    let table = SlabTable::new(ds.slabs.clone()).map_err(|e| MainError::Configuration(e.to_string()))?;

    println!(
        "inputs OK: {} slabs, {} sales, {} stores, {} attach-rate records",
        table.len(),
        ds.sales.len(),
        ds.org.stores().count(),
        ds.attach_rates.len()
    );
    if let Some(period) = period {
        let normalized = normalize(&ds.sales, period);
        println!("period {period}: {} sales accepted", normalized.records.len());
        for w in normalized.warnings() {
            println!("  {}: {}", w.code, w.message);
        }
    }
    Ok(())
}

/// Write `result.json` (+ requested reports) when `--out` is set; print the
/// text report unless `--quiet`.
fn emit<T: Serialize>(run: &RunArgs, calc: &Calculated<T>, model: &ReportModel) -> Result<(), MainError> {
    if let Some(out) = &run.out {
        fs::create_dir_all(out).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out.display())))?;
        write_canonical_file(&out.join("result.json"), calc).map_err(map_io_err)?;
        for r in &run.render {
            match r {
                RenderArg::Json => write_canonical_file(&out.join("report.json"), model).map_err(map_io_err)?,
                RenderArg::Text => {
                    let text = render_text(model).map_err(map_report_err)?;
                    fs::write(out.join("report.txt"), text)
                        .map_err(|e| MainError::Io(format!("write report.txt: {e}")))?;
                }
            }
        }
        info!(dir = %out.display(), result_id = %model.cover.result_id, "artifacts written");
    }
    if !run.quiet {
        print!("{}", render_text(model).map_err(map_report_err)?);
    }
    Ok(())
}

// ----- Error mapping -------------------------------------------------------------------------------

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(m) => MainError::Io(m),
        IoError::Manifest(e @ (ManifestError::Io(..) | ManifestError::NotAFile(..))) => MainError::Io(e.to_string()),
        other @ (IoError::Json { .. } | IoError::Manifest(_) | IoError::Invalid(_)) => {
            MainError::Validation(other.to_string())
        }
    }
}

fn map_engine_err(e: EngineError) -> MainError {
    match e {
        EngineError::Configuration(c) => MainError::Configuration(c.to_string()),
        e @ EngineError::NotFound { .. } => MainError::NotFound(e.to_string()),
        EngineError::Source(s) => MainError::Io(s.to_string()),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Io(format!("report: {e}"))
}
