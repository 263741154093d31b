// crates/inc_cli/src/args.rs
//
// Command-line surface for the offline `incentive` binary.
// - Every input comes from one local manifest (no URL schemes)
// - Periods: `YYYY-MM` (calendar month) or `YYYY-MM-DD..YYYY-MM-DD` (inclusive)
// - Output: optional `--out` directory for canonical artifacts, `--render` json|text

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inc_core::org::OrgRole;
use inc_core::period::Period;
use inc_core::variables::CalcMode;
use inc_pipeline::LeaderboardScope;

#[derive(Debug, Parser)]
#[command(
    name = "incentive",
    disable_help_subcommand = true,
    about = "Offline tiered incentive calculations over a local manifest"
)]
pub struct Cli {
    /// Log filter, e.g. `info` or `inc_pipeline=debug`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Incentive for one seller over the period.
    Seller {
        #[command(flatten)]
        run: RunArgs,
        /// Seller id.
        #[arg(long)]
        id: String,
    },
    /// Store rollup in per-seller or pooled aggregate mode.
    Store {
        #[command(flatten)]
        run: RunArgs,
        /// Store id.
        #[arg(long)]
        id: String,
        /// Calculation mode; there is no default.
        #[arg(long, value_enum)]
        mode: ModeArg,
    },
    /// Rollup for an ASE/ABM (own stores) or ZSE/ZSM (through child managers).
    Org {
        #[command(flatten)]
        run: RunArgs,
        /// Org unit id.
        #[arg(long)]
        id: String,
    },
    /// Ranked totals for every seller, store, or org unit of one role.
    Leaderboard {
        #[command(flatten)]
        run: RunArgs,
        #[arg(long, value_enum)]
        scope: ScopeArg,
    },
    /// Load and check every input without calculating.
    Validate {
        #[arg(long, value_parser = parse_local_path)]
        manifest: PathBuf,
        /// Also normalize the period's sales and list what would be skipped.
        #[arg(long, value_parser = parse_period)]
        period: Option<Period>,
    },
}

/// Flags shared by every calculating subcommand.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Manifest JSON naming slabs, sales, org, attach rates and config.
    #[arg(long, value_parser = parse_local_path)]
    pub manifest: PathBuf,

    /// `YYYY-MM` or `YYYY-MM-DD..YYYY-MM-DD`.
    #[arg(long, value_parser = parse_period)]
    pub period: Period,

    /// Directory for `result.json` and rendered reports.
    #[arg(long, value_parser = parse_local_path)]
    pub out: Option<PathBuf>,

    /// Report files to write into `--out`.
    #[arg(long, value_enum, num_args = 0..=2, requires = "out")]
    pub render: Vec<RenderArg>,

    /// Do not print the text report to stdout.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    PerSeller,
    #[value(alias = "aggregate")]
    PerStoreAggregate,
}

impl From<ModeArg> for CalcMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::PerSeller => CalcMode::PerSeller,
            ModeArg::PerStoreAggregate => CalcMode::PerStoreAggregate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Sellers,
    Stores,
    Ase,
    Zse,
    Abm,
    Zsm,
}

impl From<ScopeArg> for LeaderboardScope {
    fn from(s: ScopeArg) -> Self {
        match s {
            ScopeArg::Sellers => LeaderboardScope::Sellers,
            ScopeArg::Stores => LeaderboardScope::Stores,
            ScopeArg::Ase => LeaderboardScope::OrgUnits(OrgRole::Ase),
            ScopeArg::Zse => LeaderboardScope::OrgUnits(OrgRole::Zse),
            ScopeArg::Abm => LeaderboardScope::OrgUnits(OrgRole::Abm),
            ScopeArg::Zsm => LeaderboardScope::OrgUnits(OrgRole::Zsm),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderArg {
    Json,
    Text,
}

/// `YYYY-MM` → that calendar month; `A..B` or `A..=B` → inclusive day range.
pub fn parse_period(s: &str) -> Result<Period, String> {
    let s = s.trim();
    if let Some((a, b)) = s.split_once("..") {
        let b = b.strip_prefix('=').unwrap_or(b);
        let start = parse_day(a)?;
        let end = parse_day(b)?;
        return Period::new(start, end).map_err(|e| e.to_string());
    }
    let (y, m) = s.split_once('-').ok_or_else(|| format!("expected YYYY-MM or a date range: {s}"))?;
    let year: i32 = y.parse().map_err(|_| format!("bad year: {y}"))?;
    let month: u32 = m.parse().map_err(|_| format!("bad month: {m}"))?;
    Period::month(year, month).map_err(|e| e.to_string())
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| format!("bad date (YYYY-MM-DD): {s}"))
}

/// Reject any explicit URI scheme; existence is checked by the loader.
pub fn parse_local_path(s: &str) -> Result<PathBuf, String> {
    if inc_io::looks_like_url_strict(s) || s.trim().to_ascii_lowercase().starts_with("file:") {
        return Err(format!("path must be local (no scheme): {s}"));
    }
    Ok(PathBuf::from(s))
}
