//! # Optica Console Library
//!
//! Command-line front end of the Optica admin screens. The binary in
//! `main.rs` only parses arguments and prints; everything else lives here.
//!
//! ## Module Organization
//! ```text
//! optica_console/
//! ├── lib.rs          ◄─── You are here (CLI definition, tracing, dispatch)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── list.rs     ◄─── `list <screen>`: drive a ScreenState, print a page
//! │   └── promotions.rs ◄─ `promotions`: status counts, offerable promotions
//! ├── render.rs       ◄─── Text tables and per-screen columns
//! └── error.rs        ◄─── ConsoleError { code, message }
//! ```
//!
//! ## Example
//! ```text
//! optica-console list lentes --search solar --filter marca=Ray-Ban \
//!     --min 50 --max 200 --sort precio:desc --page 2
//! optica-console promotions --offerable
//! ```

pub mod commands;
pub mod error;
pub mod render;

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use optica_api::{ApiClient, ConsoleConfig};
use optica_core::lenient::parse_date;
use optica_core::ScreenKind;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

pub use error::{ConsoleError, ConsoleResult, ErrorCode};

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "optica-console", version, about = "Optica admin console")]
pub struct Cli {
    /// Config file (defaults to `<config dir>/optica/console.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one screen's records
    List(ListArgs),

    /// Promotion status counts, or the promotions a product may use today
    Promotions(PromotionArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// aros, lentes, accesorios, clientes, empleados, sucursales, recetas,
    /// ventas or promociones
    pub screen: ScreenKind,

    /// Case-insensitive search term
    #[arg(long, short)]
    pub search: Option<String>,

    /// Filter as key=value (repeatable)
    #[arg(long = "filter", short = 'f', value_parser = parse_filter)]
    pub filters: Vec<(String, String)>,

    /// Lower bound of the screen's range field
    #[arg(long)]
    pub min: Option<f64>,

    /// Upper bound of the screen's range field
    #[arg(long)]
    pub max: Option<f64>,

    /// First day of the screen's date field (inclusive)
    #[arg(long, value_parser = parse_day)]
    pub from: Option<DateTime<Utc>>,

    /// Last day of the screen's date field (inclusive)
    #[arg(long, value_parser = parse_day_end)]
    pub to: Option<DateTime<Utc>>,

    /// field or field:asc|desc
    #[arg(long)]
    pub sort: Option<String>,

    /// 1-based page number
    #[arg(long)]
    pub page: Option<usize>,

    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct PromotionArgs {
    /// Only promotions that may be offered on the product form now
    #[arg(long)]
    pub offerable: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing filter key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_day(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_date(raw).ok_or_else(|| format!("not a date: '{}'", raw))
}

/// Like [`parse_day`], but a plain `YYYY-MM-DD` covers the whole day.
fn parse_day_end(raw: &str) -> Result<DateTime<Utc>, String> {
    let start = parse_day(raw)?;
    if raw.trim().len() == "YYYY-MM-DD".len() {
        Ok(start + Duration::days(1) - Duration::milliseconds(1))
    } else {
        Ok(start)
    }
}

// =============================================================================
// Run
// =============================================================================

/// Runs one command and returns what should be printed.
pub async fn run(cli: Cli) -> ConsoleResult<String> {
    init_tracing();

    let mut config = ConsoleConfig::load(cli.config.clone())?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    let api = ApiClient::new(&config)?;
    debug!(base_url = %api.base_url(), "console ready");

    match &cli.command {
        Command::List(args) => commands::list::run(&api, &config, args, cli.json).await,
        Command::Promotions(args) => commands::promotions::run(&api, args, cli.json).await,
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=optica_core=trace` - Pipeline runs in detail
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout stays clean for tables and JSON.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .try_init();
}

// =============================================================================
// Unit Tests
// =============================================================================
