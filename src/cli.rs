//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::yahoo_adapter::YahooQuoteAdapter;
use crate::domain::config::{build_poller_config, PollerConfig, SchedulerConfig, StoreConfig};
use crate::domain::error::QuotepollError;
use crate::domain::metrics_row::MetricsRow;
use crate::domain::scheduler::{CancellationToken, Scheduler};
use crate::domain::updater::{CycleReport, MetricsUpdater};
use crate::logging::init_logging;
use crate::ports::clock_port::{Clock, SystemClock};
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::MetricsStore;

#[derive(Parser, Debug)]
#[command(name = "quotepoll", about = "Periodic market quote poller")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true, default_value = "quotepoll.ini")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Poll every interval until the process is killed
    Run,
    /// Run a single cycle and print its summary
    Once,
    /// Create the symbols and metrics tables if missing
    InitSchema,
    /// Show the most recent metrics rows for a symbol
    History {
        #[arg(long)]
        symbol: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_poller_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let result = match cli.command {
        Command::Run => run_daemon(&config),
        Command::Once => run_single(&config),
        Command::InitSchema => run_init_schema(&config),
        Command::History { symbol, limit } => run_history(&config, &symbol, limit),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_poller_config(path: &Path) -> Result<PollerConfig, QuotepollError> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| QuotepollError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    build_poller_config(&adapter)
}

pub fn open_store(config: &StoreConfig) -> Result<Box<dyn MetricsStore>, QuotepollError> {
    match config {
        #[cfg(feature = "postgres")]
        StoreConfig::Postgres { conninfo } => Ok(Box::new(
            crate::adapters::postgres_adapter::PostgresAdapter::new(conninfo.clone()),
        )),
        #[cfg(feature = "sqlite")]
        StoreConfig::Sqlite { path } => Ok(Box::new(
            crate::adapters::sqlite_adapter::SqliteAdapter::new(path),
        )),
        #[allow(unreachable_patterns)]
        other => Err(QuotepollError::ConfigInvalid {
            section: "database".into(),
            key: "backend".into(),
            reason: format!("{other:?} requires a feature this build was compiled without"),
        }),
    }
}

/// Create tables at startup. A failure is logged and polling continues: the
/// store may come up later and the tables may already exist.
pub fn prepare_store(store: &dyn MetricsStore) {
    match store.initialize_schema() {
        Ok(()) => info!("tables ready"),
        Err(e) => error!(error = %e, "error creating tables"),
    }
}

/// Drive the update cycle on `scheduler` until its token is cancelled.
pub fn run_poller(
    quotes: &dyn QuotePort,
    store: &dyn MetricsStore,
    clock: &dyn Clock,
    scheduler_config: &SchedulerConfig,
    token: CancellationToken,
) -> u64 {
    let updater = MetricsUpdater::new(quotes, store, clock, scheduler_config.ema_span);
    let scheduler = Scheduler::new(scheduler_config.interval, token);
    scheduler.run(|| {
        updater.run_cycle();
    })
}

pub fn run_once(
    quotes: &dyn QuotePort,
    store: &dyn MetricsStore,
    clock: &dyn Clock,
    scheduler_config: &SchedulerConfig,
) -> CycleReport {
    MetricsUpdater::new(quotes, store, clock, scheduler_config.ema_span).run_cycle()
}

pub fn format_report(report: &CycleReport) -> String {
    format!(
        "{} symbols: {} inserted, {} skipped, {} failed",
        report.symbols, report.inserted, report.skipped, report.failed
    )
}

pub fn format_row(row: &MetricsRow) -> String {
    fn opt_f64(v: Option<f64>) -> String {
        v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
    }

    format!(
        "{}  {}  price={:.2} open={:.2} high={:.2} low={:.2} close={:.2} volume={} avg_volume={} ema={} vwap={}",
        row.timestamp.format("%Y-%m-%d %H:%M:%S"),
        row.symbol,
        row.price,
        row.open,
        row.high,
        row.low,
        row.close,
        row.volume.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
        opt_f64(row.avg_volume),
        opt_f64(row.ema),
        opt_f64(row.vwap),
    )
}

fn run_daemon(config: &PollerConfig) -> Result<(), QuotepollError> {
    let store = open_store(&config.store)?;
    let quotes = YahooQuoteAdapter::new(config.provider.clone())?;

    info!("starting quote poller");
    prepare_store(store.as_ref());

    // Nothing cancels this token; the process runs until it is signalled.
    run_poller(
        &quotes,
        store.as_ref(),
        &SystemClock,
        &config.scheduler,
        CancellationToken::new(),
    );
    Ok(())
}

fn run_single(config: &PollerConfig) -> Result<(), QuotepollError> {
    let store = open_store(&config.store)?;
    let quotes = YahooQuoteAdapter::new(config.provider.clone())?;

    prepare_store(store.as_ref());
    let report = run_once(&quotes, store.as_ref(), &SystemClock, &config.scheduler);
    println!("{}", format_report(&report));
    Ok(())
}

fn run_init_schema(config: &PollerConfig) -> Result<(), QuotepollError> {
    let store = open_store(&config.store)?;
    store.initialize_schema()?;
    info!("tables created");
    eprintln!("Tables created successfully.");
    Ok(())
}

fn run_history(config: &PollerConfig, symbol: &str, limit: usize) -> Result<(), QuotepollError> {
    let store = open_store(&config.store)?;
    let rows = store.recent_metrics(symbol.trim(), limit)?;

    if rows.is_empty() {
        eprintln!("No metrics recorded for {symbol}");
    }
    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}
