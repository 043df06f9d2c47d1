//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_report::write_holdings_report;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store::JsonFileStore;
use crate::domain::calc;
use crate::domain::error::FundMirrorError;
use crate::domain::fund_info::{FundInfo, prefill_holding};
use crate::domain::holding::{HoldingPatch, NewHolding};
use crate::domain::ledger::Ledger;
use crate::domain::session::PersistentLedger;
use crate::domain::settings::{AppConfig, DEFAULT_SQLITE_PATH, StorageBackend, StorageSettings};
use crate::domain::snapshot::SnapshotPatch;
use crate::ports::config_port::ConfigPort;
use crate::ports::snapshot_port::SnapshotStore;

#[derive(Parser, Debug)]
#[command(
    name = "fundmirror",
    about = "Mirror a benchmark investor's fund allocation at your own scale"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Ledger file, overrides [storage] path
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show totals, ratios and holdings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the benchmark holder's total capital
    SetBenchmarkTotal {
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// Set your own total capital
    SetUserTotal {
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// Add a holding
    Add {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        benchmark: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        target: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        actual: f64,
        /// Look the fund name up by code; --name is the fallback
        #[arg(long)]
        fetch_name: bool,
    },
    /// Change fields of a holding
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        code: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        benchmark: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        target: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        actual: Option<f64>,
    },
    /// Remove a holding
    Delete { id: u64 },
    /// Write the ledger as JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load totals and/or holdings from a JSON file
    Import { input: PathBuf },
    /// Write the holdings table as CSV
    Report {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Fetch a fund's name by code
    Lookup { code: String },
    /// Replace the ledger with the default seed
    Reset,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match resolve_config(cli.config.as_deref(), cli.data.as_deref()) {
        Ok(c) => c,
        Err(e) => return report_error(&e),
    };
    init_logging(&config.log_level);

    if let Command::Lookup { code } = &cli.command {
        return match fetch_fund(&config, code) {
            Ok(info) => {
                println!("{}\t{}", info.code, info.name);
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&e),
        };
    }

    let store = match open_store(&config.storage) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };
    let mut session = match PersistentLedger::open(store.as_ref()) {
        Ok(s) => s,
        Err(e) => return report_error(&e),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match execute(&cli.command, &mut session, &config, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(err: &FundMirrorError) -> ExitCode {
    match err {
        FundMirrorError::Lookup(e) => {
            tracing::warn!("{e}");
            eprintln!("error: {}", e.user_message());
        }
        other => eprintln!("error: {other}"),
    }
    ExitCode::from(err)
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// configured level. Later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FundMirrorError> {
    FileConfigAdapter::from_file(path).map_err(|e| FundMirrorError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_app_config(adapter: &dyn ConfigPort) -> Result<AppConfig, FundMirrorError> {
    let mut config = AppConfig::default();

    if let Some(backend) = adapter.get_non_empty("storage", "backend") {
        config.storage.backend =
            backend
                .parse()
                .map_err(|reason| FundMirrorError::ConfigInvalid {
                    section: "storage".into(),
                    key: "backend".into(),
                    reason,
                })?;
    }
    match adapter.get_non_empty("storage", "path") {
        Some(path) => config.storage.path = PathBuf::from(path),
        None if config.storage.backend == StorageBackend::Sqlite => {
            config.storage.path = PathBuf::from(DEFAULT_SQLITE_PATH)
        }
        None => {}
    }

    let history = adapter.get_int("storage", "history", config.storage.history as i64);
    if history <= 0 {
        return Err(FundMirrorError::ConfigInvalid {
            section: "storage".into(),
            key: "history".into(),
            reason: "must keep at least one snapshot".into(),
        });
    }
    config.storage.history = history as usize;

    if let Some(url) = adapter.get_non_empty("lookup", "base_url") {
        config.lookup.base_url = url;
    }
    let timeout = adapter.get_int("lookup", "timeout_secs", config.lookup.timeout_secs as i64);
    if timeout <= 0 {
        return Err(FundMirrorError::ConfigInvalid {
            section: "lookup".into(),
            key: "timeout_secs".into(),
            reason: "must be a positive number of seconds".into(),
        });
    }
    config.lookup.timeout_secs = timeout as u64;

    if let Some(level) = adapter.get_non_empty("logging", "level") {
        config.log_level = level;
    }

    Ok(config)
}

/// Defaults, then the config file if given, then `--data`.
pub fn resolve_config(
    config_path: Option<&Path>,
    data_override: Option<&Path>,
) -> Result<AppConfig, FundMirrorError> {
    let mut config = match config_path {
        Some(path) => build_app_config(&load_config(path)?)?,
        None => AppConfig::default(),
    };
    if let Some(path) = data_override {
        config.storage.path = path.to_path_buf();
    }
    Ok(config)
}

pub fn open_store(settings: &StorageSettings) -> Result<Box<dyn SnapshotStore>, FundMirrorError> {
    tracing::debug!(backend = %settings.backend, path = %settings.path.display(), "opening store");
    match settings.backend {
        StorageBackend::Json => Ok(Box::new(JsonFileStore::new(settings.path.clone()))),
        StorageBackend::Sqlite => open_sqlite_store(settings),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite_store(settings: &StorageSettings) -> Result<Box<dyn SnapshotStore>, FundMirrorError> {
    use crate::adapters::sqlite_store::SqliteSnapshotStore;
    let store = SqliteSnapshotStore::open(&settings.path)?.with_history(settings.history);
    Ok(Box::new(store))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite_store(_settings: &StorageSettings) -> Result<Box<dyn SnapshotStore>, FundMirrorError> {
    Err(FundMirrorError::FeatureDisabled {
        feature: "sqlite",
        command: "the sqlite storage backend",
    })
}

#[cfg(feature = "lookup")]
fn fetch_fund(config: &AppConfig, code: &str) -> Result<FundInfo, FundMirrorError> {
    use crate::adapters::http_lookup::HttpFundLookup;
    use crate::domain::fund_info::lookup_fund;

    let lookup = HttpFundLookup::new(&config.lookup)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(lookup_fund(&lookup, code))?)
}

#[cfg(not(feature = "lookup"))]
fn fetch_fund(_config: &AppConfig, _code: &str) -> Result<FundInfo, FundMirrorError> {
    Err(FundMirrorError::FeatureDisabled {
        feature: "lookup",
        command: "fund lookup",
    })
}

/// Looks the fund up and builds the holding to add. Lookup failures fall
/// back to `fallback_name`; anything else is returned as is.
fn fetched_holding(
    config: &AppConfig,
    code: &str,
    fallback_name: Option<&str>,
) -> Result<NewHolding, FundMirrorError> {
    let looked_up = match fetch_fund(config, code) {
        Ok(info) => Ok(info),
        Err(FundMirrorError::Lookup(e)) => {
            if fallback_name.is_some() {
                eprintln!("warning: {}", e.user_message());
            }
            Err(e)
        }
        Err(other) => return Err(other),
    };
    Ok(prefill_holding(looked_up, code, fallback_name)?)
}

/// Runs one ledger command, writing user-facing output to `out`.
pub fn execute(
    command: &Command,
    session: &mut PersistentLedger<'_>,
    config: &AppConfig,
    out: &mut dyn Write,
) -> Result<(), FundMirrorError> {
    match command {
        Command::Show { json } => {
            if *json {
                write_json_summary(session.ledger(), out)?;
            } else {
                write_summary(session.ledger(), out)?;
            }
        }
        Command::SetBenchmarkTotal { value } => {
            session.set_benchmark_total(*value)?;
            writeln!(out, "benchmark total set to {}", calc::fixed2(*value))?;
        }
        Command::SetUserTotal { value } => {
            session.set_user_total(*value)?;
            writeln!(out, "user total set to {}", calc::fixed2(*value))?;
        }
        Command::Add {
            code,
            name,
            benchmark,
            target,
            actual,
            fetch_name,
        } => {
            let holding = if *fetch_name {
                fetched_holding(config, code, name.as_deref())?
            } else {
                NewHolding::new(name.clone().unwrap_or_default(), code.trim())
            };
            let id = session.add_holding(holding.with_amounts(*benchmark, *target, *actual))?;
            writeln!(out, "added holding {id}")?;
        }
        Command::Update {
            id,
            name,
            code,
            benchmark,
            target,
            actual,
        } => {
            let patch = HoldingPatch {
                name: name.clone(),
                code: code.clone(),
                benchmark_amount: *benchmark,
                target_amount: *target,
                actual_amount: *actual,
            };
            if patch.is_empty() {
                writeln!(out, "nothing to update")?;
            } else if session.update_holding(*id, &patch)? {
                writeln!(out, "updated holding {id}")?;
            } else {
                writeln!(out, "no holding with id {id}")?;
            }
        }
        Command::Delete { id } => match session.delete_holding(*id)? {
            Some(removed) => writeln!(out, "deleted holding {} ({})", removed.id, removed.name)?,
            None => writeln!(out, "no holding with id {id}")?,
        },
        Command::Export { output } => {
            let json = session.ledger().export_snapshot().to_json_pretty()?;
            match output {
                Some(path) => {
                    fs::write(path, json)?;
                    writeln!(out, "exported to {}", path.display())?;
                }
                None => writeln!(out, "{json}")?,
            }
        }
        Command::Import { input } => {
            let content = fs::read_to_string(input)?;
            let patch = SnapshotPatch::from_json(&content)?;
            session.import_snapshot(patch)?;
            writeln!(
                out,
                "imported {} ({} holdings)",
                input.display(),
                session.ledger().holdings().len()
            )?;
        }
        Command::Report { output } => match output {
            Some(path) => {
                write_holdings_report(session.ledger(), fs::File::create(path)?)?;
                writeln!(out, "report written to {}", path.display())?;
            }
            None => write_holdings_report(session.ledger(), &mut *out)?,
        },
        Command::Lookup { code } => {
            let info = fetch_fund(config, code)?;
            writeln!(out, "{}\t{}", info.code, info.name)?;
        }
        Command::Reset => {
            session.reset()?;
            writeln!(out, "ledger reset to the default seed")?;
        }
    }
    Ok(())
}

pub fn write_summary(ledger: &Ledger, out: &mut dyn Write) -> io::Result<()> {
    let summary = ledger.summary();
    writeln!(out, "Benchmark total:     {}", calc::fixed2(ledger.benchmark_total()))?;
    writeln!(out, "User total:          {}", calc::fixed2(ledger.user_total()))?;
    writeln!(out, "Position ratio:     {}", summary.position_ratio)?;
    writeln!(
        out,
        "Benchmark deployed:  {} ({}%)",
        calc::fixed2(summary.benchmark_current_total),
        summary.benchmark_position_ratio
    )?;
    writeln!(
        out,
        "User deployed:       {} ({}%)",
        summary.actual_invested_total, summary.user_position_ratio
    )?;
    writeln!(out, "Should invest:       {}", summary.should_invest_total)?;

    if ledger.holdings().is_empty() {
        writeln!(out, "\nNo holdings.")?;
        return Ok(());
    }

    writeln!(
        out,
        "\n{:>4}  {:<8}  {:>12}  {:>10}  {:>10}  {:>12}  Name",
        "ID", "Code", "Benchmark", "Target", "Actual", "Proportional"
    )?;
    for h in ledger.holdings() {
        writeln!(
            out,
            "{:>4}  {:<8}  {:>12}  {:>10}  {:>10}  {:>12}  {}",
            h.id,
            h.code,
            calc::fixed2(h.benchmark_amount),
            calc::fixed2(h.target_amount),
            calc::fixed2(h.actual_amount),
            ledger.proportional_amount(h),
            h.name
        )?;
    }
    Ok(())
}

pub fn write_json_summary(ledger: &Ledger, out: &mut dyn Write) -> Result<(), FundMirrorError> {
    let document = serde_json::json!({
        "benchmarkTotal": ledger.benchmark_total(),
        "userTotal": ledger.user_total(),
        "summary": ledger.summary(),
        "holdings": ledger.holdings(),
    });
    let json = serde_json::to_string_pretty(&document).map_err(|e| FundMirrorError::Snapshot {
        reason: e.to_string(),
    })?;
    writeln!(out, "{json}")?;
    Ok(())
}
