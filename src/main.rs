use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use windo_catalog_sync::{
    all_catalogs, sync_replace, sync_upsert, CatalogStore, RunStatus, SqliteCatalogStore,
    SyncReport,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "catalog-sync", about = "Windo catalog maintenance tool")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert-sync every catalog into the store (safe, additive).
    Sync {
        /// Path to the SQLite catalog database file.
        #[clap(value_parser = parse_path)]
        db_path: PathBuf,
    },
    /// Destructively replace every catalog table, purging dependents first.
    ///
    /// Deletes all gift messages and all existing catalog rows before
    /// re-inserting the compiled-in catalogs.
    Reset {
        /// Path to the SQLite catalog database file.
        #[clap(value_parser = parse_path)]
        db_path: PathBuf,

        /// Acknowledge that existing rows and their dependents will be
        /// irreversibly deleted.
        #[clap(long)]
        yes: bool,
    },
    /// Show per-table row counts and recent sync runs.
    Status {
        /// Path to the SQLite catalog database file.
        #[clap(value_parser = parse_path)]
        db_path: PathBuf,

        /// Number of recent sync runs to show.
        #[clap(long, default_value_t = 10)]
        runs: usize,
    },
}

fn sync_all(store: &dyn CatalogStore, destructive: bool) -> Result<Vec<SyncReport>> {
    let mut reports = Vec::new();
    for seed in all_catalogs() {
        let report = if destructive {
            sync_replace(&seed.catalog, store, seed.dependents)?
        } else {
            sync_upsert(&seed.catalog, store)?
        };
        reports.push(report);
    }
    Ok(reports)
}

/// Run a full sync of all catalogs, bracketing it with run-log entries.
/// Run-log write failures are reported as warnings and never mask the
/// sync outcome.
fn run_sync(store: &dyn CatalogStore, destructive: bool) -> Result<()> {
    let mode = if destructive { "reset" } else { "sync" };
    let run_id = match store.record_run_start(mode) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!("Could not record sync run start: {}", e);
            None
        }
    };

    let result = sync_all(store, destructive);

    if let Some(run_id) = run_id {
        let (status, message) = match &result {
            Ok(_) => (RunStatus::Completed, None),
            Err(e) => (RunStatus::Failed, Some(format!("{:#}", e))),
        };
        if let Err(e) = store.record_run_finish(run_id, status, message.as_deref()) {
            warn!("Could not record sync run finish: {}", e);
        }
    }

    let reports = result?;
    let total_written: usize = reports.iter().map(|r| r.records_written).sum();
    info!(
        "{} completed: {} records written across {} catalogs",
        mode,
        total_written,
        reports.len()
    );
    Ok(())
}

fn show_status(store: &dyn CatalogStore, runs: usize) -> Result<()> {
    for seed in all_catalogs() {
        let table = seed.catalog.table();
        info!(
            "{}: {} rows ({} in catalog)",
            table,
            store.count(table)?,
            seed.catalog.records().len()
        );
    }
    for dependent in windo_catalog_sync::GIFT_DEPENDENTS {
        info!("{}: {} rows", dependent.table, store.count(dependent.table)?);
    }

    let recent = store.recent_runs(runs)?;
    if recent.is_empty() {
        info!("No sync runs recorded yet");
    }
    for run in recent {
        info!(
            "run {} [{}] started {} status {}{}",
            run.id,
            run.mode,
            run.started_at.to_rfc3339(),
            run.status.as_str(),
            run.error_message
                .as_deref()
                .map(|m| format!(" ({})", m))
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Sync { db_path } => {
            info!("Opening catalog database at {:?}...", db_path);
            let store = SqliteCatalogStore::open(&db_path)?;
            run_sync(&store, false)
        }
        Command::Reset { db_path, yes } => {
            if !yes {
                bail!(
                    "reset deletes all catalog rows and their dependents; \
                     re-run with --yes to confirm"
                );
            }
            info!("Opening catalog database at {:?}...", db_path);
            let store = SqliteCatalogStore::open(&db_path)?;
            run_sync(&store, true)
        }
        Command::Status { db_path, runs } => {
            let store = SqliteCatalogStore::open(&db_path)?;
            show_status(&store, runs)
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    if let Err(e) = run(cli_args.command) {
        error!("Catalog sync failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
