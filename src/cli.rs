//! CLI definition and host startup sequence.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::adapters::dataset_dir_adapter::{
    DatasetDirAdapter, DEFAULT_EXTENSION, DEFAULT_SYMBOL_SUFFIX,
};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::PriceStoreError;
use crate::domain::loader::{self, LoaderConfig, LoadSummary, TransactionScope};
use crate::ports::config_port::ConfigPort;
use crate::ports::storage_port::StoragePort;

#[derive(Parser, Debug)]
#[command(name = "pricestore", about = "Daily price file loader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the startup sequence; loads datasets only when [loader] load_csv is set
    Start {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Load every dataset now, ignoring [loader] load_csv
    Load {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Parse every dataset and report row counts without writing
    Scan {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Postgres,
}

pub fn run(cli: Cli) -> ExitCode {
    let (config_path, force) = match &cli.command {
        Command::Start { config } => (config, false),
        Command::Load { config } => (config, true),
        Command::Scan { config } => (config, false),
    };

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Scan { .. } => run_scan(&config),
        Command::Start { .. } | Command::Load { .. } => run_startup(&config, force).map(|_| ()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e.chain());
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, PriceStoreError> {
    FileConfigAdapter::from_file(path)
}

/// RUST_LOG wins; otherwise `[logging] level`, default `info`.
pub fn init_logging(config: &dyn ConfigPort) {
    let level = config
        .get_string("logging", "level")
        .unwrap_or_else(|| "info".to_string());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn build_loader_config(config: &dyn ConfigPort) -> Result<LoaderConfig, PriceStoreError> {
    let scope = match config.get_string("loader", "transaction_scope") {
        Some(value) => value
            .parse::<TransactionScope>()
            .map_err(|reason| PriceStoreError::ConfigInvalid {
                section: "loader".into(),
                key: "transaction_scope".into(),
                reason,
            })?,
        None => TransactionScope::default(),
    };

    let extension = config
        .get_string("loader", "extension")
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    if extension.trim_start_matches('.').is_empty() {
        return Err(PriceStoreError::ConfigInvalid {
            section: "loader".into(),
            key: "extension".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(LoaderConfig {
        load_csv: config.get_bool("loader", "load_csv")?.unwrap_or(false),
        dataset_dir: PathBuf::from(
            config
                .get_string("loader", "dataset_dir")
                .unwrap_or_else(|| "datasets".to_string()),
        ),
        extension,
        symbol_suffix: config
            .get_string("loader", "symbol_suffix")
            .unwrap_or_else(|| DEFAULT_SYMBOL_SUFFIX.to_string()),
        scope,
    })
}

pub fn storage_backend(config: &dyn ConfigPort) -> Result<StorageBackend, PriceStoreError> {
    match config
        .get_string("storage", "backend")
        .map(|b| b.trim().to_lowercase())
        .as_deref()
    {
        None | Some("sqlite") => Ok(StorageBackend::Sqlite),
        Some("postgres") | Some("postgresql") => Ok(StorageBackend::Postgres),
        Some(other) => Err(PriceStoreError::ConfigInvalid {
            section: "storage".into(),
            key: "backend".into(),
            reason: format!("unknown backend '{other}' (expected sqlite or postgres)"),
        }),
    }
}

pub fn open_storage(config: &dyn ConfigPort) -> Result<Box<dyn StoragePort>, PriceStoreError> {
    match storage_backend(config)? {
        StorageBackend::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_adapter::SqliteAdapter;
                Ok(Box::new(SqliteAdapter::from_config(config)?))
            }
            #[cfg(not(feature = "sqlite"))]
            {
                Err(PriceStoreError::ConfigInvalid {
                    section: "storage".into(),
                    key: "backend".into(),
                    reason: "sqlite feature is not enabled".into(),
                })
            }
        }
        StorageBackend::Postgres => {
            #[cfg(feature = "postgres")]
            {
                use crate::adapters::postgres_adapter::PostgresAdapter;
                Ok(Box::new(PostgresAdapter::from_config(config)?))
            }
            #[cfg(not(feature = "postgres"))]
            {
                Err(PriceStoreError::ConfigInvalid {
                    section: "storage".into(),
                    key: "backend".into(),
                    reason: "postgres feature is not enabled".into(),
                })
            }
        }
    }
}

pub fn dataset_source(loader_config: &LoaderConfig) -> DatasetDirAdapter {
    DatasetDirAdapter::with_pattern(
        loader_config.dataset_dir.clone(),
        &loader_config.extension,
        &loader_config.symbol_suffix,
    )
}

/// Host startup: open storage, ensure the schema, then run the gated load.
/// `force` loads even when `[loader] load_csv` is off.
pub fn run_startup(
    config: &dyn ConfigPort,
    force: bool,
) -> Result<Option<LoadSummary>, PriceStoreError> {
    let loader_config = build_loader_config(config)?;
    let store = open_storage(config)?;
    store.initialize_schema()?;

    info!(
        dir = %loader_config.dataset_dir.display(),
        scope = %loader_config.scope,
        "storage ready"
    );

    let datasets = dataset_source(&loader_config);
    loader::run_startup_load(
        loader_config.load_csv || force,
        &datasets,
        store.as_ref(),
        loader_config.scope,
    )
}

fn run_scan(config: &dyn ConfigPort) -> Result<(), PriceStoreError> {
    let loader_config = build_loader_config(config)?;
    let datasets = dataset_source(&loader_config);
    let summary = loader::scan_datasets(&datasets)?;

    for file in &summary.files {
        println!(
            "{}\t{}\t{} rows\t{} skipped",
            file.symbol, file.name, file.inserted, file.skipped
        );
    }
    eprintln!(
        "{} files, {} rows, {} skipped lines",
        summary.files.len(),
        summary.inserted(),
        summary.skipped()
    );
    Ok(())
}
