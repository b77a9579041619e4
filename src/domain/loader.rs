//! Dataset load orchestration: locate, parse, materialize, write.

use crate::domain::dataset::DatasetFile;
use crate::domain::error::PriceStoreError;
use crate::domain::materializer::materialize;
use crate::domain::row_parser::parse_rows;
use crate::ports::dataset_port::DatasetPort;
use crate::ports::storage_port::{StoragePort, UnitOfWork};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// How much of a load shares one storage transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionScope {
    /// All files commit together; any failure rolls back the whole run.
    #[default]
    Run,
    /// Each file commits on its own.
    File,
}

impl FromStr for TransactionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" => Ok(TransactionScope::Run),
            "file" => Ok(TransactionScope::File),
            other => Err(format!("unknown transaction scope '{other}' (expected run or file)")),
        }
    }
}

impl fmt::Display for TransactionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionScope::Run => write!(f, "run"),
            TransactionScope::File => write!(f, "file"),
        }
    }
}

/// Loader settings injected by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Gate for the startup load.
    pub load_csv: bool,
    pub dataset_dir: PathBuf,
    pub extension: String,
    pub symbol_suffix: String,
    pub scope: TransactionScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub symbol: String,
    pub inserted: usize,
    /// Lines dropped for a field-count mismatch.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub files: Vec<FileSummary>,
}

impl LoadSummary {
    pub fn inserted(&self) -> usize {
        self.files.iter().map(|f| f.inserted).sum()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped).sum()
    }
}

/// Startup entry point: loads every dataset when `enabled`, otherwise does nothing.
pub fn run_startup_load(
    enabled: bool,
    datasets: &dyn DatasetPort,
    store: &dyn StoragePort,
    scope: TransactionScope,
) -> Result<Option<LoadSummary>, PriceStoreError> {
    if !enabled {
        debug!("CSV load disabled, skipping");
        return Ok(None);
    }

    info!("Loading CSV datasets into database...");
    let summary = load_all_datasets(datasets, store, scope)?;
    info!(
        files = summary.files.len(),
        inserted = summary.inserted(),
        "CSV load complete."
    );
    Ok(Some(summary))
}

/// Load every located dataset. Any failure is returned wrapped in
/// [`PriceStoreError::LoadFailed`]; the files already written are kept or
/// rolled back according to `scope`.
pub fn load_all_datasets(
    datasets: &dyn DatasetPort,
    store: &dyn StoragePort,
    scope: TransactionScope,
) -> Result<LoadSummary, PriceStoreError> {
    load_inner(datasets, store, scope).map_err(PriceStoreError::load_failed)
}

fn load_inner(
    datasets: &dyn DatasetPort,
    store: &dyn StoragePort,
    scope: TransactionScope,
) -> Result<LoadSummary, PriceStoreError> {
    let files = datasets.locate()?;
    let mut summary = LoadSummary::default();

    match scope {
        TransactionScope::Run => {
            let mut uow = store.begin()?;
            for file in &files {
                summary.files.push(load_file(datasets, file, uow.as_mut())?);
            }
            uow.commit()?;
        }
        TransactionScope::File => {
            for file in &files {
                let mut uow = store.begin()?;
                let file_summary = load_file(datasets, file, uow.as_mut())?;
                uow.commit()?;
                summary.files.push(file_summary);
            }
        }
    }

    Ok(summary)
}

/// Parse and materialize every dataset without touching storage.
pub fn scan_datasets(datasets: &dyn DatasetPort) -> Result<LoadSummary, PriceStoreError> {
    let mut summary = LoadSummary::default();
    for file in datasets.locate()? {
        let parsed = parse_rows(datasets.open(&file)?)?;
        let records = materialize(&parsed.rows, &file.symbol)?;
        summary.files.push(FileSummary {
            inserted: records.len(),
            skipped: parsed.skipped,
            name: file.name,
            symbol: file.symbol,
        });
    }
    Ok(summary)
}

/// Parse and materialize one file fully, then write it as a single batch.
pub fn load_file(
    datasets: &dyn DatasetPort,
    file: &DatasetFile,
    uow: &mut dyn UnitOfWork,
) -> Result<FileSummary, PriceStoreError> {
    let parsed = parse_rows(datasets.open(file)?)?;
    if parsed.skipped > 0 {
        debug!(
            file = %file.name,
            skipped = parsed.skipped,
            "dropped lines with wrong field count"
        );
    }

    let records = materialize(&parsed.rows, &file.symbol)?;
    uow.insert_batch(&records)?;

    info!(file = %file.name, symbol = %file.symbol, rows = records.len(), "loaded");
    Ok(FileSummary {
        name: file.name.clone(),
        symbol: file.symbol.clone(),
        inserted: records.len(),
        skipped: parsed.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_scope_parses_case_insensitively() {
        assert_eq!("run".parse::<TransactionScope>(), Ok(TransactionScope::Run));
        assert_eq!(" File ".parse::<TransactionScope>(), Ok(TransactionScope::File));
        assert!("batch".parse::<TransactionScope>().is_err());
    }

    #[test]
    fn transaction_scope_defaults_to_run() {
        assert_eq!(TransactionScope::default(), TransactionScope::Run);
        assert_eq!(TransactionScope::File.to_string(), "file");
    }

    #[test]
    fn summary_totals() {
        let summary = LoadSummary {
            files: vec![
                FileSummary {
                    name: "ko_us_d.csv".into(),
                    symbol: "KO".into(),
                    inserted: 3,
                    skipped: 0,
                },
                FileSummary {
                    name: "ibm_us_d.csv".into(),
                    symbol: "IBM".into(),
                    inserted: 1,
                    skipped: 1,
                },
            ],
        };
        assert_eq!(summary.inserted(), 4);
        assert_eq!(summary.skipped(), 1);
    }
}
