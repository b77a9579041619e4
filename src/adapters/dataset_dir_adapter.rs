//! Directory-backed dataset source.

use crate::domain::dataset::DatasetFile;
use crate::domain::error::PriceStoreError;
use crate::ports::dataset_port::DatasetPort;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "csv";
pub const DEFAULT_SYMBOL_SUFFIX: &str = "_us_d.csv";

pub struct DatasetDirAdapter {
    dir: PathBuf,
    extension: String,
    symbol_suffix: String,
}

impl DatasetDirAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self::with_pattern(dir, DEFAULT_EXTENSION, DEFAULT_SYMBOL_SUFFIX)
    }

    pub fn with_pattern(dir: PathBuf, extension: &str, symbol_suffix: &str) -> Self {
        Self {
            dir,
            extension: extension.trim_start_matches('.').to_string(),
            symbol_suffix: symbol_suffix.to_string(),
        }
    }

    fn discovery_error(&self, reason: impl ToString) -> PriceStoreError {
        PriceStoreError::Discovery {
            dir: self.dir.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl DatasetPort for DatasetDirAdapter {
    fn locate(&self) -> Result<Vec<DatasetFile>, PriceStoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| self.discovery_error(e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.discovery_error(e))?;
            let file_type = entry.file_type().map_err(|e| self.discovery_error(e))?;
            if file_type.is_dir() {
                continue;
            }

            let path = entry.path();
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension);
            if !matches_extension {
                continue;
            }

            // Non UTF-8 names cannot yield a symbol.
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            files.push(DatasetFile::new(name, &self.symbol_suffix));
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    fn open(&self, dataset: &DatasetFile) -> Result<Box<dyn Read + '_>, PriceStoreError> {
        let file = File::open(self.dir.join(&dataset.name))?;
        Ok(Box::new(BufReader::new(file)))
    }
}
