#![allow(dead_code)]

use pricestore::domain::dataset::DatasetFile;
use pricestore::domain::error::PriceStoreError;
use pricestore::domain::price_record::PriceRecord;
use pricestore::ports::dataset_port::DatasetPort;
use pricestore::ports::storage_port::{StoragePort, UnitOfWork};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

pub const HEADER: &str = "Date,Open,High,Low,Close,Volume\n";
pub const SUFFIX: &str = "_us_d.csv";

/// In-memory storage with real unit-of-work semantics.
pub struct MemoryStore {
    pub committed: RefCell<Vec<PriceRecord>>,
    next_id: Cell<i64>,
    /// 1-based batch number that fails, counted across the store's lifetime.
    fail_on_batch: Option<usize>,
    batches: Cell<usize>,
    pub batch_sizes: RefCell<Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            committed: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            fail_on_batch: None,
            batches: Cell::new(0),
            batch_sizes: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on_batch(n: usize) -> Self {
        Self {
            fail_on_batch: Some(n),
            ..Self::new()
        }
    }

    pub fn records(&self) -> Vec<PriceRecord> {
        self.committed.borrow().clone()
    }

    pub fn count_symbol(&self, symbol: &str) -> usize {
        self.committed
            .borrow()
            .iter()
            .filter(|r| r.symbol == symbol)
            .count()
    }
}

impl StoragePort for MemoryStore {
    fn initialize_schema(&self) -> Result<(), PriceStoreError> {
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>, PriceStoreError> {
        Ok(Box::new(MemoryUnitOfWork {
            store: self,
            pending: Vec::new(),
        }))
    }
}

struct MemoryUnitOfWork<'a> {
    store: &'a MemoryStore,
    pending: Vec<PriceRecord>,
}

impl UnitOfWork for MemoryUnitOfWork<'_> {
    fn insert_batch(&mut self, records: &[PriceRecord]) -> Result<(), PriceStoreError> {
        let batch = self.store.batches.get() + 1;
        self.store.batches.set(batch);
        if self.store.fail_on_batch == Some(batch) {
            return Err(PriceStoreError::DatabaseQuery {
                reason: format!("batch {batch} rejected"),
            });
        }

        self.store.batch_sizes.borrow_mut().push(records.len());
        for record in records {
            let id = self.store.next_id.get();
            self.store.next_id.set(id + 1);
            self.pending.push(PriceRecord {
                id: Some(id),
                ..record.clone()
            });
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), PriceStoreError> {
        let store = self.store;
        store.committed.borrow_mut().extend(self.pending);
        Ok(())
    }
}

/// Dataset source backed by in-memory file contents.
pub struct MemoryDatasets {
    pub files: BTreeMap<String, String>,
}

impl MemoryDatasets {
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        self.files.insert(name.to_string(), content.to_string());
        self
    }
}

impl DatasetPort for MemoryDatasets {
    fn locate(&self) -> Result<Vec<DatasetFile>, PriceStoreError> {
        Ok(self
            .files
            .keys()
            .map(|name| DatasetFile::new(name.clone(), SUFFIX))
            .collect())
    }

    fn open(&self, dataset: &DatasetFile) -> Result<Box<dyn Read + '_>, PriceStoreError> {
        let content = self.files.get(&dataset.name).ok_or_else(|| {
            PriceStoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                dataset.name.clone(),
            ))
        })?;
        Ok(Box::new(content.as_bytes()))
    }
}

pub fn csv_file(lines: &[&str]) -> String {
    let mut content = HEADER.to_string();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// `ko_us_d.csv` with 3 valid rows and `ibm_us_d.csv` with 1 valid and 1 five-field row.
pub fn ko_and_ibm() -> Vec<(&'static str, String)> {
    vec![
        (
            "ko_us_d.csv",
            csv_file(&[
                "1970-01-02,1.234567,1.300000,1.200000,1.250000,1000000.000000",
                "1970-01-05,1.25,1.31,1.22,1.30,1200000",
                "1970-01-06,1.30,1.35,1.28,1.33,900000",
            ]),
        ),
        (
            "ibm_us_d.csv",
            csv_file(&[
                "1970-01-02,18.225,18.287,18.2,18.237,15625",
                "1970-01-05,18.3,18.4,18.2,18.35",
            ]),
        ),
    ]
}

pub fn memory_datasets(files: &[(&str, String)]) -> MemoryDatasets {
    files
        .iter()
        .fold(MemoryDatasets::new(), |ds, (name, content)| ds.with_file(name, content))
}

pub fn write_datasets(dir: &Path, files: &[(&str, String)]) {
    for (name, content) in files {
        std::fs::write(dir.join(name), content).unwrap();
    }
}
