//! Dataset source port trait.

use crate::domain::dataset::DatasetFile;
use crate::domain::error::PriceStoreError;
use std::io::Read;

pub trait DatasetPort {
    /// Every source file available to load. Order is unspecified.
    fn locate(&self) -> Result<Vec<DatasetFile>, PriceStoreError>;

    fn open(&self, dataset: &DatasetFile) -> Result<Box<dyn Read + '_>, PriceStoreError>;
}
