//! Price record storage port traits.

use crate::domain::error::PriceStoreError;
use crate::domain::price_record::PriceRecord;

/// Write-only storage for price records.
pub trait StoragePort {
    fn initialize_schema(&self) -> Result<(), PriceStoreError>;

    /// Open a unit of work. Dropping it without [`UnitOfWork::commit`] rolls back.
    fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>, PriceStoreError>;

    /// Insert one batch in its own unit of work.
    fn insert_batch(&self, records: &[PriceRecord]) -> Result<(), PriceStoreError> {
        let mut uow = self.begin()?;
        uow.insert_batch(records)?;
        uow.commit()
    }
}

pub trait UnitOfWork {
    /// Insert all records; storage assigns their identifiers.
    fn insert_batch(&mut self, records: &[PriceRecord]) -> Result<(), PriceStoreError>;

    fn commit(self: Box<Self>) -> Result<(), PriceStoreError>;
}
