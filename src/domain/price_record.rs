//! Raw rows and persisted price records.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Total digits of the open/high/low/close columns, NUMERIC(15, 6).
pub const PRICE_PRECISION: u32 = 15;
/// Total digits of the volume column, NUMERIC(20, 6).
pub const VOLUME_PRECISION: u32 = 20;
/// Fractional digits shared by every numeric column.
pub const DECIMAL_SCALE: u32 = 6;
/// Longest symbol the `price_history.symbol` column accepts.
pub const MAX_SYMBOL_LEN: usize = 10;

/// One data line of a source file, fields still unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source file.
    pub line: usize,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

/// One symbol's OHLCV data for one trade date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    /// Assigned by storage on insert.
    pub id: Option<i64>,
    pub symbol: String,
    pub trade_date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}
