//! Raw row to price record conversion.

use crate::domain::error::PriceStoreError;
use crate::domain::price_record::{
    DECIMAL_SCALE, PRICE_PRECISION, PriceRecord, RawRow, VOLUME_PRECISION,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Convert every row of one file. Fails on the first malformed field, in
/// which case nothing for the file is returned.
pub fn materialize(rows: &[RawRow], symbol: &str) -> Result<Vec<PriceRecord>, PriceStoreError> {
    rows.iter().map(|row| to_record(row, symbol)).collect()
}

pub fn to_record(row: &RawRow, symbol: &str) -> Result<PriceRecord, PriceStoreError> {
    Ok(PriceRecord {
        id: None,
        symbol: symbol.to_string(),
        trade_date: parse_iso_date(row.line, &row.date)?,
        open: parse_decimal(row.line, "open", &row.open, PRICE_PRECISION)?,
        high: parse_decimal(row.line, "high", &row.high, PRICE_PRECISION)?,
        low: parse_decimal(row.line, "low", &row.low, PRICE_PRECISION)?,
        close: parse_decimal(row.line, "close", &row.close, PRICE_PRECISION)?,
        volume: parse_decimal(row.line, "volume", &row.volume, VOLUME_PRECISION)?,
    })
}

/// Strict `YYYY-MM-DD`: chrono alone would accept unpadded months and days.
pub fn parse_iso_date(line: usize, value: &str) -> Result<NaiveDate, PriceStoreError> {
    let malformed = |reason: String| PriceStoreError::MalformedField {
        line,
        field: "trade date",
        value: value.to_string(),
        reason,
    };

    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shape_ok {
        return Err(malformed("expected YYYY-MM-DD".into()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| malformed(e.to_string()))
}

/// Parse exact decimal text and fit it to NUMERIC(`precision`, 6).
pub fn parse_decimal(
    line: usize,
    field: &'static str,
    value: &str,
    precision: u32,
) -> Result<Decimal, PriceStoreError> {
    let malformed = |reason: String| PriceStoreError::MalformedField {
        line,
        field,
        value: value.to_string(),
        reason,
    };

    if value.is_empty() || value.contains('_') {
        return Err(malformed("not a decimal number".into()));
    }

    let parsed = if value.contains(['e', 'E']) {
        Decimal::from_scientific(value)
    } else {
        Decimal::from_str(value)
    }
    .map_err(|e| malformed(e.to_string()))?;

    let mut scaled =
        parsed.round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(DECIMAL_SCALE);

    let integer_digits = scaled.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if integer_digits > precision - DECIMAL_SCALE {
        return Err(malformed(format!(
            "exceeds NUMERIC({precision}, {DECIMAL_SCALE})"
        )));
    }

    Ok(scaled)
}
