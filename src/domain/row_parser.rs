//! Header-skipping, six-field line parser for price files.

use crate::domain::error::PriceStoreError;
use crate::domain::price_record::RawRow;
use std::io::Read;

pub const FIELD_COUNT: usize = 6;

/// Rows parsed from one file plus the count of lines dropped for a bad field count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub rows: Vec<RawRow>,
    pub skipped: usize,
}

/// Parse a whole price file into memory.
///
/// The first physical line is the header and is ignored, whatever it holds.
/// Blank or whitespace-only lines are skipped, and so is any line that does
/// not split into exactly six comma-separated fields once trailing empty
/// fields are dropped. Neither raises an error.
pub fn parse_rows<R: Read>(mut reader: R) -> Result<ParsedFile, PriceStoreError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let Some((_header, body)) = text.split_once('\n') else {
        return Ok(ParsedFile::default());
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(body.as_bytes());

    let mut parsed = ParsedFile::default();
    let mut lines = LineCursor::new(body, 2);

    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let scan_start = record
            .position()
            .map(|p| p.byte() as usize)
            .unwrap_or_default();
        let line = lines.line_of_record(scan_start);

        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        let mut fields: Vec<&str> = record.iter().collect();
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
        if fields.len() != FIELD_COUNT {
            parsed.skipped += 1;
            continue;
        }

        parsed.rows.push(RawRow {
            line,
            date: fields[0].trim().to_string(),
            open: fields[1].trim().to_string(),
            high: fields[2].trim().to_string(),
            low: fields[3].trim().to_string(),
            close: fields[4].trim().to_string(),
            volume: fields[5].trim().to_string(),
        });
    }

    Ok(parsed)
}

/// Maps csv record offsets to physical line numbers.
///
/// The reader reports where it began scanning for a record, which is before
/// any empty lines it swallowed, so those terminators are skipped here.
struct LineCursor<'a> {
    text: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str, first_line: usize) -> Self {
        Self {
            text: text.as_bytes(),
            pos: 0,
            line: first_line,
        }
    }

    fn line_of_record(&mut self, scan_start: usize) -> usize {
        let rest = self.text.get(scan_start..).unwrap_or_default();
        let start = scan_start
            + rest
                .iter()
                .take_while(|&&b| matches!(b, b'\r' | b'\n'))
                .count();
        let start = start.max(self.pos);

        self.line += self.text[self.pos..start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.pos = start;
        self.line
    }
}

fn csv_error(err: csv::Error) -> PriceStoreError {
    match err.into_kind() {
        csv::ErrorKind::Io(e) => PriceStoreError::Io(e),
        other => PriceStoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{other:?}"),
        )),
    }
}
