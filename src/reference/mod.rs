//! Reference catalog parsing.
//!
//! The reference catalog arrives as a comma-separated export with one album
//! per row. The header only has its column count checked; data rows are read
//! positionally and rows too short to carry the needed columns are set aside
//! instead of failing the whole upload.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::AlbumRecord;

/// Minimum number of columns the header row must have.
pub const MIN_HEADER_COLUMNS: usize = 12;

const ID_COLUMN: usize = 0;
const FIRST_NAME_COLUMN: usize = 1;
const LAST_NAME_COLUMN: usize = 2;
const TITLE_COLUMN: usize = 5;
const RELEASE_COLUMN: usize = 6;

/// Minimum number of columns a data row needs to be usable.
pub const MIN_ROW_COLUMNS: usize = RELEASE_COLUMN + 1;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Error, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputFormatError {
    #[error("Reference catalog is empty")]
    Empty,

    #[error("Row {row} has {actual} columns, expected at least {expected}")]
    TooFewColumns {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed input near line {line}: {message}")]
    Malformed { line: u64, message: String },
}

/// Parsed reference albums, plus the data rows that could not be used.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReferenceCatalog {
    pub albums: Vec<AlbumRecord>,
    pub rejected_rows: Vec<InputFormatError>,
}

fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Reads a release field holding either a bare year or a `YYYY-MM-DD` date.
/// Anything else yields 0.
fn parse_release_year(value: &str) -> i32 {
    if let Ok(year) = value.parse::<i32>() {
        return year;
    }
    value
        .get(..4)
        .filter(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(0)
}

fn record_from_row(row: &csv::StringRecord) -> AlbumRecord {
    let field = |idx: usize| row.get(idx).unwrap_or("");

    let first = field(FIRST_NAME_COLUMN);
    let last = field(LAST_NAME_COLUMN);
    let contributor = format!("{} {}", first, last).trim().to_string();

    let id = field(ID_COLUMN);
    AlbumRecord {
        external_id: (!id.is_empty()).then(|| id.to_string()),
        title: field(TITLE_COLUMN).to_string(),
        primary_contributor: contributor,
        release_year: parse_release_year(field(RELEASE_COLUMN)),
        description: None,
        image_ref: None,
    }
}

fn malformed(err: csv::Error) -> InputFormatError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    InputFormatError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Parses an uploaded reference catalog.
///
/// Fails when the input is empty, undecodable, or its header is too narrow.
/// Short data rows are reported in [`ReferenceCatalog::rejected_rows`] with
/// their row index (the header is row 0).
pub fn parse_reference_catalog(data: &[u8]) -> Result<ReferenceCatalog, InputFormatError> {
    let data = strip_bom(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = reader.records();

    let header = match rows.next() {
        None => return Err(InputFormatError::Empty),
        Some(header) => header.map_err(malformed)?,
    };
    if header.len() < MIN_HEADER_COLUMNS {
        return Err(InputFormatError::TooFewColumns {
            row: 0,
            expected: MIN_HEADER_COLUMNS,
            actual: header.len(),
        });
    }

    let mut catalog = ReferenceCatalog::default();
    for (idx, row) in rows.enumerate() {
        let row_number = idx + 1;
        let row = row.map_err(malformed)?;

        if row.len() < MIN_ROW_COLUMNS {
            let rejected = InputFormatError::TooFewColumns {
                row: row_number,
                expected: MIN_ROW_COLUMNS,
                actual: row.len(),
            };
            warn!("Skipping reference row: {}", rejected);
            catalog.rejected_rows.push(rejected);
            continue;
        }

        catalog.albums.push(record_from_row(&row));
    }

    debug!(
        "Parsed {} reference albums ({} rows rejected)",
        catalog.albums.len(),
        catalog.rejected_rows.len()
    );
    Ok(catalog)
}
