//! Parse headerless CSV text into a `LocationSequence`.
//!
//! Column layout (0-indexed): id, label, date, latitude, longitude, name.
//!
//! ```text
//! 1,RouteA,2024-01-01,10.0,20.0,Alice
//! 2,RouteA,2024-01-02,abc,21.0,Bob      <- dropped, latitude is not a number
//! 3,RouteA,2024-01-03,11.0,21.5,Carl
//! ```

use csv::{ReaderBuilder, StringRecord};
use std::io::Read;

use super::types::{FileParseError, LocationRecord, LocationSequence, RowValidationError};

const COL_ID: usize = 0;
const COL_LABEL: usize = 1;
const COL_DATE: usize = 2;
const COL_LATITUDE: usize = 3;
const COL_LONGITUDE: usize = 4;
const COL_NAME: usize = 5;

/// Parse CSV text into a sequence of validated records.
///
/// # Parameters
///
/// * `raw` - Whole file contents, no header row
///
/// # Returns
///
/// `Ok(sequence)` with every row whose coordinates parse, in input order.
/// Rows with invalid coordinates are logged and skipped. `Err` only when the
/// input as a whole cannot be read as CSV.
pub fn parse(raw: &str) -> Result<LocationSequence, FileParseError> {
    parse_reader(raw.as_bytes())
}

/// Invalid UTF-8 anywhere in the input rejects the whole input.
pub(super) fn parse_reader<R: Read>(reader: R) -> Result<LocationSequence, FileParseError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

    let mut records = Vec::new();
    let mut rejected = 0usize;
    for result in csv_reader.records() {
        let row = result.map_err(|e| {
            if e.is_io_error() {
                FileParseError::Read(e.to_string())
            } else {
                FileParseError::Malformed(e.to_string())
            }
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        match validate_row(&row, line) {
            Ok(record) => records.push(record),
            Err(e) => {
                log::warn!("{}", e);
                rejected += 1;
            }
        }
    }

    log::debug!("Parsed {} location records, rejected {}", records.len(), rejected);
    Ok(LocationSequence::new(records))
}

/// Turn one CSV row into a record, or explain why it was rejected.
fn validate_row(row: &StringRecord, line: u64) -> Result<LocationRecord, RowValidationError> {
    let raw_latitude = row.get(COL_LATITUDE);
    let raw_longitude = row.get(COL_LONGITUDE);

    match (raw_latitude.and_then(parse_coordinate), raw_longitude.and_then(parse_coordinate)) {
        (Some(latitude), Some(longitude)) => Ok(LocationRecord {
            id: column(row, COL_ID),
            label: column(row, COL_LABEL),
            date: column(row, COL_DATE),
            latitude,
            longitude,
            name: column(row, COL_NAME),
        }),
        _ => Err(RowValidationError {
            line,
            latitude: raw_latitude.map(str::to_string),
            longitude: raw_longitude.map(str::to_string),
        }),
    }
}

/// Parse the leading number of a coordinate field.
///
/// Leading whitespace is skipped and anything after the number is ignored,
/// so `48.8566N` reads as `48.8566`. Fields without a leading number and
/// non-finite values give `None`.
fn parse_coordinate(value: &str) -> Option<f64> {
    let text = value.trim_start();
    text[..numeric_prefix_len(text)].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Length of the longest leading `[+-]digits[.digits][(e|E)[+-]digits]` run.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let skip_digits = |start: usize| {
        let mut i = start;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        (i, i - start)
    };

    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let (mut end, int_digits) = skip_digits(sign);
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        (end, frac_digits) = skip_digits(end + 1);
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let (exp_end, exp_digits) = skip_digits(end + 1 + exp_sign);
        if exp_digits > 0 {
            end = exp_end;
        }
    }
    end
}

/// Copy a text column verbatim; absent columns become empty strings.
fn column(row: &StringRecord, index: usize) -> String {
    row.get(index).unwrap_or_default().to_string()
}
