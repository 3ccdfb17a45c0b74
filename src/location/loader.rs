//! Read a location file from disk.
//!
//! The whole file is parsed in memory; there is no streaming or tailing.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::parser::parse_reader;
use super::types::{FileParseError, LocationSequence};

/// Buffer size for reading location files (8KB).
const BUFFER_SIZE: usize = 8 * 1024;

/// Open and parse a single CSV file.
///
/// # Returns
///
/// `Ok(sequence)` on success (possibly empty if no row validated),
/// `Err(FileParseError)` if the file cannot be opened or read as CSV.
pub fn load_sequence(path: &Path) -> Result<LocationSequence, FileParseError> {
    let file = File::open(path).map_err(|e| FileParseError::Read(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let sequence = parse_reader(reader)?;
    log::info!("Loaded {} location records from {}", sequence.len(), path.display());
    Ok(sequence)
}

/// Load the first of several selected files.
///
/// Only one sequence can play at a time; any further paths are logged and ignored.
pub fn load_first<P: AsRef<Path>>(paths: &[P]) -> Result<LocationSequence, FileParseError> {
    let (first, rest) = paths.split_first().ok_or_else(|| FileParseError::Read("no file selected".to_string()))?;
    for ignored in rest {
        log::warn!("Ignoring additional file {}", ignored.as_ref().display());
    }
    load_sequence(first.as_ref())
}
