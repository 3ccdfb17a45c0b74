//! Type definitions for location records and load errors.

use std::sync::Arc;

/// A single validated row of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub id: String,
    /// Route or marker name.
    pub label: String,
    /// Kept as written in the file; never interpreted.
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Ordered records from one successful parse, in input row order.
///
/// Shared between the playback task and the UI, so cloning only bumps a
/// reference count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationSequence {
    records: Arc<[LocationRecord]>,
}

impl LocationSequence {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        Self { records: records.into() }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LocationRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationRecord> {
        self.records.iter()
    }

    /// Bounding box of all coordinates, `None` for an empty sequence.
    pub fn bounds(&self) -> Option<GeoBounds> {
        let first = self.records.first()?;
        let mut bounds = GeoBounds {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };
        for r in self.records.iter().skip(1) {
            bounds.min_lat = bounds.min_lat.min(r.latitude);
            bounds.max_lat = bounds.max_lat.max(r.latitude);
            bounds.min_lon = bounds.min_lon.min(r.longitude);
            bounds.max_lon = bounds.max_lon.max(r.longitude);
        }
        Some(bounds)
    }
}

impl<'a> IntoIterator for &'a LocationSequence {
    type Item = &'a LocationRecord;
    type IntoIter = std::slice::Iter<'a, LocationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// A row whose latitude or longitude is not a finite number.
///
/// Never surfaced to the user; the row is dropped and this is logged.
#[derive(Debug, Clone, PartialEq)]
pub struct RowValidationError {
    /// 1-based line number in the input.
    pub line: u64,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl std::fmt::Display for RowValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid latitude or longitude on line {}: {}, {}",
            self.line,
            self.latitude.as_deref().unwrap_or("<missing>"),
            self.longitude.as_deref().unwrap_or("<missing>")
        )
    }
}

impl std::error::Error for RowValidationError {}

/// Error type for failures that reject the whole input.
#[derive(Debug)]
pub enum FileParseError {
    Read(String),
    Malformed(String),
}

impl std::fmt::Display for FileParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileParseError::Read(msg) => write!(f, "Failed to read file: {}", msg),
            FileParseError::Malformed(msg) => write!(f, "Failed to parse CSV: {}", msg),
        }
    }
}

impl std::error::Error for FileParseError {}
