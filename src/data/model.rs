use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::error::{MergeError, Result};

/// An (identifier, height) pair from the location file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    /// Identifier exactly as written in the file.
    pub identifier: String,
    /// Height/location value, passed through untouched.
    pub height: String,
}

impl LocationRecord {
    /// Identifier with all whitespace removed and lower-cased, the form
    /// used when matching against sample ids.
    pub fn normalized_key(&self) -> String {
        self.identifier
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }
}

/// Immutable lookup built once from the location file.
///
/// Records keep the position of their first occurrence; a later record with
/// the same identifier replaces the height in place.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    records: Vec<LocationRecord>,
    index: HashMap<String, usize>,
}

impl LocationTable {
    /// Build a table, letting later duplicates overwrite earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = LocationRecord>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.upsert(record);
        }
        table
    }

    /// Build a table, rejecting any identifier that appears twice.
    pub fn from_records_strict(records: impl IntoIterator<Item = LocationRecord>) -> Result<Self> {
        let mut table = Self::default();
        for record in records {
            if table.index.contains_key(&record.identifier) {
                return Err(MergeError::DuplicateLocation {
                    identifier: record.identifier,
                });
            }
            table.upsert(record);
        }
        Ok(table)
    }

    fn upsert(&mut self, record: LocationRecord) {
        match self.index.get(&record.identifier) {
            Some(&i) => self.records[i].height = record.height,
            None => {
                self.index
                    .insert(record.identifier.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Number of records.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the raw identifier is present.
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Records in load order.
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Raw identifiers in load order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.identifier.as_str())
    }
}

/// One (angle, intensity) pair from a measurement file's data block.
/// Values stay text so the output reproduces the instrument export exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPoint {
    pub angle: String,
    pub intensity: String,
}

impl DataPoint {
    pub fn new(angle: impl Into<String>, intensity: impl Into<String>) -> Self {
        Self {
            angle: angle.into(),
            intensity: intensity.into(),
        }
    }
}

/// One row of the combined output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    #[serde(rename = "Alpha")]
    pub angle: String,
    #[serde(rename = "Intensity")]
    pub intensity: String,
    #[serde(rename = "Location")]
    pub location: String,
}

impl MergedRow {
    pub fn tagged(point: DataPoint, location: &str) -> Self {
        Self {
            angle: point.angle,
            intensity: point.intensity,
            location: location.to_string(),
        }
    }
}

/// Column headers of the combined output table.
pub const OUTPUT_HEADER: [&str; 3] = ["Alpha", "Intensity", "Location"];

/// Sample id of a measurement file: the file name up to its first `.`.
pub fn sample_id(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((id, _)) => id.to_string(),
        None => name,
    }
}

#[cfg(test)]
impl LocationTable {
    /// Height for a raw identifier.
    pub(crate) fn get(&self, identifier: &str) -> Option<&str> {
        self.index
            .get(identifier)
            .map(|&i| self.records[i].height.as_str())
    }
}
