use std::borrow::Cow;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use glob::{MatchOptions, Pattern};

use super::model::{DataPoint, LocationRecord, LocationTable};
use crate::error::{MergeError, Result};

/// Location rows whose identifier ends like this are header noise.
const NOISE_ROW_PATTERN: &str = "*sample";

/// First field of the row that separates the metadata preamble from the
/// data block in a measurement file.
const DATA_HEADER_MARKER: &str = "Angle";

/// Measurement files are semicolon separated.
const MEASUREMENT_DELIMITER: u8 = b';';

/// File names picked up as measurement files (matched case-insensitively).
const MEASUREMENT_FILE_PATTERN: &str = "*csv";

/// Delimiters the location file may use, in tie-break order. A space is
/// only taken when none of these occur.
const DELIMITER_CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b':'];

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

/// Decode file bytes as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback cannot fail.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

fn read_decoded(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| MergeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_text(&bytes);
    if let Cow::Owned(_) = text {
        log::debug!("{}: not valid UTF-8, decoded as Latin-1", path.display());
    }
    Ok(text.into_owned())
}

// ---------------------------------------------------------------------------
// Location file
// ---------------------------------------------------------------------------

/// Pick the delimiter of a single sample line: the most frequent candidate,
/// ties going to the earlier entry of [`DELIMITER_CANDIDATES`].
/// Falls back to a space, since identifiers often contain one.
pub fn sniff_delimiter(line: &str) -> Option<u8> {
    let mut best: Option<(u8, usize)> = None;
    for &candidate in &DELIMITER_CANDIDATES {
        let count = line.bytes().filter(|&b| b == candidate).count();
        if count == 0 {
            continue;
        }
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((candidate, count));
        }
    }
    match best {
        Some((d, _)) => Some(d),
        None if line.contains(' ') => Some(b' '),
        None => None,
    }
}

/// Load the location file.
///
/// The first line is only used to detect the delimiter and is not loaded.
/// Rows whose identifier matches `*sample` are skipped. With `strict` set a
/// repeated identifier is an error, otherwise the last height wins.
pub fn load_location_table(path: &Path, strict: bool) -> Result<LocationTable> {
    let text = read_decoded(path)?;
    let (first_line, body) = match text.split_once('\n') {
        Some((first, rest)) => (first.trim_end_matches('\r'), rest),
        None => (text.as_str(), ""),
    };

    let delimiter = sniff_delimiter(first_line).ok_or_else(|| MergeError::DelimiterNotDetected {
        path: path.to_path_buf(),
    })?;
    log::debug!(
        "{}: using delimiter {:?}",
        path.display(),
        char::from(delimiter)
    );

    let noise = Pattern::new(NOISE_ROW_PATTERN).expect("static pattern is valid");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(body.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| MergeError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        // +1 for the consumed first line
        let line = record.position().map_or(0, |p| p.line()) + 1;
        if record.len() < 2 {
            return Err(MergeError::MalformedInput {
                path: path.to_path_buf(),
                line,
                found: record.len(),
            });
        }
        if noise.matches_with(&record[0], exact_case()) {
            log::debug!("{}:{line}: skipping header row '{}'", path.display(), &record[0]);
            continue;
        }
        records.push(LocationRecord {
            identifier: record[0].to_string(),
            height: record[1].to_string(),
        });
    }

    if strict {
        LocationTable::from_records_strict(records)
    } else {
        Ok(LocationTable::from_records(records))
    }
}

pub(crate) fn exact_case() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    }
}

// ---------------------------------------------------------------------------
// Measurement files
// ---------------------------------------------------------------------------

/// Read one measurement file and return its data block.
pub fn parse_measurement_file(path: &Path) -> Result<Vec<DataPoint>> {
    let text = read_decoded(path)?;
    parse_measurement_text(&text, path)
}

/// Extract the data block from decoded measurement text: every row after
/// the first row whose first field is exactly `Angle`, first two fields only.
pub fn parse_measurement_text(text: &str, path: &Path) -> Result<Vec<DataPoint>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(MEASUREMENT_DELIMITER)
        .from_reader(text.as_bytes());

    let mut in_data = false;
    let mut points = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|source| MergeError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        if !more {
            break;
        }
        if !in_data {
            in_data = record.get(0) == Some(DATA_HEADER_MARKER);
            continue;
        }
        match (record.get(0), record.get(1)) {
            (Some(angle), Some(intensity)) => points.push(DataPoint::new(angle, intensity)),
            _ => {
                return Err(MergeError::MalformedDataRow {
                    path: path.to_path_buf(),
                    line: record.position().map_or(0, |p| p.line()),
                })
            }
        }
    }

    if !in_data {
        return Err(MergeError::HeaderNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(points)
}

/// Regular files in `dir` whose name matches `*csv` in any case, sorted by
/// file name.
pub fn list_measurement_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| MergeError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let pattern = Pattern::new(MEASUREMENT_FILE_PATTERN).expect("static pattern is valid");
    let options = MatchOptions {
        case_sensitive: false,
        ..exact_case()
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        if pattern.matches_with(&name.to_string_lossy(), options) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
