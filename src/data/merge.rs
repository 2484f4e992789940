use std::path::PathBuf;

use super::loader::parse_measurement_file;
use super::matcher::match_location;
use super::model::{sample_id, LocationTable, MergedRow};
use crate::error::Result;
use crate::state::RunLog;

/// Merge every measurement file that has exactly one location, in file
/// order, tagging each data point with that location.
///
/// Files without a location are skipped without a log entry of their own;
/// `log` only gets a closing count. An ambiguous match or an unreadable file
/// aborts the whole merge and nothing is returned.
pub fn merge_files(
    files: &[PathBuf],
    table: &LocationTable,
    log: &mut RunLog,
) -> Result<Vec<MergedRow>> {
    let mut rows = Vec::new();
    let mut merged = 0;

    for path in files {
        let id = sample_id(path);
        let Some(location) = match_location(&id, table)? else {
            log::debug!("{}: no location for '{id}', skipped", path.display());
            continue;
        };

        let points = parse_measurement_file(path)?;
        log::debug!(
            "{}: {} points at location {location}",
            path.display(),
            points.len()
        );
        rows.extend(points.into_iter().map(|p| MergedRow::tagged(p, location)));
        merged += 1;
    }

    log.info(format!("+ Combined {merged} of {} XRD files", files.len()));
    Ok(rows)
}
