use std::collections::HashSet;
use std::path::PathBuf;

use super::model::{sample_id, LocationTable};
use crate::state::RunLog;

/// Set differences between measurement files and location records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Sample ids of files with no location record, in file order.
    pub ids_without_location: Vec<String>,
    /// Location identifiers with no file, in table order.
    pub locations_without_file: Vec<String>,
}

/// Compare raw sample ids against raw location identifiers and log the
/// result. Never fails and never touches its inputs.
///
/// The "location without file" warning is emitted whenever the table has
/// records, even when every location has a file, in which case it names
/// nobody.
pub fn check_consistency(
    table: &LocationTable,
    files: &[PathBuf],
    log: &mut RunLog,
) -> ConsistencyReport {
    log.info("+ Check consistency between XRD files and location file");

    let file_ids: Vec<String> = files.iter().map(|f| sample_id(f)).collect();
    let file_id_set: HashSet<&str> = file_ids.iter().map(String::as_str).collect();

    let report = ConsistencyReport {
        ids_without_location: file_ids
            .iter()
            .filter(|id| !table.contains(id))
            .cloned()
            .collect(),
        locations_without_file: table
            .identifiers()
            .filter(|id| !file_id_set.contains(id))
            .map(str::to_string)
            .collect(),
    };

    if report.ids_without_location.is_empty() && report.locations_without_file.is_empty() {
        log.info("+ Everything looks good :-)\n");
    }

    if !report.ids_without_location.is_empty() {
        log.warn(format!(
            "+\tWARNING: XRD measurement(s) with ID(s) {} have no location. \
             They are excluded from the combined file\n",
            report.ids_without_location.join(",")
        ));
    }

    if !table.is_empty() {
        log.warn(format!(
            "+\tWARNING: Location(s) with ID(s) {} have no XRD measurement. \
             They are not used in the combined file\n",
            report.locations_without_file.join(",")
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LocationRecord;

    fn table(ids: &[&str]) -> LocationTable {
        LocationTable::from_records(ids.iter().map(|id| LocationRecord {
            identifier: id.to_string(),
            height: "0".to_string(),
        }))
    }

    fn files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/xrd").join(n)).collect()
    }

    #[test]
    fn test_reports_both_differences() {
        let mut log = RunLog::new();
        let report = check_consistency(
            &table(&["s1", "s2", "s4"]),
            &files(&["s1.csv", "s2.csv", "s3.csv"]),
            &mut log,
        );

        assert_eq!(report.ids_without_location, vec!["s3"]);
        assert_eq!(report.locations_without_file, vec!["s4"]);
        let text = log.to_text();
        assert!(text.contains("ID(s) s3 have no location"));
        assert!(text.contains("ID(s) s4 have no XRD measurement"));
        assert!(!text.contains("Everything looks good"));
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let mut log = RunLog::new();
        check_consistency(&table(&["s1"]), &files(&["a.csv", "b.csv", "s1.csv"]), &mut log);
        assert!(log.to_text().contains("ID(s) a,b have no location"));
    }

    #[test]
    fn test_all_matched_still_warns_about_locations() {
        // success message and an empty location warning both appear
        let mut log = RunLog::new();
        let report = check_consistency(&table(&["s1"]), &files(&["s1.csv"]), &mut log);

        assert_eq!(report, ConsistencyReport::default());
        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[1].contains("Everything looks good"));
        assert!(messages[2].contains("Location(s) with ID(s)  have no XRD measurement"));
    }

    #[test]
    fn test_empty_table_skips_location_warning() {
        let mut log = RunLog::new();
        let report = check_consistency(&table(&[]), &files(&["s1.csv"]), &mut log);

        assert_eq!(report.ids_without_location, vec!["s1"]);
        assert!(!log.to_text().contains("Location(s) with ID(s)"));
    }

    #[test]
    fn test_comparison_uses_raw_identifiers() {
        let mut log = RunLog::new();
        let report = check_consistency(&table(&["S 1"]), &files(&["s1.csv"]), &mut log);
        assert_eq!(report.ids_without_location, vec!["s1"]);
        assert_eq!(report.locations_without_file, vec!["S 1"]);
    }
}
