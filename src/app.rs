use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::data::consistency::check_consistency;
use crate::data::loader::{list_measurement_files, load_location_table};
use crate::data::merge::merge_files;
use crate::data::model::MergedRow;
use crate::state::RunLog;

// ---------------------------------------------------------------------------
// Run inputs and outputs
// ---------------------------------------------------------------------------

/// Input paths of a run, however they were chosen.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub measurement_dir: PathBuf,
    pub location_file: PathBuf,
}

/// Behaviour switches for the core pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Reject location files that list an identifier twice.
    pub strict_locations: bool,
}

/// Where a finished run goes.
pub trait OutputSink {
    fn write_table(&mut self, rows: &[MergedRow]) -> Result<()>;
    fn write_log(&mut self, log: &RunLog) -> Result<()>;

    /// Human-readable destination used in the final log line.
    fn describe(&self) -> String;
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub locations: usize,
    pub files: usize,
    pub rows: usize,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole pipeline and hand the result to `sink`.
///
/// The log is always written. The table is written only when every stage
/// succeeded; on failure the error is appended to the log first.
pub fn run(inputs: &RunInputs, options: MergeOptions, sink: &mut dyn OutputSink) -> Result<RunSummary> {
    let mut log = RunLog::new();
    log.info("Combine XRD files and associate each file with a given location\n");

    let outcome = merge_stage(inputs, options, &mut log).and_then(|(rows, summary)| {
        sink.write_table(&rows)?;
        log.info(format!(
            "+\tDone - Saved .csv file with {} lines in {}",
            rows.len(),
            sink.describe()
        ));
        Ok(summary)
    });

    if let Err(e) = &outcome {
        log.error(format!("ERROR: {e:#}"));
    }
    sink.write_log(&log).context("writing run log")?;
    outcome
}

fn merge_stage(
    inputs: &RunInputs,
    options: MergeOptions,
    log: &mut RunLog,
) -> Result<(Vec<MergedRow>, RunSummary)> {
    let table = load_location_table(&inputs.location_file, options.strict_locations)
        .context("loading location file")?;
    log.info(format!(
        "+ Done - Read file with location. {} samples available",
        table.size()
    ));

    let files = list_measurement_files(&inputs.measurement_dir)
        .context("listing measurement files")?;
    log.info(format!("+ {} XRD .csv files available", files.len()));

    check_consistency(&table, &files, log);

    log.info("+ Start to combine .csv files and associate location");
    let rows = merge_files(&files, &table, log)?;

    let summary = RunSummary {
        locations: table.size(),
        files: files.len(),
        rows: rows.len(),
    };
    Ok((rows, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use crate::output::FsSink;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Keeps whatever the pipeline hands over.
    #[derive(Default)]
    struct MemorySink {
        table: Option<Vec<MergedRow>>,
        log: Option<String>,
    }

    impl OutputSink for MemorySink {
        fn write_table(&mut self, rows: &[MergedRow]) -> Result<()> {
            self.table = Some(rows.to_vec());
            Ok(())
        }

        fn write_log(&mut self, log: &RunLog) -> Result<()> {
            self.log = Some(log.to_text());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn fixture(locations: &str, files: &[(&str, &str)]) -> (TempDir, RunInputs) {
        let dir = tempdir().unwrap();
        let xrd = dir.path().join("xrd");
        fs::create_dir(&xrd).unwrap();
        for (name, body) in files {
            fs::write(xrd.join(name), body).unwrap();
        }
        let location_file = dir.path().join("locations.csv");
        fs::write(&location_file, locations).unwrap();
        let inputs = RunInputs {
            measurement_dir: xrd,
            location_file,
        };
        (dir, inputs)
    }

    fn standard_fixture() -> (TempDir, RunInputs) {
        fixture(
            "ID,Height\ns1,10mm\ns2,20mm\n",
            &[
                ("s1.csv", "Sample;s1\nAngle;Intensity\n0;5\n1;6\n"),
                ("s2.csv", "Angle;Intensity\n0;7\n"),
                ("s3.csv", "Angle;Intensity\n0;8\n"),
                ("readme.txt", "not a measurement"),
            ],
        )
    }

    fn tuples(rows: &[MergedRow]) -> Vec<(&str, &str, &str)> {
        rows.iter()
            .map(|r| (r.angle.as_str(), r.intensity.as_str(), r.location.as_str()))
            .collect()
    }

    #[test]
    fn test_end_to_end() {
        let (_dir, inputs) = standard_fixture();
        let mut sink = MemorySink::default();

        let summary = run(&inputs, MergeOptions::default(), &mut sink).unwrap();

        assert_eq!(summary, RunSummary { locations: 2, files: 3, rows: 3 });
        let table = sink.table.unwrap();
        assert_eq!(
            tuples(&table),
            vec![("0", "5", "10mm"), ("1", "6", "10mm"), ("0", "7", "20mm")]
        );

        let log = sink.log.unwrap();
        assert!(log.contains("2 samples available"));
        assert!(log.contains("3 XRD .csv files available"));
        assert!(log.contains("ID(s) s3 have no location"));
        assert!(log.contains("Combined 2 of 3 XRD files"));
        assert!(log.contains("Saved .csv file with 3 lines in memory"));
    }

    #[test]
    fn test_ambiguous_match_writes_log_but_no_table() {
        let (_dir, inputs) = fixture(
            "ID,Height\nS 1,10mm\ns1,20mm\n",
            &[("s1.csv", "Angle;Intensity\n0;5\n")],
        );
        let mut sink = MemorySink::default();

        let err = run(&inputs, MergeOptions::default(), &mut sink).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::AmbiguousMatch { .. })
        ));
        assert!(sink.table.is_none());
        let log = sink.log.unwrap();
        assert!(log.contains("Start to combine"));
        assert!(log.contains("Sample ID has two heights"));
    }

    #[test]
    fn test_malformed_location_file_aborts_before_merge() {
        let (_dir, inputs) = fixture("ID,Height\ns1\n", &[("s1.csv", "Angle;Intensity\n0;5\n")]);
        let mut sink = MemorySink::default();

        let err = run(&inputs, MergeOptions::default(), &mut sink).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MergeError>(),
            Some(MergeError::MalformedInput { .. })
        ));
        assert!(sink.table.is_none());
        assert!(!sink.log.unwrap().contains("Start to combine"));
    }

    #[test]
    fn test_strict_mode() {
        let (_dir, inputs) = fixture(
            "ID,Height\ns1,10mm\ns1,11mm\n",
            &[("s1.csv", "Angle;Intensity\n0;5\n")],
        );

        let mut sink = MemorySink::default();
        run(&inputs, MergeOptions::default(), &mut sink).unwrap();
        assert_eq!(tuples(&sink.table.unwrap()), vec![("0", "5", "11mm")]);

        let mut sink = MemorySink::default();
        let strict = MergeOptions { strict_locations: true };
        assert!(run(&inputs, strict, &mut sink).is_err());
        assert!(sink.table.is_none());
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let (dir, inputs) = standard_fixture();
        let read = |p: &Path| fs::read(p).unwrap();

        let mut first = FsSink::new(dir.path().join("out1"));
        let mut second = FsSink::new(dir.path().join("out2"));
        run(&inputs, MergeOptions::default(), &mut first).unwrap();
        run(&inputs, MergeOptions::default(), &mut second).unwrap();

        assert_eq!(read(&first.table_path()), read(&second.table_path()));
        let table = String::from_utf8(read(&first.table_path())).unwrap();
        assert_eq!(table, "Alpha,Intensity,Location\n0,5,10mm\n1,6,10mm\n0,7,20mm\n");

        // logs differ only in the output directory
        let log1 = String::from_utf8(read(&first.log_path())).unwrap();
        let log2 = String::from_utf8(read(&second.log_path())).unwrap();
        assert_eq!(log1.replace("out1", "out"), log2.replace("out2", "out"));
    }
}
