use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::OutputSink;
use crate::data::model::{MergedRow, OUTPUT_HEADER};
use crate::state::RunLog;

pub const DEFAULT_TABLE_NAME: &str = "combined_xrd_3d.csv";
pub const DEFAULT_LOG_NAME: &str = "xrd23d_log.txt";

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write the combined table as comma-separated values with the
/// `Alpha,Intensity,Location` header, even when there are no rows.
pub fn write_table<W: std::io::Write>(out: W, rows: &[MergedRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(OUTPUT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File-system sink
// ---------------------------------------------------------------------------

/// Persists the table and the log into an output directory.
#[derive(Debug, Clone)]
pub struct FsSink {
    pub output_dir: PathBuf,
    pub table_name: String,
    pub log_name: String,
}

impl FsSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_name: DEFAULT_LOG_NAME.to_string(),
        }
    }

    pub fn table_path(&self) -> PathBuf {
        self.output_dir.join(&self.table_name)
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_name)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    Ok(())
}

impl OutputSink for FsSink {
    fn write_table(&mut self, rows: &[MergedRow]) -> Result<()> {
        ensure_dir(&self.output_dir)?;
        let path = self.table_path();
        let file = fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_table(file, rows).with_context(|| format!("writing {}", path.display()))
    }

    fn write_log(&mut self, log: &RunLog) -> Result<()> {
        ensure_dir(&self.output_dir)?;
        let path = self.log_path();
        fs::write(&path, log.to_text()).with_context(|| format!("writing {}", path.display()))
    }

    fn describe(&self) -> String {
        self.output_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(a: &str, i: &str, l: &str) -> MergedRow {
        MergedRow {
            angle: a.to_string(),
            intensity: i.to_string(),
            location: l.to_string(),
        }
    }

    #[test]
    fn test_write_table_format() {
        let mut buf = Vec::new();
        write_table(&mut buf, &[row("0", "5", "10mm"), row("1.5", "6", "a,b")]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "Alpha,Intensity,Location\n0,5,10mm\n1.5,6,\"a,b\"\n");
    }

    #[test]
    fn test_write_empty_table_has_header() {
        let mut buf = Vec::new();
        write_table(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Alpha,Intensity,Location\n");
    }

    #[test]
    fn test_fs_sink_creates_dir_and_files() {
        let dir = tempdir().unwrap();
        let mut sink = FsSink::new(dir.path().join("out").join("run1"));
        let mut log = RunLog::new();
        log.info("one");
        log.info("two");

        sink.write_table(&[row("0", "1", "x")]).unwrap();
        sink.write_log(&log).unwrap();

        assert!(sink.table_path().ends_with(DEFAULT_TABLE_NAME));
        let table = fs::read_to_string(sink.table_path()).unwrap();
        assert_eq!(table.lines().count(), 2);
        assert_eq!(fs::read_to_string(sink.log_path()).unwrap(), "one\ntwo");
    }
}
