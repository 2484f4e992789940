use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a merge run.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("{}:{line}: expected at least 2 columns (identifier, height), found {found}", path.display())]
    MalformedInput {
        path: PathBuf,
        line: u64,
        found: usize,
    },

    #[error("Sample ID has two heights: '{sample_id}' matches locations {keys:?}. Check and correct!")]
    AmbiguousMatch { sample_id: String, keys: Vec<String> },

    #[error("{}: no row starting with \"Angle\" found", path.display())]
    HeaderNotFound { path: PathBuf },

    #[error("{}:{line}: data row has fewer than 2 columns", path.display())]
    MalformedDataRow { path: PathBuf, line: u64 },

    #[error("{}: could not determine delimiter from the first line", path.display())]
    DelimiterNotDetected { path: PathBuf },

    #[error("location '{identifier}' is listed more than once")]
    DuplicateLocation { identifier: String },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;
