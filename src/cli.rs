use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};

use crate::app::{MergeOptions, RunInputs};
use crate::output::{FsSink, DEFAULT_LOG_NAME, DEFAULT_TABLE_NAME};
use crate::ui::dialogs;

#[derive(Parser, Debug)]
#[command(name = "xrd-merge")]
#[command(about = "Combine XRD measurement files and tag each row with its sample location", version)]
pub struct Cli {
    /// Folder with the XRD .csv exports (asked for when omitted)
    #[arg(short, long)]
    pub measurements: Option<PathBuf>,

    /// Location table with identifier and height columns (asked for when omitted)
    #[arg(short, long)]
    pub locations: Option<PathBuf>,

    /// Output folder for the combined table and the log (asked for when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File name of the combined table
    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    pub table_name: String,

    /// File name of the run log
    #[arg(long, default_value = DEFAULT_LOG_NAME)]
    pub log_name: String,

    /// Fail when the location table lists an identifier twice
    #[arg(long)]
    pub strict: bool,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Warn;
        }
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    pub fn options(&self) -> MergeOptions {
        MergeOptions {
            strict_locations: self.strict,
        }
    }

    /// Fill in every missing path through a dialog, in the order the
    /// questions are asked interactively.
    pub fn resolve(&self) -> Result<(RunInputs, FsSink)> {
        let measurement_dir = match &self.measurements {
            Some(p) => p.clone(),
            None => dialogs::pick_measurement_dir()?,
        };
        let location_file = match &self.locations {
            Some(p) => p.clone(),
            None => dialogs::pick_location_file()?,
        };
        let output_dir = match &self.output {
            Some(p) => p.clone(),
            None => dialogs::pick_output_dir()?,
        };

        let mut sink = FsSink::new(output_dir);
        sink.table_name = self.table_name.clone();
        sink.log_name = self.log_name.clone();
        Ok((
            RunInputs {
                measurement_dir,
                location_file,
            },
            sink,
        ))
    }
}
