use std::path::PathBuf;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// Native pickers
// ---------------------------------------------------------------------------

/// Ask for the folder holding the XRD exports.
pub fn pick_measurement_dir() -> Result<PathBuf> {
    log::info!("Please select folder with .csv files containing XRD measurements");
    rfd::FileDialog::new()
        .set_title("Select folder with XRD measurements")
        .pick_folder()
        .context("no measurement folder selected")
}

/// Ask for the location table.
pub fn pick_location_file() -> Result<PathBuf> {
    log::info!("Please select .csv file with location of each measurement");
    rfd::FileDialog::new()
        .set_title("Select .csv file with locations")
        .add_filter("Location .csv file", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file()
        .context("no location file selected")
}

/// Ask where the combined table and log go.
pub fn pick_output_dir() -> Result<PathBuf> {
    log::info!("Please select output folder");
    rfd::FileDialog::new()
        .set_title("Select output folder")
        .pick_folder()
        .context("no output folder selected")
}
