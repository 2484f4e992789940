mod app;
mod cli;
mod data;
mod error;
mod output;
mod state;
mod ui;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let (inputs, mut sink) = match cli.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match app::run(&inputs, cli.options(), &mut sink) {
        Ok(summary) => {
            log::info!(
                "{} rows from {} files ({} locations) written to {}",
                summary.rows,
                summary.files,
                summary.locations,
                sink.table_path().display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Run aborted, see {}: {e:#}", sink.log_path().display());
            ExitCode::FAILURE
        }
    }
}
