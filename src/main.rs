use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = sws::Cli::parse();
    let verbose = cli.verbose();

    sws::init_logging(verbose);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    match sws::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with an error");
            ExitCode::FAILURE
        }
    }
}
