use std::process::ExitCode;

use clap::Parser;
use gettext_extract::cli::{Arguments, ExitStatus};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "gettext_extract=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    match gettext_extract::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitStatus::Error.into()
        }
    }
}
