//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Scan templates and scripts and write a PO template
//! - `init`: Initialize the configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Files, directories or glob patterns to scan (default: `includes` from the config)
    pub inputs: Vec<String>,

    /// Output file (overrides config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional marker function name; can be specified multiple times
    #[arg(long = "marker-name", value_name = "NAME")]
    pub marker_names: Vec<String>,

    /// Interpolation start delimiter (overrides config file)
    #[arg(long, allow_hyphen_values = true)]
    pub start_delim: Option<String>,

    /// Interpolation end delimiter (overrides config file)
    #[arg(long, allow_hyphen_values = true)]
    pub end_delim: Option<String>,

    /// Omit line numbers from source references
    #[arg(long)]
    pub no_line_numbers: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable strings into a PO template
    Extract(ExtractCommand),
    /// Initialize a new .gettext-extract.json configuration file
    Init,
}
