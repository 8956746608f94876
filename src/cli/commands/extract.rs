use std::{fs, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::{
    args::ExtractCommand,
    exit_status::ExitStatus,
    report::{self, ExtractSummary},
};
use crate::{
    config::{Config, load_config},
    core::{Extractor, files::discover_files},
};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let summary = run_extract(&cwd, cmd)?;
    report::print_extract_summary(&summary);
    Ok(ExitStatus::Success)
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut Config, cmd: &ExtractCommand) {
    if let Some(output) = &cmd.output {
        config.output = output.to_string_lossy().into_owned();
    }
    config
        .extractor
        .marker_names
        .extend(cmd.marker_names.iter().cloned());
    if let Some(start) = &cmd.start_delim {
        config.extractor.start_delim = start.clone();
    }
    if let Some(end) = &cmd.end_delim {
        config.extractor.end_delim = end.clone();
    }
    if cmd.no_line_numbers {
        config.extractor.line_numbers = false;
    }
}

fn run_extract(base_dir: &Path, cmd: ExtractCommand) -> Result<ExtractSummary> {
    let verbose = cmd.verbose;
    let mut config = load_config(base_dir)?.config;
    apply_overrides(&mut config, &cmd);
    config.validate()?;

    let inputs = if cmd.inputs.is_empty() {
        config.includes.clone()
    } else {
        cmd.inputs
    };
    let discovered = discover_files(
        base_dir,
        &inputs,
        &config.ignores,
        &config.extractor,
        verbose,
    );

    let mut extractor = Extractor::new(config.extractor.clone())?;
    let mut skipped_count = discovered.skipped_count;
    let mut files_scanned = 0;
    for file in &discovered.files {
        let content = match fs::read_to_string(base_dir.join(file)) {
            Ok(content) => content,
            Err(e) => {
                skipped_count += 1;
                if verbose {
                    eprintln!(
                        "{} Cannot read {}: {}",
                        "warning:".bold().yellow(),
                        file,
                        e
                    );
                }
                continue;
            }
        };
        extractor.parse(file, &content)?;
        files_scanned += 1;
    }

    let output = base_dir.join(&config.output);
    extractor.write(&output)?;

    Ok(ExtractSummary {
        files_scanned,
        entry_count: extractor.catalog().len(),
        skipped_count,
        output: config.output,
        verbose,
    })
}
