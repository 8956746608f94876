use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

use crate::core::extractor::ExtractorOptions;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of resolving the input files of a run.
#[derive(Debug, Default)]
pub struct DiscoveredFiles {
    /// Paths relative to the base directory, sorted.
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

struct Ignores {
    literal: Vec<PathBuf>,
    globs: Vec<Pattern>,
}

impl Ignores {
    fn new(base_dir: &Path, patterns: &[String], verbose: bool) -> Self {
        let mut literal = Vec::new();
        let mut globs = Vec::new();
        for p in patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => globs.push(pattern),
                    Err(e) => {
                        if verbose {
                            eprintln!(
                                "{} Invalid ignore pattern '{}': {}",
                                "warning:".bold().yellow(),
                                p,
                                e
                            );
                        }
                    }
                }
            } else {
                literal.push(base_dir.join(p));
            }
        }
        Self { literal, globs }
    }

    fn matches(&self, path: &Path, relative: &str) -> bool {
        self.literal.iter().any(|ignore| path.starts_with(ignore))
            || self.globs.iter().any(|p| p.matches(relative))
    }
}

/// Resolve `inputs` (files, directories or glob patterns, relative to `base_dir`) into
/// the set of files that have a scanning strategy.
///
/// Directories are walked recursively. Explicitly named files are kept only when their
/// extension is known, like files found by walking.
pub fn discover_files(
    base_dir: &Path,
    inputs: &[String],
    ignore_patterns: &[String],
    options: &ExtractorOptions,
    verbose: bool,
) -> DiscoveredFiles {
    let ignores = Ignores::new(base_dir, ignore_patterns, verbose);
    let mut result = DiscoveredFiles::default();

    let mut roots: Vec<PathBuf> = Vec::new();
    for input in inputs {
        if is_glob_pattern(input) {
            let full_pattern = base_dir.join(input);
            match glob(&full_pattern.to_string_lossy()) {
                Ok(entries) => roots.extend(entries.flatten()),
                Err(e) => {
                    result.skipped_count += 1;
                    if verbose {
                        eprintln!(
                            "{} Invalid glob pattern '{}': {}",
                            "warning:".bold().yellow(),
                            input,
                            e
                        );
                    }
                }
            }
        } else {
            let path = base_dir.join(input);
            if path.exists() {
                roots.push(path);
            } else {
                result.skipped_count += 1;
                if verbose {
                    eprintln!(
                        "{} Input path does not exist: {}",
                        "warning:".bold().yellow(),
                        path.display()
                    );
                }
            }
        }
    }

    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = relative_path(base_dir, path);
            if ignores.matches(path, &relative) {
                continue;
            }
            if options.strategy_for(&relative).is_some() {
                result.files.insert(relative);
            }
        }
    }

    result
}

/// `path` relative to `base_dir` with `/` separators, as written into references.
fn relative_path(base_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
