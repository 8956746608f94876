//! Summary output of the CLI commands.
//!
//! Separate from core logic so the extractor can be used as a library.

use std::io::{self, Write};

use colored::Colorize;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// What an `extract` run did.
#[derive(Debug)]
pub struct ExtractSummary {
    pub files_scanned: usize,
    pub entry_count: usize,
    /// Inputs that were missing or unreadable.
    pub skipped_count: usize,
    pub output: String,
    pub verbose: bool,
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

pub fn print_extract_summary(summary: &ExtractSummary) {
    print_extract_summary_to(summary, &mut io::stdout().lock());
    print_skipped_warning_to(summary, &mut io::stderr().lock());
}

pub fn print_extract_summary_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    let msg = format!(
        "Extracted {} {} from {} {} into {}",
        summary.entry_count,
        plural(summary.entry_count, "string", "strings"),
        summary.files_scanned,
        plural(summary.files_scanned, "file", "files"),
        summary.output
    );
    let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), msg.green());
}

/// Warn about skipped inputs; in verbose mode each one was already reported.
pub fn print_skipped_warning_to<W: Write>(summary: &ExtractSummary, writer: &mut W) {
    if summary.skipped_count > 0 && !summary.verbose {
        let _ = writeln!(
            writer,
            "{} {} input(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            summary.skipped_count,
            "-v".cyan()
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn summary(entry_count: usize, files_scanned: usize, skipped_count: usize) -> ExtractSummary {
        ExtractSummary {
            files_scanned,
            entry_count,
            skipped_count,
            output: "template.pot".to_string(),
            verbose: false,
        }
    }

    fn render(f: impl Fn(&mut Vec<u8>)) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_summary_line() {
        let out = render(|w| print_extract_summary_to(&summary(3, 1, 0), w));
        assert_eq!(out, "\u{2713} Extracted 3 strings from 1 file into template.pot\n");

        let out = render(|w| print_extract_summary_to(&summary(1, 2, 0), w));
        assert_eq!(out, "\u{2713} Extracted 1 string from 2 files into template.pot\n");
    }

    #[test]
    fn test_skipped_warning() {
        let out = render(|w| print_skipped_warning_to(&summary(0, 0, 2), w));
        assert_eq!(out, "warning: 2 input(s) could not be read (use -v for details)\n");

        let out = render(|w| print_skipped_warning_to(&summary(0, 0, 0), w));
        assert!(out.is_empty());
    }
}
