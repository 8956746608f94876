//! gettext-extract - translatable string extraction for AngularJS projects
//!
//! Scans HTML templates and JavaScript/TypeScript sources for strings marked for
//! translation (`translate` directives and filters, `gettext()` style marker calls,
//! `gettextCatalog` lookups) and writes them to a gettext PO template.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (`extract`, `init`)
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (parsers, scanners, catalog)
//!
//! ## Library usage
//!
//! ```no_run
//! use gettext_extract::core::{Extractor, ExtractorOptions};
//!
//! let mut extractor = Extractor::new(ExtractorOptions::default())?;
//! extractor.parse("index.html", "<h1 translate>Welcome</h1>")?;
//! extractor.write(std::path::Path::new("template.pot"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
