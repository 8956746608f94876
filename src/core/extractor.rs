//! Extraction driver.
//!
//! Owns the options, the two scanners and the catalog of one run. Files are routed to a
//! scanner by extension; the finished catalog is rendered through `polib`.

use std::{collections::BTreeMap, path::Path};

use anyhow::Result;
use polib::catalog::Catalog as PoCatalog;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::{
    catalog::{
        Catalog, CatalogError,
        output::{PostProcess, write_po},
    },
    data::Candidate,
    extract::{Patterns, ScanStrategy, Scanner, ScriptScanner, TemplateScanner},
};

/// How a file is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[serde(alias = "markup")]
    Html,
    #[serde(alias = "script")]
    Js,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid interpolation delimiters: {0}")]
    Delimiters(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorOptions {
    #[serde(default = "default_start_delim")]
    pub start_delim: String,
    #[serde(default = "default_end_delim")]
    pub end_delim: String,
    /// Primary marker function name.
    #[serde(default = "default_marker_name")]
    pub marker_name: String,
    /// Additional marker function names.
    #[serde(default)]
    pub marker_names: Vec<String>,
    #[serde(default = "default_line_numbers")]
    pub line_numbers: bool,
    /// File extension (without dot) to scanning strategy.
    #[serde(default = "default_extensions")]
    pub extensions: BTreeMap<String, Strategy>,
}

fn default_start_delim() -> String {
    "{{".to_string()
}

fn default_end_delim() -> String {
    "}}".to_string()
}

fn default_marker_name() -> String {
    "gettext".to_string()
}

fn default_line_numbers() -> bool {
    true
}

fn default_extensions() -> BTreeMap<String, Strategy> {
    ["htm", "html", "php", "phtml", "tml", "ejs", "erb"]
        .into_iter()
        .map(|ext| (ext.to_string(), Strategy::Html))
        .chain([("js".to_string(), Strategy::Js)])
        .collect()
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            start_delim: default_start_delim(),
            end_delim: default_end_delim(),
            marker_name: default_marker_name(),
            marker_names: Vec::new(),
            line_numbers: default_line_numbers(),
            extensions: default_extensions(),
        }
    }
}

impl ExtractorOptions {
    /// All marker names, primary first, without duplicates.
    pub fn all_marker_names(&self) -> Vec<String> {
        let mut names = vec![self.marker_name.clone()];
        for name in &self.marker_names {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Strategy registered for `filename`'s extension, if any.
    pub fn strategy_for(&self, filename: &str) -> Option<Strategy> {
        self.extensions.get(extension(filename)).copied()
    }
}

/// Text after the last `.`; the whole name when there is none.
fn extension(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map_or(filename, |(_, extension)| extension)
}

pub struct Extractor {
    options: ExtractorOptions,
    template: ScanStrategy,
    script: ScanStrategy,
    catalog: Catalog,
    post_process: Option<PostProcess>,
}

impl Extractor {
    pub fn new(options: ExtractorOptions) -> Result<Self, ExtractError> {
        let patterns = Patterns::new(&options.start_delim, &options.end_delim)?;
        let script = ScriptScanner::new(options.all_marker_names());
        let template = TemplateScanner::new(script.clone(), patterns);
        Ok(Self {
            catalog: Catalog::new(options.line_numbers),
            options,
            template: template.into(),
            script: script.into(),
            post_process: None,
        })
    }

    /// Install a hook that may edit the PO catalog before it is rendered.
    pub fn with_post_process(mut self, hook: impl FnMut(&mut PoCatalog) + 'static) -> Self {
        self.post_process = Some(Box::new(hook));
        self
    }

    /// Scanner for `strategy` alongside the catalog it writes to.
    fn scanner_and_catalog(&mut self, strategy: Strategy) -> (&ScanStrategy, &mut Catalog) {
        let scanner = match strategy {
            Strategy::Html => &self.template,
            Strategy::Js => &self.script,
        };
        (scanner, &mut self.catalog)
    }

    /// Scan one file. Files whose extension has no strategy are ignored.
    pub fn parse(&mut self, filename: &str, content: &str) -> Result<(), CatalogError> {
        let Some(strategy) = self.options.strategy_for(filename) else {
            debug!(file = filename, "no strategy for extension, skipping");
            return Ok(());
        };
        debug!(file = filename, ?strategy, "scanning");
        self.parse_as(strategy, filename, content)
    }

    /// Scan `content` with an explicit strategy, regardless of the file name.
    pub fn parse_as(
        &mut self,
        strategy: Strategy,
        filename: &str,
        content: &str,
    ) -> Result<(), CatalogError> {
        let (scanner, catalog) = self.scanner_and_catalog(strategy);
        scanner.scan(filename, content, catalog)
    }

    /// Add a string found outside the scanners.
    pub fn add_string(&mut self, candidate: Candidate) -> Result<(), CatalogError> {
        self.catalog.add_string(candidate)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Assemble the PO catalog and run the post-process hook on it.
    pub fn to_po(&mut self) -> PoCatalog {
        let mut po = self.catalog.to_po();
        if let Some(hook) = self.post_process.as_mut() {
            hook(&mut po);
        }
        po
    }

    /// Write the PO template to `path`.
    pub fn write(&mut self, path: &Path) -> Result<()> {
        let po = self.to_po();
        write_po(&po, path)
    }
}
