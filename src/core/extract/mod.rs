//! Scanners that turn source files into catalog candidates.
//!
//! Markup goes through [`TemplateScanner`], scripts through [`ScriptScanner`]. Both feed
//! the same [`Catalog`], so a string used in a template and in a controller ends up as one
//! entry with both references.

use enum_dispatch::enum_dispatch;

use crate::core::catalog::{Catalog, CatalogError};

pub mod filters;
pub mod patterns;
pub mod script;
pub mod template;

pub use filters::{Translatable, parse_for_filters, try_parse_for_filters};
pub use patterns::{Interpolation, Patterns};
pub use script::ScriptScanner;
pub use template::TemplateScanner;

/// A scanning strategy applied to a whole file.
#[enum_dispatch]
pub trait Scanner {
    /// Scan `source` (read from `filename`) and merge every candidate into `catalog`.
    ///
    /// Only a plural conflict is an error; unparsable input contributes nothing.
    fn scan(&self, filename: &str, source: &str, catalog: &mut Catalog)
    -> Result<(), CatalogError>;
}

impl Scanner for TemplateScanner {
    fn scan(
        &self,
        filename: &str,
        source: &str,
        catalog: &mut Catalog,
    ) -> Result<(), CatalogError> {
        self.scan_fragment(filename, source, 0, catalog)
    }
}

impl Scanner for ScriptScanner {
    fn scan(
        &self,
        filename: &str,
        source: &str,
        catalog: &mut Catalog,
    ) -> Result<(), CatalogError> {
        self.scan_fragment(filename, source, 0, catalog)
    }
}

#[enum_dispatch(Scanner)]
#[derive(Debug, Clone)]
pub enum ScanStrategy {
    Template(TemplateScanner),
    Script(ScriptScanner),
}
