//! Extraction engine.
//!
//! Files are dispatched by [`Extractor`] to a scanner in [`extract`]; scanners parse with
//! [`parsers`] and merge what they find into a [`Catalog`], which is finally rendered as
//! a PO template.

pub mod catalog;
pub mod data;
pub mod extract;
pub mod extractor;
pub mod files;
pub mod parsers;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogKey};
pub use data::{Candidate, SourceReference};
pub use extractor::{ExtractError, Extractor, ExtractorOptions, Strategy};
