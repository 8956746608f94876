//! Core data types shared by the scanners and the catalog.
//!
//! - `reference`: source references and extraction candidates

pub mod reference;

pub use reference::{Candidate, SourceReference};
