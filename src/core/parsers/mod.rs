//! Parsers for the three source languages the scanners walk.
//!
//! - `expression`: AngularJS expressions (interpolations, attribute values)
//! - `markup`: HTML templates, with byte offsets and entities kept verbatim
//! - `script`: JavaScript / TypeScript (uses swc for AST generation)

pub mod expression;
pub mod markup;
pub mod script;
