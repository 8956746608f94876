//! Catalog merge engine.
//!
//! Every candidate found by the scanners is funneled through [`Catalog::add_string`],
//! which deduplicates by `(msgid, context)`, merges references and extracted comments
//! into sorted sets and enforces plural-form consistency.
//!
//! ## Module Structure
//!
//! - `collation`: locale-style ordering used when finalizing the catalog
//! - `output`: conversion to a `polib` catalog and writing PO templates

mod collation;
pub mod output;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::core::data::Candidate;

pub use collation::locale_compare;

/// Errors raised while merging candidates into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The same `(msgid, context)` was declared with two different plural forms.
    #[error(
        "Incompatible plural definitions for {msgid}: {existing} / {conflicting} (in: {})",
        references.join(", ")
    )]
    IncompatiblePlural {
        msgid: String,
        existing: String,
        conflicting: String,
        references: Vec<String>,
    },
}

/// Lookup key of a catalog entry. `None` is the no-context sentinel and orders before
/// every real context.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CatalogKey {
    pub msgid: String,
    pub context: Option<String>,
}

impl CatalogKey {
    pub fn new(msgid: &str, context: Option<&str>) -> Self {
        Self {
            msgid: msgid.to_string(),
            context: context.map(str::to_string),
        }
    }
}

/// A deduplicated translation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub msgid: String,
    pub msgctxt: Option<String>,
    pub msgid_plural: Option<String>,
    /// Rendered source references, sorted and unique.
    pub references: BTreeSet<String>,
    /// Extracted comments, sorted and unique.
    pub extracted_comments: BTreeSet<String>,
    /// Translation placeholders: two empty slots once a plural is set, none otherwise.
    pub msgstr: Vec<String>,
}

impl CatalogEntry {
    fn new(msgid: &str) -> Self {
        Self {
            msgid: msgid.to_string(),
            ..Default::default()
        }
    }
}

/// The translation catalog of one extraction run.
#[derive(Debug, Clone)]
pub struct Catalog {
    line_numbers: bool,
    entries: BTreeMap<CatalogKey, CatalogEntry>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Catalog {
    /// Create an empty catalog. `line_numbers` controls whether references carry `:line`.
    pub fn new(line_numbers: bool) -> Self {
        Self {
            line_numbers,
            entries: BTreeMap::new(),
        }
    }

    /// Merge one candidate into the catalog.
    ///
    /// Blank msgids are ignored. Fails only when the candidate declares a plural form that
    /// differs from the one already recorded for the same `(msgid, context)`.
    pub fn add_string(&mut self, candidate: Candidate) -> Result<(), CatalogError> {
        let msgid = candidate.msgid.trim();
        if msgid.is_empty() {
            return Ok(());
        }

        let context = candidate.context.filter(|c| !c.is_empty());
        let entry = self
            .entries
            .entry(CatalogKey::new(msgid, context.as_deref()))
            .or_insert_with(|| CatalogEntry::new(msgid));

        entry
            .references
            .insert(candidate.reference.render(self.line_numbers));

        if context.is_some() {
            entry.msgctxt = context;
        }

        if let Some(plural) = candidate.plural.filter(|p| !p.is_empty()) {
            if let Some(existing) = &entry.msgid_plural
                && *existing != plural
            {
                return Err(CatalogError::IncompatiblePlural {
                    msgid: msgid.to_string(),
                    existing: existing.clone(),
                    conflicting: plural,
                    references: entry.references.iter().cloned().collect(),
                });
            }
            entry.msgid_plural = Some(plural);
            entry.msgstr = vec![String::new(), String::new()];
        }

        if let Some(comment) = candidate.comment.filter(|c| !c.is_empty()) {
            entry.extracted_comments.insert(comment);
        }

        Ok(())
    }

    pub fn get(&self, msgid: &str, context: Option<&str>) -> Option<&CatalogEntry> {
        self.entries.get(&CatalogKey::new(msgid, context))
    }

    /// Number of entries (one per `(msgid, context)`).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn line_numbers(&self) -> bool {
        self.line_numbers
    }

    /// Entries in serialization order: msgids by locale collation, then contexts
    /// lexicographically with the context-less entry first.
    pub fn entries_sorted(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries.values().collect();
        // Stable sort keeps the key order of contexts within a msgid.
        entries.sort_by(|a, b| locale_compare(&a.msgid, &b.msgid));
        entries
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::data::SourceReference;

    fn candidate(file: &str, line: usize, msgid: &str) -> Candidate {
        Candidate::new(SourceReference::new(file, line), msgid)
    }

    fn references(entry: &CatalogEntry) -> Vec<&str> {
        entry.references.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_same_reference_added_twice_is_recorded_once() {
        let mut catalog = Catalog::default();
        catalog.add_string(candidate("a.html", 3, "Hello")).unwrap();
        catalog.add_string(candidate("a.html", 3, "Hello")).unwrap();

        let entry = catalog.get("Hello", None).unwrap();
        assert_eq!(references(entry), vec!["a.html:3"]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_references_and_comments_stay_sorted() {
        let mut catalog = Catalog::default();
        for (file, comment) in [("c.js", "zeta"), ("a.js", "alpha"), ("b.js", "mid")] {
            catalog
                .add_string(candidate(file, 1, "Save").with_comment(Some(comment.to_string())))
                .unwrap();
        }
        catalog
            .add_string(candidate("b.js", 1, "Save").with_comment(Some("alpha".to_string())))
            .unwrap();

        let entry = catalog.get("Save", None).unwrap();
        assert_eq!(references(entry), vec!["a.js:1", "b.js:1", "c.js:1"]);
        let comments: Vec<_> = entry.extracted_comments.iter().cloned().collect();
        assert_eq!(comments, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_contexts_create_distinct_entries() {
        let mut catalog = Catalog::default();
        catalog.add_string(candidate("a.js", 1, "Open")).unwrap();
        catalog
            .add_string(candidate("a.js", 2, "Open").with_context(Some("menu".to_string())))
            .unwrap();
        catalog
            .add_string(candidate("b.js", 5, "Open").with_context(Some("menu".to_string())))
            .unwrap();

        assert_eq!(catalog.len(), 2);
        let plain = catalog.get("Open", None).unwrap();
        assert_eq!(plain.msgctxt, None);
        assert_eq!(references(plain), vec!["a.js:1"]);

        let menu = catalog.get("Open", Some("menu")).unwrap();
        assert_eq!(menu.msgctxt.as_deref(), Some("menu"));
        assert_eq!(references(menu), vec!["a.js:2", "b.js:5"]);
    }

    #[test]
    fn test_catalog_key_orders_no_context_first() {
        let mut keys = vec![
            CatalogKey::new("Open", Some("menu")),
            CatalogKey::new("Open", None),
            CatalogKey::new("Close", Some("menu")),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                CatalogKey::new("Close", Some("menu")),
                CatalogKey::new("Open", None),
                CatalogKey::new("Open", Some("menu")),
            ]
        );
    }

    #[test]
    fn test_empty_context_is_no_context() {
        let mut catalog = Catalog::default();
        catalog
            .add_string(candidate("a.js", 1, "Open").with_context(Some(String::new())))
            .unwrap();
        assert!(catalog.get("Open", None).is_some());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_msgid_is_trimmed() {
        let mut catalog = Catalog::default();
        catalog.add_string(candidate("a.html", 1, "  Hello \n")).unwrap();
        assert!(catalog.get("Hello", None).is_some());
    }

    #[test]
    fn test_blank_msgids_are_ignored() {
        let mut catalog = Catalog::default();
        catalog.add_string(candidate("a.html", 1, "")).unwrap();
        catalog.add_string(candidate("a.html", 2, "   \n\t")).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_plural_sets_two_translation_slots() {
        let mut catalog = Catalog::default();
        catalog
            .add_string(candidate("a.html", 1, "1 item").with_plural(Some("{n} items".into())))
            .unwrap();
        let entry = catalog.get("1 item", None).unwrap();
        assert_eq!(entry.msgid_plural.as_deref(), Some("{n} items"));
        assert_eq!(entry.msgstr, vec![String::new(), String::new()]);
    }

    #[test]
    fn test_same_plural_twice_is_accepted() {
        let mut catalog = Catalog::default();
        for line in [1, 2] {
            catalog
                .add_string(candidate("a.html", line, "Bird").with_plural(Some("Birds".into())))
                .unwrap();
        }
        // A later singular-only occurrence keeps the plural.
        catalog.add_string(candidate("b.html", 1, "Bird")).unwrap();
        let entry = catalog.get("Bird", None).unwrap();
        assert_eq!(entry.msgid_plural.as_deref(), Some("Birds"));
        assert_eq!(references(entry), vec!["a.html:1", "a.html:2", "b.html:1"]);
    }

    #[test]
    fn test_conflicting_plural_is_fatal() {
        let mut catalog = Catalog::default();
        catalog
            .add_string(candidate("a.html", 1, "Bird").with_plural(Some("a".into())))
            .unwrap();
        let err = catalog
            .add_string(candidate("b.html", 7, "Bird").with_plural(Some("b".into())))
            .unwrap_err();

        assert_eq!(
            err,
            CatalogError::IncompatiblePlural {
                msgid: "Bird".to_string(),
                existing: "a".to_string(),
                conflicting: "b".to_string(),
                references: vec!["a.html:1".to_string(), "b.html:7".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "Incompatible plural definitions for Bird: a / b (in: a.html:1, b.html:7)"
        );
    }

    #[test]
    fn test_plural_conflict_is_scoped_to_context() {
        let mut catalog = Catalog::default();
        catalog
            .add_string(candidate("a.html", 1, "Bird").with_plural(Some("a".into())))
            .unwrap();
        catalog
            .add_string(
                candidate("a.html", 2, "Bird")
                    .with_plural(Some("b".into()))
                    .with_context(Some("zoo".into())),
            )
            .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_line_numbers_disabled() {
        let mut catalog = Catalog::new(false);
        catalog.add_string(candidate("a.html", 1, "Hello")).unwrap();
        catalog.add_string(candidate("a.html", 9, "Hello")).unwrap();
        let entry = catalog.get("Hello", None).unwrap();
        assert_eq!(references(entry), vec!["a.html"]);
    }

    #[test]
    fn test_entries_sorted_by_msgid_then_context() {
        let mut catalog = Catalog::default();
        catalog
            .add_string(candidate("a.js", 1, "banana").with_context(Some("b".into())))
            .unwrap();
        catalog.add_string(candidate("a.js", 1, "Banana")).unwrap();
        catalog.add_string(candidate("a.js", 1, "apple")).unwrap();
        catalog
            .add_string(candidate("a.js", 1, "banana").with_context(Some("a".into())))
            .unwrap();
        catalog.add_string(candidate("a.js", 1, "banana")).unwrap();

        let order: Vec<_> = catalog
            .entries_sorted()
            .into_iter()
            .map(|e| (e.msgid.as_str(), e.msgctxt.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("apple", None),
                ("banana", None),
                ("banana", Some("a")),
                ("banana", Some("b")),
                ("Banana", None),
            ]
        );
    }
}
