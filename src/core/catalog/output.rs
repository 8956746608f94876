//! Conversion of the merged catalog into a PO template.
//!
//! Serialization itself is delegated to `polib`; this module only decides the header
//! metadata and how entries map onto PO messages.

use std::path::Path;

use anyhow::{Context, Result};
use polib::{
    catalog::Catalog as PoCatalog,
    message::Message,
    metadata::{CatalogMetadata, CatalogPluralRules},
};

use super::{Catalog, CatalogEntry};

/// Hook invoked on the assembled PO catalog before it is written.
pub type PostProcess = Box<dyn FnMut(&mut PoCatalog)>;

/// Plural entries always carry two translation slots; the header has to agree.
fn plural_rules() -> CatalogPluralRules {
    CatalogPluralRules {
        nplurals: 2,
        expr: "(n != 1)".to_string(),
    }
}

/// Header block of every generated template.
pub fn header_metadata() -> CatalogMetadata {
    CatalogMetadata {
        project_id_version: String::new(),
        pot_creation_date: String::new(),
        po_revision_date: String::new(),
        last_translator: String::new(),
        language_team: String::new(),
        mime_version: String::new(),
        content_type: "text/plain; charset=UTF-8".to_string(),
        content_transfer_encoding: "8bit".to_string(),
        language: String::new(),
        plural_rules: plural_rules(),
    }
}

impl CatalogEntry {
    /// Build the PO message for this entry.
    ///
    /// References go on one `#:` line; each extracted comment becomes its own `#.` line.
    pub fn to_message(&self) -> Message {
        let mut builder = match &self.msgid_plural {
            Some(plural) => {
                let mut builder = Message::build_plural();
                builder.with_msgid_plural(plural.clone());
                builder.with_msgstr_plural(self.msgstr.clone());
                builder
            }
            None => {
                let mut builder = Message::build_singular();
                builder.with_msgstr(String::new());
                builder
            }
        };
        builder.with_msgid(self.msgid.clone());
        if let Some(msgctxt) = &self.msgctxt {
            builder.with_msgctxt(msgctxt.clone());
        }
        builder.with_source(
            self.references
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        );
        builder.with_comments(
            self.extracted_comments
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        );
        builder.done()
    }
}

impl Catalog {
    /// Assemble the PO catalog in serialization order.
    pub fn to_po(&self) -> PoCatalog {
        let mut po = PoCatalog::new(header_metadata());
        for entry in self.entries_sorted() {
            po.append_or_update(entry.to_message());
        }
        po
    }
}

/// Write a PO catalog to `path`, creating parent directories as needed.
pub fn write_po(po: &PoCatalog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    polib::po_file::write(po, path)
        .with_context(|| format!("Failed to write catalog: {}", path.display()))
}
