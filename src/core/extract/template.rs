//! Template scanner: finds translatable strings in AngularJS-style markup.
//!
//! Sources of strings, per element:
//! - `<translate>` elements and elements carrying a `translate` / `data-translate`
//!   attribute (inner HTML is the msgid, `translate-plural`, `translate-context` and
//!   `translate-comment` refine it)
//! - `'literal' | translate` filters inside interpolations of attribute values and text
//! - inline `<script>` blocks (handed to the script scanner) and nested
//!   `text/ng-template` blocks (scanned recursively)

use crate::core::{
    catalog::{Catalog, CatalogError},
    data::{Candidate, SourceReference},
    parsers::markup::{Document, Element},
};

use super::{
    filters::{parse_for_filters, try_parse_for_filters},
    patterns::Patterns,
    script::ScriptScanner,
};

const NG_TEMPLATE_TYPE: &str = "text/ng-template";
const JAVASCRIPT_TYPE: &str = "text/javascript";

/// Newline positions of a source, for offset to line conversion.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        Self {
            newlines: source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Number of newlines strictly before `offset`.
    fn newlines_before(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&pos| pos < offset)
    }
}

#[derive(Debug, Clone)]
pub struct TemplateScanner {
    script: ScriptScanner,
    patterns: Patterns,
}

/// Per-fragment state: where references point and how lines are computed.
struct Fragment<'a> {
    filename: &'a str,
    lines: LineIndex,
    line_offset: usize,
}

impl Fragment<'_> {
    fn reference(&self, offset: usize) -> SourceReference {
        SourceReference::new(
            self.filename,
            self.line_offset + self.lines.newlines_before(offset) + 1,
        )
    }

    /// Offset for a fragment that starts at `offset` inside this one.
    fn nested_offset(&self, offset: usize) -> usize {
        self.line_offset + self.lines.newlines_before(offset)
    }
}

impl TemplateScanner {
    pub fn new(script: ScriptScanner, patterns: Patterns) -> Self {
        Self { script, patterns }
    }

    /// Scan markup `source`; `line_offset` is the number of lines preceding it in the
    /// enclosing file (zero for a whole file).
    pub fn scan_fragment(
        &self,
        filename: &str,
        source: &str,
        line_offset: usize,
        catalog: &mut Catalog,
    ) -> Result<(), CatalogError> {
        let document = Document::parse(source);
        let fragment = Fragment {
            filename,
            lines: LineIndex::new(source),
            line_offset,
        };

        for element in document.elements() {
            self.scan_element(&document, &fragment, element, catalog)?;
        }
        Ok(())
    }

    fn scan_element(
        &self,
        document: &Document<'_>,
        fragment: &Fragment<'_>,
        element: &Element,
        catalog: &mut Catalog,
    ) -> Result<(), CatalogError> {
        if element.name == "script" {
            match element.attr("type") {
                Some(NG_TEMPLATE_TYPE) => {
                    return self.scan_fragment(
                        fragment.filename,
                        document.inner_html(element),
                        fragment.nested_offset(element.start),
                        catalog,
                    );
                }
                None | Some("") | Some(JAVASCRIPT_TYPE) => {
                    return self.script.scan_fragment(
                        fragment.filename,
                        document.inner_html(element),
                        fragment.nested_offset(element.start),
                        catalog,
                    );
                }
                Some(_) => {}
            }
        }

        if element.name == "translate"
            || element.has_attr("translate")
            || element.has_attr("data-translate")
        {
            return catalog.add_string(translate_tag_candidate(document, fragment, element));
        }

        let reference = fragment.reference(element.start);
        for attr in element.attrs.iter().filter(|attr| !attr.value.is_empty()) {
            for msgid in self.attribute_msgids(&attr.value) {
                catalog.add_string(Candidate::new(reference.clone(), msgid))?;
            }
        }

        for (offset, text) in document.text_children(element) {
            let reference = fragment.reference(offset);
            for interpolation in self.patterns.interpolations(text) {
                for found in parse_for_filters(interpolation.expression) {
                    catalog.add_string(Candidate::new(reference.clone(), found.msgid))?;
                }
            }
        }
        Ok(())
    }

    /// Translate-filtered literals in an attribute value.
    ///
    /// Interpolations are parsed one by one; a value without interpolation is parsed as
    /// an expression as a whole. Text that does not parse falls back to the direct
    /// `'literal' | translate` pattern.
    fn attribute_msgids(&self, value: &str) -> Vec<String> {
        let interpolations = self.patterns.interpolations(value);
        if interpolations.is_empty() {
            return match try_parse_for_filters(value) {
                Ok(found) => found.into_iter().map(|t| t.msgid).collect(),
                Err(_) => self.patterns.bare_filters(value),
            };
        }

        interpolations
            .into_iter()
            .flat_map(|interpolation| match try_parse_for_filters(interpolation.expression) {
                Ok(found) => found.into_iter().map(|t| t.msgid).collect(),
                Err(_) => self.patterns.delimited_filters(interpolation.full),
            })
            .collect()
    }
}

fn translate_tag_candidate(
    document: &Document<'_>,
    fragment: &Fragment<'_>,
    element: &Element,
) -> Candidate {
    let owned = |value: Option<&str>| value.map(str::to_string);
    Candidate::new(
        fragment.reference(element.start),
        document.inner_html(element),
    )
    .with_plural(owned(element.attr_or_data("translate-plural")))
    .with_comment(owned(element.attr_or_data("translate-comment")))
    .with_context(owned(element.attr_or_data("translate-context")))
}
