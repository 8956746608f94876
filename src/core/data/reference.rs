use std::fmt;

/// Location of an extraction site in a scanned file.
///
/// Rendered as `file` or `file:line` in the catalog's reference line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceReference {
    /// Path of the scanned file, as handed to the extractor.
    pub file: String,
    /// Line number (1-indexed), when known.
    pub line: Option<usize>,
}

impl SourceReference {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }

    /// Render the reference, dropping the line when line numbering is disabled.
    pub fn render(&self, line_numbers: bool) -> String {
        match self.line {
            Some(line) if line_numbers => format!("{}:{}", self.file, line),
            _ => self.file.clone(),
        }
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(true))
    }
}

/// A single extraction occurrence, before it is merged into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub reference: SourceReference,
    pub msgid: String,
    pub plural: Option<String>,
    pub comment: Option<String>,
    pub context: Option<String>,
}

impl Candidate {
    pub fn new(reference: SourceReference, msgid: impl Into<String>) -> Self {
        Self {
            reference,
            msgid: msgid.into(),
            plural: None,
            comment: None,
            context: None,
        }
    }

    pub fn with_plural(mut self, plural: Option<String>) -> Self {
        self.plural = plural;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}
