//! Regex patterns built from the configured interpolation delimiters.

use regex::Regex;

/// An interpolation found in attribute or text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interpolation<'t> {
    /// The whole match, delimiters included.
    pub full: &'t str,
    /// The expression between the delimiters (bind-once `::` excluded).
    pub expression: &'t str,
}

#[derive(Debug, Clone)]
pub struct Patterns {
    /// `{{ expr }}`, with an optional `::` bind-once marker. None when delimiters are empty.
    interpolate: Option<Regex>,
    /// `{{ 'literal' | translate }}` written directly in an attribute value.
    delimited_filter: Regex,
    /// `'literal' | translate` at the start of an attribute value, without delimiters.
    bare_filter: Regex,
}

/// Quoted literal in any of the quote styles that survive in raw markup.
const QUOTED_LITERAL: &str = r#"(?:'(.*?)'|"(.*?)"|&quot;(.*?)&quot;|&#39;(.*?)&#39;)"#;

fn attr_filter_regex(start_delim: &str, end_delim: &str) -> Result<Regex, regex::Error> {
    let mut start = regex::escape(start_delim);
    let end = regex::escape(end_delim);
    if start.is_empty() && end.is_empty() {
        start = "^".to_string();
    } else {
        start.push_str(r"(?:\s*::\s*)?");
    }
    Regex::new(&format!(
        r"{start}\s*{QUOTED_LITERAL}\s*\|\s*translate\s*(?:{end}|\|)"
    ))
}

fn interpolate_regex(start_delim: &str, end_delim: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"{}\s*(?:::)?(.*?){}",
        regex::escape(start_delim),
        regex::escape(end_delim)
    ))
}

impl Patterns {
    pub fn new(start_delim: &str, end_delim: &str) -> Result<Self, regex::Error> {
        let interpolate = if start_delim.is_empty() && end_delim.is_empty() {
            None
        } else {
            Some(interpolate_regex(start_delim, end_delim)?)
        };
        Ok(Self {
            interpolate,
            delimited_filter: attr_filter_regex(start_delim, end_delim)?,
            bare_filter: attr_filter_regex("", "")?,
        })
    }

    pub fn interpolations<'t>(&self, text: &'t str) -> Vec<Interpolation<'t>> {
        let Some(regex) = &self.interpolate else {
            return Vec::new();
        };
        regex
            .captures_iter(text)
            .filter_map(|caps| {
                Some(Interpolation {
                    full: caps.get(0)?.as_str(),
                    expression: caps.get(1)?.as_str(),
                })
            })
            .collect()
    }

    /// Literals piped into `translate` inside delimiters, matched textually.
    pub fn delimited_filters(&self, text: &str) -> Vec<String> {
        literals(&self.delimited_filter, text)
    }

    /// Literal piped into `translate` at the start of a delimiter-less value.
    pub fn bare_filters(&self, text: &str) -> Vec<String> {
        literals(&self.bare_filter, text)
    }
}

fn literals(regex: &Regex, text: &str) -> Vec<String> {
    regex
        .captures_iter(text)
        .filter_map(|caps| (1..=4).find_map(|group| caps.get(group)))
        .map(|m| m.as_str().to_string())
        .collect()
}
