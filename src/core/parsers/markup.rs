//! Lenient HTML parser for template scanning.
//!
//! Builds a small node tree over the source without decoding entities, so element
//! contents and attribute values can be sliced verbatim from the input. Every node keeps
//! its byte offset, which the template scanner turns into line numbers.
//!
//! The parser never fails: stray end tags are ignored, unclosed elements are closed at
//! the end of input, and the usual implied end tags (`<p>` before a block element,
//! `<li>` before `<li>`, ...) are applied so inner HTML matches what a browser would see.

use std::ops::Range;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Raw value (entities preserved). Empty for boolean attributes.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Offset of the opening `<`.
    pub start: usize,
    /// Byte range between the end of the start tag and the start of the end tag.
    pub inner: Range<usize>,
    pub children: Vec<NodeId>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|attr| attr.name == name)
    }

    /// Non-empty value of `name`, falling back to its `data-` prefixed form.
    pub fn attr_or_data(&self, name: &str) -> Option<&str> {
        self.attr(name)
            .filter(|value| !value.is_empty())
            .or_else(|| {
                self.attr(&format!("data-{name}"))
                    .filter(|value| !value.is_empty())
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub range: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Range<usize>),
}

/// A parsed markup document borrowing its source.
#[derive(Debug)]
pub struct Document<'a> {
    source: &'a str,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements whose start tag closes an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Open elements implicitly closed when `opening` starts.
fn implied_closes(opening: &str) -> &'static [&'static str] {
    match opening {
        "li" => &["li"],
        "option" => &["option"],
        "optgroup" => &["optgroup", "option"],
        "dt" | "dd" => &["dt", "dd"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "tbody" | "tfoot" => &["thead", "tbody", "tr", "td", "th"],
        name if CLOSES_P.contains(&name) => &["p"],
        _ => &[],
    }
}

impl<'a> Document<'a> {
    pub fn parse(source: &'a str) -> Self {
        let mut builder = Builder {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            nodes: Vec::new(),
            roots: Vec::new(),
            open: Vec::new(),
        };
        builder.run();
        Document {
            source,
            nodes: builder.nodes,
            roots: builder.roots,
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// All elements in document (pre-)order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Node::Element(element) = self.node(id) {
                out.push(element);
                stack.extend(element.children.iter().rev().copied());
            }
        }
        out
    }

    /// Raw inner HTML of an element.
    pub fn inner_html(&self, element: &Element) -> &'a str {
        &self.source[element.inner.clone()]
    }

    /// Direct text children of an element with their start offsets.
    pub fn text_children(&self, element: &Element) -> Vec<(usize, &'a str)> {
        element
            .children
            .iter()
            .filter_map(|id| match self.node(*id) {
                Node::Text(text) => Some((text.range.start, &self.source[text.range.clone()])),
                _ => None,
            })
            .collect()
    }
}

struct Builder<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Stack of open elements.
    open: Vec<NodeId>,
}

impl Builder<'_> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.starts_with("<!--") {
                self.comment();
            } else if self.starts_with("</") && self.peek_is_alpha(2) {
                self.end_tag();
            } else if self.starts_with("<!") || self.starts_with("<?") || self.starts_with("</") {
                self.skip_declaration();
            } else if self.bytes[self.pos] == b'<' && self.peek_is_alpha(1) {
                self.start_tag();
            } else {
                self.text();
            }
        }
        let end = self.bytes.len();
        while let Some(id) = self.open.pop() {
            self.close(id, end);
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.bytes[self.pos..].starts_with(prefix.as_bytes())
    }

    fn peek_is_alpha(&self, offset: usize) -> bool {
        self.bytes
            .get(self.pos + offset)
            .is_some_and(u8::is_ascii_alphabetic)
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.source[from..].find(needle).map(|idx| from + idx)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        match self.open.last() {
            Some(parent) => {
                if let Node::Element(element) = &mut self.nodes[parent.0] {
                    element.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    fn element_name(&self, id: NodeId) -> &str {
        match &self.nodes[id.0] {
            Node::Element(element) => &element.name,
            _ => "",
        }
    }

    fn close(&mut self, id: NodeId, inner_end: usize) {
        if let Node::Element(element) = &mut self.nodes[id.0] {
            element.inner.end = inner_end.max(element.inner.start);
        }
    }

    fn comment(&mut self) {
        let start = self.pos;
        let end = self
            .find_from(start + 4, "-->")
            .map_or(self.bytes.len(), |idx| idx + 3);
        self.push(Node::Comment(start..end));
        self.pos = end;
    }

    fn skip_declaration(&mut self) {
        self.pos = self
            .find_from(self.pos, ">")
            .map_or(self.bytes.len(), |idx| idx + 1);
    }

    fn text(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        while end < self.bytes.len() {
            if self.bytes[end] == b'<'
                && self
                    .bytes
                    .get(end + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
            {
                break;
            }
            end += 1;
        }
        // Merge with a directly preceding text node split by a lone `<`.
        let previous = match self.open.last() {
            Some(parent) => match &self.nodes[parent.0] {
                Node::Element(element) => element.children.last().copied(),
                _ => None,
            },
            None => self.roots.last().copied(),
        };
        if let Some(prev) = previous
            && let Node::Text(text) = &mut self.nodes[prev.0]
            && text.range.end == start
        {
            text.range.end = end;
        } else {
            self.push(Node::Text(Text { range: start..end }));
        }
        self.pos = end;
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && !matches!(self.bytes[self.pos], b'>' | b'/')
        {
            self.pos += 1;
        }
        self.source[start..self.pos].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn end_tag(&mut self) {
        let tag_start = self.pos;
        self.pos += 2;
        let name = self.read_name();
        self.skip_declaration();

        if let Some(depth) = self
            .open
            .iter()
            .rposition(|id| self.element_name(*id) == name)
        {
            while self.open.len() > depth {
                if let Some(id) = self.open.pop() {
                    self.close(id, tag_start);
                }
            }
        }
    }

    /// Parse attributes up to the end of the start tag. Returns whether it was self-closing.
    fn attributes(&mut self) -> (Vec<Attribute>, bool) {
        let mut attrs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => return (attrs, false),
                Some(b'>') => {
                    self.pos += 1;
                    return (attrs, false);
                }
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'>') => {
                    self.pos += 2;
                    return (attrs, true);
                }
                Some(b'/') => {
                    self.pos += 1;
                    continue;
                }
                Some(_) => {}
            }

            let name_start = self.pos;
            while self.pos < self.bytes.len()
                && !self.bytes[self.pos].is_ascii_whitespace()
                && !matches!(self.bytes[self.pos], b'=' | b'>')
                && !(self.bytes[self.pos] == b'/' && self.bytes.get(self.pos + 1) == Some(&b'>'))
            {
                self.pos += 1;
            }
            let name = self.source[name_start..self.pos].to_ascii_lowercase();

            self.skip_whitespace();
            let value = if self.bytes.get(self.pos) == Some(&b'=') {
                self.pos += 1;
                self.skip_whitespace();
                self.attribute_value()
            } else {
                String::new()
            };

            if !name.is_empty() && !attrs.iter().any(|attr: &Attribute| attr.name == name) {
                attrs.push(Attribute { name, value });
            }
        }
    }

    fn attribute_value(&mut self) -> String {
        match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let end = self.bytes[start..]
                    .iter()
                    .position(|b| *b == quote)
                    .map_or(self.bytes.len(), |idx| start + idx);
                self.pos = (end + 1).min(self.bytes.len());
                self.source[start..end].to_string()
            }
            _ => {
                let start = self.pos;
                while self.pos < self.bytes.len()
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'>'
                {
                    self.pos += 1;
                }
                self.source[start..self.pos].to_string()
            }
        }
    }

    fn start_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_name();
        let (attrs, self_closing) = self.attributes();
        let inner_start = self.pos;

        let closes = implied_closes(&name);
        while let Some(top) = self.open.last().copied() {
            if closes.contains(&self.element_name(top)) {
                self.open.pop();
                self.close(top, start);
            } else {
                break;
            }
        }

        let is_void = VOID_ELEMENTS.contains(&name.as_str());
        let is_raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
        let id = self.push(Node::Element(Element {
            name: name.clone(),
            attrs,
            start,
            inner: inner_start..inner_start,
            children: Vec::new(),
        }));

        if is_void || self_closing {
            return;
        }

        if is_raw {
            let closing = format!("</{name}");
            let lower = self.source[inner_start..].to_ascii_lowercase();
            let inner_end = lower
                .find(&closing)
                .map_or(self.bytes.len(), |idx| inner_start + idx);
            self.open.push(id);
            if inner_end > inner_start {
                self.push(Node::Text(Text {
                    range: inner_start..inner_end,
                }));
            }
            self.open.pop();
            self.close(id, inner_end);
            self.pos = inner_end;
            if self.pos < self.bytes.len() {
                self.skip_declaration();
            }
            return;
        }

        self.open.push(id);
    }
}
