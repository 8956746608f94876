//! Finds literal strings piped through the `translate` filter in template expressions.
//!
//! The expression is parsed into a [`Node`] tree and walked with a dispatch table keyed
//! by [`NodeKind`]. Only the node kinds that can carry a translate pipe down to a literal
//! have a handler; everything else is a dead end.

use tracing::{debug, warn};

use crate::core::parsers::expression::{self, ExpressionError, Literal, Node, NodeKind};

/// A literal reported by the filter parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translatable {
    pub msgid: String,
}

type Handler = fn(&mut FilterCollector, &Node);

fn handler(kind: NodeKind) -> Option<Handler> {
    match kind {
        NodeKind::Program => Some(FilterCollector::visit_program),
        NodeKind::ExpressionStatement => Some(FilterCollector::visit_expression_statement),
        NodeKind::Call => Some(FilterCollector::visit_call),
        NodeKind::Object => Some(FilterCollector::visit_object),
        NodeKind::Property => Some(FilterCollector::visit_property),
        NodeKind::Conditional => Some(FilterCollector::visit_conditional),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct FilterCollector {
    found: Vec<Translatable>,
}

impl FilterCollector {
    fn visit(&mut self, node: &Node) {
        if let Some(handle) = handler(node.kind()) {
            handle(self, node);
        }
    }

    fn visit_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit(node);
        }
    }

    fn visit_program(&mut self, node: &Node) {
        if let Node::Program { body } = node {
            self.visit_all(body);
        }
    }

    fn visit_expression_statement(&mut self, node: &Node) {
        if let Node::ExpressionStatement { expression } = node {
            self.visit(expression);
        }
    }

    fn visit_call(&mut self, node: &Node) {
        let Node::Call {
            callee,
            arguments,
            filter,
        } = node
        else {
            return;
        };
        if *filter && matches!(callee.as_ref(), Node::Identifier(name) if name == "translate") {
            match arguments.first() {
                Some(Node::Literal(Literal::String(value))) => self.found.push(Translatable {
                    msgid: value.clone(),
                }),
                Some(other) => {
                    warn!(kind = ?other.kind(), "translate filter applied to a non-literal value, skipping")
                }
                None => {}
            }
        }
        self.visit_all(arguments);
    }

    fn visit_object(&mut self, node: &Node) {
        if let Node::Object { properties } = node {
            self.visit_all(properties);
        }
    }

    fn visit_property(&mut self, node: &Node) {
        if let Node::Property { value, .. } = node {
            self.visit(value);
        }
    }

    fn visit_conditional(&mut self, node: &Node) {
        if let Node::Conditional {
            consequent,
            alternate,
            ..
        } = node
        {
            self.visit(consequent);
            self.visit(alternate);
        }
    }
}

/// Undo the HTML escaping of quotes that survives in raw markup, and drop a leading
/// bind-once marker.
fn normalize(text: &str) -> String {
    let text = text.replace("&quot;", "\"").replace("&#39;", "\"");
    match text.trim_start().strip_prefix("::") {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

/// Parse `text` and collect translate-filtered literals, surfacing parse errors.
pub fn try_parse_for_filters(text: &str) -> Result<Vec<Translatable>, ExpressionError> {
    let ast = expression::parse(&normalize(text))?;
    let mut collector = FilterCollector::default();
    collector.visit(&ast);
    Ok(collector.found)
}

/// Like [`try_parse_for_filters`], but an unparsable expression yields nothing.
pub fn parse_for_filters(text: &str) -> Vec<Translatable> {
    try_parse_for_filters(text).unwrap_or_else(|err| {
        debug!(expression = text, error = %err, "could not parse expression");
        Vec::new()
    })
}
