//! Script scanner: finds marker calls and `gettextCatalog` lookups in JS/TS sources.
//!
//! Recognised call shapes (each needs at least one argument):
//! - `gettext('msg', _, 'context')` or `obj.gettext(...)` for every configured marker name
//! - `gettextCatalog.getString('msg', _, 'context')`
//! - `gettextCatalog.getPlural(n, 'singular', 'plural')`
//!
//! Only string literals and `+` chains of string literals are resolved. `/// ` line
//! comments before the call, or before the closest enclosing node that has leading
//! comments, become extracted comments.

use swc_common::{
    SourceMap, Span, Spanned,
    comments::{Comment, CommentKind},
};
use swc_ecma_ast::{
    BinExpr, BinaryOp, CallExpr, Callee, ClassMember, Decl, Expr, ExprOrSpread, Lit, MemberProp,
    ModuleItem, PropOrSpread, Stmt, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::core::{
    catalog::{Catalog, CatalogError},
    data::{Candidate, SourceReference},
    parsers::script::{ExtractedComments, parse_script_source},
};

/// Object name that `getString` / `getPlural` must be called on.
const CATALOG_ACCESSOR: &str = "gettextCatalog";

/// Marker for comments meant for translators.
const TRANSLATOR_COMMENT_PREFIX: &str = "/ ";

#[derive(Debug, Clone)]
pub struct ScriptScanner {
    marker_names: Vec<String>,
}

impl ScriptScanner {
    pub fn new(marker_names: Vec<String>) -> Self {
        Self { marker_names }
    }

    pub fn marker_names(&self) -> &[String] {
        &self.marker_names
    }

    /// Scan `source`, shifting reported lines by `line_offset` (non-zero for scripts
    /// embedded in markup).
    ///
    /// A source that fails to parse contributes nothing.
    pub fn scan_fragment(
        &self,
        filename: &str,
        source: &str,
        line_offset: usize,
        catalog: &mut Catalog,
    ) -> Result<(), CatalogError> {
        let parsed = match parse_script_source(source.to_string(), filename) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(file = filename, error = %err, "skipping unparsable script");
                return Ok(());
            }
        };

        let mut collector = CallCollector {
            scanner: self,
            filename,
            line_offset,
            source_map: &parsed.source_map,
            comments: &parsed.comments,
            comment_scope: Vec::new(),
            candidates: Vec::new(),
        };
        parsed.program.visit_with(&mut collector);

        for candidate in collector.candidates {
            catalog.add_string(candidate)?;
        }
        Ok(())
    }

    fn is_marker(&self, name: &str) -> bool {
        self.marker_names.iter().any(|marker| marker == name)
    }
}

/// Which argument positions carry the strings of a recognised call.
enum CallShape {
    /// msgid at 0, context at 2.
    Singular,
    /// singular at 1, plural at 2.
    Plural,
}

struct CallCollector<'a> {
    scanner: &'a ScriptScanner,
    filename: &'a str,
    line_offset: usize,
    source_map: &'a SourceMap,
    comments: &'a ExtractedComments,
    /// Leading comments of the enclosing nodes, innermost last.
    comment_scope: Vec<&'a [Comment]>,
    candidates: Vec<Candidate>,
}

impl<'a> CallCollector<'a> {
    /// Walk `node`'s children with its leading comments (if any) pushed as fallback.
    fn with_comment_scope<N>(&mut self, node: &N)
    where
        N: Spanned + VisitWith<Self>,
    {
        let comments = self.comments;
        let scoped = comments.leading_at(node.span().lo);
        if let Some(scoped) = scoped {
            self.comment_scope.push(scoped);
        }
        node.visit_children_with(self);
        if scoped.is_some() {
            self.comment_scope.pop();
        }
    }

    fn shape_of(&self, call: &CallExpr) -> Option<(CallShape, Span)> {
        if call.args.is_empty() {
            return None;
        }
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let (name, span) = method_name(callee)?;
        if self.scanner.is_marker(name) {
            return Some((CallShape::Singular, span));
        }
        if object_name(callee) != Some(CATALOG_ACCESSOR) {
            return None;
        }
        match name {
            "getString" => Some((CallShape::Singular, span)),
            "getPlural" => Some((CallShape::Plural, span)),
            _ => None,
        }
    }

    fn collect(&mut self, call: &CallExpr) {
        let Some((shape, name_span)) = self.shape_of(call) else {
            return;
        };
        let arg = |index: usize| call.args.get(index).and_then(literal_argument);
        let (msgid, plural, context) = match shape {
            CallShape::Singular => (arg(0), None, arg(2)),
            CallShape::Plural => (arg(1), arg(2), None),
        };
        let Some(msgid) = msgid else {
            return;
        };

        let line = self.source_map.lookup_char_pos(name_span.hi).line + self.line_offset;
        let comment = self.translator_comment(call);
        self.candidates.push(
            Candidate::new(SourceReference::new(self.filename, line), msgid)
                .with_plural(plural)
                .with_comment(comment)
                .with_context(context),
        );
    }

    fn translator_comment(&self, call: &CallExpr) -> Option<String> {
        let comments = self
            .comments
            .leading_at(call.span.lo)
            .or_else(|| self.comment_scope.last().copied())?;
        let lines: Vec<&str> = comments
            .iter()
            .filter(|comment| comment.kind == CommentKind::Line)
            .filter_map(|comment| comment.text.strip_prefix(TRANSLATOR_COMMENT_PREFIX))
            .collect();
        (!lines.is_empty()).then(|| lines.join(", "))
    }
}

impl Visit for CallCollector<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.collect(node);
        node.visit_children_with(self);
    }

    fn visit_module_item(&mut self, node: &ModuleItem) {
        self.with_comment_scope(node);
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        self.with_comment_scope(node);
    }

    fn visit_decl(&mut self, node: &Decl) {
        self.with_comment_scope(node);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.with_comment_scope(node);
    }

    fn visit_expr(&mut self, node: &Expr) {
        self.with_comment_scope(node);
    }

    fn visit_prop_or_spread(&mut self, node: &PropOrSpread) {
        self.with_comment_scope(node);
    }

    fn visit_class_member(&mut self, node: &ClassMember) {
        self.with_comment_scope(node);
    }
}

/// Name of the called function: `name(...)` or `obj.name(...)`.
fn method_name(callee: &Expr) -> Option<(&str, Span)> {
    match callee {
        Expr::Ident(ident) => Some((ident.sym.as_str(), ident.span)),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => Some((prop.sym.as_str(), prop.span)),
            _ => None,
        },
        _ => None,
    }
}

/// Name of the receiver of a member call: `obj` in `obj.m()`, `b` in `a.b.m()`.
fn object_name(callee: &Expr) -> Option<&str> {
    let Expr::Member(member) = callee else {
        return None;
    };
    match member.obj.as_ref() {
        Expr::Ident(ident) => Some(ident.sym.as_str()),
        Expr::Member(inner) => match &inner.prop {
            MemberProp::Ident(prop) => Some(prop.sym.as_str()),
            _ => None,
        },
        _ => None,
    }
}

fn literal_argument(arg: &ExprOrSpread) -> Option<String> {
    if arg.spread.is_some() {
        return None;
    }
    literal_value(&arg.expr)
}

/// Resolve a string literal or a concatenation made only of string literals.
fn literal_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(str::to_string),
        Expr::Bin(BinExpr {
            op: BinaryOp::Add,
            left,
            right,
            ..
        }) => {
            let mut value = literal_value(left)?;
            value.push_str(&literal_value(right)?);
            Some(value)
        }
        _ => None,
    }
}
