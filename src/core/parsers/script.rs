use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::Arc;
use swc_common::{
    BytePos, FileName, Globals, SourceMap,
    comments::{Comment, SingleThreadedComments},
};
use swc_ecma_ast::Program;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// Map of byte positions to comments.
pub type CommentMap = HashMap<BytePos, Vec<Comment>>;

/// Comments extracted from SingleThreadedComments, detached from swc's RefCell storage.
#[derive(Debug, Clone, Default)]
pub struct ExtractedComments {
    pub leading: CommentMap,
    pub trailing: CommentMap,
}

impl ExtractedComments {
    /// Extract comments from SingleThreadedComments.
    /// This must be called before SingleThreadedComments is dropped.
    pub fn from_swc(comments: &SingleThreadedComments) -> Self {
        let (leading, trailing) = comments.borrow_all();
        Self {
            leading: leading.iter().map(|(k, v)| (*k, v.clone())).collect(),
            trailing: trailing.iter().map(|(k, v)| (*k, v.clone())).collect(),
        }
    }

    /// Leading comments attached to the token starting at `pos`.
    pub fn leading_at(&self, pos: BytePos) -> Option<&[Comment]> {
        self.leading
            .get(&pos)
            .map(Vec::as_slice)
            .filter(|comments| !comments.is_empty())
    }
}

pub struct ParsedScript {
    pub program: Program,
    pub source_map: Arc<SourceMap>,
    pub comments: ExtractedComments,
}

/// Pick the parser syntax from the file name: TypeScript for `.ts`/`.tsx`,
/// ECMAScript with JSX for everything else (including scripts embedded in markup).
pub fn syntax_for(file_path: &str) -> Syntax {
    match file_path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("ts") | Some("mts") | Some("cts") => Syntax::Typescript(TsSyntax::default()),
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

/// Parse script source code into a program (module or classic script).
///
/// Each call gets its own SourceMap, so byte positions are only meaningful
/// together with the returned `source_map`.
pub fn parse_script_source(code: String, file_path: &str) -> Result<ParsedScript> {
    use swc_common::GLOBALS;

    let source_map: Arc<SourceMap> = Default::default();

    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

        let comments = SingleThreadedComments::default();
        let mut parser = Parser::new(
            syntax_for(file_path),
            StringInput::from(&*source_file),
            Some(&comments),
        );

        let program = parser
            .parse_program()
            .map_err(|e| anyhow!("Failed to parse script: {:?}", e))?;

        // Extract comments immediately (before SingleThreadedComments drops)
        let extracted_comments = ExtractedComments::from_swc(&comments);

        Ok(ParsedScript {
            program,
            source_map: source_map.clone(),
            comments: extracted_comments,
        })
    })
}
