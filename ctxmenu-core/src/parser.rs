//! TypeScript and JavaScript parser using SWC
//!
//! Global invariants enforced:
//! - Every parse owns a fresh `SourceMap`; nothing is shared between calls
//! - Recoverable syntax errors never abort a parse
//! - Byte offsets handed out are relative to the caller's text

use crate::language::Language;
use anyhow::Result;
use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::{sync::Lrc, BytePos, FileName, SourceFile, SourceMap, Span};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use tracing::debug;

const BOM: &str = "\u{feff}";

/// Deepest bracket nesting accepted before a document is refused
///
/// Parsing and every tree walk recurse once per level, and a stack overflow
/// aborts the process instead of unwinding.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A successfully parsed document
pub struct ParsedSource {
    pub module: Module,
    /// Name of the parser configuration that succeeded
    pub syntax_label: &'static str,
    start_pos: BytePos,
    bom_len: usize,
}

impl ParsedSource {
    /// Byte offset of a SWC position within the input text
    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start_pos.0) as usize + self.bom_len
    }

    /// Byte range of a SWC span within the input text
    pub fn range(&self, span: Span) -> (usize, usize) {
        (self.offset(span.lo), self.offset(span.hi))
    }
}

fn typescript(tsx: bool) -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx,
        decorators: true,
        dts: false,
        ..Default::default()
    })
}

fn ecmascript() -> Syntax {
    Syntax::Es(EsSyntax {
        jsx: true,
        decorators: true,
        decorators_before_export: true,
        ..Default::default()
    })
}

/// Parser configurations to try, most precise first
///
/// Plain TypeScript keeps JSX off so `<T>value` casts and generic arrows stay
/// legal; everything else starts from TSX, which also accepts untyped
/// JavaScript with markup. Later entries trade features for tolerance.
fn syntax_attempts(language: Language) -> [(&'static str, Syntax); 3] {
    match language {
        Language::TypeScript => [
            ("typescript", typescript(false)),
            ("tsx", typescript(true)),
            ("ecmascript", ecmascript()),
        ],
        Language::TypeScriptReact | Language::JavaScript | Language::JavaScriptReact => [
            ("tsx", typescript(true)),
            ("typescript", typescript(false)),
            ("ecmascript", ecmascript()),
        ],
    }
}

/// Parse a document as an ES module
///
/// Tries each configuration from [`syntax_attempts`] in turn and returns the
/// first that parses. Returns the last error if none do.
pub fn parse_source(src: &str, language: Language) -> Result<ParsedSource> {
    check_nesting(src)?;
    let (body, bom_len) = strip_bom(src);

    let mut last_error = None;
    for (label, syntax) in syntax_attempts(language) {
        match parse_with(body, syntax, label, None) {
            Ok((module, start_pos)) => {
                return Ok(ParsedSource {
                    module,
                    syntax_label: label,
                    start_pos,
                    bom_len,
                });
            }
            Err(e) => {
                debug!(syntax = label, error = %e, "parse attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no parser configuration available")))
}

/// Byte ranges of every comment, sorted by start
///
/// Uses the same configurations as [`parse_source`]; fails when the text
/// does not parse under any of them.
pub fn comment_ranges(src: &str, language: Language) -> Result<Vec<(usize, usize)>> {
    check_nesting(src)?;
    let (body, bom_len) = strip_bom(src);

    let mut last_error = None;
    for (label, syntax) in syntax_attempts(language) {
        let comments = SingleThreadedComments::default();
        match parse_with(body, syntax, label, Some(&comments as &dyn Comments)) {
            Ok((_, start_pos)) => {
                let offset = |pos: BytePos| pos.0.saturating_sub(start_pos.0) as usize + bom_len;
                let (leading, trailing) = comments.take_all();
                let leading = leading.borrow();
                let trailing = trailing.borrow();
                let mut ranges: Vec<(usize, usize)> = leading
                    .values()
                    .chain(trailing.values())
                    .flatten()
                    .map(|comment| (offset(comment.span.lo), offset(comment.span.hi)))
                    .collect();
                ranges.sort_unstable();
                ranges.dedup();
                return Ok(ranges);
            }
            Err(e) => {
                debug!(syntax = label, error = %e, "comment scan attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no parser configuration available")))
}

/// Deepest `(` / `[` / `{` nesting in the text
///
/// One linear pass with no tokenizing: brackets inside strings, comments and
/// regex literals count as well, and unmatched closers never go below zero.
pub fn nesting_depth(src: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    for byte in src.bytes() {
        match byte {
            b'(' | b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

fn check_nesting(src: &str) -> Result<()> {
    let depth = nesting_depth(src);
    if depth > MAX_NESTING_DEPTH {
        debug!(depth, limit = MAX_NESTING_DEPTH, "refusing to parse deeply nested document");
        anyhow::bail!(
            "nesting depth {} exceeds the limit of {}",
            depth,
            MAX_NESTING_DEPTH
        );
    }
    Ok(())
}

fn strip_bom(src: &str) -> (&str, usize) {
    match src.strip_prefix(BOM) {
        Some(rest) => (rest, BOM.len()),
        None => (src, 0),
    }
}

fn parse_with(
    src: &str,
    syntax: Syntax,
    label: &str,
    comments: Option<&dyn Comments>,
) -> Result<(Module, BytePos)> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file: Lrc<SourceFile> = source_map.new_source_file(
        FileName::Custom(format!("<{}>", label)).into(),
        src.to_string(),
    );

    let input = StringInput::from(&*source_file);
    let lexer = Lexer::new(syntax, EsVersion::EsNext, input, comments);
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| {
        let error_msg = e.kind().msg();
        anyhow::anyhow!("Parse error: {}", error_msg)
    })?;

    let recovered = parser.take_errors();
    if !recovered.is_empty() {
        debug!(
            syntax = label,
            count = recovered.len(),
            first = %recovered[0].kind().msg(),
            "recovered from syntax errors"
        );
    }

    Ok((module, source_file.start_pos))
}

#[cfg(test)]
#[path = "parser/tests.rs"]
mod tests;
