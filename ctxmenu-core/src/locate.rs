//! Cursor-to-function lookup
//!
//! Global invariants enforced:
//! - Public entry points never return errors and never panic outward
//! - Among candidates containing the cursor, the innermost wins
//! - Results depend only on the inputs; nothing is cached between calls

use crate::ast::FunctionSpan;
use crate::classify::classify;
use crate::discover::{discover_functions, Candidate};
use crate::imports;
use crate::language::{Cursor, Language, LineIndex};
use crate::parser::parse_source;
use anyhow::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// Name reported for functions with no resolvable binding
pub const ANONYMOUS: &str = "anonymous";

/// Finds the function-like construct enclosing a cursor
///
/// Stateless: every call parses the text afresh, so a single instance can be
/// shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionLocator;

impl FunctionLocator {
    pub fn new() -> Self {
        FunctionLocator
    }

    /// Innermost function-like construct containing `cursor`
    ///
    /// `language_hint` is an editor language id (`typescriptreact`) or a file
    /// extension or name (`.tsx`, `App.tsx`). Returns `None` when the cursor
    /// is outside every function, cannot be mapped into the text, or the
    /// text cannot be parsed.
    pub fn locate(&self, text: &str, language_hint: &str, cursor: impl Into<Cursor>) -> Option<FunctionSpan> {
        let cursor = cursor.into();
        guarded("locate", || locate_inner(text, language_hint, cursor)).flatten()
    }

    /// Every function-like construct in the text, ordered by start offset
    pub fn functions(&self, text: &str, language_hint: &str) -> Vec<FunctionSpan> {
        guarded("functions", || functions_inner(text, language_hint)).unwrap_or_default()
    }

    /// Raw import statements in source order, duplicates preserved
    pub fn extract_imports(&self, code: &str, language_hint: &str) -> Vec<String> {
        guarded("extract_imports", || {
            imports::extract_imports(code, Language::from_hint_or_default(language_hint))
        })
        .unwrap_or_default()
    }
}

/// Run a query, logging and swallowing both errors and panics
fn guarded<T>(operation: &str, query: impl FnOnce() -> Result<T>) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(query)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            debug!(operation, error = %e, "query failed");
            None
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(operation, panic = %message, "query panicked");
            None
        }
    }
}

fn locate_inner(text: &str, language_hint: &str, cursor: Cursor) -> Result<Option<FunctionSpan>> {
    let index = LineIndex::new(text);
    let Some(offset) = index.byte_offset(cursor) else {
        debug!(?cursor, "cursor outside document");
        return Ok(None);
    };

    let language = Language::from_hint_or_default(language_hint);
    let parsed = parse_source(text, language)?;
    let candidates = discover_functions(&parsed);

    let found = innermost(&candidates, offset).map(|candidate| to_span(text, &index, candidate));
    match &found {
        Some(span) => debug!(offset, function = %span.label(), "located function"),
        None => debug!(offset, candidates = candidates.len(), "no function at cursor"),
    }
    Ok(found)
}

fn functions_inner(text: &str, language_hint: &str) -> Result<Vec<FunctionSpan>> {
    let index = LineIndex::new(text);
    let parsed = parse_source(text, Language::from_hint_or_default(language_hint))?;
    Ok(discover_functions(&parsed)
        .iter()
        .map(|candidate| to_span(text, &index, candidate))
        .collect())
}

/// Latest start wins; equal starts go to the smallest end
fn innermost(candidates: &[Candidate], offset: usize) -> Option<&Candidate> {
    candidates
        .iter()
        .filter(|c| c.contains(offset))
        .max_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)))
}

fn to_span(text: &str, index: &LineIndex<'_>, candidate: &Candidate) -> FunctionSpan {
    let name = candidate.name.as_deref().unwrap_or(ANONYMOUS);
    let kind = classify(candidate.shape, name, candidate.is_async, candidate.renders_markup);
    FunctionSpan::new(
        text,
        index.span(candidate.start, candidate.end),
        name.to_string(),
        kind,
        candidate.is_exported,
        candidate.has_decorators,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FunctionKind;
    use crate::language::Position;

    #[test]
    fn test_guarded_swallows_panics() {
        let result: Option<u32> = guarded("test", || panic!("boom"));
        assert_eq!(result, None);
    }

    #[test]
    fn test_guarded_swallows_errors() {
        let result: Option<u32> = guarded("test", || anyhow::bail!("nope"));
        assert_eq!(result, None);
        assert_eq!(guarded("test", || Ok(7)), Some(7));
    }

    #[test]
    fn test_cursor_past_document_end() {
        let locator = FunctionLocator::new();
        let text = "function f() {}";
        assert!(locator.locate(text, "ts", Position::new(3, 0)).is_none());
        assert!(locator.locate(text, "ts", Cursor::Offset(1000)).is_none());
    }

    #[test]
    fn test_offset_and_position_agree() {
        let locator = FunctionLocator::new();
        let text = "const a = 1;\nfunction run() {\n  return a;\n}\n";
        let by_position = locator.locate(text, "typescript", Position::new(2, 4)).unwrap();
        let offset = text.find("return").unwrap();
        let by_offset = locator.locate(text, "typescript", Cursor::Offset(offset)).unwrap();
        assert_eq!(by_position, by_offset);
        assert_eq!(by_position.name, "run");
        assert_eq!(by_position.kind, FunctionKind::Function);
    }
}
