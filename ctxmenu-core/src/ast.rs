//! Query results produced by the function locator
//!
//! Global invariants enforced:
//! - A `FunctionSpan` is built fresh per query and never cached
//! - `full_text` is exactly the document sliced at the span

use crate::language::SourceSpan;
use serde::{Deserialize, Serialize};

/// Syntactic shape of a function-like node
///
/// The closed set of tree nodes the locator cares about. Every match over it
/// is exhaustive so a new shape cannot be silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionShape {
    /// `function foo() {}`, including `export default function () {}`
    Declaration,
    /// `() => {}`
    Arrow,
    /// `function () {}` in expression position
    Expression,
    /// Class method, private method, accessor or constructor
    Method,
    /// `{ foo() {} }`
    ObjectMethod,
}

impl FunctionShape {
    /// Kind reported when no naming or markup convention applies
    pub fn structural_kind(self) -> FunctionKind {
        match self {
            FunctionShape::Declaration | FunctionShape::Expression => FunctionKind::Function,
            FunctionShape::Arrow => FunctionKind::Arrow,
            FunctionShape::Method | FunctionShape::ObjectMethod => FunctionKind::Method,
        }
    }
}

/// Classification reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Method,
    Arrow,
    Async,
    Component,
    Hook,
}

impl FunctionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Function => "function",
            FunctionKind::Method => "method",
            FunctionKind::Arrow => "arrow",
            FunctionKind::Async => "async",
            FunctionKind::Component => "component",
            FunctionKind::Hook => "hook",
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The enclosing function-like construct found for a cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpan {
    /// Bound identifier, or `"anonymous"`
    pub name: String,
    pub kind: FunctionKind,
    /// 1-based
    pub start_line: u32,
    /// 0-based, UTF-16 units
    pub start_column: u32,
    /// 1-based
    pub end_line: u32,
    /// 0-based, UTF-16 units, just past the last character
    pub end_column: u32,
    pub is_exported: bool,
    pub has_decorators: bool,
    pub full_text: String,
}

impl FunctionSpan {
    /// Build a span result, slicing `full_text` out of the document
    pub(crate) fn new(
        source: &str,
        span: SourceSpan,
        name: String,
        kind: FunctionKind,
        is_exported: bool,
        has_decorators: bool,
    ) -> Self {
        FunctionSpan {
            name,
            kind,
            start_line: span.start_line,
            start_column: span.start_column,
            end_line: span.end_line,
            end_column: span.end_column,
            is_exported,
            has_decorators,
            full_text: source.get(span.start..span.end).unwrap_or_default().to_string(),
        }
    }

    /// Short label used in confirmations, e.g. `hook 'useThing'`
    pub fn label(&self) -> String {
        format!("{} '{}'", self.kind, self.name)
    }
}
