//! ctxmenu core library - function-boundary detection for TypeScript and JavaScript editors

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Detection is strictly per-document; nothing is cached between queries
// - No global mutable state; services are plain values passed explicitly
// - Detection entry points never panic outward and never return errors
// - Identical input yields identical output

pub mod ast;
pub mod classify;
pub mod config;
pub mod discover;
pub mod extract;
pub mod imports;
pub mod language;
pub mod locate;
pub mod parser;
pub mod project;
pub mod terminal;
pub mod workspace;

pub use ast::{FunctionKind, FunctionShape, FunctionSpan};
pub use config::{ContextMenuConfig, ResolvedConfig};
pub use extract::{copy_to_file, move_to_file, CodeRange, TransferOutcome};
pub use language::{Cursor, Language, Position};
pub use locate::FunctionLocator;
pub use project::{detect_project, resolve_project, ProjectType};
pub use terminal::{plan_terminal, TerminalLaunch};
pub use workspace::{find_compatible_files, validate_target_file, CompatibleFile};

/// Innermost function containing `cursor`, see [`FunctionLocator::locate`]
pub fn locate(text: &str, language_hint: &str, cursor: impl Into<Cursor>) -> Option<FunctionSpan> {
    FunctionLocator::new().locate(text, language_hint, cursor)
}

/// Raw import statements of `code`, see [`FunctionLocator::extract_imports`]
pub fn extract_imports(code: &str, language_hint: &str) -> Vec<String> {
    FunctionLocator::new().extract_imports(code, language_hint)
}
