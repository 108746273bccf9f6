//! Import statement extraction
//!
//! Recognizes import statements syntactically; module paths are never
//! resolved. Used by the copy/move workflow to carry imports across files.
//!
//! Global invariants:
//! - Statements come back in source order, duplicates preserved
//! - Text is returned exactly as written (multi-line imports included)

use crate::language::Language;
use crate::parser::{parse_source, ParsedSource};
use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use swc_common::Spanned;
use swc_ecma_ast::{ImportSpecifier, ModuleDecl, ModuleItem, TsModuleRef};
use tracing::debug;

/// One import statement found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    /// Statement text as written
    pub text: String,
    /// Module specifier, e.g. `react` or `./utils`
    pub source: String,
    /// Names the statement binds in the importing module
    pub local_names: Vec<String>,
    /// Byte offset of the statement start
    pub start: usize,
    /// Byte offset just past the statement
    pub end: usize,
}

/// Raw import statements in source order
///
/// Parses the code as a module; if that fails (a partial selection, say)
/// falls back to a line scan for `import` lines.
pub fn extract_imports(code: &str, language: Language) -> Result<Vec<String>> {
    Ok(import_statements(code, language)
        .into_iter()
        .map(|statement| statement.text)
        .collect())
}

/// Import statements with their bindings, parse first, line scan second
pub fn import_statements(code: &str, language: Language) -> Vec<ImportStatement> {
    match parse_source(code, language) {
        Ok(parsed) => collect_imports(&parsed, code),
        Err(e) => {
            debug!(error = %e, "falling back to line scan for imports");
            scan_import_lines(code)
        }
    }
}

/// Import declarations at module scope of a parsed document
pub fn collect_imports(parsed: &ParsedSource, code: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();

    for item in &parsed.module.body {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };

        let (source, local_names) = match decl {
            ModuleDecl::Import(import) => {
                let names = import
                    .specifiers
                    .iter()
                    .map(|specifier| match specifier {
                        ImportSpecifier::Named(named) => named.local.sym.to_string(),
                        ImportSpecifier::Default(default) => default.local.sym.to_string(),
                        ImportSpecifier::Namespace(namespace) => namespace.local.sym.to_string(),
                    })
                    .collect();
                (import.src.value.to_atom_lossy().to_string(), names)
            }
            ModuleDecl::TsImportEquals(import) => match &import.module_ref {
                TsModuleRef::TsExternalModuleRef(external) => (
                    external.expr.value.to_atom_lossy().to_string(),
                    vec![import.id.sym.to_string()],
                ),
                TsModuleRef::TsEntityName(_) => continue,
            },
            _ => continue,
        };

        let (start, end) = parsed.range(decl.span());
        imports.push(ImportStatement {
            text: code.get(start..end).unwrap_or_default().to_string(),
            source,
            local_names,
            start,
            end,
        });
    }

    imports
}

/// Line-oriented recognition of `import ...` lines
///
/// Only single-line statements are recognized and no bindings are reported.
pub fn scan_import_lines(code: &str) -> Vec<ImportStatement> {
    static IMPORT_LINE_RE: OnceLock<Regex> = OnceLock::new();
    let line_re = IMPORT_LINE_RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*(import\b.+?)[ \t]*\r?$").unwrap());

    static SOURCE_RE: OnceLock<Regex> = OnceLock::new();
    let source_re = SOURCE_RE.get_or_init(|| {
        Regex::new(r#"(?:from|import|require\()\s*['"]([^'"]+)['"]"#).unwrap()
    });

    line_re
        .captures_iter(code)
        .filter_map(|cap| cap.get(1))
        .filter(|m| !m.as_str().starts_with("import("))
        .map(|m| ImportStatement {
            text: m.as_str().to_string(),
            source: source_re
                .captures(m.as_str())
                .map(|c| c[1].to_string())
                .unwrap_or_default(),
            local_names: Vec::new(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Canonical form for comparing import statements
///
/// Collapses whitespace, unifies quote style and drops the trailing `;`.
pub fn normalize_import(statement: &str) -> String {
    static WS_RE: OnceLock<Regex> = OnceLock::new();
    let ws_re = WS_RE.get_or_init(|| Regex::new(r"\s+").unwrap());

    static PUNCT_RE: OnceLock<Regex> = OnceLock::new();
    let punct_re = PUNCT_RE.get_or_init(|| Regex::new(r"\s*([{},])\s*").unwrap());

    let collapsed = ws_re.replace_all(statement.trim(), " ");
    let tightened = punct_re.replace_all(&collapsed, "$1");
    tightened
        .trim_end_matches(';')
        .trim_end()
        .replace('"', "'")
        .replace(",}", "}")
}

/// Statements from `candidates` whose normalized form is not in `existing`
///
/// Also drops repeats within `candidates`; first occurrence wins.
pub fn missing_imports(candidates: &[String], existing: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|s| normalize_import(s)).collect();
    candidates
        .iter()
        .filter(|statement| seen.insert(normalize_import(statement)))
        .cloned()
        .collect()
}

/// Imports whose bindings are referenced in `code`
///
/// Side-effect imports (`import './polyfill'`) bind nothing and are never
/// considered referenced.
pub fn referenced_imports<'a>(imports: &'a [ImportStatement], code: &str) -> Vec<&'a ImportStatement> {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    let ident_re = IDENT_RE.get_or_init(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap());

    let identifiers: HashSet<&str> = ident_re.find_iter(code).map(|m| m.as_str()).collect();
    imports
        .iter()
        .filter(|import| {
            import
                .local_names
                .iter()
                .any(|name| identifiers.contains(name.as_str()))
        })
        .collect()
}
