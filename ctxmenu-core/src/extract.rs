//! Copy/move-to-file workflow
//!
//! Text transforms that place a block of code into another file, carrying
//! the imports it needs, plus the file I/O around them.
//!
//! Global invariants:
//! - Code is inserted as `"\n" + code + "\n"` at the start of a line
//! - The target is written before the source is touched on a move
//! - Files are replaced atomically; a move whose source write fails restores
//!   the target, so a failed transfer leaves both intact

use crate::ast::FunctionSpan;
use crate::config::{CopyCodeConfig, ImportHandling, InsertionPoint};
use crate::imports::{collect_imports, import_statements, missing_imports, referenced_imports};
use crate::language::{is_compatible_extension, Cursor, Language, LineIndex, Position};
use crate::parser::{comment_ranges, parse_source};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use swc_common::Spanned;
use swc_ecma_ast::{ModuleDecl, ModuleItem};
use tracing::{debug, info, warn};

/// Region of a document between two editor positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeRange {
    pub start: Position,
    pub end: Position,
}

impl CodeRange {
    pub fn new(start: Position, end: Position) -> Self {
        CodeRange { start, end }
    }

    /// Range covering a located function
    pub fn from_function(function: &FunctionSpan) -> Self {
        CodeRange {
            start: Position::new(function.start_line.saturating_sub(1), function.start_column),
            end: Position::new(function.end_line.saturating_sub(1), function.end_column),
        }
    }

    /// Byte offsets of the range within `text`
    pub fn byte_range(&self, text: &str) -> Result<(usize, usize)> {
        let index = LineIndex::new(text);
        let start = index
            .byte_offset(Cursor::Position(self.start))
            .with_context(|| format!("range start {:?} is outside the document", self.start))?;
        let end = index
            .byte_offset(Cursor::Position(self.end))
            .with_context(|| format!("range end {:?} is outside the document", self.end))?;
        if start > end {
            anyhow::bail!("range start {:?} is after its end {:?}", self.start, self.end);
        }
        Ok((start, end))
    }
}

/// 0-based line at which copied code is inserted
///
/// `Smart` goes after the last top-level import, else before the first
/// export, else to the end. A result equal to the line count means "append".
pub fn insertion_line(target: &str, point: InsertionPoint, language: Language) -> usize {
    let index = LineIndex::new(target);
    match point {
        InsertionPoint::Beginning => 0,
        InsertionPoint::End => index.line_count(),
        InsertionPoint::Smart => smart_insertion_line(target, &index, language),
    }
}

fn smart_insertion_line(target: &str, index: &LineIndex<'_>, language: Language) -> usize {
    match parse_source(target, language) {
        Ok(parsed) => {
            if let Some(last) = collect_imports(&parsed, target).last() {
                return index.line_of(last.end) + 1;
            }
            let first_export = parsed.module.body.iter().find_map(|item| match item {
                ModuleItem::ModuleDecl(ModuleDecl::Import(_) | ModuleDecl::TsImportEquals(_)) => None,
                ModuleItem::ModuleDecl(decl) => Some(parsed.offset(decl.span().lo)),
                ModuleItem::Stmt(_) => None,
            });
            match first_export {
                Some(offset) => index.line_of(offset),
                None => index.line_count(),
            }
        }
        Err(e) => {
            debug!(error = %e, "target does not parse, scanning lines for insertion point");
            scan_insertion_line(target, index)
        }
    }
}

/// Line-based fallback: after the last `import ` line, else before the first `export ` line
fn scan_insertion_line(target: &str, index: &LineIndex<'_>) -> usize {
    let mut last_import = None;
    let mut first_export = None;
    for (i, line) in target.split('\n').enumerate() {
        let line = line.trim();
        if line.starts_with("import ") {
            last_import = Some(i);
        } else if line.starts_with("export ") && first_export.is_none() {
            first_export = Some(i);
        }
    }

    match (last_import, first_export) {
        (Some(line), _) => line + 1,
        (None, Some(line)) => line,
        (None, None) => index.line_count(),
    }
}

/// Byte offset of the start of a 0-based line, or the end of the text
fn line_start(target: &str, line: usize) -> usize {
    LineIndex::new(target)
        .byte_offset(Cursor::Position(Position::new(line as u32, 0)))
        .unwrap_or(target.len())
}

/// Insert `code` into `target` at the configured point
pub fn insert_code(target: &str, code: &str, point: InsertionPoint, language: Language) -> String {
    let offset = line_start(target, insertion_line(target, point, language));
    let mut out = String::with_capacity(target.len() + code.len() + 2);
    out.push_str(&target[..offset]);
    out.push('\n');
    out.push_str(code);
    out.push('\n');
    out.push_str(&target[offset..]);
    out
}

/// Remove comments from a block of code
///
/// Comments alone on their line take the whole line with them. Code that
/// does not parse is returned unchanged.
pub fn strip_comments(code: &str, language: Language) -> String {
    let ranges = match comment_ranges(code, language) {
        Ok(ranges) => ranges,
        Err(e) => {
            debug!(error = %e, "cannot strip comments from unparseable code");
            return code.to_string();
        }
    };

    let mut out = String::with_capacity(code.len());
    let mut cursor = 0;
    for (start, end) in ranges {
        if start < cursor {
            continue;
        }
        let line_begin = code[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = code[end..].find('\n').map_or(code.len(), |i| end + i);
        let alone = code[line_begin..start].trim().is_empty() && code[end..line_end].trim().is_empty();

        let (cut_start, cut_end) = if alone && line_begin >= cursor {
            (line_begin, (line_end + 1).min(code.len()))
        } else {
            (code[cursor..start].trim_end_matches([' ', '\t']).len() + cursor, end)
        };
        out.push_str(&code[cursor..cut_start]);
        cursor = cut_end;
    }
    out.push_str(&code[cursor..]);
    out
}

/// Import statements to add to the target for a block of code
///
/// Candidates are the source file's imports whose bindings the code
/// references, minus any the code already carries.
pub fn plan_imports(
    source_text: &str,
    code: &str,
    target_text: &str,
    handling: ImportHandling,
    language: Language,
) -> Vec<String> {
    let statement_texts = |text: &str| -> Vec<String> {
        import_statements(text, language)
            .into_iter()
            .map(|statement| statement.text)
            .collect()
    };

    let candidates = match handling {
        ImportHandling::Skip => return Vec::new(),
        ImportHandling::Merge | ImportHandling::Duplicate => {
            let source_imports = import_statements(source_text, language);
            let referenced: Vec<String> = referenced_imports(&source_imports, code)
                .into_iter()
                .map(|statement| statement.text.clone())
                .collect();
            missing_imports(&referenced, &statement_texts(code))
        }
    };

    match handling {
        ImportHandling::Merge => missing_imports(&candidates, &statement_texts(target_text)),
        ImportHandling::Duplicate | ImportHandling::Skip => candidates,
    }
}

/// Result of placing code into a target document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPlan {
    /// New target text
    pub target_text: String,
    /// 0-based line where the code block was inserted
    pub insertion_line: usize,
    pub imports_added: Vec<String>,
}

/// Place `code` into `target_text`, adding imports per `settings`
pub fn plan_transfer(
    source_text: &str,
    code: &str,
    target_text: &str,
    settings: &CopyCodeConfig,
    language: Language,
) -> TransferPlan {
    let code = if settings.preserve_comments {
        code.to_string()
    } else {
        strip_comments(code, language)
    };
    let imports = plan_imports(source_text, &code, target_text, settings.handle_imports, language);

    let code_line = insertion_line(target_text, settings.insertion_point, language);
    let code_offset = line_start(target_text, code_line);

    let import_offset = import_statements(target_text, language)
        .last()
        .map_or(0, |last| line_start(target_text, LineIndex::new(target_text).line_of(last.end) + 1));

    let mut import_block = String::new();
    for statement in &imports {
        import_block.push_str(statement);
        import_block.push('\n');
    }
    // Imports appended after the last line need their own line break
    if !import_block.is_empty()
        && import_offset == target_text.len()
        && !target_text.is_empty()
        && !target_text.ends_with('\n')
    {
        import_block.insert(0, '\n');
    }

    let code_block = format!("\n{}\n", code);

    // At equal offsets the imports go first
    let mut target = String::with_capacity(target_text.len() + import_block.len() + code_block.len());
    if import_offset <= code_offset {
        target.push_str(&target_text[..import_offset]);
        target.push_str(&import_block);
        target.push_str(&target_text[import_offset..code_offset]);
        target.push_str(&code_block);
        target.push_str(&target_text[code_offset..]);
    } else {
        target.push_str(&target_text[..code_offset]);
        target.push_str(&code_block);
        target.push_str(&target_text[code_offset..import_offset]);
        target.push_str(&import_block);
        target.push_str(&target_text[import_offset..]);
    }

    let insertion_line = if import_offset <= code_offset {
        code_line + imports.len()
    } else {
        code_line
    };

    TransferPlan {
        target_text: target,
        insertion_line,
        imports_added: imports,
    }
}

/// Outcome of a copy or move between files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub insertion_line: usize,
    pub imports_added: Vec<String>,
    /// Whether the code was removed from the source
    pub moved: bool,
}

/// Copy a range of `source_path` into `target_path`
pub fn copy_to_file(
    source_path: &Path,
    range: CodeRange,
    target_path: &Path,
    settings: &CopyCodeConfig,
) -> Result<TransferOutcome> {
    transfer(source_path, range, target_path, settings, false)
}

/// Move a range of `source_path` into `target_path`
pub fn move_to_file(
    source_path: &Path,
    range: CodeRange,
    target_path: &Path,
    settings: &CopyCodeConfig,
) -> Result<TransferOutcome> {
    transfer(source_path, range, target_path, settings, true)
}

fn transfer(
    source_path: &Path,
    range: CodeRange,
    target_path: &Path,
    settings: &CopyCodeConfig,
    remove_from_source: bool,
) -> Result<TransferOutcome> {
    check_target(source_path, target_path)?;

    let source_text = std::fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file: {}", source_path.display()))?;
    let target_text = std::fs::read_to_string(target_path)
        .with_context(|| format!("failed to read target file: {}", target_path.display()))?;

    let (start, end) = range
        .byte_range(&source_text)
        .with_context(|| format!("invalid range in {}", source_path.display()))?;
    let code = &source_text[start..end];
    if code.trim().is_empty() {
        anyhow::bail!("no code selected");
    }

    let language = Language::from_path(source_path).unwrap_or(Language::TypeScriptReact);
    let plan = plan_transfer(&source_text, code, &target_text, settings, language);
    atomic_write(target_path, &plan.target_text)?;

    if remove_from_source {
        let mut remaining = String::with_capacity(source_text.len() - code.len());
        remaining.push_str(&source_text[..start]);
        remaining.push_str(&source_text[end..]);
        if let Err(e) = atomic_write(source_path, &remaining) {
            warn!(
                target = %target_path.display(),
                error = %e,
                "source write failed, restoring target"
            );
            atomic_write(target_path, &target_text).with_context(|| {
                format!("failed to restore target file: {}", target_path.display())
            })?;
            return Err(e);
        }
    }

    info!(
        source = %source_path.display(),
        target = %target_path.display(),
        line = plan.insertion_line + 1,
        imports = plan.imports_added.len(),
        moved = remove_from_source,
        "code transferred"
    );

    Ok(TransferOutcome {
        source_path: source_path.to_path_buf(),
        target_path: target_path.to_path_buf(),
        insertion_line: plan.insertion_line,
        imports_added: plan.imports_added,
        moved: remove_from_source,
    })
}

fn check_target(source_path: &Path, target_path: &Path) -> Result<()> {
    if !crate::workspace::validate_target_file(target_path) {
        anyhow::bail!(
            "target file is not accessible or writable: {}",
            target_path.display()
        );
    }

    let same_file = match (source_path.canonicalize(), target_path.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => source_path == target_path,
    };
    if same_file {
        anyhow::bail!("source and target are the same file: {}", target_path.display());
    }

    let extension = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string()
    };
    let (source_ext, target_ext) = (extension(source_path), extension(target_path));
    if !is_compatible_extension(&source_ext, &target_ext) {
        anyhow::bail!(
            "{} files cannot receive code from {} files",
            crate::language::normalize_extension(&target_ext),
            crate::language::normalize_extension(&source_ext)
        );
    }

    Ok(())
}

/// Write a file atomically (temp file + rename)
fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".ctxmenu-tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = std::fs::File::create(&tmp_path)
            .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("failed to write temp file: {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to sync temp file: {}", tmp_path.display()))?;
    }

    std::fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to rename {} to {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "extract/tests.rs"]
mod tests;
