//! Language detection and source positions
//!
//! Editors hand us either a language id (`typescriptreact`) or a file name;
//! both resolve to one of the four ECMAScript flavours the parser knows.

pub mod span;

use std::path::Path;

pub use span::{Cursor, LineIndex, Position, SourceSpan};

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// TypeScript (.ts, .mts, .cts)
    TypeScript,
    /// TypeScript with JSX (.tsx, .mtsx, .ctsx)
    TypeScriptReact,
    /// JavaScript (.js, .mjs, .cjs)
    JavaScript,
    /// JavaScript with JSX (.jsx, .mjsx, .cjsx)
    JavaScriptReact,
}

impl Language {
    /// Detect language from file extension (without the dot)
    ///
    /// Returns `None` if the extension is not recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" | "mtsx" | "ctsx" => Some(Language::TypeScriptReact),
            "js" | "mjs" | "cjs" => Some(Language::JavaScript),
            "jsx" | "mjsx" | "cjsx" => Some(Language::JavaScriptReact),
            _ => None,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Resolve an editor language id, an extension (with or without the dot)
    /// or a file name.
    ///
    /// Matching is case-insensitive. Returns `None` for anything else; callers
    /// that need a parser regardless should use [`Language::from_hint_or_default`].
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.trim().to_ascii_lowercase();
        match hint.as_str() {
            "typescript" => return Some(Language::TypeScript),
            "typescriptreact" => return Some(Language::TypeScriptReact),
            "javascript" => return Some(Language::JavaScript),
            "javascriptreact" => return Some(Language::JavaScriptReact),
            _ => {}
        }

        let ext = hint.rsplit('.').next().unwrap_or(hint.as_str());
        Self::from_extension(ext)
    }

    /// Like [`Language::from_hint`], falling back to the most permissive
    /// flavour (TypeScript + JSX) for unknown hints.
    pub fn from_hint_or_default(hint: &str) -> Self {
        Self::from_hint(hint).unwrap_or(Language::TypeScriptReact)
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::TypeScriptReact => "TypeScript React",
            Language::JavaScript => "JavaScript",
            Language::JavaScriptReact => "JavaScript React",
        }
    }

    /// Check if this is a TypeScript variant
    pub fn is_typescript(&self) -> bool {
        matches!(self, Language::TypeScript | Language::TypeScriptReact)
    }

    /// Check if this variant allows JSX
    pub fn is_react(&self) -> bool {
        matches!(self, Language::TypeScriptReact | Language::JavaScriptReact)
    }

    /// Get file extensions for this language (without the dot)
    pub fn extensions(&self) -> &[&'static str] {
        match self {
            Language::TypeScript => &["ts", "mts", "cts"],
            Language::TypeScriptReact => &["tsx", "mtsx", "ctsx"],
            Language::JavaScript => &["js", "mjs", "cjs"],
            Language::JavaScriptReact => &["jsx", "mjsx", "cjsx"],
        }
    }
}

/// Normalize an extension to its dotted, lowercase form (`TS` -> `.ts`)
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_ascii_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Extensions a snippet taken from a `source` file may be pasted into.
///
/// TypeScript and JavaScript each pair with their JSX flavour; any other
/// extension is only compatible with itself.
pub fn compatible_extensions(source: &str) -> Vec<String> {
    let source = normalize_extension(source);
    match source.as_str() {
        ".ts" | ".tsx" => vec![".ts".to_string(), ".tsx".to_string()],
        ".js" | ".jsx" => vec![".js".to_string(), ".jsx".to_string()],
        _ => vec![source],
    }
}

/// Check whether code from a `source` file may be inserted into a `target` file
pub fn is_compatible_extension(source: &str, target: &str) -> bool {
    let target = normalize_extension(target);
    compatible_extensions(source).contains(&target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("cts"), Some(Language::TypeScript));
        assert_eq!(
            Language::from_extension("tsx"),
            Some(Language::TypeScriptReact)
        );
        assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
        assert_eq!(
            Language::from_extension("jsx"),
            Some(Language::JavaScriptReact)
        );
        assert_eq!(Language::from_extension("py"), None);
        assert_eq!(Language::from_extension(""), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Language::from_path(Path::new("src/components/Button.tsx")),
            Some(Language::TypeScriptReact)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_from_hint_language_ids() {
        assert_eq!(Language::from_hint("typescript"), Some(Language::TypeScript));
        assert_eq!(
            Language::from_hint("typescriptreact"),
            Some(Language::TypeScriptReact)
        );
        assert_eq!(Language::from_hint("javascript"), Some(Language::JavaScript));
        assert_eq!(
            Language::from_hint("JavaScriptReact"),
            Some(Language::JavaScriptReact)
        );
    }

    #[test]
    fn test_from_hint_extensions_and_file_names() {
        assert_eq!(Language::from_hint(".ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_hint("tsx"), Some(Language::TypeScriptReact));
        assert_eq!(
            Language::from_hint("src/App.jsx"),
            Some(Language::JavaScriptReact)
        );
        assert_eq!(Language::from_hint("markdown"), None);
    }

    #[test]
    fn test_unknown_hint_defaults_to_permissive() {
        assert_eq!(
            Language::from_hint_or_default("plaintext"),
            Language::TypeScriptReact
        );
        assert_eq!(Language::from_hint_or_default(""), Language::TypeScriptReact);
    }

    #[test]
    fn test_compatible_extensions() {
        assert!(is_compatible_extension(".ts", ".tsx"));
        assert!(is_compatible_extension("tsx", "ts"));
        assert!(is_compatible_extension(".js", "jsx"));
        assert!(!is_compatible_extension(".ts", ".js"));
        assert!(!is_compatible_extension(".jsx", ".tsx"));
        assert!(is_compatible_extension(".vue", ".vue"));
        assert!(!is_compatible_extension(".vue", ".ts"));
    }

    #[test]
    fn test_is_react() {
        assert!(Language::TypeScriptReact.is_react());
        assert!(Language::JavaScriptReact.is_react());
        assert!(!Language::TypeScript.is_react());
        assert!(Language::TypeScript.is_typescript());
        assert!(!Language::JavaScript.is_typescript());
    }
}
