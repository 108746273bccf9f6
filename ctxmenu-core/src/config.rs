//! Configuration file support for ctxmenu
//!
//! Loads the add-on settings object from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.ctxmenurc.json` in project root
//! 3. `ctxmenu.config.json` in project root
//! 4. `"additionalContextMenus"` key in `package.json`
//!
//! All fields are optional. Keys are camelCase, as in editor settings.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Key holding the settings object inside `package.json`
pub const PACKAGE_JSON_KEY: &str = "additionalContextMenus";

/// Extensions the menus are offered for when none are configured
const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx"];

/// Default exclude patterns for target-file discovery
pub const DEFAULT_EXCLUDES: &[&str] = &["**/node_modules/**", "**/dist/**", "**/build/**", "**/out/**"];

/// Add-on settings loaded from a JSON config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase", default)]
pub struct ContextMenuConfig {
    /// Master switch for every menu command
    pub enabled: bool,
    /// Detect the project type to decide which menus to show
    pub auto_detect_projects: bool,
    /// File extensions the menus apply to, each with a leading dot
    pub supported_extensions: Vec<String>,
    /// Glob patterns hidden from the target-file picker; `[]` hides nothing
    pub exclude: Vec<String>,
    pub copy_code: CopyCodeConfig,
    pub terminal: TerminalConfig,
}

impl Default for ContextMenuConfig {
    fn default() -> Self {
        ContextMenuConfig {
            enabled: true,
            auto_detect_projects: true,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            copy_code: CopyCodeConfig::default(),
            terminal: TerminalConfig::default(),
        }
    }
}

/// Copy/move-to-file behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase", default)]
pub struct CopyCodeConfig {
    pub insertion_point: InsertionPoint,
    pub handle_imports: ImportHandling,
    pub preserve_comments: bool,
}

impl Default for CopyCodeConfig {
    fn default() -> Self {
        CopyCodeConfig {
            insertion_point: InsertionPoint::Smart,
            handle_imports: ImportHandling::Merge,
            preserve_comments: true,
        }
    }
}

/// Where copied code lands in the target file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionPoint {
    /// After the last import, else before the first export, else at the end
    #[default]
    Smart,
    End,
    Beginning,
}

/// What happens to the source file's imports on copy/move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportHandling {
    /// Add imports the target does not already have
    #[default]
    Merge,
    /// Add every import, even ones already present
    Duplicate,
    /// Leave the target's imports alone
    Skip,
}

/// How the open-terminal command starts a terminal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase", default)]
pub struct TerminalConfig {
    #[serde(rename = "type")]
    pub kind: TerminalKind,
    /// Command line used when `type` is `external`
    pub external_terminal_command: String,
    pub open_behavior: OpenBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalKind {
    /// The editor's own terminal panel
    #[default]
    Integrated,
    /// `externalTerminalCommand`, with `{{directory}}` substituted
    External,
    /// The platform's usual terminal application
    SystemDefault,
}

/// Which directory a new terminal starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenBehavior {
    #[default]
    ParentDirectory,
    WorkspaceRoot,
    CurrentDirectory,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    pub settings: ContextMenuConfig,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl ContextMenuConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if self.supported_extensions.is_empty() {
            anyhow::bail!("supportedExtensions must list at least one extension");
        }
        for ext in &self.supported_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                anyhow::bail!(
                    "supportedExtensions entries must start with a dot (got {:?})",
                    ext
                );
            }
        }

        if self.terminal.kind == TerminalKind::External
            && self.terminal.external_terminal_command.trim().is_empty()
        {
            anyhow::bail!("terminal.externalTerminalCommand is required when terminal.type is \"external\"");
        }

        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(self) -> Result<ResolvedConfig> {
        self.validate()?;

        let exclude = {
            let mut builder = GlobSetBuilder::new();
            for pattern in &self.exclude {
                builder.add(Glob::new(pattern)?);
            }
            builder.build()?
        };

        Ok(ResolvedConfig {
            settings: self,
            exclude,
            config_path: None,
        })
    }

    /// Whether menus apply to files with this extension (dot optional)
    pub fn supports_extension(&self, ext: &str) -> bool {
        let ext = crate::language::normalize_extension(ext);
        self.supported_extensions
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(&ext))
    }
}

impl ResolvedConfig {
    /// Check if a path (relative to the project root) is hidden by the exclude patterns
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.is_match(path_str.as_ref())
    }

    /// Check a file named on the command line against the exclude patterns
    ///
    /// The path is matched relative to `root` when it lies inside it, and as
    /// given otherwise.
    pub fn excludes_target(&self, root: &Path, path: &Path) -> bool {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let relative = path.strip_prefix(&root).unwrap_or(&path);
        self.is_excluded(relative)
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        ContextMenuConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(ContextMenuConfig, PathBuf)>> {
    for name in [".ctxmenurc.json", "ctxmenu.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<ContextMenuConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: ContextMenuConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

fn load_from_package_json(path: &Path) -> Result<Option<ContextMenuConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match pkg.get(PACKAGE_JSON_KEY) {
        Some(value) => {
            let config = ContextMenuConfig::deserialize(value)
                .with_context(|| format!("invalid {} config in {}", PACKAGE_JSON_KEY, path.display()))?;
            config
                .validate()
                .with_context(|| format!("invalid {} config in {}", PACKAGE_JSON_KEY, path.display()))?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (ContextMenuConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
