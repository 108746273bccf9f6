//! Project type detection
//!
//! Reads `package.json` (and looks for `tsconfig.json`) to decide which
//! frameworks a workspace uses. Menus are only offered for Node projects.
//!
//! Global invariants:
//! - Detection never fails; unreadable manifests degrade to "not a Node project"
//! - Frameworks are reported in a fixed order

use crate::config::ContextMenuConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Dependencies whose presence marks a Node project
const NODE_INDICATORS: &[&str] = &[
    "express",
    "react",
    "angular",
    "next",
    "vue",
    "svelte",
    "@angular/core",
    "@nestjs/core",
    "typescript",
    "@types/node",
    "webpack",
    "vite",
    "rollup",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Angular,
    Express,
    Nextjs,
    Vue,
    Svelte,
    Nestjs,
}

impl Framework {
    /// Detection order
    pub const ALL: [Framework; 7] = [
        Framework::React,
        Framework::Angular,
        Framework::Express,
        Framework::Nextjs,
        Framework::Vue,
        Framework::Svelte,
        Framework::Nestjs,
    ];

    /// npm package that signals the framework
    pub fn package(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Angular => "@angular/core",
            Framework::Express => "express",
            Framework::Nextjs => "next",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
            Framework::Nestjs => "@nestjs/core",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Angular => "angular",
            Framework::Express => "express",
            Framework::Nextjs => "nextjs",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
            Framework::Nestjs => "nestjs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Full,
    Partial,
    None,
}

/// What kind of project a workspace folder holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectType {
    pub is_node_project: bool,
    pub frameworks: Vec<Framework>,
    pub has_typescript: bool,
    pub support_level: SupportLevel,
}

/// Flags the editor uses to show or hide menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextFlags {
    pub is_node_project: bool,
    pub has_react: bool,
    pub has_angular: bool,
    pub has_express: bool,
    pub has_nextjs: bool,
    pub has_type_script: bool,
}

impl ProjectType {
    /// Result for folders without a usable `package.json`
    pub fn unsupported() -> Self {
        ProjectType {
            is_node_project: false,
            frameworks: Vec::new(),
            has_typescript: false,
            support_level: SupportLevel::None,
        }
    }

    /// Result when detection is switched off: a Node project of unknown makeup
    pub fn assumed() -> Self {
        ProjectType {
            is_node_project: true,
            frameworks: Vec::new(),
            has_typescript: false,
            support_level: SupportLevel::Partial,
        }
    }

    pub fn has_framework(&self, framework: Framework) -> bool {
        self.frameworks.contains(&framework)
    }

    pub fn context_flags(&self) -> ContextFlags {
        ContextFlags {
            is_node_project: self.is_node_project,
            has_react: self.has_framework(Framework::React),
            has_angular: self.has_framework(Framework::Angular),
            has_express: self.has_framework(Framework::Express),
            has_nextjs: self.has_framework(Framework::Nextjs),
            has_type_script: self.has_typescript,
        }
    }
}

/// The parts of `package.json` detection cares about
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    fn has(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }

    /// Present with a non-empty version
    fn has_version(&self, package: &str) -> bool {
        let truthy = |value: &serde_json::Value| match value {
            serde_json::Value::String(s) => !s.is_empty(),
            serde_json::Value::Null | serde_json::Value::Bool(false) => false,
            _ => true,
        };
        self.dev_dependencies
            .get(package)
            .or_else(|| self.dependencies.get(package))
            .is_some_and(truthy)
    }
}

/// Detect the project type of a workspace folder
pub fn detect_project(root: &Path) -> ProjectType {
    let manifest_path = root.join("package.json");
    if !manifest_path.exists() {
        debug!(root = %root.display(), "no package.json, not a Node project");
        return ProjectType::unsupported();
    }

    let manifest = match read_manifest(&manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!(error = %format!("{:#}", e), "could not analyze project");
            return ProjectType::unsupported();
        }
    };

    let has_typescript = root.join("tsconfig.json").exists()
        || manifest.has("typescript")
        || manifest.has("@types/node");

    let frameworks: Vec<Framework> = Framework::ALL
        .into_iter()
        .filter(|framework| manifest.has_version(framework.package()))
        .collect();

    let is_node_project = NODE_INDICATORS.iter().any(|package| manifest.has(package));

    let support_level = support_level(is_node_project, &frameworks, has_typescript);

    let project = ProjectType {
        is_node_project,
        frameworks,
        has_typescript,
        support_level,
    };
    info!(
        root = %root.display(),
        is_node_project,
        frameworks = ?project.frameworks,
        has_typescript,
        support_level = ?project.support_level,
        "project detected"
    );
    project
}

/// Project type as the menus see it under the given settings
///
/// With `autoDetectProjects` off nothing is read from disk and every folder
/// counts as a Node project, so the menus stay available.
pub fn resolve_project(root: &Path, settings: &ContextMenuConfig) -> ProjectType {
    if settings.auto_detect_projects {
        detect_project(root)
    } else {
        debug!(root = %root.display(), "project detection disabled by configuration");
        ProjectType::assumed()
    }
}

fn read_manifest(path: &Path) -> Result<PackageManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn support_level(is_node_project: bool, frameworks: &[Framework], has_typescript: bool) -> SupportLevel {
    if !is_node_project {
        SupportLevel::None
    } else if !frameworks.is_empty() && has_typescript {
        SupportLevel::Full
    } else {
        SupportLevel::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project_with(package_json: &str, tsconfig: bool) -> (tempfile::TempDir, ProjectType) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), package_json).unwrap();
        if tsconfig {
            fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        }
        let project = detect_project(dir.path());
        (dir, project)
    }

    #[test]
    fn test_no_package_json() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_project(dir.path()), ProjectType::unsupported());
    }

    #[test]
    fn test_invalid_package_json_degrades() {
        let (_dir, project) = project_with("{ not json", false);
        assert_eq!(project, ProjectType::unsupported());
    }

    #[test]
    fn test_react_typescript_is_full_support() {
        let (_dir, project) = project_with(
            r#"{"dependencies": {"react": "^18.2.0"}, "devDependencies": {"typescript": "^5.0.0"}}"#,
            false,
        );
        assert!(project.is_node_project);
        assert_eq!(project.frameworks, vec![Framework::React]);
        assert!(project.has_typescript);
        assert_eq!(project.support_level, SupportLevel::Full);
    }

    #[test]
    fn test_frameworks_in_fixed_order() {
        let (_dir, project) = project_with(
            r#"{"dependencies": {"@nestjs/core": "10", "express": "4", "next": "14", "react": "18"}}"#,
            false,
        );
        assert_eq!(
            project.frameworks,
            vec![Framework::React, Framework::Express, Framework::Nextjs, Framework::Nestjs]
        );
        assert_eq!(project.support_level, SupportLevel::Partial);
    }

    #[test]
    fn test_tsconfig_marks_typescript() {
        let (_dir, project) = project_with(r#"{"devDependencies": {"vite": "5"}}"#, true);
        assert!(project.is_node_project);
        assert!(project.has_typescript);
        assert!(project.frameworks.is_empty());
        assert_eq!(project.support_level, SupportLevel::Partial);
    }

    #[test]
    fn test_package_json_without_indicators() {
        let (_dir, project) = project_with(r#"{"name": "scripts", "dependencies": {"lodash": "4"}}"#, false);
        assert!(!project.is_node_project);
        assert_eq!(project.support_level, SupportLevel::None);
    }

    #[test]
    fn test_empty_version_is_not_a_framework() {
        let (_dir, project) = project_with(r#"{"dependencies": {"react": ""}}"#, false);
        assert!(project.is_node_project);
        assert!(project.frameworks.is_empty());
    }

    #[test]
    fn test_resolve_project_honours_auto_detect() {
        let (dir, detected) = project_with(r#"{"dependencies": {"react": "18"}}"#, true);
        let settings = ContextMenuConfig::default();
        assert_eq!(resolve_project(dir.path(), &settings), detected);

        let manual = ContextMenuConfig {
            auto_detect_projects: false,
            ..Default::default()
        };
        assert_eq!(resolve_project(dir.path(), &manual), ProjectType::assumed());

        // an empty folder still gets the menus when detection is off
        let empty = tempfile::tempdir().unwrap();
        let project = resolve_project(empty.path(), &manual);
        assert!(project.is_node_project);
        assert_eq!(project.support_level, SupportLevel::Partial);
        assert_eq!(resolve_project(empty.path(), &settings), ProjectType::unsupported());
    }

    #[test]
    fn test_context_flags() {
        let (_dir, project) = project_with(
            r#"{"dependencies": {"@angular/core": "17", "express": "4"}, "devDependencies": {"@types/node": "20"}}"#,
            false,
        );
        let flags = project.context_flags();
        assert!(flags.is_node_project);
        assert!(flags.has_angular);
        assert!(flags.has_express);
        assert!(!flags.has_react);
        assert!(flags.has_type_script);

        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["hasTypeScript"], true);
        assert_eq!(json["isNodeProject"], true);
    }
}
