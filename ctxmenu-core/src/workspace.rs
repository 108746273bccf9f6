//! Target-file discovery for copy/move-to-file
//!
//! Global invariants:
//! - `node_modules` and dot-directories are never entered
//! - Results are ordered most recently modified first, ties by path

use crate::config::ResolvedConfig;
use crate::language::{is_compatible_extension, normalize_extension};
use anyhow::{Context, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// A file code can be copied into
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibleFile {
    pub path: PathBuf,
    pub name: String,
    /// Extension with its leading dot
    pub extension: String,
    /// Path relative to the workspace root
    pub relative_path: PathBuf,
    pub last_modified: SystemTime,
}

/// Files under `root` whose extension is compatible with `source_extension`
///
/// `.ts` and `.tsx` are interchangeable, as are `.js` and `.jsx`; any other
/// extension only matches itself. Paths matching the config's exclude
/// patterns are skipped.
pub fn find_compatible_files(
    root: &Path,
    source_extension: &str,
    config: &ResolvedConfig,
) -> Result<Vec<CompatibleFile>> {
    let source_extension = normalize_extension(source_extension);
    let mut files = Vec::new();
    collect_compatible_recursive(root, root, &source_extension, config, &mut files)?;

    files.sort_by(|a, b| {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| a.path.cmp(&b.path))
    });

    debug!(
        root = %root.display(),
        extension = %source_extension,
        count = files.len(),
        "found compatible files"
    );
    Ok(files)
}

fn collect_compatible_recursive(
    root: &Path,
    dir: &Path,
    source_extension: &str,
    config: &ResolvedConfig,
    files: &mut Vec<CompatibleFile>,
) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result?;
        let path = entry.path();
        let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n: &OsStr| n.to_str()) {
                if name == "node_modules" || name.starts_with('.') {
                    continue;
                }
            }
            collect_compatible_recursive(root, &path, source_extension, config, files)?;
        } else if path.is_file() {
            let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !is_compatible_extension(source_extension, extension) || config.is_excluded(&relative_path) {
                continue;
            }

            let last_modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file without metadata");
                    continue;
                }
            };

            files.push(CompatibleFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                extension: normalize_extension(extension),
                relative_path,
                last_modified,
                path,
            });
        }
    }

    Ok(())
}

/// Whether `path` is an existing file that can be opened for writing
pub fn validate_target_file(path: &Path) -> bool {
    if !path.is_file() {
        debug!(path = %path.display(), "target is not an existing file");
        return false;
    }

    match std::fs::OpenOptions::new().append(true).open(path) {
        Ok(_) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "target file is not writable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn touch(path: &Path, age_secs: u64) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "export {};\n").unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    fn names(files: &[CompatibleFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_finds_compatible_extensions_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("src/old.ts"), 300);
        touch(&dir.path().join("src/new.tsx"), 10);
        touch(&dir.path().join("src/mid.ts"), 100);
        touch(&dir.path().join("src/script.js"), 5);
        touch(&dir.path().join("README.md"), 1);

        let config = ResolvedConfig::defaults().unwrap();
        let files = find_compatible_files(dir.path(), "tsx", &config).unwrap();
        assert_eq!(names(&files), vec!["new.tsx", "mid.ts", "old.ts"]);
        assert_eq!(files[0].extension, ".tsx");
        assert_eq!(files[0].relative_path, Path::new("src").join("new.tsx"));
    }

    #[test]
    fn test_skips_node_modules_and_dot_dirs() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("index.js"), 50);
        touch(&dir.path().join("node_modules/lib/index.js"), 1);
        touch(&dir.path().join(".cache/chunk.js"), 1);

        let config = ResolvedConfig::defaults().unwrap();
        let files = find_compatible_files(dir.path(), ".jsx", &config).unwrap();
        assert_eq!(names(&files), vec!["index.js"]);
    }

    #[test]
    fn test_config_excludes_apply() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("src/app.ts"), 20);
        touch(&dir.path().join("dist/app.ts"), 10);

        let config = ResolvedConfig::defaults().unwrap();
        let files = find_compatible_files(dir.path(), ".ts", &config).unwrap();
        assert_eq!(names(&files), vec!["app.ts"]);
        assert!(files[0].relative_path.starts_with("src"));
    }

    #[test]
    fn test_other_extensions_match_only_themselves() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.vue"), 10);
        touch(&dir.path().join("b.ts"), 10);

        let config = ResolvedConfig::defaults().unwrap();
        let files = find_compatible_files(dir.path(), "vue", &config).unwrap();
        assert_eq!(names(&files), vec!["a.vue"]);
    }

    #[test]
    fn test_validate_target_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("target.ts");
        assert!(!validate_target_file(&file));
        fs::write(&file, "").unwrap();
        assert!(validate_target_file(&file));
        assert!(!validate_target_file(dir.path()));
    }
}
