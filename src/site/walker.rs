//! Source tree traversal and output path mirroring

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::config::{SiteConfig, CONFIG_JSON, CONFIG_TOML};
use crate::error::BuildError;

/// How a source file is turned into its output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Markup scanned for component tags
    Markup,
    /// Anything else, copied byte for byte
    Asset,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        let is_markup = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        if is_markup {
            FileKind::Markup
        } else {
            FileKind::Asset
        }
    }
}

/// A file to be processed, with its mirrored destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub kind: FileKind,
}

/// Collect every file under the base directory, in a stable order
///
/// The components directory, the output directory and `.git` are never
/// descended into; registry files and `.gitignore` are skipped. Excluded
/// locations are compared after resolving `..` and symlinks, so any spelling
/// of the output directory is recognized.
pub fn collect_files(config: &SiteConfig) -> Result<Vec<SourceFile>, BuildError> {
    let root = resolve(&config.base_dir);
    let excluded = Exclusions::new(config);
    let mut files = Vec::new();

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !excluded.is_excluded_dir(entry.path()));

    for entry in walker {
        let entry = entry.map_err(|source| BuildError::Walk {
            path: config.base_dir.clone(),
            source,
        })?;
        if !entry.file_type().is_file() || excluded.is_excluded_file(entry.path()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(&root) else {
            continue;
        };
        let source = config.base_dir.join(relative);
        let destination = config.output_dir.join(relative);
        trace!("{} -> {}", source.display(), destination.display());
        files.push(SourceFile {
            kind: FileKind::of(&source),
            source,
            destination,
        });
    }

    Ok(files)
}

/// Where `source` lands under the output directory
pub fn output_path(source: &Path, config: &SiteConfig) -> PathBuf {
    let relative = source
        .strip_prefix(&config.base_dir)
        .ok()
        .map(Path::to_path_buf)
        .or_else(|| {
            resolve(source)
                .strip_prefix(resolve(&config.base_dir))
                .ok()
                .map(Path::to_path_buf)
        });
    match relative {
        Some(relative) => config.output_dir.join(relative),
        None => config
            .output_dir
            .join(source.file_name().unwrap_or_else(|| source.as_os_str())),
    }
}

/// Resolved locations the walker must not emit
struct Exclusions {
    components_dir: PathBuf,
    output_dir: PathBuf,
    config_file: Option<PathBuf>,
}

impl Exclusions {
    fn new(config: &SiteConfig) -> Self {
        Self {
            components_dir: resolve(&config.components_dir),
            output_dir: resolve(&config.output_dir),
            config_file: config.config_file.as_deref().map(resolve),
        }
    }

    fn is_excluded_dir(&self, path: &Path) -> bool {
        path == self.components_dir
            || path == self.output_dir
            || path.file_name() == Some(OsStr::new(".git"))
    }

    fn is_excluded_file(&self, path: &Path) -> bool {
        if self.config_file.as_deref() == Some(path) {
            return true;
        }
        matches!(
            path.file_name().and_then(OsStr::to_str),
            Some(CONFIG_TOML | CONFIG_JSON | ".gitignore")
        )
    }
}

/// Absolute form of `path` with `.` and `..` removed and symlinks resolved
///
/// Paths that do not exist yet (an output directory before the first build)
/// resolve through their nearest existing ancestor.
fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing.iter().rev().fold(canonical, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of(Path::new("index.html")), FileKind::Markup);
        assert_eq!(FileKind::of(Path::new("old/INDEX.HTM")), FileKind::Markup);
        assert_eq!(FileKind::of(Path::new("logo.png")), FileKind::Asset);
        assert_eq!(FileKind::of(Path::new("Makefile")), FileKind::Asset);
    }

    #[test]
    fn test_output_path_mirrors_structure() {
        let config = SiteConfig::new("/srv/site");
        assert_eq!(
            output_path(Path::new("/srv/site/blog/post.html"), &config),
            PathBuf::from("/srv/site/curvature-output/blog/post.html")
        );
    }

    #[test]
    fn test_collect_skips_excluded_entries() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        touch(&base.join("index.html"));
        touch(&base.join("css/site.css"));
        touch(&base.join("blog/post.html"));
        touch(&base.join("components/nav.html"));
        touch(&base.join("curvature-output/stale.html"));
        touch(&base.join(".git/HEAD"));
        touch(&base.join(".gitignore"));
        touch(&base.join(CONFIG_TOML));

        let config = SiteConfig::new(base);
        let files = collect_files(&config).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|f| f.source.strip_prefix(&config.base_dir).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("blog/post.html"),
                PathBuf::from("css/site.css"),
                PathBuf::from("index.html"),
            ]
        );
        assert_eq!(files[1].kind, FileKind::Asset);
        assert_eq!(
            files[2].destination,
            config.output_dir.join("index.html")
        );
    }

    #[test]
    fn test_custom_output_dir_inside_base_is_excluded() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        touch(&base.join("index.html"));
        touch(&base.join("dist/index.html"));

        let config = SiteConfig::new(base).with_output_dir(base.join("dist"));
        let files = collect_files(&config).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_resolve_removes_parent_components() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::create_dir(base.join("x")).unwrap();
        assert_eq!(resolve(&base.join("x/../dist")), resolve(base).join("dist"));
        assert_eq!(resolve(&base.join("./a/./b/..")), resolve(base).join("a"));
    }

    #[test]
    fn test_output_dir_with_parent_components_is_excluded() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        touch(&base.join("index.html"));
        touch(&base.join("dist/index.html"));

        let config = SiteConfig::new(base).with_output_dir(base.join("x/../dist"));
        let files = collect_files(&config).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].source, config.base_dir.join("index.html"));
    }

    #[test]
    fn test_relative_config_file_is_excluded() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        touch(&base.join("index.html"));
        touch(&base.join("site.toml"));

        let config = SiteConfig::new(base).with_config_file(base.join("sub/../site.toml"));
        let files = collect_files(&config).unwrap();
        assert_eq!(files.len(), 1);
    }
}
