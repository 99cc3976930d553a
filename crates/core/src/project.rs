//! Project layout discovery
//!
//! Locates the enclosing project root (the nearest ancestor carrying a
//! `package.json`), the monorepo root and its workspace member directories.
//! Discovery never fails hard: running outside a project yields an empty
//! layout and every downstream consumer degrades to best-effort paths.

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Manifest file recognized as a project marker
pub const MANIFEST_FILE: &str = "package.json";

/// The subset of a package manifest the locator cares about
#[derive(Debug, Clone, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    workspaces: Option<WorkspacesField>,
}

/// `workspaces` appears either as a bare list or wrapped in `{ packages }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    List(Vec<String>),
    Config { packages: Vec<String> },
}

impl WorkspacesField {
    fn patterns(&self) -> &[String] {
        match self {
            WorkspacesField::List(patterns) => patterns,
            WorkspacesField::Config { packages } => packages,
        }
    }
}

/// Resolved project layout: root, optional workspace members, project name
///
/// A plain constructible value so callers can override discovery entirely;
/// [`ProjectLayout::current`] memoizes one detection per process for the
/// common path.
#[derive(Debug, Clone, Default)]
pub struct ProjectLayout {
    monorepo_root: Option<PathBuf>,
    workspace_paths: Vec<PathBuf>,
    project_name: Option<String>,
}

impl ProjectLayout {
    /// Walk parent directories from `start_dir` to the first one containing
    /// a manifest. Returns `None` when the walk reaches the filesystem root
    /// without a hit; this is the fail-open path, never an error.
    pub fn find_project_root(start_dir: &Path) -> Option<PathBuf> {
        let mut directory = start_dir.to_path_buf();
        loop {
            if directory.join(MANIFEST_FILE).is_file() {
                return Some(directory);
            }
            if !directory.pop() {
                return None;
            }
        }
    }

    /// Detect the layout starting from the current working directory
    pub fn detect() -> Self {
        let start = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::detect_from(&start)
    }

    /// Detect the layout starting from an explicit directory
    ///
    /// The nearest manifest is the monorepo root when it declares a
    /// non-empty workspace list; otherwise that directory itself is the
    /// single-package root with no members.
    pub fn detect_from(start_dir: &Path) -> Self {
        match Self::find_project_root(start_dir) {
            Some(root) => Self::for_root(root),
            None => Self::default(),
        }
    }

    /// Layout rooted at a known directory, skipping discovery
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::for_root(root.into())
    }

    fn for_root(root: PathBuf) -> Self {
        let manifest = read_manifest(&root.join(MANIFEST_FILE)).unwrap_or_default();
        let patterns = manifest
            .workspaces
            .as_ref()
            .map(|w| w.patterns().to_vec())
            .unwrap_or_default();
        let workspace_paths = expand_workspace_globs(&root, &patterns);

        Self {
            monorepo_root: Some(root),
            workspace_paths,
            project_name: manifest.name,
        }
    }

    /// Replace the workspace member list (override hook for callers)
    pub fn with_workspaces(mut self, paths: Vec<PathBuf>) -> Self {
        self.workspace_paths = paths;
        self
    }

    /// The memoized per-process layout
    pub fn current() -> &'static ProjectLayout {
        static LAYOUT: OnceLock<ProjectLayout> = OnceLock::new();
        LAYOUT.get_or_init(ProjectLayout::detect)
    }

    pub fn monorepo_root(&self) -> Option<&Path> {
        self.monorepo_root.as_deref()
    }

    /// Root to resolve against, falling back to the current working
    /// directory when discovery found nothing
    pub fn effective_root(&self) -> PathBuf {
        self.monorepo_root
            .clone()
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    pub fn workspace_paths(&self) -> &[PathBuf] {
        &self.workspace_paths
    }

    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }
}

fn read_manifest(path: &Path) -> Option<Manifest> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Expand workspace glob patterns into concrete existing directories
///
/// A trailing `/*` lists every subdirectory of the parent path. Other
/// patterns are matched with globset against directories under the root, to
/// the depth the pattern names. Missing base directories are skipped with a
/// warning.
fn expand_workspace_globs(root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if let Some(parent) = pattern.strip_suffix("/*") {
            let base = root.join(parent);
            if !base.is_dir() {
                tracing::warn!(
                    pattern = %pattern,
                    base = %base.display(),
                    "workspace base directory does not exist, skipping"
                );
                continue;
            }
            let Ok(entries) = fs::read_dir(&base) else {
                continue;
            };
            let mut members: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect();
            members.sort();
            paths.extend(members);
        } else if !pattern.contains(|c| matches!(c, '*' | '?' | '[')) {
            let member = root.join(pattern);
            if member.is_dir() {
                paths.push(member);
            } else {
                tracing::warn!(
                    pattern = %pattern,
                    "workspace directory does not exist, skipping"
                );
            }
        } else if let Some(globs) = build_globset(pattern) {
            let depth = pattern.split('/').count();
            let mut matches = Vec::new();
            collect_matching_dirs(root, root, &globs, depth, &mut matches);
            matches.sort();
            paths.extend(matches);
        }
    }

    paths.dedup();
    paths
}

fn build_globset(pattern: &str) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new(pattern).ok()?);
    builder.build().ok()
}

/// Depth-limited directory walk matching relative paths against the globset
fn collect_matching_dirs(
    root: &Path,
    dir: &Path,
    globs: &GlobSet,
    depth_left: usize,
    out: &mut Vec<PathBuf>,
) {
    if depth_left == 0 {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(root) {
            if globs.is_match(rel) {
                out.push(path.clone());
            }
        }
        collect_matching_dirs(root, &path, globs, depth_left - 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, body: &str) {
        fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    #[test]
    fn test_find_project_root_walks_up() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_manifest(&root, r#"{"name": "app"}"#);

        let nested = root.join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let found = ProjectLayout::find_project_root(&nested).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn test_find_project_root_fails_open() {
        let dir = TempDir::new().unwrap();
        let lonely = dir.path().join("no-manifest-here");
        fs::create_dir_all(&lonely).unwrap();

        // No manifest anywhere under the temp root; the walk escapes into
        // the real filesystem, so only assert it does not panic.
        let _ = ProjectLayout::find_project_root(&lonely);
    }

    #[test]
    fn test_detect_single_package_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_manifest(&root, r#"{"name": "solo"}"#);

        let layout = ProjectLayout::detect_from(&root);
        assert_eq!(layout.monorepo_root(), Some(root.as_path()));
        assert!(layout.workspace_paths().is_empty());
        assert_eq!(layout.project_name(), Some("solo"));
    }

    #[test]
    fn test_workspace_expansion_trailing_star() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_manifest(&root, r#"{"name": "mono", "workspaces": ["packages/*"]}"#);
        fs::create_dir_all(root.join("packages/alpha")).unwrap();
        fs::create_dir_all(root.join("packages/beta")).unwrap();
        fs::write(root.join("packages/readme.md"), "not a dir").unwrap();

        let layout = ProjectLayout::detect_from(&root);
        let members = layout.workspace_paths();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&root.join("packages/alpha")));
        assert!(members.contains(&root.join("packages/beta")));
    }

    #[test]
    fn test_workspace_expansion_skips_missing_base() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_manifest(
            &root,
            r#"{"name": "mono", "workspaces": ["packages/*", "libs/*"]}"#,
        );
        fs::create_dir_all(root.join("packages/only")).unwrap();

        let layout = ProjectLayout::detect_from(&root);
        assert_eq!(layout.workspace_paths(), &[root.join("packages/only")]);
    }

    #[test]
    fn test_workspace_literal_and_object_form() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        write_manifest(
            &root,
            r#"{"name": "mono", "workspaces": {"packages": ["tools/cli"]}}"#,
        );
        fs::create_dir_all(root.join("tools/cli")).unwrap();

        let layout = ProjectLayout::detect_from(&root);
        assert_eq!(layout.workspace_paths(), &[root.join("tools/cli")]);
    }

    #[test]
    fn test_override_workspaces() {
        let layout = ProjectLayout::with_root("/tmp/nowhere")
            .with_workspaces(vec![PathBuf::from("/tmp/nowhere/pkg")]);
        assert_eq!(layout.workspace_paths(), &[PathBuf::from("/tmp/nowhere/pkg")]);
    }
}
