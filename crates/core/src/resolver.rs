//! Path resolution between absolute trace paths and project-relative paths
//!
//! One interface over both layouts: a plain single-package root and a
//! monorepo with workspace members. A path under workspace `W` renders as
//! `<W-basename>/<relative>`; everything else is taken relative to
//! `<root>/src`, the fixed convention the inverse operation mirrors.

use crate::project::ProjectLayout;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    /// Workspace member directories, longest path first for deterministic
    /// matching when members nest
    workspaces: Vec<PathBuf>,
}

impl PathResolver {
    pub fn new(layout: &ProjectLayout) -> Self {
        let mut workspaces = layout.workspace_paths().to_vec();
        workspaces.sort_by_key(|w| std::cmp::Reverse(w.as_os_str().len()));
        Self {
            root: layout.effective_root(),
            workspaces,
        }
    }

    /// Resolver over a bare root with no workspace members
    pub fn plain(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workspaces: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Convert an absolute path into the project-relative form
    pub fn relative_path(&self, absolute_path: &str) -> String {
        let path = Path::new(absolute_path);

        for workspace in &self.workspaces {
            if let Ok(rel) = path.strip_prefix(workspace) {
                let name = workspace
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                return forward_slashes(&Path::new(&name).join(rel));
            }
        }

        let src_root = self.root.join("src");
        forward_slashes(&relative_to(&src_root, path))
    }

    /// Reconstruct the absolute path for a project-relative one
    pub fn absolute_file_path(&self, relative_path: &str) -> PathBuf {
        let mut segments = relative_path.splitn(2, '/');
        let head = segments.next().unwrap_or_default();
        let rest = segments.next().unwrap_or_default();

        for workspace in &self.workspaces {
            let matches_basename = workspace
                .file_name()
                .map(|n| n.to_string_lossy() == head)
                .unwrap_or(false);
            if matches_basename {
                return if rest.is_empty() {
                    workspace.clone()
                } else {
                    workspace.join(rest)
                };
            }
        }

        self.root.join("src").join(relative_path)
    }

    /// Whether a raw stack line references the project or a workspace
    ///
    /// A permissive substring test; used for frame classification only.
    pub fn is_line_in_project(&self, line: &str) -> bool {
        if line.contains(&*self.root.to_string_lossy()) {
            return true;
        }
        self.workspaces
            .iter()
            .any(|w| line.contains(&*w.to_string_lossy()))
    }
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Component-wise relative path from `base` to `target`, producing `..`
/// segments when `target` lies outside `base`
fn relative_to(base: &Path, target: &Path) -> PathBuf {
    let base_components: Vec<Component> = base.components().collect();
    let target_components: Vec<Component> = target.components().collect();

    let common = base_components
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..base_components.len() {
        result.push("..");
    }
    for component in &target_components[common..] {
        result.push(component.as_os_str());
    }
    result
}
