//! Path resolution for project nodes
//!
//! Paths are derived by walking `parent_id` links up to the root, so they are never
//! stored and never go stale after a rename or move.

use super::{NodeKind, Project};
use crate::types::NodeId;

/// Sentinel returned by [`canonical_path`] for unknown ids
pub const UNRESOLVED_CANONICAL: &str = "/";

/// Names from the node up to (excluding) the root, nearest first.
///
/// Returns `None` when `id` is unknown or the parent chain is broken.
fn segments(project: &Project, id: &NodeId) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut current = project.get(id)?;
    // A chain longer than the arena means a cycle
    for _ in 0..=project.len() {
        let Some(parent_id) = &current.parent_id else {
            return (current.id == project.root_id).then_some(segments);
        };
        segments.push(current.name.clone());
        current = project.get(parent_id)?;
    }
    None
}

/// Absolute path of a node: `/` for the root, `/src/app.js` below it.
///
/// Unknown ids yield `/`; callers must not treat that as a valid location.
pub fn canonical_path(project: &Project, id: &NodeId) -> String {
    match segments(project, id) {
        Some(segments) if !segments.is_empty() => {
            let mut path = String::new();
            for segment in segments.iter().rev() {
                path.push('/');
                path.push_str(segment);
            }
            path
        }
        _ => UNRESOLVED_CANONICAL.to_string(),
    }
}

/// Root-relative path of a node with no leading slash, e.g. `src/app.js`.
///
/// The root itself and unknown ids yield an empty string.
pub fn relative_path(project: &Project, id: &NodeId) -> String {
    segments(project, id)
        .map(|mut segments| {
            segments.reverse();
            segments.join("/")
        })
        .unwrap_or_default()
}

/// Join a canonical folder path and a child name
pub fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Find the node at a root-relative path by walking folder children.
///
/// An empty path (or `/`) resolves to the root.
pub fn find_by_relative_path(project: &Project, path: &str) -> Option<NodeId> {
    let mut current = project.root_id.clone();
    for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let node = project.get(&current)?;
        let NodeKind::Folder { children_ids } = &node.kind else {
            return None;
        };
        current = children_ids
            .iter()
            .find(|child| project.get(child).is_some_and(|c| c.name == segment))?
            .clone();
    }
    Some(current)
}

/// Find the file whose root-relative path is exactly `path`
pub fn find_file_by_relative_path<'a>(
    project: &'a Project,
    path: &str,
) -> Option<&'a super::Node> {
    project
        .files()
        .find(|file| relative_path(project, &file.id) == path)
}
