//! Project node types

use crate::types::{NodeId, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Variant payload of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File {
        #[serde(default)]
        content: String,
    },
    Folder {
        /// Insertion order; display order is computed, never stored
        #[serde(rename = "childrenIds", default)]
        children_ids: Vec<NodeId>,
    },
}

/// A file or folder entry in the project arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Non-owning back-reference; `None` only for the project root
    pub parent_id: Option<NodeId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new_file(
        id: NodeId,
        name: String,
        parent_id: NodeId,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            parent_id: Some(parent_id),
            created_at: now,
            updated_at: now,
            kind: NodeKind::File {
                content: String::new(),
            },
        }
    }

    pub(crate) fn new_folder(
        id: NodeId,
        name: String,
        parent_id: Option<NodeId>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            parent_id,
            created_at: now,
            updated_at: now,
            kind: NodeKind::Folder {
                children_ids: Vec::new(),
            },
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    /// File content, or `None` for folders
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Child ids in insertion order; empty for files
    pub fn children_ids(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::File { .. } => &[],
            NodeKind::Folder { children_ids } => children_ids,
        }
    }

    pub(crate) fn children_ids_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::File { .. } => None,
            NodeKind::Folder { children_ids } => Some(children_ids),
        }
    }

    /// Lowercased extension of the node name, without the dot
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Display ordering: folders before files, then by name
pub fn display_order(a: &Node, b: &Node) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

/// Check that `name` is a single, non-empty path segment
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
