//! Project Node Store
//!
//! A project is an arena of nodes keyed by id. Folders own an ordered list of child
//! ids; every node keeps a non-owning `parent_id` back-reference used for path lookups.
//! Every operation validates first and mutates second, so a failed call leaves the
//! tree untouched.

pub mod node;
pub mod path;
pub mod template;

pub use node::{display_order, is_valid_name, Node, NodeKind};

use crate::error::TreeError;
use crate::types::{monotonic_now, NodeId, ProjectId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

/// Name given to every project root folder
pub const ROOT_NAME: &str = "root";

/// A project: the exclusive owner of its node arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub root_id: NodeId,
    pub nodes: BTreeMap<NodeId, Node>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Create an empty project holding only its root folder
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        let root_id = NodeId::generate();
        let root = Node::new_folder(root_id.clone(), ROOT_NAME.to_string(), None, now);
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), root);
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            root_id,
            nodes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All file nodes, in id order
    pub fn files(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_file())
    }

    /// Create an empty file under `parent_id`
    pub fn create_file(&mut self, parent_id: &NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.insert_child(parent_id, name, false)
    }

    /// Create an empty folder under `parent_id`
    pub fn create_folder(&mut self, parent_id: &NodeId, name: &str) -> Result<NodeId, TreeError> {
        self.insert_child(parent_id, name, true)
    }

    fn insert_child(
        &mut self,
        parent_id: &NodeId,
        name: &str,
        folder: bool,
    ) -> Result<NodeId, TreeError> {
        self.check_new_child(parent_id, name, None)?;

        let mut id = NodeId::generate();
        while self.nodes.contains_key(&id) {
            id = NodeId::generate();
        }

        let now = monotonic_now(self.updated_at);
        let node = if folder {
            Node::new_folder(id.clone(), name.to_string(), Some(parent_id.clone()), now)
        } else {
            Node::new_file(id.clone(), name.to_string(), parent_id.clone(), now)
        };
        self.nodes.insert(id.clone(), node);

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            if let Some(children) = parent.children_ids_mut() {
                children.push(id.clone());
            }
            parent.updated_at = monotonic_now(parent.updated_at).max(now);
        }
        self.updated_at = now;

        debug!(node_id = %id, parent_id = %parent_id, name, folder, "Created node");
        Ok(id)
    }

    /// Validate that `name` may be added to `parent_id`, ignoring `except` among siblings
    fn check_new_child(
        &self,
        parent_id: &NodeId,
        name: &str,
        except: Option<&NodeId>,
    ) -> Result<(), TreeError> {
        let parent = self
            .nodes
            .get(parent_id)
            .filter(|n| n.is_folder())
            .ok_or_else(|| TreeError::InvalidParent(parent_id.clone()))?;
        if !is_valid_name(name) {
            return Err(TreeError::InvalidName(name.to_string()));
        }

        let collides = parent
            .children_ids()
            .iter()
            .filter(|child| Some(*child) != except)
            .filter_map(|child| self.nodes.get(child))
            .any(|child| child.name == name);
        if collides {
            return Err(TreeError::NameCollision {
                parent: parent_id.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Ids of `id` and all of its descendants, breadth-first
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([id.clone()]);
        while let Some(current) = queue.pop_front() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if !seen.insert(current.clone()) {
                continue;
            }
            queue.extend(node.children_ids().iter().cloned());
            collected.push(current);
        }
        collected
    }

    /// Delete a node and its whole subtree; returns every removed id
    pub fn delete_node(&mut self, id: &NodeId) -> Result<Vec<NodeId>, TreeError> {
        if *id == self.root_id {
            return Err(TreeError::CannotDeleteRoot);
        }
        let parent_id = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?
            .parent_id
            .clone();

        let removed = self.subtree_ids(id);
        for node_id in &removed {
            self.nodes.remove(node_id);
        }

        let now = monotonic_now(self.updated_at);
        if let Some(parent) = parent_id.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            if let Some(children) = parent.children_ids_mut() {
                children.retain(|child| child != id);
            }
            parent.updated_at = monotonic_now(parent.updated_at).max(now);
        }
        self.updated_at = now;

        debug!(node_id = %id, removed = removed.len(), "Deleted subtree");
        Ok(removed)
    }

    /// Replace a file's content; returns whether anything changed
    pub fn update_file_content(&mut self, id: &NodeId, content: &str) -> Result<bool, TreeError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let NodeKind::File { content: current } = &mut node.kind else {
            return Err(TreeError::NotFound(id.clone()));
        };
        if current == content {
            return Ok(false);
        }
        *current = content.to_string();
        let now = monotonic_now(node.updated_at.max(self.updated_at));
        node.updated_at = now;
        self.updated_at = now;
        debug!(node_id = %id, bytes = content.len(), "Updated file content");
        Ok(true)
    }

    /// Direct children of a folder in display order
    pub fn resolve_children(&self, folder_id: &NodeId) -> Result<Vec<&Node>, TreeError> {
        let folder = self
            .nodes
            .get(folder_id)
            .filter(|n| n.is_folder())
            .ok_or_else(|| TreeError::NotFound(folder_id.clone()))?;
        let mut children: Vec<&Node> = folder
            .children_ids()
            .iter()
            .filter_map(|child| self.nodes.get(child))
            .collect();
        children.sort_by(|a, b| display_order(a, b));
        Ok(children)
    }

    /// Rename a node in place; returns whether the name changed
    pub fn rename_node(&mut self, id: &NodeId, new_name: &str) -> Result<bool, TreeError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        if node.name == new_name {
            return Ok(false);
        }
        let Some(parent_id) = node.parent_id.clone() else {
            return Err(TreeError::ImmutableRoot);
        };
        self.check_new_child(&parent_id, new_name, Some(id))?;

        let now = monotonic_now(self.updated_at);
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = new_name.to_string();
            node.updated_at = monotonic_now(node.updated_at).max(now);
        }
        self.updated_at = now;
        debug!(node_id = %id, new_name, "Renamed node");
        Ok(true)
    }

    /// Move a node under another folder, appending it to that folder's children.
    ///
    /// Moving into the current parent is a no-op and returns `false`.
    pub fn move_node(&mut self, id: &NodeId, new_parent_id: &NodeId) -> Result<bool, TreeError> {
        if *id == self.root_id {
            return Err(TreeError::ImmutableRoot);
        }
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let old_parent_id = node.parent_id.clone();
        if old_parent_id.as_ref() == Some(new_parent_id) {
            return Ok(false);
        }
        let name = node.name.clone();
        if self.subtree_ids(id).contains(new_parent_id) {
            return Err(TreeError::InvalidParent(new_parent_id.clone()));
        }
        self.check_new_child(new_parent_id, &name, None)?;

        let now = monotonic_now(self.updated_at);
        if let Some(old) = old_parent_id.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            if let Some(children) = old.children_ids_mut() {
                children.retain(|child| child != id);
            }
            old.updated_at = monotonic_now(old.updated_at).max(now);
        }
        if let Some(new_parent) = self.nodes.get_mut(new_parent_id) {
            if let Some(children) = new_parent.children_ids_mut() {
                children.push(id.clone());
            }
            new_parent.updated_at = monotonic_now(new_parent.updated_at).max(now);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = Some(new_parent_id.clone());
            node.updated_at = monotonic_now(node.updated_at).max(now);
        }
        self.updated_at = now;
        debug!(node_id = %id, new_parent_id = %new_parent_id, "Moved node");
        Ok(true)
    }

    /// Check every structural invariant of the tree.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let root = self
            .nodes
            .get(&self.root_id)
            .ok_or_else(|| format!("root node {} is missing", self.root_id))?;
        if !root.is_folder() {
            return Err(format!("root node {} is not a folder", self.root_id));
        }
        if root.parent_id.is_some() {
            return Err(format!("root node {} has a parent", self.root_id));
        }
        if self.updated_at < self.created_at {
            return Err("project was updated before it was created".to_string());
        }

        for (key, node) in &self.nodes {
            if *key != node.id {
                return Err(format!("node stored under {} has id {}", key, node.id));
            }
            if node.updated_at < node.created_at {
                return Err(format!("node {} was updated before it was created", key));
            }
            match &node.parent_id {
                None if *key != self.root_id => {
                    return Err(format!("node {} has no parent but is not the root", key));
                }
                None => {}
                Some(parent_id) => {
                    let parent = self
                        .nodes
                        .get(parent_id)
                        .ok_or_else(|| format!("node {} points at missing parent {}", key, parent_id))?;
                    if !parent.children_ids().contains(key) {
                        return Err(format!("parent {} does not list child {}", parent_id, key));
                    }
                }
            }
            let mut names = HashSet::new();
            for child_id in node.children_ids() {
                let child = self
                    .nodes
                    .get(child_id)
                    .ok_or_else(|| format!("folder {} lists missing child {}", key, child_id))?;
                if child.parent_id.as_ref() != Some(key) {
                    return Err(format!("child {} does not point back at {}", child_id, key));
                }
                if !names.insert(child.name.as_str()) {
                    return Err(format!("folder {} has duplicate child name '{}'", key, child.name));
                }
            }
        }

        let reachable = self.subtree_ids(&self.root_id);
        if reachable.len() != self.nodes.len() {
            return Err(format!(
                "{} node(s) are not reachable from the root",
                self.nodes.len() - reachable.len()
            ));
        }
        Ok(())
    }
}
