//! Project import/export
//!
//! The exchange format is the project's own JSON shape:
//! `{ id, name, rootId, nodes: { [id]: node }, createdAt, updatedAt }`.
//! Import is all-or-nothing: a rejected document never reaches the caller's state.

use crate::error::FormatError;
use crate::tree::Project;
use crate::types::NodeId;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Serialize a project to the exchange format
pub fn export_project(project: &Project) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(project)?)
}

/// Parse and validate a project from the exchange format.
///
/// `id`, `name` and `nodes` are required. A missing `rootId` is inferred from the
/// single parentless node, and missing timestamps default to now.
pub fn import_project(json: &str) -> Result<Project, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(mut object) = value else {
        return Err(FormatError::InvalidTree(
            "top-level value is not an object".to_string(),
        ));
    };

    for field in ["id", "name", "nodes"] {
        if object.get(field).map_or(true, Value::is_null) {
            warn!(field, "Rejected import: missing field");
            return Err(FormatError::MissingField(field));
        }
    }

    let now = Value::String(chrono::Utc::now().to_rfc3339());
    match object.get_mut("nodes") {
        Some(Value::Object(nodes)) => {
            for (key, node) in nodes.iter_mut() {
                let Value::Object(node) = node else {
                    return Err(FormatError::InvalidTree(format!(
                        "node {} is not an object",
                        key
                    )));
                };
                fill_timestamps(node, &now);
            }
        }
        _ => return Err(FormatError::InvalidTree("'nodes' is not an object".to_string())),
    }

    if object.get("rootId").map_or(true, Value::is_null) {
        let root_id = match object.get("nodes") {
            Some(Value::Object(nodes)) => infer_root(nodes)?,
            _ => return Err(FormatError::MissingField("nodes")),
        };
        object.insert("rootId".to_string(), Value::String(root_id.to_string()));
    }
    fill_timestamps(&mut object, &now);

    let project: Project = serde_json::from_value(Value::Object(object))?;
    project.validate().map_err(FormatError::InvalidTree)?;

    debug!(project_id = %project.id, nodes = project.len(), "Imported project");
    Ok(project)
}

fn fill_timestamps(object: &mut Map<String, Value>, now: &Value) {
    let created = object
        .get("createdAt")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| now.clone());
    let updated = object
        .get("updatedAt")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| created.clone());
    object.insert("createdAt".to_string(), created);
    object.insert("updatedAt".to_string(), updated);
}

fn infer_root(nodes: &Map<String, Value>) -> Result<NodeId, FormatError> {
    let mut roots = nodes
        .iter()
        .filter(|(_, node)| node.get("parentId").map_or(true, Value::is_null))
        .map(|(key, _)| key);
    match (roots.next(), roots.next()) {
        (Some(root), None) => Ok(NodeId::from(root.as_str())),
        (None, _) => Err(FormatError::InvalidTree("no root node found".to_string())),
        (Some(_), Some(_)) => Err(FormatError::InvalidTree(
            "more than one parentless node".to_string(),
        )),
    }
}
