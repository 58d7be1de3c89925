//! Persistence Gateway
//!
//! Durable storage of whole-project snapshots and the global settings record.
//! The gateway offers no conflict resolution: the last write for a project id wins,
//! so callers must not issue overlapping writes for the same project.

pub mod memory;
pub mod persistence;

pub use memory::MemoryGateway;
pub use persistence::SledProjectStore;

use crate::error::PersistenceError;
use crate::settings::Settings;
use crate::tree::Project;
use crate::types::{ProjectId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Picker metadata for a stored project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub name: String,
    pub file_count: usize,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            file_count: project.files().count(),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

/// Persistence gateway interface
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Upsert by `project.id` and record it as the last opened project
    async fn save_project(&self, project: &Project) -> Result<(), PersistenceError>;

    async fn load_project_by_id(&self, id: &ProjectId)
        -> Result<Option<Project>, PersistenceError>;

    /// Stored projects, most recently updated first
    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, PersistenceError>;

    /// Remove a project, clearing the last-opened marker if it pointed there
    async fn delete_project(&self, id: &ProjectId) -> Result<(), PersistenceError>;

    async fn last_opened(&self) -> Result<Option<ProjectId>, PersistenceError>;

    async fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError>;

    async fn load_settings(&self) -> Result<Option<Settings>, PersistenceError>;
}

pub(crate) fn sort_summaries(summaries: &mut [ProjectSummary]) {
    summaries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.name.cmp(&b.name))
    });
}
