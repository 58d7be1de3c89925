//! Sled-backed project store
//!
//! Projects live in the `projects` tree keyed by project id, as JSON in the
//! exchange shape. The `meta` tree holds the last-opened marker and settings.

use super::{sort_summaries, PersistenceGateway, ProjectSummary};
use crate::error::PersistenceError;
use crate::settings::Settings;
use crate::tree::Project;
use crate::types::ProjectId;
use async_trait::async_trait;
use sled::transaction::{ConflictableTransactionResult, TransactionError};
use sled::Transactional;
use std::path::Path;
use tracing::{debug, info, warn};

const PROJECTS_TREE: &str = "projects";
const META_TREE: &str = "meta";
const LAST_OPENED_KEY: &[u8] = b"last_opened";
const SETTINGS_KEY: &[u8] = b"settings";

/// Durable gateway over a sled database
pub struct SledProjectStore {
    db: sled::Db,
    projects: sled::Tree,
    meta: sled::Tree,
}

impl SledProjectStore {
    /// Open (or create) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let db = sled::open(path.as_ref())?;
        let projects = db.open_tree(PROJECTS_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        info!(path = %path.as_ref().display(), "Opened project store");
        Ok(Self { db, projects, meta })
    }

    /// Temporary database removed on drop, for tests
    pub fn temporary() -> Result<Self, PersistenceError> {
        let db = sled::Config::new().temporary(true).open()?;
        let projects = db.open_tree(PROJECTS_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self { db, projects, meta })
    }

    fn decode_project(bytes: &[u8]) -> Result<Project, PersistenceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn transaction_error(err: TransactionError<()>) -> PersistenceError {
    match err {
        TransactionError::Storage(e) => PersistenceError::Sled(e),
        TransactionError::Abort(()) => PersistenceError::TransactionAborted,
    }
}

#[async_trait]
impl PersistenceGateway for SledProjectStore {
    async fn save_project(&self, project: &Project) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec(project)?;
        let key = project.id.as_str().as_bytes();
        (&self.projects, &self.meta)
            .transaction(|(projects, meta)| -> ConflictableTransactionResult<(), ()> {
                projects.insert(key, bytes.clone())?;
                meta.insert(LAST_OPENED_KEY, key)?;
                Ok(())
            })
            .map_err(transaction_error)?;
        self.db.flush_async().await?;
        debug!(project_id = %project.id, nodes = project.len(), "Saved project");
        Ok(())
    }

    async fn load_project_by_id(
        &self,
        id: &ProjectId,
    ) -> Result<Option<Project>, PersistenceError> {
        match self.projects.get(id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(Self::decode_project(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, PersistenceError> {
        let mut summaries = Vec::new();
        for entry in self.projects.iter() {
            let (key, bytes) = entry?;
            match Self::decode_project(&bytes) {
                Ok(project) => summaries.push(ProjectSummary::from(&project)),
                Err(e) => {
                    warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "Skipping unreadable project record"
                    );
                }
            }
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), PersistenceError> {
        let key = id.as_str().as_bytes();
        (&self.projects, &self.meta)
            .transaction(|(projects, meta)| -> ConflictableTransactionResult<(), ()> {
                projects.remove(key)?;
                if meta
                    .get(LAST_OPENED_KEY)?
                    .is_some_and(|last| last.as_ref() == key)
                {
                    meta.remove(LAST_OPENED_KEY)?;
                }
                Ok(())
            })
            .map_err(transaction_error)?;
        self.db.flush_async().await?;
        info!(project_id = %id, "Deleted project");
        Ok(())
    }

    async fn last_opened(&self) -> Result<Option<ProjectId>, PersistenceError> {
        Ok(self
            .meta
            .get(LAST_OPENED_KEY)?
            .map(|bytes| ProjectId::from(String::from_utf8_lossy(&bytes).into_owned())))
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.meta.insert(SETTINGS_KEY, serde_json::to_vec(settings)?)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>, PersistenceError> {
        match self.meta.get(SETTINGS_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}
