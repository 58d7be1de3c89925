//! In-memory gateway: volatile, used by tests and as a scratch backend.

use super::{sort_summaries, PersistenceGateway, ProjectSummary};
use crate::error::PersistenceError;
use crate::settings::Settings;
use crate::tree::Project;
use crate::types::ProjectId;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
struct MemoryState {
    projects: HashMap<ProjectId, Project>,
    last_opened: Option<ProjectId>,
    settings: Option<Settings>,
}

/// Volatile gateway backed by a map
#[derive(Default)]
pub struct MemoryGateway {
    state: RwLock<MemoryState>,
    project_writes: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful project writes so far
    pub fn project_writes(&self) -> usize {
        self.project_writes.load(Ordering::SeqCst)
    }

    /// Make every write fail with an I/O error until switched back off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Io("simulated write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save_project(&self, project: &Project) -> Result<(), PersistenceError> {
        self.check_failing()?;
        let mut state = self.state.write();
        state.projects.insert(project.id.clone(), project.clone());
        state.last_opened = Some(project.id.clone());
        self.project_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_project_by_id(
        &self,
        id: &ProjectId,
    ) -> Result<Option<Project>, PersistenceError> {
        Ok(self.state.read().projects.get(id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, PersistenceError> {
        let mut summaries: Vec<ProjectSummary> = self
            .state
            .read()
            .projects
            .values()
            .map(ProjectSummary::from)
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), PersistenceError> {
        self.check_failing()?;
        let mut state = self.state.write();
        state.projects.remove(id);
        if state.last_opened.as_ref() == Some(id) {
            state.last_opened = None;
        }
        Ok(())
    }

    async fn last_opened(&self) -> Result<Option<ProjectId>, PersistenceError> {
        Ok(self.state.read().last_opened.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        self.check_failing()?;
        self.state.write().settings = Some(settings.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<Settings>, PersistenceError> {
        Ok(self.state.read().settings.clone())
    }
}
