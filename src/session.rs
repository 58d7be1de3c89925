//! Editing session
//!
//! A [`Session`] is the context object every operation goes through: it owns the
//! open project, the global settings, the autosave state machine, the preview cache
//! and the sandbox side of the console bridge. Sessions are independent, so tests
//! and multiple windows can each hold one.

use crate::autosave::{AutosaveController, SaveState};
use crate::config::PreviewConfig;
use crate::error::ApiError;
use crate::exchange::{export_project, import_project};
use crate::preview::{PreviewCache, PreviewOptions};
use crate::sandbox::{bridge_channel, ConsoleChannel, ConsoleLog, Inbox, Outlet};
use crate::settings::Settings;
use crate::store::{PersistenceGateway, ProjectSummary};
use crate::tree::path::find_by_relative_path;
use crate::tree::template::{blank_project, sample_project};
use crate::tree::Project;
use crate::types::{NodeId, ProjectId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Name given to projects created without one
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

pub struct Session {
    gateway: Arc<dyn PersistenceGateway>,
    preview_config: PreviewConfig,
    project: Project,
    settings: Settings,
    autosave: AutosaveController,
    preview: PreviewCache,
    console: ConsoleLog,
    outlet: Outlet,
    inbox: Inbox,
    notifications: Vec<Notification>,
}

impl Session {
    /// Session over an in-memory project that has not been persisted yet
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        preview_config: PreviewConfig,
        project: Project,
        settings: Settings,
    ) -> Self {
        let (outlet, inbox) = bridge_channel();
        let preview = PreviewCache::new(
            PreviewOptions::from_config(&preview_config, &settings),
            Duration::from_millis(preview_config.recompile_debounce_ms),
        );
        Self {
            gateway,
            autosave: AutosaveController::new(settings.autosave_delay()),
            console: ConsoleLog::new(preview_config.console_capacity),
            preview_config,
            project,
            settings,
            preview,
            outlet,
            inbox,
            notifications: Vec::new(),
        }
    }

    /// Load stored settings and the last opened project.
    ///
    /// Falls back to default settings and a sample project that starts `Unsaved`,
    /// so the autosave timer persists it.
    pub async fn start(
        gateway: Arc<dyn PersistenceGateway>,
        preview_config: PreviewConfig,
    ) -> Result<Self, ApiError> {
        let settings = gateway.load_settings().await?.unwrap_or_default();
        let stored = match gateway.last_opened().await? {
            Some(id) => gateway.load_project_by_id(&id).await?,
            None => None,
        };
        let (project, state) = match stored {
            Some(project) => (project, SaveState::Saved),
            None => (sample_project(DEFAULT_PROJECT_NAME)?, SaveState::Unsaved),
        };
        info!(project_id = %project.id, state = %state, "Session started");
        let mut session = Self::new(gateway, preview_config, project, settings);
        if state == SaveState::Unsaved {
            session.autosave.mark_dirty(Instant::now());
        }
        Ok(session)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn save_state(&self) -> SaveState {
        self.autosave.state()
    }

    /// When the pending autosave will fire, if any
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    pub fn clear_console(&mut self) {
        self.console.clear();
    }

    /// Drain notifications raised since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn touched(&mut self) {
        let now = Instant::now();
        self.autosave.mark_dirty(now);
        self.preview.invalidate(now);
    }

    // Node Store operations

    pub fn create_file(&mut self, parent_id: &NodeId, name: &str) -> Result<NodeId, ApiError> {
        let id = self.project.create_file(parent_id, name)?;
        self.touched();
        Ok(id)
    }

    pub fn create_folder(&mut self, parent_id: &NodeId, name: &str) -> Result<NodeId, ApiError> {
        let id = self.project.create_folder(parent_id, name)?;
        self.touched();
        Ok(id)
    }

    pub fn delete_node(&mut self, id: &NodeId) -> Result<Vec<NodeId>, ApiError> {
        let removed = self.project.delete_node(id)?;
        self.touched();
        Ok(removed)
    }

    /// Replace file content; identical content is not a mutation
    pub fn update_file_content(&mut self, id: &NodeId, content: &str) -> Result<(), ApiError> {
        if self.project.update_file_content(id, content)? {
            self.touched();
        }
        Ok(())
    }

    /// Rename a node; keeping the same name is not a mutation
    pub fn rename_node(&mut self, id: &NodeId, new_name: &str) -> Result<(), ApiError> {
        if self.project.rename_node(id, new_name)? {
            self.touched();
        }
        Ok(())
    }

    pub fn move_node(&mut self, id: &NodeId, new_parent_id: &NodeId) -> Result<(), ApiError> {
        if self.project.move_node(id, new_parent_id)? {
            self.touched();
        }
        Ok(())
    }

    // Root-relative path helpers

    /// Node at a root-relative path
    pub fn resolve(&self, path: &str) -> Result<NodeId, ApiError> {
        find_by_relative_path(&self.project, path)
            .ok_or_else(|| ApiError::PathNotFound(path.to_string()))
    }

    fn split_parent<'p>(&self, path: &'p str) -> Result<(NodeId, &'p str), ApiError> {
        let trimmed = path.trim_matches('/');
        let (parent, name) = match trimmed.rsplit_once('/') {
            Some((parent, name)) => (parent, name),
            None => ("", trimmed),
        };
        Ok((self.resolve(parent)?, name))
    }

    pub fn create_file_at(&mut self, path: &str) -> Result<NodeId, ApiError> {
        let (parent, name) = self.split_parent(path)?;
        self.create_file(&parent, name)
    }

    pub fn create_folder_at(&mut self, path: &str) -> Result<NodeId, ApiError> {
        let (parent, name) = self.split_parent(path)?;
        self.create_folder(&parent, name)
    }

    // Persistence

    /// Save now. Refused with `SaveInProgress` while another write is in flight.
    pub async fn save(&mut self) -> Result<(), ApiError> {
        if !self.autosave.begin_manual() {
            return Err(ApiError::SaveInProgress);
        }
        self.write_project().await
    }

    async fn write_project(&mut self) -> Result<(), ApiError> {
        let result = self.gateway.save_project(&self.project).await;
        self.autosave.finish(result.is_ok(), Instant::now());
        match result {
            Ok(()) => {
                info!(project_id = %self.project.id, "Project saved");
                Ok(())
            }
            Err(e) => {
                warn!(project_id = %self.project.id, error = %e, "Project save failed");
                self.notifications
                    .push(Notification::error(format!("Could not save project: {}", e)));
                Err(e.into())
            }
        }
    }

    /// Run the autosave if its timer has expired at `now`; returns whether a write happened
    pub async fn tick(&mut self, now: Instant) -> Result<bool, ApiError> {
        if !self.autosave.begin_autosave(now) {
            return Ok(false);
        }
        self.write_project().await?;
        Ok(true)
    }

    /// Wait for the armed autosave timer and run it. Returns immediately when
    /// nothing is armed.
    pub async fn run_pending_autosave(&mut self) -> Result<bool, ApiError> {
        let Some(deadline) = self.autosave.deadline() else {
            return Ok(false);
        };
        tokio::time::sleep_until(deadline).await;
        self.tick(Instant::now()).await
    }

    // Preview and sandbox

    /// Compiled document for the current project
    pub fn preview(&mut self) -> Arc<str> {
        self.preview.document(&self.project)
    }

    /// Debounced recompile: a new document once the quiet period after the last edit
    /// has passed
    pub fn poll_preview(&mut self, now: Instant) -> Option<Arc<str>> {
        self.preview.poll(&self.project, now)
    }

    pub fn preview_deadline(&self) -> Option<Instant> {
        self.preview.pending_deadline()
    }

    /// Send-only handle for the executing preview document
    pub fn sandbox_outlet(&self) -> Outlet {
        self.outlet.clone()
    }

    /// Move queued sandbox messages into the console log; returns how many were accepted
    pub fn pump_sandbox(&mut self) -> usize {
        let mut accepted = 0;
        for value in self.inbox.drain() {
            let Some(message) = self.console.accept(&value) else {
                continue;
            };
            accepted += 1;
            if message.channel == ConsoleChannel::Error {
                let text = message.text();
                self.notifications.push(Notification::error(text));
            }
        }
        accepted
    }

    // Project management

    fn install(&mut self, project: Project, state: SaveState) {
        info!(project_id = %project.id, name = %project.name, "Opened project");
        self.project = project;
        self.autosave.reset(state);
        if state == SaveState::Unsaved {
            self.autosave.mark_dirty(Instant::now());
        }
        self.console.clear();
        self.preview.invalidate(Instant::now());
    }

    /// Replace the open project with a new one and persist it
    pub async fn new_project(&mut self, name: &str, sample: bool) -> Result<ProjectId, ApiError> {
        let name = if name.trim().is_empty() {
            DEFAULT_PROJECT_NAME
        } else {
            name.trim()
        };
        let project = if sample {
            sample_project(name)?
        } else {
            blank_project(name)?
        };
        let id = project.id.clone();
        self.install(project, SaveState::Unsaved);
        self.save().await?;
        Ok(id)
    }

    pub async fn open_project(&mut self, id: &ProjectId) -> Result<(), ApiError> {
        let project = self
            .gateway
            .load_project_by_id(id)
            .await?
            .ok_or_else(|| ApiError::ProjectNotFound(id.clone()))?;
        self.install(project, SaveState::Saved);
        Ok(())
    }

    /// Open whatever was saved last; false when there is nothing to open
    pub async fn open_last_project(&mut self) -> Result<bool, ApiError> {
        let Some(id) = self.gateway.last_opened().await? else {
            return Ok(false);
        };
        match self.open_project(&id).await {
            Ok(()) => Ok(true),
            Err(ApiError::ProjectNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ApiError> {
        Ok(self.gateway.list_projects().await?)
    }

    /// Delete a stored project. Deleting the open one switches to a fresh blank project.
    pub async fn delete_project(&mut self, id: &ProjectId) -> Result<(), ApiError> {
        self.gateway.delete_project(id).await?;
        if *id == self.project.id {
            let replacement = blank_project(DEFAULT_PROJECT_NAME)?;
            self.install(replacement, SaveState::Unsaved);
        }
        self.notifications.push(Notification::info("Project deleted"));
        Ok(())
    }

    /// Import a project from its JSON export and make it the open project.
    ///
    /// A rejected document leaves the session untouched.
    pub async fn import_json(&mut self, json: &str) -> Result<ProjectId, ApiError> {
        let project = import_project(json)?;
        let id = project.id.clone();
        self.install(project, SaveState::Unsaved);
        self.save().await?;
        self.notifications
            .push(Notification::info(format!("Imported {}", self.project.name)));
        Ok(id)
    }

    pub fn export_json(&self) -> Result<String, ApiError> {
        Ok(export_project(&self.project)?)
    }

    /// Validate, persist and apply new settings
    pub async fn update_settings(&mut self, settings: Settings) -> Result<(), ApiError> {
        settings.validate()?;
        self.gateway.save_settings(&settings).await?;
        self.autosave
            .set_interval(settings.autosave_delay(), Instant::now());
        self.preview
            .set_options(PreviewOptions::from_config(&self.preview_config, &settings));
        self.settings = settings;
        Ok(())
    }

    /// Set one setting by key, e.g. `("tabWidth", "4")`
    pub async fn set_setting(&mut self, key: &str, value: &str) -> Result<(), ApiError> {
        let next = self.settings.with_field(key, value)?;
        self.update_settings(next).await
    }
}
