//! CLI Tooling
//!
//! Command-line surface over the editing session. Every command opens the project
//! store, runs one session operation, saves when something changed and prints a
//! short report.

use crate::config::{ConfigLoader, WebpadConfig};
use crate::error::{ApiError, FormatError};
use crate::logging::LoggingConfig;
use crate::session::Session;
use crate::store::{PersistenceGateway, ProjectSummary, SledProjectStore};
use crate::tree::Project;
use crate::types::{NodeId, ProjectId};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// webpad - project editor with live preview
#[derive(Parser)]
#[command(name = "webpad")]
#[command(about = "Edit small web projects, preview them as one self-contained page")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory of the project database
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings from `base` with command-line flags applied on top
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project
    New {
        name: String,
        /// Start from the sample project instead of a blank page
        #[arg(long)]
        sample: bool,
    },
    /// List stored projects
    List,
    /// Print a project's file tree
    Show { project: String },
    /// Create an empty file
    AddFile { project: String, path: String },
    /// Create a folder
    AddFolder { project: String, path: String },
    /// Replace a file's content with a file from disk, creating it if needed
    Write {
        project: String,
        path: String,
        source: PathBuf,
    },
    /// Delete a file or folder (folders recursively)
    Rm { project: String, path: String },
    /// Move a node into another folder ("" or "/" is the root)
    Mv {
        project: String,
        path: String,
        folder: String,
    },
    /// Rename a node
    Rename {
        project: String,
        path: String,
        new_name: String,
    },
    /// Print a file's content
    Cat { project: String, path: String },
    /// Compile the preview document
    Preview {
        project: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import a project from its JSON export
    Import { file: PathBuf },
    /// Export a project as JSON
    Export {
        project: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a stored project
    Delete { project: String },
    /// Print the effective configuration as TOML
    Config,
    /// Show or change editor settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,
    /// Change one setting, e.g. `set tabWidth 4`
    Set { key: String, value: String },
}

/// Load configuration the way the CLI does: an explicit file, or the default layers
pub fn load_config(cli: &Cli) -> Result<WebpadConfig, ApiError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    Ok(config)
}

/// CLI context: configuration, the opened store and a runtime to drive it
pub struct CliContext {
    config: WebpadConfig,
    gateway: Arc<SledProjectStore>,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    pub fn new(config: WebpadConfig) -> Result<Self, ApiError> {
        let data_dir = config.storage.resolve_data_dir()?;
        if let Some(parent) = data_dir.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let gateway = Arc::new(SledProjectStore::new(&data_dir)?);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            config,
            gateway,
            runtime,
        })
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        self.runtime.block_on(self.execute_inner(command))
    }

    async fn session(&self) -> Result<Session, ApiError> {
        let gateway: Arc<dyn PersistenceGateway> = self.gateway.clone();
        Session::start(gateway, self.config.preview.clone()).await
    }

    /// Session with the selected project open
    async fn open(&self, selector: &str) -> Result<Session, ApiError> {
        let id = self.find_project(selector).await?;
        let mut session = self.session().await?;
        session.open_project(&id).await?;
        Ok(session)
    }

    /// Match a project by id, then by exact name
    async fn find_project(&self, selector: &str) -> Result<ProjectId, ApiError> {
        let summaries = self.gateway.list_projects().await?;
        if let Some(summary) = summaries.iter().find(|s| s.id.as_str() == selector) {
            return Ok(summary.id.clone());
        }
        let named: Vec<&ProjectSummary> = summaries.iter().filter(|s| s.name == selector).collect();
        match named.as_slice() {
            [only] => Ok(only.id.clone()),
            [] => Err(ApiError::ProjectNotFound(ProjectId::from(selector))),
            _ => Err(ApiError::AmbiguousProject(selector.to_string())),
        }
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::New { name, sample } => {
                let mut session = self.session().await?;
                let id = session.new_project(name, *sample).await?;
                info!(project_id = %id, "Created project");
                Ok(format!(
                    "{} {} ({})",
                    "Created".green().bold(),
                    session.project().name,
                    id
                ))
            }
            Commands::List => {
                let summaries = self.gateway.list_projects().await?;
                Ok(format_project_table(&summaries))
            }
            Commands::Show { project } => {
                let session = self.open(project).await?;
                Ok(format_tree(session.project()))
            }
            Commands::AddFile { project, path } => {
                let mut session = self.open(project).await?;
                session.create_file_at(path)?;
                session.save().await?;
                Ok(format!("{} {}", "Created file".green(), path))
            }
            Commands::AddFolder { project, path } => {
                let mut session = self.open(project).await?;
                session.create_folder_at(path)?;
                session.save().await?;
                Ok(format!("{} {}", "Created folder".green(), path))
            }
            Commands::Write {
                project,
                path,
                source,
            } => {
                let content = std::fs::read_to_string(source)?;
                let mut session = self.open(project).await?;
                let id = match session.resolve(path) {
                    Ok(id) => id,
                    Err(ApiError::PathNotFound(_)) => session.create_file_at(path)?,
                    Err(e) => return Err(e),
                };
                session.update_file_content(&id, &content)?;
                session.save().await?;
                Ok(format!(
                    "{} {} ({} bytes)",
                    "Wrote".green(),
                    path,
                    content.len()
                ))
            }
            Commands::Rm { project, path } => {
                let mut session = self.open(project).await?;
                let id = session.resolve(path)?;
                let removed = session.delete_node(&id)?;
                session.save().await?;
                Ok(format!(
                    "{} {} ({} node{})",
                    "Removed".green(),
                    path,
                    removed.len(),
                    if removed.len() == 1 { "" } else { "s" }
                ))
            }
            Commands::Mv {
                project,
                path,
                folder,
            } => {
                let mut session = self.open(project).await?;
                let id = session.resolve(path)?;
                let target = session.resolve(folder)?;
                session.move_node(&id, &target)?;
                session.save().await?;
                Ok(format!("{} {} -> /{}", "Moved".green(), path, folder.trim_matches('/')))
            }
            Commands::Rename {
                project,
                path,
                new_name,
            } => {
                let mut session = self.open(project).await?;
                let id = session.resolve(path)?;
                session.rename_node(&id, new_name)?;
                session.save().await?;
                Ok(format!("{} {} -> {}", "Renamed".green(), path, new_name))
            }
            Commands::Cat { project, path } => {
                let session = self.open(project).await?;
                let id = session.resolve(path)?;
                session
                    .project()
                    .get(&id)
                    .and_then(|node| node.content())
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::PathNotFound(path.clone()))
            }
            Commands::Preview { project, out } => {
                let mut session = self.open(project).await?;
                let document = session.preview();
                write_or_return(out.as_deref(), &document)
            }
            Commands::Import { file } => {
                let json = std::fs::read_to_string(file)?;
                let mut session = self.session().await?;
                let id = session.import_json(&json).await?;
                Ok(format!(
                    "{} {} ({})",
                    "Imported".green().bold(),
                    session.project().name,
                    id
                ))
            }
            Commands::Export { project, out } => {
                let session = self.open(project).await?;
                let json = session.export_json()?;
                write_or_return(out.as_deref(), &json)
            }
            Commands::Delete { project } => {
                let id = self.find_project(project).await?;
                self.gateway.delete_project(&id).await?;
                Ok(format!("{} {}", "Deleted".green(), id))
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e))),
            Commands::Settings { command } => {
                let mut session = self.session().await?;
                if let SettingsCommands::Set { key, value } = command {
                    session.set_setting(key, value).await?;
                }
                serde_json::to_string_pretty(session.settings())
                    .map_err(|e| ApiError::Format(FormatError::Json(e)))
            }
        }
    }
}

fn write_or_return(out: Option<&Path>, text: &str) -> Result<String, ApiError> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(format!("{} {}", "Wrote".green(), path.display()))
        }
        None => Ok(text.to_string()),
    }
}

/// Project picker table
pub fn format_project_table(summaries: &[ProjectSummary]) -> String {
    if summaries.is_empty() {
        return "No projects yet. Create one with `webpad new <name>`.".to_string();
    }
    use comfy_table::Table;
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "ID", "Files", "Updated"]);
    for s in summaries {
        table.add_row(vec![
            s.name.clone(),
            s.id.to_string(),
            s.file_count.to_string(),
            s.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table.to_string()
}

/// Indented file tree, folders first
pub fn format_tree(project: &Project) -> String {
    let mut output = format!("{}\n", project.name.bold().underline());
    append_children(project, &project.root_id, 1, &mut output);
    output
}

fn append_children(project: &Project, folder: &NodeId, depth: usize, output: &mut String) {
    let Ok(children) = project.resolve_children(folder) else {
        return;
    };
    for child in children {
        let indent = "  ".repeat(depth);
        if child.is_folder() {
            output.push_str(&format!("{}{}/\n", indent, child.name.cyan()));
            append_children(project, &child.id, depth + 1, output);
        } else {
            output.push_str(&format!("{}{}\n", indent, child.name));
        }
    }
}
