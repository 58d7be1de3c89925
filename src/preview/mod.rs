//! Preview Compiler
//!
//! Turns a project snapshot into one self-contained HTML document: the entry file
//! with local assets inlined and the console bridge injected. Compilation never
//! fails; a missing entry point or a broken reference is rendered, not raised.

pub mod assets;
pub mod bridge;

use crate::config::PreviewConfig;
use crate::settings::Settings;
use crate::tree::path::relative_path;
use crate::tree::Project;
use assets::{rewrite_asset_references, AssetResolution};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Inputs of a compilation besides the project itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    pub entry_name: String,
    pub allow_external_resources: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            entry_name: "index.html".to_string(),
            allow_external_resources: false,
        }
    }
}

impl PreviewOptions {
    pub fn from_config(config: &PreviewConfig, settings: &Settings) -> Self {
        Self {
            entry_name: config.entry_name.clone(),
            allow_external_resources: settings.allow_external_resources,
        }
    }
}

/// Result of one compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPreview {
    pub document: String,
    /// False when the entry file was missing and a diagnostic page was produced
    pub has_entry: bool,
    pub bridge_injected: bool,
    pub assets: Vec<AssetResolution>,
}

/// Compile `project` into a single executable document
pub fn compile(project: &Project, options: &PreviewOptions) -> String {
    compile_detailed(project, options).document
}

/// Compile and report what happened along the way
pub fn compile_detailed(project: &Project, options: &PreviewOptions) -> CompiledPreview {
    let entry = project.root().and_then(|root| {
        root.children_ids()
            .iter()
            .filter_map(|id| project.get(id))
            .find(|node| node.is_file() && node.name == options.entry_name)
    });

    let Some(entry) = entry else {
        debug!(entry = %options.entry_name, "No entry file, rendering diagnostic");
        return CompiledPreview {
            document: missing_entry_document(project, &options.entry_name),
            has_entry: false,
            bridge_injected: false,
            assets: Vec::new(),
        };
    };

    let source = entry.content().unwrap_or_default();
    let (rewritten, assets) = rewrite_asset_references(source, project);
    let (mut document, bridge_injected) = bridge::inject_bridge(&rewritten);
    if !options.allow_external_resources {
        document = bridge::inject_local_only_policy(&document);
    }

    CompiledPreview {
        document,
        has_entry: true,
        bridge_injected,
        assets,
    }
}

/// Diagnostic page shown when the entry document is absent
fn missing_entry_document(project: &Project, entry_name: &str) -> String {
    let mut files: Vec<String> = project
        .files()
        .map(|file| relative_path(project, &file.id))
        .collect();
    files.sort();

    let listing = if files.is_empty() {
        "<p>The project has no files yet.</p>".to_string()
    } else {
        let items: String = files
            .iter()
            .map(|path| format!("<li><code>{}</code></li>", html_escape::encode_text(path)))
            .collect();
        format!("<p>Files in this project:</p><ul>{}</ul>", items)
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>No preview</title>\
<style>body{{font-family:system-ui,sans-serif;margin:2rem;color:#52525b}}code{{color:#b45309}}</style>\
</head>\n<body>\n<h1>Nothing to preview</h1>\n<p>Create <code>{}</code> at the top level of \
<strong>{}</strong> to see a live preview.</p>\n{}\n</body>\n</html>\n",
        html_escape::encode_text(entry_name),
        html_escape::encode_text(&project.name),
        listing
    )
}

/// Fingerprint of every compile input
fn fingerprint(project: &Project, options: &PreviewOptions) -> blake3::Hash {
    let mut files: Vec<(String, &str)> = project
        .files()
        .map(|file| (relative_path(project, &file.id), file.content().unwrap_or_default()))
        .collect();
    files.sort();

    let mut hasher = blake3::Hasher::new();
    hasher.update(options.entry_name.as_bytes());
    hasher.update(&[0, options.allow_external_resources as u8]);
    hasher.update(project.name.as_bytes());
    hasher.update(&[0]);
    for (path, content) in files {
        hasher.update(&(path.len() as u64).to_le_bytes());
        hasher.update(path.as_bytes());
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content.as_bytes());
    }
    hasher.finalize()
}

/// Memoized, debounced preview output
///
/// Edits mark the cache stale and (re)schedule a recompile one debounce window
/// later; later edits push the deadline back rather than queueing more work.
pub struct PreviewCache {
    options: PreviewOptions,
    debounce: Duration,
    fingerprint: Option<blake3::Hash>,
    document: Arc<str>,
    pending_until: Option<Instant>,
}

impl PreviewCache {
    pub fn new(options: PreviewOptions, debounce: Duration) -> Self {
        Self {
            options,
            debounce,
            fingerprint: None,
            document: Arc::from(""),
            pending_until: None,
        }
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// Replace compile options; the next request recompiles if they changed
    pub fn set_options(&mut self, options: PreviewOptions) {
        if options != self.options {
            self.options = options;
            self.fingerprint = None;
        }
    }

    /// Record a mutation at `now`
    pub fn invalidate(&mut self, now: Instant) {
        self.pending_until = Some(now + self.debounce);
    }

    /// When the next debounced recompile is due, if any
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending_until
    }

    /// Hex fingerprint of the cached document's inputs
    pub fn fingerprint_hex(&self) -> Option<String> {
        self.fingerprint.map(|hash| hex::encode(hash.as_bytes()))
    }

    /// Current document, recompiling only when the inputs changed
    pub fn document(&mut self, project: &Project) -> Arc<str> {
        self.pending_until = None;
        let current = fingerprint(project, &self.options);
        if self.fingerprint != Some(current) {
            let compiled = compile_detailed(project, &self.options);
            info!(
                project_id = %project.id,
                fingerprint = %current.to_hex(),
                has_entry = compiled.has_entry,
                assets = compiled.assets.len(),
                "Compiled preview"
            );
            self.document = Arc::from(compiled.document);
            self.fingerprint = Some(current);
        }
        Arc::clone(&self.document)
    }

    /// Recompile if the debounce window has elapsed; returns the new document
    pub fn poll(&mut self, project: &Project, now: Instant) -> Option<Arc<str>> {
        match self.pending_until {
            Some(deadline) if now >= deadline => Some(self.document(project)),
            _ => None,
        }
    }
}
