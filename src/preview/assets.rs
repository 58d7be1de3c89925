//! Local asset resolution for the preview compiler
//!
//! Every `href`/`src` attribute of the entry document that is not an absolute URL is
//! resolved against the project root the way a static file server would. Matches are
//! inlined as base64 `data:` URIs; anything unresolvable passes through untouched.

use crate::tree::path::relative_path;
use crate::tree::{Node, Project};
use base64::Engine;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(\s)(href|src)(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#)
            .expect("asset attribute pattern is valid")
    })
}

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("URL scheme pattern is valid")
    })
}

/// True for values with a scheme (`https:`, `data:`, `mailto:`) or a `//` prefix
pub fn is_absolute_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("//") || scheme_pattern().is_match(value)
}

/// Root-relative lookup key for an attribute value, or `None` if it cannot name a
/// project file.
///
/// Query strings and fragments are dropped, `./` and empty segments are skipped,
/// a leading `/` anchors at the project root, and `..` pops one segment. A `..`
/// that would climb above the root makes the reference unresolvable.
pub fn candidate_path(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') || is_absolute_url(value) {
        return None;
    }
    let end = value.find(['?', '#']).unwrap_or(value.len());
    let path = &value[..end];

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// MIME type for a file, inferred from its extension
pub fn mime_type(node: &Node) -> &'static str {
    match node.extension().as_deref() {
        Some("js") | Some("mjs") => "text/javascript",
        Some("css") => "text/css",
        _ => "text/plain",
    }
}

/// Encode text as a `data:` URI of the given MIME type
pub fn data_uri(mime: &str, content: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(content.as_bytes());
    format!("data:{};charset=utf-8;base64,{}", mime, encoded)
}

/// Outcome of rewriting one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetResolution {
    /// Replaced with an inline resource built from the file at `path`
    Inlined { path: String, mime: &'static str },
    /// Left as written because no file has that path
    Unresolved { value: String },
}

/// Rewrite every local `href`/`src` reference in `html`.
///
/// Returns the rewritten markup and one resolution per local reference, in order.
pub fn rewrite_asset_references(html: &str, project: &Project) -> (String, Vec<AssetResolution>) {
    let files: HashMap<String, &Node> = project
        .files()
        .map(|file| (relative_path(project, &file.id), file))
        .filter(|(path, _)| !path.is_empty())
        .collect();

    let mut resolutions = Vec::new();
    let rewritten = attribute_pattern().replace_all(html, |caps: &Captures| {
        let (quote, value) = match (caps.get(4), caps.get(5)) {
            (Some(v), _) => ('"', v.as_str()),
            (None, Some(v)) => ('\'', v.as_str()),
            (None, None) => return caps[0].to_string(),
        };
        let Some(candidate) = candidate_path(value) else {
            return caps[0].to_string();
        };
        match files.get(&candidate) {
            Some(file) => {
                let mime = mime_type(file);
                let uri = data_uri(mime, file.content().unwrap_or_default());
                resolutions.push(AssetResolution::Inlined {
                    path: candidate,
                    mime,
                });
                format!("{}{}{}{q}{}{q}", &caps[1], &caps[2], &caps[3], uri, q = quote)
            }
            None => {
                debug!(reference = value, "Unresolved asset reference");
                resolutions.push(AssetResolution::Unresolved {
                    value: value.to_string(),
                });
                caps[0].to_string()
            }
        }
    });
    (rewritten.into_owned(), resolutions)
}
