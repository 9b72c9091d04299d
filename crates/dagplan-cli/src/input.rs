//! Issue list loading.
//!
//! Accepted shapes, in JSON or YAML:
//!
//! ```yaml
//! - { id: a, effortHours: 2, priority: P1, dependencies: [] }
//! ```
//!
//! or the same list under an `issues` key. The format is picked by file
//! extension (`.json`, `.yaml`, `.yml`); anything else is tried as JSON
//! first, then YAML.

use std::path::Path;

use anyhow::{Context, Result};
use dagplan_core::IssueNode;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IssueFile {
    Bare(Vec<IssueNode>),
    Wrapped { issues: Vec<IssueNode> },
}

impl IssueFile {
    fn into_issues(self) -> Vec<IssueNode> {
        match self {
            Self::Bare(issues) | Self::Wrapped { issues } => issues,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Unknown,
}

fn detect_format(path: &Path) -> Format {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Format::Json,
        Some("yaml" | "yml") => Format::Yaml,
        _ => Format::Unknown,
    }
}

/// Parse an issue list from `content`.
///
/// # Errors
///
/// Returns an error if `content` is not a valid issue list in the format
/// implied by `path`.
pub fn parse_issues(path: &Path, content: &str) -> Result<Vec<IssueNode>> {
    let file: IssueFile = match detect_format(path) {
        Format::Json => serde_json::from_str(content).context("invalid JSON issue list")?,
        Format::Yaml => serde_yaml::from_str(content).context("invalid YAML issue list")?,
        Format::Unknown => match serde_json::from_str(content) {
            Ok(file) => file,
            Err(_) => serde_yaml::from_str(content)
                .context("issue list is neither valid JSON nor valid YAML")?,
        },
    };
    Ok(file.into_issues())
}

/// Read and parse the issue file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_issues(path: &Path) -> Result<Vec<IssueNode>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let issues =
        parse_issues(path, &content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), issues = issues.len(), "issue file loaded");
    Ok(issues)
}
