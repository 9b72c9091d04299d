//! Command handlers.
//!
//! Every command loads the scheduler config and an issue file, runs the
//! analysis, and renders a slice of the result. Failures are rendered with
//! their stable error code before the command bails.

pub mod analyze;
pub mod groups;
pub mod next;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use dagplan_core::config::resolve_config;
use dagplan_core::{ConfigError, ErrorCode, SchedulerConfig};
use dagplan_graph::{GraphAnalysisResult, analyze};
use tracing::{debug, warn};

use crate::input::load_issues;
use crate::output::{CliError, OutputMode, render_error};

/// Arguments shared by every command that reads an issue file.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Issue list (JSON or YAML).
    pub file: PathBuf,
}

/// Resolve config, load `file`, and analyze it.
///
/// Errors are rendered to stderr in `output` mode before being returned.
pub fn load_and_analyze(
    file: &Path,
    config_path: Option<&Path>,
    project_root: &Path,
    output: OutputMode,
) -> Result<GraphAnalysisResult> {
    let config = load_config(config_path, project_root, output)?;

    let issues = match load_issues(file) {
        Ok(issues) => issues,
        Err(e) => {
            render_error(output, &CliError::coded(ErrorCode::InputParseError, format!("{e:#}")))?;
            return Err(e);
        }
    };

    match analyze(&issues, &config) {
        Ok(result) => {
            for warning in &result.warnings {
                warn!(%warning, "input anomaly");
            }
            Ok(result)
        }
        Err(e) => {
            render_error(output, &CliError::coded(e.code(), e.to_string()))?;
            Err(e.into())
        }
    }
}

fn load_config(
    config_path: Option<&Path>,
    project_root: &Path,
    output: OutputMode,
) -> Result<SchedulerConfig> {
    match resolve_config(project_root, config_path) {
        Ok((config, source)) => {
            debug!(%source, "using scheduler config");
            Ok(config)
        }
        Err(e) => {
            let code = if e.downcast_ref::<ConfigError>().is_some() {
                ErrorCode::InvalidConfig
            } else {
                ErrorCode::ConfigParseError
            };
            render_error(output, &CliError::coded(code, format!("{e:#}")))?;
            Err(e)
        }
    }
}
