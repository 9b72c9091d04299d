//! Scheduler configuration.
//!
//! Scoring weights are never baked into the scheduler: every weight, bonus
//! and threshold is read from [`ScoringConfig`]. Defaults live here, in the
//! `Default` impls and the `default_*` helpers used by serde.
//!
//! Resolution order for [`resolve_config`]:
//!
//! 1. An explicit path (`--config`), which must exist.
//! 2. `<project>/.dagplan/config.toml`
//! 3. `<user config dir>/dagplan/config.toml`
//! 4. Built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::Priority;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl SchedulerConfig {
    /// Check the invariants the scorer relies on.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()
    }
}

/// Weights for `score = weight(priority) + cp_bonus + dependents * multiplier + quick_win_bonus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub priority_weights: PriorityWeights,
    #[serde(default = "default_critical_path_bonus")]
    pub critical_path_bonus: f64,
    #[serde(default = "default_dependent_multiplier")]
    pub dependent_multiplier: f64,
    #[serde(default = "default_quick_win_bonus")]
    pub quick_win_bonus: f64,
    #[serde(default = "default_quick_win_threshold_hours")]
    pub quick_win_threshold_hours: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            priority_weights: PriorityWeights::default(),
            critical_path_bonus: default_critical_path_bonus(),
            dependent_multiplier: default_dependent_multiplier(),
            quick_win_bonus: default_quick_win_bonus(),
            quick_win_threshold_hours: default_quick_win_threshold_hours(),
        }
    }
}

impl ScoringConfig {
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any value is non-finite or negative, or
    /// if the priority weights are not strictly decreasing from P0 to P3.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("critical_path_bonus", self.critical_path_bonus),
            ("dependent_multiplier", self.dependent_multiplier),
            ("quick_win_bonus", self.quick_win_bonus),
            ("quick_win_threshold_hours", self.quick_win_threshold_hours),
        ];
        for (field, value) in scalars {
            check_non_negative(field, value)?;
        }
        self.priority_weights.validate()
    }
}

/// Numeric weight per priority level. Must satisfy `p0 > p1 > p2 > p3`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "default_p0")]
    pub p0: f64,
    #[serde(default = "default_p1")]
    pub p1: f64,
    #[serde(default = "default_p2")]
    pub p2: f64,
    #[serde(default = "default_p3")]
    pub p3: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            p0: default_p0(),
            p1: default_p1(),
            p2: default_p2(),
            p3: default_p3(),
        }
    }
}

impl PriorityWeights {
    #[must_use]
    pub const fn weight(&self, priority: Priority) -> f64 {
        match priority {
            Priority::P0 => self.p0,
            Priority::P1 => self.p1,
            Priority::P2 => self.p2,
            Priority::P3 => self.p3,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::NonMonotonicWeights`] when a lower priority
    /// weighs as much as or more than a higher one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for level in Priority::ALL {
            check_non_negative(level.as_field(), self.weight(level))?;
        }
        for pair in Priority::ALL.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if self.weight(higher) <= self.weight(lower) {
                return Err(ConfigError::NonMonotonicWeights {
                    higher,
                    lower,
                    higher_weight: self.weight(higher),
                    lower_weight: self.weight(lower),
                });
            }
        }
        Ok(())
    }
}

impl Priority {
    const fn as_field(self) -> &'static str {
        match self {
            Self::P0 => "priority_weights.p0",
            Self::P1 => "priority_weights.p1",
            Self::P2 => "priority_weights.p2",
            Self::P3 => "priority_weights.p3",
        }
    }
}

/// A scoring configuration that the scheduler refuses to run with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error(
        "priority weights must strictly decrease: {higher} ({higher_weight}) <= {lower} ({lower_weight})"
    )]
    NonMonotonicWeights {
        higher: Priority,
        lower: Priority,
        higher_weight: f64,
        lower_weight: f64,
    },
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

const fn default_p0() -> f64 {
    100.0
}

const fn default_p1() -> f64 {
    75.0
}

const fn default_p2() -> f64 {
    50.0
}

const fn default_p3() -> f64 {
    25.0
}

const fn default_critical_path_bonus() -> f64 {
    20.0
}

const fn default_dependent_multiplier() -> f64 {
    10.0
}

const fn default_quick_win_bonus() -> f64 {
    15.0
}

const fn default_quick_win_threshold_hours() -> f64 {
    4.0
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Project(PathBuf),
    User(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(path) | Self::Project(path) | Self::User(path) => {
                write!(f, "{}", path.display())
            }
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Read and parse a scheduler config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`SchedulerConfig`].
pub fn load_config_file(path: &Path) -> Result<SchedulerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<SchedulerConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<project_root>/.dagplan/config.toml` if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<Option<(SchedulerConfig, PathBuf)>> {
    let path = project_root.join(".dagplan/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(|config| Some((config, path)))
}

/// Load `<config dir>/dagplan/config.toml` if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<Option<(SchedulerConfig, PathBuf)>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };

    let path = config_dir.join("dagplan/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(|config| Some((config, path)))
}

/// Resolve the effective configuration and validate it.
///
/// # Errors
///
/// Returns an error if the explicit file is missing, any consulted file
/// fails to parse, or the resulting configuration is invalid.
pub fn resolve_config(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<(SchedulerConfig, ConfigSource)> {
    let (config, source) = if let Some(path) = explicit {
        (load_config_file(path)?, ConfigSource::Explicit(path.to_path_buf()))
    } else if let Some((config, path)) = load_project_config(project_root)? {
        (config, ConfigSource::Project(path))
    } else if let Some((config, path)) = load_user_config()? {
        (config, ConfigSource::User(path))
    } else {
        (SchedulerConfig::default(), ConfigSource::Defaults)
    };

    config
        .validate()
        .with_context(|| format!("Invalid scheduler config from {source}"))?;

    debug!(%source, "scheduler config resolved");
    Ok((config, source))
}
