use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The four ordinal priority levels an issue can carry.
///
/// `Ord` follows urgency: `P0` sorts before `P3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "P0", alias = "p0")]
    P0,
    #[serde(rename = "P1", alias = "p1")]
    P1,
    #[serde(rename = "P2", alias = "p2")]
    P2,
    #[serde(rename = "P3", alias = "p3")]
    P3,
}

impl Priority {
    /// All levels, most urgent first.
    pub const ALL: [Self; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    const fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected}: '{got}'")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" => Ok(Self::P0),
            "P1" => Ok(Self::P1),
            "P2" => Ok(Self::P2),
            "P3" => Ok(Self::P3),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

/// A work item as handed to the scheduler by the issue-generation stage.
///
/// Only `id`, `priority`, `effortHours` and `dependencies` drive scheduling.
/// `completed` is caller-owned state: the scheduler reads it to decide
/// whether the dependents of this issue have their dependencies resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "effort", alias = "effort_hours")]
    pub effort_hours: f64,
    pub priority: Priority,
    /// Ids this issue requires before it can start.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

impl IssueNode {
    #[must_use]
    pub fn new(id: impl Into<String>, effort_hours: f64, priority: Priority) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            effort_hours,
            priority,
            dependencies: Vec::new(),
            completed: false,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}
