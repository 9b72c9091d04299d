use dagplan_core::{ConfigError, ErrorCode};

/// Fatal scheduling failures. No partial result is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("duplicate issue ids: {}", .ids.join(", "))]
    DuplicateIssueIds { ids: Vec<String> },

    #[error("issue at position {position} has an empty id")]
    EmptyIssueId { position: usize },

    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("dependency cycle left after cycle removal: {}", .ids.join(", "))]
    ResidualCycle { ids: Vec<String> },
}

impl AnalysisError {
    /// Stable error code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateIssueIds { .. } => ErrorCode::DuplicateIssueId,
            Self::EmptyIssueId { .. } => ErrorCode::EmptyIssueId,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::ResidualCycle { .. } => ErrorCode::ResidualCycle,
        }
    }
}
