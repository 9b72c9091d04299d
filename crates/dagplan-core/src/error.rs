use std::fmt;

/// Machine-readable error codes for orchestration-layer decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidConfig,
    InputParseError,
    DuplicateIssueId,
    EmptyIssueId,
    ResidualCycle,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidConfig => "E1002",
            Self::InputParseError => "E2001",
            Self::DuplicateIssueId => "E2002",
            Self::EmptyIssueId => "E2003",
            Self::ResidualCycle => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidConfig => "Invalid scoring configuration",
            Self::InputParseError => "Issue list parse error",
            Self::DuplicateIssueId => "Duplicate issue ID",
            Self::EmptyIssueId => "Empty issue ID",
            Self::ResidualCycle => "Cycle left in scheduling graph",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .dagplan/config.toml and retry."),
            Self::InvalidConfig => {
                Some("Priority weights must strictly decrease from p0 to p3; bonuses must be >= 0.")
            }
            Self::InputParseError => {
                Some("Provide a JSON or YAML list of {id, dependencies, effortHours, priority}.")
            }
            Self::DuplicateIssueId => Some("Give every issue a unique ID and re-run the scheduler."),
            Self::EmptyIssueId => Some("Every issue needs a non-blank ID."),
            Self::ResidualCycle | Self::InternalUnexpected => {
                Some("Retry once. If persistent, report a bug with the input issue list.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 7] = [
        ErrorCode::ConfigParseError,
        ErrorCode::InvalidConfig,
        ErrorCode::InputParseError,
        ErrorCode::DuplicateIssueId,
        ErrorCode::EmptyIssueId,
        ErrorCode::ResidualCycle,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let codes: HashSet<&str> = ALL.iter().map(|code| code.code()).collect();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn codes_follow_e_prefix_format() {
        for code in ALL {
            let id = code.code();
            assert_eq!(id.len(), 5, "{id}");
            assert!(id.starts_with('E'), "{id}");
            assert!(id[1..].chars().all(|c| c.is_ascii_digit()), "{id}");
        }
    }

    #[test]
    fn display_is_the_code() {
        assert_eq!(ErrorCode::DuplicateIssueId.to_string(), "E2002");
    }
}
