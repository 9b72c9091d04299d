//! Input records consumed by the scheduler.

pub mod issue;

pub use issue::{IssueNode, ParseEnumError, Priority};
