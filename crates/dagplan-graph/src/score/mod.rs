//! Issue scoring.

pub mod priority;

pub use priority::{ScoreInputs, priority_score};
