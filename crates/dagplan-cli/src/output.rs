//! Shared output layer for human/JSON parity across CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: sectioned text for humans, or stable camelCase JSON.

use dagplan_core::ErrorCode;
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human separators.
pub const RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by human output.
pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<22} {}", format!("{key}:"), value.as_ref())
}

/// Format an hour count the same way everywhere.
pub fn hours(value: f64) -> String {
    format!("{value:.1}h")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }

    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A structured error with a stable code and optional remediation hint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl CliError {
    /// Describe `message` under a stable error code.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code: Some(code.code()),
            hint: code.hint(),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode the value is pretty-printed with `serde_json`; otherwise
/// `human_fn` writes the text form.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(mode, error, &mut out)
}

fn write_error(mode: OutputMode, error: &CliError, out: &mut dyn Write) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            match error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(hint) = error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(mode: OutputMode, error: &CliError) -> String {
        let mut buf = Vec::new();
        write_error(mode, error, &mut buf).expect("write error");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn human_error_shows_code_and_hint() {
        let error = CliError::coded(ErrorCode::DuplicateIssueId, "duplicate issue ids: a");
        let text = rendered(OutputMode::Human, &error);

        assert!(text.starts_with("error[E2002]: duplicate issue ids: a"));
        assert!(text.contains("hint: "));
    }

    #[test]
    fn json_error_is_wrapped() {
        let error = CliError::coded(ErrorCode::InvalidConfig, "bad weights");
        let value: serde_json::Value =
            serde_json::from_str(&rendered(OutputMode::Json, &error)).expect("json");

        assert_eq!(value["error"]["errorCode"], "E1002");
        assert_eq!(value["error"]["message"], "bad weights");
    }

    #[test]
    fn json_flag_selects_mode() {
        assert!(OutputMode::from_json_flag(true).is_json());
        assert!(!OutputMode::from_json_flag(false).is_json());
    }
}
