//! `dagplan next`: highest-priority issues that can start now.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use dagplan_graph::GraphAnalysisResult;
use serde::Serialize;

use crate::cmd::{InputArgs, load_and_analyze};
use crate::output::{OutputMode, hours, render};

/// Arguments for `dagplan next`.
#[derive(Args, Debug)]
pub struct NextArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// How many ready issues to show.
    #[arg(short = 'n', long = "count", default_value_t = 5)]
    pub count: usize,

    /// Include issues the caller already marked completed.
    #[arg(long)]
    pub include_completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NextIssue {
    id: String,
    title: String,
    priority_score: f64,
    effort_hours: f64,
    is_on_critical_path: bool,
}

/// Execute `dagplan next`.
pub fn run_next(
    args: &NextArgs,
    config_path: Option<&Path>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let result = load_and_analyze(&args.input.file, config_path, project_root, output)?;
    let picks = pick_next(&result, args.count, args.include_completed);
    render(output, &picks, |picks, w| render_next_human(picks, w))
}

fn pick_next(result: &GraphAnalysisResult, count: usize, include_completed: bool) -> Vec<NextIssue> {
    result
        .prioritized_queue
        .ready_for_execution
        .iter()
        .filter_map(|id| result.issue(id))
        .filter(|analyzed| include_completed || !analyzed.issue.completed)
        .take(count)
        .map(|analyzed| NextIssue {
            id: analyzed.issue.id.clone(),
            title: analyzed.issue.title.clone(),
            priority_score: analyzed.priority_score.unwrap_or_default(),
            effort_hours: analyzed.issue.effort_hours,
            is_on_critical_path: analyzed.is_on_critical_path,
        })
        .collect()
}

fn render_next_human(picks: &[NextIssue], w: &mut dyn Write) -> io::Result<()> {
    if picks.is_empty() {
        return writeln!(w, "Nothing is ready to start.");
    }
    for (rank, pick) in picks.iter().enumerate() {
        let marker = if pick.is_on_critical_path { " (critical)" } else { "" };
        writeln!(
            w,
            "{}. {} [{:.1}, {}]{marker}  {}",
            rank + 1,
            pick.id,
            pick.priority_score,
            hours(pick.effort_hours),
            pick.title
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagplan_core::{IssueNode, Priority, SchedulerConfig};

    fn analyzed(issues: &[IssueNode]) -> GraphAnalysisResult {
        dagplan_graph::analyze(issues, &SchedulerConfig::default()).expect("analyze")
    }

    #[test]
    fn picks_follow_queue_order_and_skip_completed() {
        let result = analyzed(&[
            IssueNode::new("done", 1.0, Priority::P0).completed(),
            IssueNode::new("low", 8.0, Priority::P3),
            IssueNode::new("high", 8.0, Priority::P1),
            IssueNode::new("waiting", 1.0, Priority::P0).with_dependencies(["high"]),
        ]);

        let ids: Vec<String> = pick_next(&result, 5, false).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["high", "low"]);

        let with_done: Vec<String> =
            pick_next(&result, 5, true).into_iter().map(|p| p.id).collect();
        assert_eq!(with_done.first().map(String::as_str), Some("done"));
    }

    #[test]
    fn count_limits_picks() {
        let result = analyzed(&[
            IssueNode::new("a", 1.0, Priority::P1),
            IssueNode::new("b", 1.0, Priority::P1),
            IssueNode::new("c", 1.0, Priority::P1),
        ]);
        assert_eq!(pick_next(&result, 2, false).len(), 2);
    }
}
