//! `dagplan analyze`: full scheduling report for an issue file.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use dagplan_graph::GraphAnalysisResult;

use crate::cmd::{InputArgs, load_and_analyze};
use crate::output::{OutputMode, hours, kv, render, section};

/// Arguments for `dagplan analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute `dagplan analyze`.
pub fn run_analyze(
    args: &AnalyzeArgs,
    config_path: Option<&Path>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let result = load_and_analyze(&args.input.file, config_path, project_root, output)?;
    render(output, &result, render_report_human)
}

fn render_report_human(result: &GraphAnalysisResult, w: &mut dyn Write) -> io::Result<()> {
    let stats = &result.statistics;

    section(w, "Summary")?;
    kv(
        w,
        "Issues",
        format!("{} ({} scheduled)", stats.total_issues, stats.scheduled_issues),
    )?;
    kv(w, "Dependencies", stats.edge_count.to_string())?;
    kv(w, "Parallel groups", stats.group_count.to_string())?;
    kv(w, "Max parallelism", stats.max_parallelism.to_string())?;
    kv(w, "Total effort", hours(stats.total_effort))?;
    kv(w, "Critical path effort", hours(stats.critical_path_effort))?;
    kv(
        w,
        "Ready / blocked",
        format!("{} / {}", stats.ready_count, stats.blocked_count),
    )?;
    kv(w, "Content hash", &result.content_hash)?;
    writeln!(w)?;

    section(w, "Critical path")?;
    if result.critical_path.issue_ids.is_empty() {
        writeln!(w, "(none)")?;
    } else {
        writeln!(
            w,
            "{}  [{}]",
            result.critical_path.issue_ids.join(" → "),
            hours(result.critical_path.total_effort)
        )?;
    }
    writeln!(w)?;

    section(w, "Parallel groups")?;
    if result.parallel_groups.is_empty() {
        writeln!(w, "(none)")?;
    }
    for group in &result.parallel_groups {
        writeln!(
            w,
            "Group {} ({}): {}",
            group.group_index,
            hours(group.total_effort),
            group.issue_ids.join(", ")
        )?;
    }
    writeln!(w)?;

    section(w, "Prioritized queue")?;
    if result.prioritized_queue.queue.is_empty() {
        writeln!(w, "(empty)")?;
    }
    for (rank, id) in result.prioritized_queue.queue.iter().enumerate() {
        let Some(issue) = result.issue(id) else {
            continue;
        };
        let state = if issue.dependencies_resolved {
            "ready"
        } else {
            "blocked"
        };
        let marker = if issue.is_on_critical_path { "*" } else { " " };
        writeln!(
            w,
            "{:>3}. {marker} {:<24} {:>7.1}  {:<7} {}",
            rank + 1,
            id,
            issue.priority_score.unwrap_or_default(),
            state,
            issue.issue.title
        )?;
    }

    if !result.cycles.is_empty() {
        writeln!(w)?;
        section(w, "Dependency cycles")?;
        for cycle in &result.cycles {
            writeln!(w, "{}", cycle.issue_ids.join(" → "))?;
            for edge in &cycle.suggested_breaks {
                writeln!(
                    w,
                    "  break: remove {} from the dependencies of {}",
                    edge.dependency, edge.dependent
                )?;
            }
        }
        kv(w, "Blocked by cycles", result.blocked_by_cycle.join(", "))?;
    }

    if !result.warnings.is_empty() {
        writeln!(w)?;
        section(w, "Warnings")?;
        for warning in &result.warnings {
            writeln!(w, "{warning}")?;
        }
    }

    Ok(())
}
