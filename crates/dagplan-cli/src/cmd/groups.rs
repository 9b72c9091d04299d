//! `dagplan groups`: batches of issues that can run in parallel.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use dagplan_graph::ParallelGroup;

use crate::cmd::{InputArgs, load_and_analyze};
use crate::output::{OutputMode, hours, render};

/// Arguments for `dagplan groups`.
#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute `dagplan groups`.
pub fn run_groups(
    args: &GroupsArgs,
    config_path: Option<&Path>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let result = load_and_analyze(&args.input.file, config_path, project_root, output)?;
    render(output, &result.parallel_groups, |groups, w| {
        render_groups_human(groups, w)
    })
}

fn render_groups_human(groups: &[ParallelGroup], w: &mut dyn Write) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(w, "No schedulable issues.");
    }
    for group in groups {
        writeln!(
            w,
            "Group {} ({} issues, {})",
            group.group_index,
            group.issue_ids.len(),
            hours(group.total_effort)
        )?;
        for id in &group.issue_ids {
            writeln!(w, "  - {id}")?;
        }
    }
    Ok(())
}
