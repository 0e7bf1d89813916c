//! Direct task execution
//!
//! One shared transfer instance, one walker configuration, tasks performed
//! in order. A file source goes straight to the transfer; a directory source
//! goes through the walker. Destinations were already standardized to
//! sync-style during resolution.

use crate::args::Cli;
use console::style;
use tracing::info;
use treeferry_types::{Result, Task, TreeShape};
use treeferry_walk::Walker;

/// Counts reported after a direct run
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    /// Single-file tasks executed
    pub files: usize,
    /// Directory tasks walked
    pub trees: usize,
    /// Directories visited across all walks
    pub dirs_visited: usize,
    /// Files listed as transfer candidates across all walks
    pub files_listed: usize,
}

/// Perform every task in order, aborting on the first fatal error
pub fn perform_tasks(cli: &Cli, tasks: &[Task]) -> Result<RunStats> {
    let transfer = cli.transfer()?;
    let walker = Walker::with_transfer(cli.walk_options()?, transfer.clone());
    let mut stats = RunStats::default();

    for task in tasks {
        task.verify_source()?;
        if task.source.is_file() {
            let outcome = transfer.execute(&task.source, &task.dest)?;
            info!(
                "file task {} -> {}: {:?}",
                task.source.display(),
                task.dest.display(),
                outcome
            );
            stats.files += 1;
        } else {
            for entry in walker.walk(&task.source, Some(&task.dest), TreeShape::Sync)? {
                let entry = entry?;
                stats.dirs_visited += 1;
                stats.files_listed += entry.files.len();
            }
            stats.trees += 1;
        }
    }
    Ok(stats)
}

/// Print the run summary unless silenced
pub fn print_summary(cli: &Cli, stats: &RunStats) {
    if cli.silent {
        return;
    }
    println!();
    println!(
        "{} {} file task(s), {} tree task(s); {} directories visited, {} files listed",
        style("✓").green().bold(),
        stats.files,
        stats.trees,
        stats.dirs_visited,
        stats.files_listed,
    );
    if cli.dryrun {
        println!("{} Dry run - no changes were made", style("ℹ").yellow());
    }
}
