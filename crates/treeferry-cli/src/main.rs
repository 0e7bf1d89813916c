//! Treeferry - depth-bounded file-tree copying with cluster fan-out
//!
//! Copies, links, or moves files and directory trees with filtering and
//! renaming, either directly in-process or bundled into jobs submitted to a
//! PBS or Slurm cluster scheduler.

mod args;
mod resolve;
mod run;
mod submit;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use console::style;
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.silent)?;

    info!("treeferry v{} starting", env!("CARGO_PKG_VERSION"));

    cli.validate()?;
    let tasks = resolve::resolve_tasks(&cli)?;
    info!("{} task(s) resolved", tasks.len());

    if cli.scheduler.is_some() {
        if !cli.silent {
            println!(
                "{} Submitting {} task(s) to {} scheduler",
                style("→").green().bold(),
                tasks.len(),
                style(cli.scheduler.as_deref().unwrap_or_default()).cyan()
            );
        }
        submit::submit_tasks(&cli, tasks)?;
    } else {
        let stats = run::perform_tasks(&cli, &tasks)?;
        run::print_summary(&cli, &stats);
    }

    Ok(())
}

fn init_logging(debug: bool, silent: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if silent {
        "error"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
