use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use crust_exp::{ledger_append, run_sweep_config, SweepConfig};
use tracing::info;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// YAML sweep configuration (solver, layout, template, plan, scheduler).
    #[arg(long)]
    pub config: PathBuf,
    /// Directory receiving sweep_report.json and sweep_report.txt.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// CSV ledger to append one row per run to.
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Overrides scheduler.parallelism from the configuration.
    #[arg(long)]
    pub parallelism: Option<usize>,
}

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let mut config = SweepConfig::load(&args.config)?;
    if let Some(parallelism) = args.parallelism {
        config.scheduler.parallelism = parallelism;
    }
    let report = run_sweep_config(&config)?;
    if let Some(out) = &args.out {
        let path = report.persist(out)?;
        info!(report = %path.display(), "sweep report written");
    }
    if let Some(ledger) = &args.ledger {
        ledger_append(ledger, &report)?;
        info!(ledger = %ledger.display(), "ledger updated");
    }
    print!("{}", report.render_text());
    if !report.all_completed() {
        return Err(format!("{} of {} runs failed", report.failed, report.runs.len()).into());
    }
    Ok(())
}
