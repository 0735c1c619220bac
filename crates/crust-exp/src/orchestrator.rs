use std::fs;
use std::path::{Path, PathBuf};

use crust_core::errors::{CrustError, ErrorInfo};
use crust_core::{ParameterSet, RunId};
use rayon::prelude::*;
use tracing::{info, info_span, warn};

use crate::config::{ArtifactLayout, SweepConfig};
use crate::hash::stable_hash_string;
use crate::report::{RunFailure, RunReport, RunStatus, SweepReport};
use crate::scratch::ScratchGuard;
use crate::solver::{CancelToken, Invocation, ProcessSolver, Solver, SolverExit};
use crate::sweep::Scheduler;
use crate::template::ConfigTemplate;
use crate::workdir::mirror_workdir;

/// Drives sweep points through template rendering, solver invocation, and
/// artifact collection.
///
/// Each point walks `Pending → ConfigWritten → Running` and ends either in
/// `Completed → ArtifactCollected` or `Failed → CleanupOnly`. Scratch files are
/// owned by a [`ScratchGuard`] for the duration of the run, so they are removed
/// on every exit path.
#[derive(Debug)]
pub struct Orchestrator<S> {
    template: ConfigTemplate,
    layout: ArtifactLayout,
    workdir: PathBuf,
    isolate_workdir: bool,
    solver: S,
    cancel: CancelToken,
}

impl<S: Solver> Orchestrator<S> {
    pub fn new(
        template: ConfigTemplate,
        layout: ArtifactLayout,
        workdir: impl Into<PathBuf>,
        solver: S,
    ) -> Self {
        Self {
            template,
            layout,
            workdir: workdir.into(),
            isolate_workdir: false,
            solver,
            cancel: CancelToken::new(),
        }
    }

    /// Runs every point in a private working directory under the scratch dir.
    pub fn isolated(mut self, isolate: bool) -> Self {
        self.isolate_workdir = isolate;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Executes the sweep on a worker pool of `scheduler.parallelism` threads.
    ///
    /// Individual run failures are recorded in the report and never abort the
    /// remaining points. Reports keep the order of `points`.
    pub fn run_sweep(
        &self,
        points: &[ParameterSet],
        scheduler: &Scheduler,
    ) -> Result<SweepReport, CrustError> {
        if scheduler.parallelism == 0 {
            return Err(CrustError::Config(ErrorInfo::new(
                "crust_exp.parallelism",
                "scheduler.parallelism must be at least 1",
            )));
        }
        if !scheduler.is_sequential() && !self.isolate_workdir {
            return Err(CrustError::Config(
                ErrorInfo::new(
                    "crust_exp.shared_output",
                    "parallel runs would share the solver's fixed output path",
                )
                .with_hint("enable workdir isolation"),
            ));
        }
        let template_hash = stable_hash_string(&self.template.source())?;
        info!(
            points = points.len(),
            parallelism = scheduler.parallelism,
            template = %template_hash,
            "starting sweep"
        );
        let runs: Vec<RunReport> = if scheduler.is_sequential() {
            points.iter().map(|point| self.run_point(point)).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(scheduler.parallelism)
                .thread_name(|idx| format!("crust-run-{idx}"))
                .build()
                .map_err(|err| {
                    CrustError::Run(ErrorInfo::new("crust_exp.worker_pool", err.to_string()))
                })?;
            pool.install(|| points.par_iter().map(|point| self.run_point(point)).collect())
        };
        let report = SweepReport::new(template_hash, runs);
        info!(
            completed = report.completed,
            failed = report.failed,
            "sweep finished"
        );
        Ok(report)
    }

    /// Runs a single sweep point and reports its outcome. Never panics on solver
    /// or filesystem failures; those become [`RunStatus::Failed`].
    pub fn run_point(&self, params: &ParameterSet) -> RunReport {
        let run_id = RunId::mint();
        let label = params.label();
        let span = info_span!("run", run_id = %run_id, label = %label);
        let _entered = span.enter();

        let rendered = self.template.render(params);
        for key in &rendered.missing {
            warn!(key = %key, "override key has no directive in template; not applied");
        }

        let status = if self.cancel.is_cancelled() {
            info!("sweep cancelled before run started");
            RunStatus::Failed {
                failure: RunFailure::Cancelled,
            }
        } else {
            let mut scratch = ScratchGuard::new(run_id.clone());
            match self.execute(&run_id, &label, &rendered.text, &mut scratch) {
                Ok(status) => status,
                Err(error) => {
                    warn!(error = %error, "run aborted by orchestration fault");
                    RunStatus::Failed {
                        failure: RunFailure::Fault { error },
                    }
                }
            }
        };

        RunReport {
            params: params.clone(),
            label,
            run_id,
            missing_keys: rendered.missing,
            status,
        }
    }

    fn execute(
        &self,
        run_id: &RunId,
        label: &str,
        config_text: &str,
        scratch: &mut ScratchGuard,
    ) -> Result<RunStatus, CrustError> {
        let workdir = if self.isolate_workdir {
            let dir = self.layout.isolated_workdir(run_id);
            scratch.create_dir(&dir)?;
            mirror_workdir(&self.workdir, &dir, &self.layout)?;
            dir
        } else {
            self.workdir.clone()
        };
        let output = self.layout.output_path(&workdir);
        prepare_output(&output)?;

        let config_path = self.layout.scratch_path(run_id);
        scratch.write_file(&config_path, config_text)?;
        info!(config = %config_path.display(), "config written");

        let invocation = Invocation {
            run_id,
            workdir: &workdir,
            config_path: &config_path,
        };
        let exit = self.solver.invoke(&invocation, &self.cancel)?;
        info!(exit = ?exit, "solver finished");

        let failure = match exit {
            SolverExit::Exited { code: 0 } if output.is_file() => None,
            SolverExit::Exited { code: 0 } => Some(RunFailure::ArtifactMissing {
                path: output.clone(),
            }),
            SolverExit::Exited { code } => Some(RunFailure::Exited { code }),
            SolverExit::Signalled { signal } => Some(RunFailure::Signalled { signal }),
            SolverExit::Cancelled => Some(RunFailure::Cancelled),
            SolverExit::TimedOut { limit_seconds } => Some(RunFailure::TimedOut { limit_seconds }),
        };
        if let Some(failure) = failure {
            warn!(reason = %failure, "run failed; cleaning up scratch only");
            return Ok(RunStatus::Failed { failure });
        }

        let destination = self.layout.destination_path(&self.workdir, label);
        relocate(&output, &destination)?;
        info!(destination = %destination.display(), "artifact collected");
        Ok(RunStatus::Completed { destination })
    }
}

impl Orchestrator<ProcessSolver> {
    /// Builds an orchestrator for the real solver binary described by `config`.
    pub fn from_config(config: &SweepConfig) -> Result<Self, CrustError> {
        let template = match &config.template {
            Some(path) => ConfigTemplate::load(path)?,
            None => ConfigTemplate::crustcool_default(),
        };
        for key in template.duplicates() {
            warn!(key = %key, "template repeats directive; only the first is rewritten");
        }
        let solver = ProcessSolver::resolved(
            &config.solver.binary,
            &config.solver.workdir,
            config.solver.mode_flag.clone(),
        )
        .with_limits(config.solver.limits);
        Ok(Self::new(
            template,
            config.layout.clone(),
            config.solver.workdir.clone(),
            solver,
        )
        .isolated(config.solver.isolate_workdir))
    }
}

/// Expands the plan in `config` and runs it against the configured solver.
pub fn run_sweep_config(config: &SweepConfig) -> Result<SweepReport, CrustError> {
    config.validate()?;
    let points = config.plan.expand()?;
    Orchestrator::from_config(config)?.run_sweep(&points, &config.scheduler)
}

/// Ensures the output directory exists and no stale artifact from an earlier
/// run can be mistaken for this run's output.
fn prepare_output(output: &Path) -> Result<(), CrustError> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| CrustError::io("crust_exp.output_dir", parent, err))?;
    }
    match fs::remove_file(output) {
        Ok(()) => {
            warn!(path = %output.display(), "removed stale solver output before run");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(CrustError::io("crust_exp.stale_output", output, err)),
    }
}

/// Copies the artifact to `destination`, then drops the working copy.
fn relocate(output: &Path, destination: &Path) -> Result<(), CrustError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| CrustError::io("crust_exp.destination_dir", parent, err))?;
    }
    fs::copy(output, destination).map_err(|err| {
        CrustError::Run(
            ErrorInfo::new("crust_exp.artifact_copy", err.to_string())
                .with_path(output)
                .with_context("destination", destination.display().to_string()),
        )
    })?;
    if let Err(err) = fs::remove_file(output) {
        warn!(path = %output.display(), error = %err, "failed to remove working artifact");
    }
    Ok(())
}
