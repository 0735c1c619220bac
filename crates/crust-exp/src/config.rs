use std::fs;
use std::path::{Path, PathBuf};

use crust_core::errors::{CrustError, ErrorInfo};
use crust_core::RunId;
use serde::{Deserialize, Serialize};

use crate::solver::RunLimits;
use crate::sweep::{Scheduler, SweepPlan};

/// YAML-configurable description of a complete sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Solver binary and invocation settings.
    pub solver: SolverSpec,
    /// Scratch, output, and destination naming.
    #[serde(default)]
    pub layout: ArtifactLayout,
    /// Template file; the built-in crustcool `init.dat` when absent.
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Swept parameter space.
    pub plan: SweepPlan,
    /// Worker pool sizing.
    #[serde(default)]
    pub scheduler: Scheduler,
}

/// How the external solver is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSpec {
    /// Path to the solver executable.
    pub binary: PathBuf,
    /// Second positional argument passed after the run identity.
    #[serde(default = "default_mode_flag")]
    pub mode_flag: String,
    /// Directory the solver runs in. Relative destinations resolve here too.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Give each run a private working directory under the scratch dir,
    /// populated with links to everything in `workdir`. Required for parallel
    /// sweeps since the solver output name is fixed.
    #[serde(default)]
    pub isolate_workdir: bool,
    /// Per-run resource limits.
    #[serde(default)]
    pub limits: RunLimits,
}

fn default_mode_flag() -> String {
    "1".to_string()
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

/// Filesystem naming conventions shared by the solver and orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactLayout {
    /// Directory holding per-run configuration files.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    /// Scratch file prefix; the run identity is appended verbatim.
    #[serde(default = "default_scratch_prefix")]
    pub scratch_prefix: String,
    /// Solver output path, relative to the run's working directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Directory receiving collected artifacts.
    #[serde(default = "default_destination_dir")]
    pub destination_dir: PathBuf,
    /// Collected artifact prefix; the parameter label is appended.
    #[serde(default = "default_destination_prefix")]
    pub destination_prefix: String,
    /// Directories, relative to the working directory, that an isolated run
    /// gets empty and private instead of linked to the shared copy.
    #[serde(default = "default_private_dirs")]
    pub private_dirs: Vec<PathBuf>,
}

/// The solver opens `/tmp/init.dat.<id>` verbatim, so this must not follow
/// `$TMPDIR`.
fn default_scratch_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_scratch_prefix() -> String {
    "init.dat.".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("out/prof")
}

fn default_destination_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_destination_prefix() -> String {
    "prof_".to_string()
}

fn default_private_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("gon_out")]
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            scratch_prefix: default_scratch_prefix(),
            output: default_output(),
            destination_dir: default_destination_dir(),
            destination_prefix: default_destination_prefix(),
            private_dirs: default_private_dirs(),
        }
    }
}

impl ArtifactLayout {
    /// Layout rooted at `scratch_dir` with default naming.
    pub fn with_scratch_dir(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            ..Self::default()
        }
    }

    /// `<scratch_dir>/<scratch_prefix><run_id>`.
    pub fn scratch_path(&self, run_id: &RunId) -> PathBuf {
        self.scratch_dir
            .join(format!("{}{}", self.scratch_prefix, run_id))
    }

    /// Private working directory used when runs are isolated.
    pub fn isolated_workdir(&self, run_id: &RunId) -> PathBuf {
        self.scratch_dir.join(format!("crustcool-run.{run_id}"))
    }

    /// Solver output location inside `workdir`.
    pub fn output_path(&self, workdir: &Path) -> PathBuf {
        workdir.join(&self.output)
    }

    /// Durable destination for the artifact labelled `label`.
    pub fn destination_path(&self, base: &Path, label: &str) -> PathBuf {
        base.join(&self.destination_dir)
            .join(format!("{}{}", self.destination_prefix, label))
    }
}

impl SweepConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, CrustError> {
        let config: SweepConfig = serde_yaml::from_str(text).map_err(|err| {
            CrustError::Config(ErrorInfo::new("crust_exp.config_parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CrustError> {
        let text = fs::read_to_string(path)
            .map_err(|err| CrustError::io("crust_exp.config_read", path, err))?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            CrustError::Config(info) => CrustError::Config(info.with_path(path)),
            other => other,
        })
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), CrustError> {
        if self.scheduler.parallelism == 0 {
            return Err(CrustError::Config(ErrorInfo::new(
                "crust_exp.parallelism",
                "scheduler.parallelism must be at least 1",
            )));
        }
        if !self.scheduler.is_sequential() && !self.solver.isolate_workdir {
            return Err(CrustError::Config(
                ErrorInfo::new(
                    "crust_exp.shared_output",
                    "parallel runs would share the solver's fixed output path",
                )
                .with_context("parallelism", self.scheduler.parallelism.to_string())
                .with_hint("set `solver.isolate_workdir: true` or `scheduler.parallelism: 1`"),
            ));
        }
        if self.layout.output.is_absolute() {
            return Err(CrustError::Config(
                ErrorInfo::new(
                    "crust_exp.output_path",
                    "layout.output must be relative to the solver working directory",
                )
                .with_path(&self.layout.output),
            ));
        }
        if let Some(dir) = self.layout.private_dirs.iter().find(|dir| dir.is_absolute()) {
            return Err(CrustError::Config(
                ErrorInfo::new(
                    "crust_exp.private_dir",
                    "layout.private_dirs must be relative to the solver working directory",
                )
                .with_path(dir),
            ));
        }
        self.plan.expand()?;
        Ok(())
    }
}
