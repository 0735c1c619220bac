use std::fmt::{self, Display, Write as _};
use std::fs;
use std::path::{Path, PathBuf};

use crust_core::errors::CrustError;
use crust_core::{ParameterSet, RunId};
use serde::{Deserialize, Serialize};

use crate::serde::to_canonical_json_bytes;

/// Why a run ended in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RunFailure {
    /// Solver exited with a nonzero status.
    Exited { code: i32 },
    /// Solver was terminated by a signal.
    Signalled { signal: Option<i32> },
    /// Solver reported success but left no output file.
    ArtifactMissing { path: PathBuf },
    /// Sweep was cancelled before or during the run.
    Cancelled,
    /// Solver exceeded its wall-clock limit and was killed.
    TimedOut { limit_seconds: u64 },
    /// Orchestration fault (scratch write, spawn, relocation).
    Fault { error: CrustError },
}

impl RunFailure {
    /// Solver exit code, when the solver exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunFailure::Exited { code } => Some(*code),
            _ => None,
        }
    }
}

impl Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::Exited { code } => write!(f, "solver exited with code {code}"),
            RunFailure::Signalled { signal: Some(signal) } => {
                write!(f, "solver killed by signal {signal}")
            }
            RunFailure::Signalled { signal: None } => write!(f, "solver terminated abnormally"),
            RunFailure::ArtifactMissing { path } => {
                write!(f, "solver output missing at {}", path.display())
            }
            RunFailure::Cancelled => write!(f, "cancelled"),
            RunFailure::TimedOut { limit_seconds } => {
                write!(f, "solver exceeded {limit_seconds}s wall limit")
            }
            RunFailure::Fault { error } => write!(f, "{error}"),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Completed { destination: PathBuf },
    Failed { failure: RunFailure },
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed { .. } => "completed",
            RunStatus::Failed { .. } => "failed",
        }
    }
}

/// Outcome of a single sweep point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub params: ParameterSet,
    pub label: String,
    pub run_id: RunId,
    /// Override keys the template had no directive for.
    #[serde(default)]
    pub missing_keys: Vec<String>,
    pub status: RunStatus,
}

impl RunReport {
    pub fn destination(&self) -> Option<&Path> {
        match &self.status {
            RunStatus::Completed { destination } => Some(destination),
            RunStatus::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match &self.status {
            RunStatus::Completed { .. } => None,
            RunStatus::Failed { failure } => Some(failure),
        }
    }
}

/// Sweep-level summary, one entry per point in plan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// SHA-256 of the template the sweep rendered from.
    pub template_hash: String,
    pub runs: Vec<RunReport>,
    pub completed: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn new(template_hash: String, runs: Vec<RunReport>) -> Self {
        let completed = runs.iter().filter(|run| run.status.is_completed()).count();
        let failed = runs.len() - completed;
        Self {
            template_hash,
            runs,
            completed,
            failed,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunReport> + '_ {
        self.runs.iter().filter(|run| !run.status.is_completed())
    }

    pub fn all_completed(&self) -> bool {
        self.failed == 0
    }

    /// Plain-text table listing each point with its status.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let width = self
            .runs
            .iter()
            .map(|run| run.label.len())
            .max()
            .unwrap_or(0)
            .max("point".len());
        let _ = writeln!(out, "{:<width$}  {:<9}  detail", "point", "status");
        for run in &self.runs {
            let detail = match &run.status {
                RunStatus::Completed { destination } => destination.display().to_string(),
                RunStatus::Failed { failure } => format!("{failure} (run {})", run.run_id),
            };
            let _ = writeln!(
                out,
                "{:<width$}  {:<9}  {detail}",
                run.label,
                run.status.as_str()
            );
            if !run.missing_keys.is_empty() {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:<9}  unmatched keys: {}",
                    "",
                    "",
                    run.missing_keys.join(", ")
                );
            }
        }
        let _ = writeln!(
            out,
            "{} completed, {} failed, {} total",
            self.completed,
            self.failed,
            self.runs.len()
        );
        out
    }

    /// Writes `sweep_report.json` and `sweep_report.txt` into `out`.
    pub fn persist(&self, out: &Path) -> Result<PathBuf, CrustError> {
        fs::create_dir_all(out).map_err(|err| CrustError::io("crust_exp.report_dir", out, err))?;
        let json_path = out.join("sweep_report.json");
        let bytes = to_canonical_json_bytes(self)?;
        fs::write(&json_path, bytes)
            .map_err(|err| CrustError::io("crust_exp.report_write", &json_path, err))?;
        let text_path = out.join("sweep_report.txt");
        fs::write(&text_path, self.render_text())
            .map_err(|err| CrustError::io("crust_exp.report_write", &text_path, err))?;
        Ok(json_path)
    }
}
