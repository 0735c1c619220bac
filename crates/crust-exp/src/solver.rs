use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crust_core::errors::{CrustError, ErrorInfo};
use crust_core::RunId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Resource limits applied to a single solver invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunLimits {
    /// Wall-clock cap in seconds; `None` waits indefinitely.
    #[serde(default)]
    pub wall_seconds: Option<u64>,
}

impl RunLimits {
    pub fn unlimited() -> Self {
        Self { wall_seconds: None }
    }

    pub fn wall_limit(&self) -> Option<Duration> {
        self.wall_seconds.map(Duration::from_secs)
    }
}

/// Shared cancellation flag. Cancelling kills in-flight solver processes and
/// prevents pending sweep points from starting.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Everything a solver needs to execute one run.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub run_id: &'a RunId,
    /// Working directory the solver runs in; its output lands relative to it.
    pub workdir: &'a Path,
    /// Scratch configuration written for this run.
    pub config_path: &'a Path,
}

/// How a solver invocation terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolverExit {
    Exited { code: i32 },
    Signalled { signal: Option<i32> },
    Cancelled,
    TimedOut { limit_seconds: u64 },
}

/// External solver seam. The orchestrator only depends on this trait so tests
/// and alternative launchers can stand in for the real binary.
pub trait Solver: Send + Sync {
    /// Runs the solver to completion, blocking the calling thread.
    fn invoke(
        &self,
        invocation: &Invocation<'_>,
        cancel: &CancelToken,
    ) -> Result<SolverExit, CrustError>;
}

impl<S: Solver + ?Sized> Solver for Arc<S> {
    fn invoke(
        &self,
        invocation: &Invocation<'_>,
        cancel: &CancelToken,
    ) -> Result<SolverExit, CrustError> {
        (**self).invoke(invocation, cancel)
    }
}

/// Launches the solver binary as a child process with argv
/// `[run_id, mode_flag]`.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: PathBuf,
    mode_flag: String,
    limits: RunLimits,
    poll_interval: Duration,
}

impl ProcessSolver {
    pub fn new(program: impl Into<PathBuf>, mode_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            mode_flag: mode_flag.into(),
            limits: RunLimits::unlimited(),
            poll_interval: Duration::from_millis(25),
        }
    }

    /// Resolves a relative program path containing a separator against
    /// `base`, so the solver can still be found from an isolated working
    /// directory. Bare names are left for `PATH` lookup.
    pub fn resolved(program: &Path, base: &Path, mode_flag: impl Into<String>) -> Self {
        let program = if program.is_absolute() || program.components().count() <= 1 {
            program.to_path_buf()
        } else {
            let candidate = base.join(program);
            fs::canonicalize(&candidate).unwrap_or(candidate)
        };
        Self::new(program, mode_flag)
    }

    pub fn with_limits(mut self, limits: RunLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn spawn(&self, invocation: &Invocation<'_>) -> Result<Child, CrustError> {
        debug!(
            program = %self.program.display(),
            workdir = %invocation.workdir.display(),
            "spawning solver"
        );
        let mut command = Command::new(&self.program);
        command
            .arg(invocation.run_id.as_str())
            .arg(&self.mode_flag)
            .current_dir(invocation.workdir)
            .stdin(Stdio::null());
        own_process_group(&mut command);
        command
            .spawn()
            .map_err(|err| {
                CrustError::Run(
                    ErrorInfo::new("crust_exp.solver_spawn", err.to_string())
                        .with_path(&self.program)
                        .with_context("run_id", invocation.run_id.as_str())
                        .with_hint("check `solver.binary` and `solver.workdir`"),
                )
            })
    }
}

impl Solver for ProcessSolver {
    fn invoke(
        &self,
        invocation: &Invocation<'_>,
        cancel: &CancelToken,
    ) -> Result<SolverExit, CrustError> {
        let mut child = self.spawn(invocation)?;
        let started = Instant::now();
        loop {
            let polled = child.try_wait().map_err(|err| {
                CrustError::Run(
                    ErrorInfo::new("crust_exp.solver_wait", err.to_string())
                        .with_context("run_id", invocation.run_id.as_str()),
                )
            })?;
            if let Some(status) = polled {
                return Ok(classify(status));
            }
            if cancel.is_cancelled() {
                terminate(&mut child, invocation.run_id);
                return Ok(SolverExit::Cancelled);
            }
            if let Some(limit) = self.limits.wall_limit() {
                if started.elapsed() >= limit {
                    terminate(&mut child, invocation.run_id);
                    return Ok(SolverExit::TimedOut {
                        limit_seconds: limit.as_secs(),
                    });
                }
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Starts the solver as the leader of a new process group so a wrapper
/// script and everything it forks can be killed together.
#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

/// Sends SIGKILL to the whole group led by `child`.
#[cfg(unix)]
fn kill_group(child: &Child, run_id: &RunId) {
    let group = format!("-{}", child.id());
    match Command::new("kill")
        .args(["-s", "KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) if status.success() => {}
        Ok(status) => debug!(run_id = %run_id, status = %status, "process group kill refused"),
        Err(err) => warn!(run_id = %run_id, error = %err, "failed to signal solver process group"),
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child, _run_id: &RunId) {}

fn terminate(child: &mut Child, run_id: &RunId) {
    kill_group(child, run_id);
    if let Err(err) = child.kill() {
        warn!(run_id = %run_id, error = %err, "failed to kill solver process");
    }
    if let Err(err) = child.wait() {
        warn!(run_id = %run_id, error = %err, "failed to reap solver process");
    }
}

fn classify(status: ExitStatus) -> SolverExit {
    match status.code() {
        Some(code) => SolverExit::Exited { code },
        None => SolverExit::Signalled {
            signal: exit_signal(&status),
        },
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
