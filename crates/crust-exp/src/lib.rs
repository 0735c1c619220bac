//! Templated configuration synthesis and solver run orchestration for
//! crustcool parameter sweeps.

mod config;
mod hash;
mod ledger;
mod orchestrator;
mod report;
mod scratch;
mod serde;
mod solver;
mod sweep;
mod template;
mod workdir;

pub use config::{ArtifactLayout, SolverSpec, SweepConfig};
pub use hash::stable_hash_string;
pub use ledger::{ledger_append, ledger_query, LedgerQuery, Table};
pub use orchestrator::{run_sweep_config, Orchestrator};
pub use report::{RunFailure, RunReport, RunStatus, SweepReport};
pub use scratch::ScratchGuard;
pub use solver::{CancelToken, Invocation, ProcessSolver, RunLimits, Solver, SolverExit};
pub use sweep::{GridParameter, GridValues, Scheduler, SweepPlan, MAX_PLAN_POINTS};
pub use template::{ConfigTemplate, Rendered, DEFAULT_TEMPLATE};
pub use workdir::mirror_workdir;

pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
