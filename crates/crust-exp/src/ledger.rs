use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::Path;

use crust_core::errors::{CrustError, ErrorInfo};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::report::{RunStatus, SweepReport};

const COLUMNS: [&str; 8] = [
    "template_hash",
    "label",
    "run_id",
    "status",
    "exit_code",
    "destination",
    "reason",
    "params",
];

/// Query descriptor for ledger lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LedgerQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Table representation returned from ledger queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Appends one CSV row per run in `report`, writing the header on first use.
pub fn ledger_append(path: &Path, report: &SweepReport) -> Result<(), CrustError> {
    ensure_parent(path)?;
    let file_exists = path.exists();
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            CrustError::Io(
                ErrorInfo::new("crust_exp.ledger_open", "failed to open CSV ledger")
                    .with_path(path)
                    .with_hint(err.to_string()),
            )
        })?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    if !file_exists {
        writer
            .write_record(COLUMNS)
            .map_err(|err| wrap_csv("crust_exp.ledger_header", err))?;
    }
    for run in &report.runs {
        let (exit_code, destination, reason) = match &run.status {
            RunStatus::Completed { destination } => {
                (String::new(), destination.display().to_string(), String::new())
            }
            RunStatus::Failed { failure } => (
                failure.exit_code().map(|code| code.to_string()).unwrap_or_default(),
                String::new(),
                failure.to_string(),
            ),
        };
        let record = [
            report.template_hash.clone(),
            run.label.clone(),
            run.run_id.to_string(),
            run.status.as_str().to_string(),
            exit_code,
            destination,
            reason,
            params_cell(&run.params)?,
        ];
        writer
            .write_record(&record)
            .map_err(|err| wrap_csv("crust_exp.ledger_row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("crust_exp.ledger_flush", err.into()))?;
    Ok(())
}

/// Reads ledger rows matching `query`, oldest first. A missing ledger is empty.
pub fn ledger_query(path: &Path, query: &LedgerQuery) -> Result<Table, CrustError> {
    if !path.exists() {
        return Ok(empty_table());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("crust_exp.ledger_read", err))?;
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|err| wrap_csv("crust_exp.ledger_record", err))?;
        if let Some(status) = &query.status {
            if record.get(3) != Some(status.as_str()) {
                continue;
            }
        }
        if let Some(label) = &query.label {
            if record.get(1) != Some(label.as_str()) {
                continue;
            }
        }
        rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        if let Some(limit) = query.limit {
            if rows.len() >= limit {
                break;
            }
        }
    }
    Ok(Table {
        columns: table_columns(),
        rows,
    })
}

/// Compact JSON with sorted keys, one line per CSV cell.
fn params_cell<T: Serialize>(value: &T) -> Result<String, CrustError> {
    serde_json::to_value(value)
        .and_then(|value| serde_json::to_string(&value))
        .map_err(|err| {
            CrustError::Serde(ErrorInfo::new("crust_exp.ledger_params", err.to_string()))
        })
}

fn ensure_parent(path: &Path) -> Result<(), CrustError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| CrustError::io("crust_exp.ledger_dir", parent, err))?
    }
    Ok(())
}

fn table_columns() -> Vec<String> {
    COLUMNS.iter().map(|column| column.to_string()).collect()
}

fn empty_table() -> Table {
    Table {
        columns: table_columns(),
        rows: Vec::new(),
    }
}

fn wrap_csv(code: &str, err: csv::Error) -> CrustError {
    CrustError::Io(ErrorInfo::new(code, "CSV ledger failure").with_hint(err.to_string()))
}
