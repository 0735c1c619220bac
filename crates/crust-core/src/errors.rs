//! Structured error types shared across crustcool crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CrustError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, line numbers, identities, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds the offending filesystem path as context.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for sweep orchestration and grid analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CrustError {
    /// Sweep configuration errors (invalid plan, scheduler, layout).
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Configuration template errors.
    #[error("template error: {0}")]
    Template(ErrorInfo),
    /// Orchestration faults while preparing or executing a solver run.
    #[error("run error: {0}")]
    Run(ErrorInfo),
    /// Malformed result table input.
    #[error("parse error: {0}")]
    Parse(ErrorInfo),
    /// Invalid table query (column out of range, layout mismatch).
    #[error("query error: {0}")]
    Query(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CrustError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CrustError::Config(info)
            | CrustError::Template(info)
            | CrustError::Run(info)
            | CrustError::Parse(info)
            | CrustError::Query(info)
            | CrustError::Io(info)
            | CrustError::Serde(info) => info,
        }
    }

    /// Wraps an [`std::io::Error`] raised while touching `path`.
    pub fn io(code: &str, path: &Path, err: std::io::Error) -> Self {
        CrustError::Io(
            ErrorInfo::new(code, err.to_string())
                .with_path(path)
                .with_context("kind", format!("{:?}", err.kind())),
        )
    }
}
