//! Sweep point parameters and numeric formatting.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One sweep point: an ordered mapping from parameter name to value.
///
/// Insertion order is preserved; it decides the order in which overrides are
/// applied and how multi-parameter destination labels are spelled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: IndexMap<String, f64>,
}

impl ParameterSet {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insertion.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a parameter, keeping its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Number of parameters in the set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the set carries no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Label used to key destination artifacts.
    ///
    /// A single parameter is labelled by its value alone (`6`), several
    /// parameters by `name-value` pairs joined with `_` (`yHe-6_mass-1.4`).
    pub fn label(&self) -> String {
        match self.values.len() {
            0 => "base".to_string(),
            1 => self.iter().map(|(_, value)| format_value(value)).collect(),
            _ => self
                .iter()
                .map(|(name, value)| format!("{name}-{}", format_value(value)))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Formats a value with its shortest round-trip representation.
///
/// Integral values drop the fractional part (`9`, not `9.0`). Magnitudes outside
/// `[1e-5, 1e16)` switch to exponent form (`1.5e-7`) so the output never
/// carries padding zeros.
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude.is_finite() && !(1e-5..1e16).contains(&magnitude) {
        format!("{value:e}")
    } else {
        format!("{value}")
    }
}
