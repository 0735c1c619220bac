use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crust_core::errors::{CrustError, ErrorInfo};
use crust_core::{format_value, ParameterSet};

/// Baseline crustcool `init.dat` used when a sweep names no template file.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/init.dat");

#[derive(Debug, Clone, PartialEq)]
struct TemplateLine {
    key: Option<String>,
    raw: String,
}

impl TemplateLine {
    fn terminator(&self) -> &str {
        if self.raw.ends_with("\r\n") {
            "\r\n"
        } else if self.raw.ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }
}

/// Line-indexed configuration document.
///
/// The template is parsed once into ordered `(key, raw line)` entries plus a
/// lookup from directive key to line position. Rendering rewrites lines by
/// position, so every untouched line is emitted byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTemplate {
    lines: Vec<TemplateLine>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

/// Output of [`ConfigTemplate::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The rewritten document.
    pub text: String,
    /// Override keys with no matching directive line, in override order.
    pub missing: Vec<String>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl ConfigTemplate {
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut index = HashMap::new();
        let mut duplicates = Vec::new();
        for (pos, raw) in text.split_inclusive('\n').enumerate() {
            let key = directive_key(raw).map(str::to_string);
            if let Some(key) = &key {
                if index.contains_key(key) {
                    duplicates.push(key.clone());
                } else {
                    index.insert(key.clone(), pos);
                }
            }
            lines.push(TemplateLine {
                key,
                raw: raw.to_string(),
            });
        }
        Self {
            lines,
            index,
            duplicates,
        }
    }

    /// Reads and parses a template from disk.
    pub fn load(path: &Path) -> Result<Self, CrustError> {
        let text = fs::read_to_string(path).map_err(|err| {
            CrustError::Template(
                ErrorInfo::new("crust_exp.template_read", err.to_string())
                    .with_path(path)
                    .with_hint("point `template` at a readable crustcool init file"),
            )
        })?;
        Ok(Self::parse(&text))
    }

    /// Built-in crustcool template.
    pub fn crustcool_default() -> Self {
        Self::parse(DEFAULT_TEMPLATE)
    }

    /// Directive keys in document order (first occurrences only).
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(pos, line)| {
                let key = line.key.as_deref()?;
                (self.index.get(key) == Some(&pos)).then_some(key)
            })
    }

    /// Position of the line carrying directive `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Keys that appear on more than one directive line. Only the first
    /// occurrence is ever rewritten.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Original template text.
    pub fn source(&self) -> String {
        self.lines.iter().map(|line| line.raw.as_str()).collect()
    }

    /// Rewrites each override's directive line to `key<TAB>value`.
    ///
    /// Keys without a directive are not inserted; they come back in
    /// [`Rendered::missing`] for the caller to surface.
    pub fn render(&self, overrides: &ParameterSet) -> Rendered {
        let mut replacements: Vec<Option<String>> = vec![None; self.lines.len()];
        let mut missing = Vec::new();
        for (key, value) in overrides.iter() {
            match self.index.get(key) {
                Some(&pos) => replacements[pos] = Some(format!("{key}\t{}", format_value(value))),
                None => missing.push(key.to_string()),
            }
        }
        let mut text = String::new();
        for (line, replacement) in self.lines.iter().zip(replacements) {
            match replacement {
                Some(body) => {
                    text.push_str(&body);
                    text.push_str(line.terminator());
                }
                None => text.push_str(&line.raw),
            }
        }
        Rendered { text, missing }
    }
}

/// First whitespace-delimited token of a directive line. Comments and blank
/// lines have no key.
fn directive_key(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    trimmed.split_whitespace().next()
}
