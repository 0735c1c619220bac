use std::fs;
use std::path::Path;

use crust_core::errors::{CrustError, ErrorInfo};

/// Immutable numeric grid with a constant column count.
///
/// Rows are stored contiguously; [`ResultTable::row`] and
/// [`ResultTable::rows`] hand out borrowed slices so queries never copy the
/// underlying data. A table with no rows has width zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    width: usize,
    values: Vec<f64>,
}

fn parse_error(code: &str, message: impl Into<String>, line: usize) -> CrustError {
    CrustError::Parse(ErrorInfo::new(code, message).with_context("line", line.to_string()))
}

impl ResultTable {
    /// Loads a whitespace-delimited numeric file with no header.
    ///
    /// Blank lines and `#` comment lines are skipped. The whole file must parse:
    /// a malformed token or a row whose arity differs from the first row fails
    /// the load and no partial table is returned.
    pub fn load(path: &Path) -> Result<Self, CrustError> {
        let text = fs::read_to_string(path)
            .map_err(|err| CrustError::io("crust_grid.table_read", path, err))?;
        Self::parse(&text).map_err(|err| match err {
            CrustError::Parse(info) => CrustError::Parse(info.with_path(path)),
            other => other,
        })
    }

    /// Parses table text; see [`ResultTable::load`] for the format.
    pub fn parse(text: &str) -> Result<Self, CrustError> {
        let mut width: Option<usize> = None;
        let mut values = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let start = values.len();
            for token in trimmed.split_whitespace() {
                let value: f64 = token.parse().map_err(|_| {
                    parse_error(
                        "crust_grid.parse_number",
                        format!("token `{token}` is not a number"),
                        line_no,
                    )
                })?;
                values.push(value);
            }
            let arity = values.len() - start;
            match width {
                None => width = Some(arity),
                Some(expected) if expected != arity => {
                    return Err(CrustError::Parse(
                        ErrorInfo::new(
                            "crust_grid.ragged_row",
                            format!("row has {arity} columns, expected {expected}"),
                        )
                        .with_context("line", line_no.to_string())
                        .with_context("expected", expected.to_string())
                        .with_context("found", arity.to_string()),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            width: width.unwrap_or(0),
            values,
        })
    }

    /// Builds a table from in-memory rows, enforcing a constant width.
    pub fn from_rows<I, R>(rows: I) -> Result<Self, CrustError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[f64]>,
    {
        let mut width: Option<usize> = None;
        let mut values = Vec::new();
        for (idx, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            match width {
                None => width = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(CrustError::Parse(
                        ErrorInfo::new(
                            "crust_grid.ragged_row",
                            format!("row has {} columns, expected {expected}", row.len()),
                        )
                        .with_context("row", idx.to_string()),
                    ));
                }
                Some(_) => {}
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            width: width.unwrap_or(0),
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        if self.width == 0 {
            return None;
        }
        let start = idx.checked_mul(self.width)?;
        self.values.get(start..start.checked_add(self.width)?)
    }

    /// Rows in file order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.width.max(1))
    }

    /// Copies one column out in row order.
    pub fn column(&self, column: usize) -> Result<Vec<f64>, CrustError> {
        self.check_column(column)?;
        Ok(self.rows().map(|row| row[column]).collect())
    }

    /// Fails when `column` is outside a non-empty table. Any column of an
    /// empty table is accepted since there is nothing to address.
    pub fn check_column(&self, column: usize) -> Result<(), CrustError> {
        if self.is_empty() || column < self.width {
            return Ok(());
        }
        Err(CrustError::Query(
            ErrorInfo::new("crust_grid.column_range", "column index outside table")
                .with_context("column", column.to_string())
                .with_context("width", self.width.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tabs_and_spaces() {
        let table = ResultTable::parse("1\t10 17  4\n2 12\t18 4\n\n# trailer\n3 14 17 5\n")
            .expect("table");
        assert_eq!(table.width(), 4);
        assert_eq!(table.len(), 3);
        assert_eq!(table.row(1), Some(&[2.0, 12.0, 18.0, 4.0][..]));
        assert_eq!(table.row(3), None);
        assert_eq!(table.column(2).expect("flux"), [17.0, 18.0, 17.0]);
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let table = ResultTable::parse("1 6.3e7 1.2E+18 1e-3\n").expect("table");
        assert_eq!(table.row(0), Some(&[1.0, 6.3e7, 1.2e18, 1e-3][..]));
    }

    #[test]
    fn bad_token_reports_line_number() {
        let err = ResultTable::parse("1 2 3\n\n4 x 6\n").expect_err("bad token");
        assert_eq!(err.info().code, "crust_grid.parse_number");
        assert_eq!(err.info().context["line"], "3");
    }

    #[test]
    fn ragged_row_reports_line_number() {
        let err = ResultTable::parse("1 2 3\n4 5 6\n7 8\n").expect_err("ragged");
        assert_eq!(err.info().code, "crust_grid.ragged_row");
        assert_eq!(err.info().context["line"], "3");
        assert_eq!(err.info().context["found"], "2");
    }

    #[test]
    fn empty_input_is_an_empty_table() {
        let table = ResultTable::parse("\n# nothing yet\n").expect("empty");
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
        assert_eq!(table.rows().count(), 0);
        assert!(table.check_column(7).is_ok());
    }

    #[test]
    fn column_outside_width_is_rejected() {
        let table = ResultTable::from_rows([[1.0, 2.0]]).expect("table");
        let err = table.column(2).expect_err("range");
        assert_eq!(err.info().code, "crust_grid.column_range");
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows: Vec<Vec<f64>> = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(ResultTable::from_rows(rows).is_err());
    }
}
