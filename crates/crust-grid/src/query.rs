use crust_core::errors::CrustError;

use crate::series::Series;
use crate::table::ResultTable;

/// Conjunction of exact-equality filters over a borrowed [`ResultTable`].
///
/// Matching uses `==` on `f64`. That is only meaningful because the key
/// columns of solver grids hold values drawn from a small enumerated domain
/// (the sweep points themselves), written and parsed through the same decimal
/// representation. Keys computed by arithmetic, such as `0.1 * 3.0`, will not
/// match a stored `0.3`; look those up by the literal the grid was generated
/// from. `NaN` never matches anything.
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    table: &'a ResultTable,
    filters: Vec<(usize, f64)>,
}

impl<'a> TableQuery<'a> {
    pub fn new(table: &'a ResultTable) -> Self {
        Self {
            table,
            filters: Vec::new(),
        }
    }

    /// Adds the condition `row[column] == value`.
    pub fn eq(mut self, column: usize, value: f64) -> Self {
        self.filters.push((column, value));
        self
    }

    fn check(&self, extra: &[usize]) -> Result<(), CrustError> {
        for column in self.filters.iter().map(|(column, _)| *column).chain(extra.iter().copied()) {
            self.table.check_column(column)?;
        }
        Ok(())
    }

    fn matches(&self, row: &[f64]) -> bool {
        self.filters.iter().all(|(column, value)| row[*column] == *value)
    }

    /// Positions of matching rows, ascending.
    pub fn indices(&self) -> Result<Vec<usize>, CrustError> {
        self.check(&[])?;
        Ok(self
            .table
            .rows()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(idx, _)| idx)
            .collect())
    }

    /// Matching rows in table order. No match yields an empty vector.
    pub fn rows(&self) -> Result<Vec<&'a [f64]>, CrustError> {
        self.check(&[])?;
        let table = self.table;
        Ok(table.rows().filter(|row| self.matches(row)).collect())
    }

    /// One column of the matching rows.
    pub fn column(&self, column: usize) -> Result<Vec<f64>, CrustError> {
        self.check(&[column])?;
        Ok(self
            .table
            .rows()
            .filter(|row| self.matches(row))
            .map(|row| row[column])
            .collect())
    }

    /// Two columns of the matching rows, positionally aligned.
    pub fn pair(&self, x: usize, y: usize) -> Result<Series, CrustError> {
        self.check(&[x, y])?;
        let mut series = Series::default();
        for row in self.table.rows().filter(|row| self.matches(row)) {
            series.push(row[x], row[y]);
        }
        Ok(series)
    }
}

/// Rows whose `column` equals `value` exactly, in table order.
pub fn filter_eq(table: &ResultTable, column: usize, value: f64) -> Result<Vec<&[f64]>, CrustError> {
    TableQuery::new(table).eq(column, value).rows()
}

/// Filters on `key_column == key` and projects `x` and `y` from the survivors.
pub fn project_pair(
    table: &ResultTable,
    key_column: usize,
    key: f64,
    x: usize,
    y: usize,
) -> Result<Series, CrustError> {
    TableQuery::new(table).eq(key_column, key).pair(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultTable {
        ResultTable::from_rows([
            [1.0, 10.0, 17.0, 4.0],
            [2.0, 12.0, 18.0, 4.0],
            [3.0, 14.0, 17.0, 5.0],
        ])
        .expect("table")
    }

    #[test]
    fn conjunction_narrows_matches() {
        let table = sample();
        let query = TableQuery::new(&table).eq(2, 17.0).eq(3, 4.0);
        assert_eq!(query.indices().expect("indices"), [0]);
        assert_eq!(query.column(1).expect("T"), [10.0]);
    }

    #[test]
    fn nan_key_matches_nothing() {
        let table = ResultTable::from_rows([[f64::NAN, 1.0]]).expect("table");
        assert!(filter_eq(&table, 0, f64::NAN).expect("query").is_empty());
    }

    #[test]
    fn filter_column_is_range_checked() {
        let table = sample();
        let err = TableQuery::new(&table).eq(4, 1.0).rows().expect_err("range");
        assert_eq!(err.info().code, "crust_grid.column_range");
        assert!(project_pair(&table, 3, 4.0, 1, 9).is_err());
    }
}
