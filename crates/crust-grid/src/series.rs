use std::path::Path;

use crust_core::errors::CrustError;
use serde::{Deserialize, Serialize};

use crate::layout::{Column, GridLayout};
use crate::query::TableQuery;
use crate::table::ResultTable;

/// Two aligned sequences extracted from a table, ready for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// A result table paired with the layout that names its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    layout: GridLayout,
    table: ResultTable,
}

impl Grid {
    pub fn new(layout: GridLayout, table: ResultTable) -> Result<Self, CrustError> {
        layout.validate(&table)?;
        Ok(Self { layout, table })
    }

    pub fn load(layout: GridLayout, path: &Path) -> Result<Self, CrustError> {
        Self::new(layout, ResultTable::load(path)?)
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn table(&self) -> &ResultTable {
        &self.table
    }

    pub fn query(&self) -> TableQuery<'_> {
        TableQuery::new(&self.table)
    }

    /// Row positions whose flux equals `flux`.
    pub fn rows_at_flux(&self, flux: f64) -> Result<Vec<usize>, CrustError> {
        let column = self.layout.column(Column::Flux)?;
        self.query().eq(column, flux).indices()
    }

    /// Temperatures of the rows at `flux`, in table order.
    pub fn temperatures_at_flux(&self, flux: f64) -> Result<Vec<f64>, CrustError> {
        let flux_column = self.layout.column(Column::Flux)?;
        let temperature = self.layout.column(Column::Temperature)?;
        self.query().eq(flux_column, flux).column(temperature)
    }

    /// Temperature (x) and flux (y) along one column depth.
    pub fn temperature_flux_at(&self, depth: f64) -> Result<Series, CrustError> {
        self.select(self.layout.key_column(), depth, Column::Temperature, Column::Flux)
    }

    /// Generic named projection under a single equality filter.
    pub fn select(
        &self,
        key: Column,
        value: f64,
        x: Column,
        y: Column,
    ) -> Result<Series, CrustError> {
        self.query()
            .eq(self.layout.column(key)?, value)
            .pair(self.layout.column(x)?, self.layout.column(y)?)
    }
}
