use std::fmt;
use std::str::FromStr;

use crust_core::errors::{CrustError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::table::ResultTable;

/// Physical quantity stored in a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Index,
    Temperature,
    Flux,
    /// Helium column depth, the key dimension of the envelope grid.
    ColumnDepth,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Index => "index",
            Column::Temperature => "temperature",
            Column::Flux => "flux",
            Column::ColumnDepth => "column_depth",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = CrustError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "index" => Ok(Column::Index),
            "temperature" | "T" => Ok(Column::Temperature),
            "flux" | "F" => Ok(Column::Flux),
            "column_depth" | "depth" | "y" => Ok(Column::ColumnDepth),
            other => Err(CrustError::Query(
                ErrorInfo::new("crust_grid.unknown_column", format!("unknown column `{other}`"))
                    .with_hint("expected index, temperature, flux or column_depth"),
            )),
        }
    }
}

/// Fixed column positions of the two grid files the solver produces.
///
/// The envelope grid stores `index, T, F, y` per row. The per-profile grids
/// (`grid_He4`, `grid_He9`, ...) store `y, T, F` with the column depth leading.
/// Positions are never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridLayout {
    Envelope,
    Profile,
}

impl GridLayout {
    /// Position of `column`, or `None` when the layout does not carry it.
    pub fn position(self, column: Column) -> Option<usize> {
        match (self, column) {
            (GridLayout::Envelope, Column::Index) => Some(0),
            (GridLayout::Envelope, Column::Temperature) => Some(1),
            (GridLayout::Envelope, Column::Flux) => Some(2),
            (GridLayout::Envelope, Column::ColumnDepth) => Some(3),
            (GridLayout::Profile, Column::ColumnDepth) => Some(0),
            (GridLayout::Profile, Column::Temperature) => Some(1),
            (GridLayout::Profile, Column::Flux) => Some(2),
            (GridLayout::Profile, Column::Index) => None,
        }
    }

    pub fn column(self, column: Column) -> Result<usize, CrustError> {
        self.position(column).ok_or_else(|| {
            CrustError::Query(
                ErrorInfo::new("crust_grid.layout_column", "column not present in layout")
                    .with_context("layout", self.as_str())
                    .with_context("column", column.as_str()),
            )
        })
    }

    /// Column a lookup by "key" selects on.
    pub fn key_column(self) -> Column {
        Column::ColumnDepth
    }

    pub fn min_width(self) -> usize {
        match self {
            GridLayout::Envelope => 4,
            GridLayout::Profile => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GridLayout::Envelope => "envelope",
            GridLayout::Profile => "profile",
        }
    }

    /// Checks that a loaded table is wide enough for this layout.
    pub fn validate(self, table: &ResultTable) -> Result<(), CrustError> {
        if table.is_empty() || table.width() >= self.min_width() {
            return Ok(());
        }
        Err(CrustError::Query(
            ErrorInfo::new("crust_grid.layout_width", "table is narrower than its layout")
                .with_context("layout", self.as_str())
                .with_context("width", table.width().to_string())
                .with_context("expected", self.min_width().to_string()),
        ))
    }
}

impl fmt::Display for GridLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridLayout {
    type Err = CrustError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "envelope" | "grid" => Ok(GridLayout::Envelope),
            "profile" => Ok(GridLayout::Profile),
            other => Err(CrustError::Query(ErrorInfo::new(
                "crust_grid.unknown_layout",
                format!("unknown grid layout `{other}`"),
            ))),
        }
    }
}
