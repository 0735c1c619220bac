//! Loading and querying of crustcool result grids.

pub mod export;
pub mod layout;
pub mod query;
pub mod series;
pub mod table;

pub use export::{export_series, export_series_csv, export_series_json};
pub use layout::{Column, GridLayout};
pub use query::{filter_eq, project_pair, TableQuery};
pub use series::{Grid, Series};
pub use table::ResultTable;
