use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use crust_grid::{export_series, Column, Grid, GridLayout};
use tracing::info;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Whitespace-delimited result grid.
    #[arg(long)]
    pub table: PathBuf,
    /// Column layout of the grid: `envelope` or `profile`.
    #[arg(long, default_value = "envelope")]
    pub layout: GridLayout,
    /// Column to filter on; defaults to the layout's column depth.
    #[arg(long)]
    pub key_column: Option<Column>,
    /// Exact key value rows must carry.
    #[arg(long, allow_negative_numbers = true)]
    pub key: f64,
    #[arg(long, default_value = "temperature")]
    pub x: Column,
    #[arg(long, default_value = "flux")]
    pub y: Column,
    /// Output file (`.json` or CSV); prints to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run(args: &ExtractArgs) -> Result<(), Box<dyn Error>> {
    let grid = Grid::load(args.layout, &args.table)?;
    let key_column = args.key_column.unwrap_or_else(|| args.layout.key_column());
    let series = grid.select(key_column, args.key, args.x, args.y)?;
    info!(
        rows = series.len(),
        key_column = %key_column,
        key = args.key,
        "series extracted"
    );
    match &args.out {
        Some(out) => export_series(&series, [args.x.as_str(), args.y.as_str()], out)?,
        None => {
            println!("{}\t{}", args.x, args.y);
            for (x, y) in series.points() {
                println!("{x}\t{y}");
            }
        }
    }
    Ok(())
}
