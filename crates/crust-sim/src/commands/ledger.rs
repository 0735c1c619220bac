use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use crust_exp::{ledger_query, LedgerQuery};

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// CSV ledger written by `crust-sim sweep --ledger`.
    #[arg(long)]
    pub ledger: PathBuf,
    /// Only rows with this status (`completed` or `failed`).
    #[arg(long)]
    pub status: Option<String>,
    /// Only rows for this destination label.
    #[arg(long)]
    pub label: Option<String>,
    /// Stop after this many rows.
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: &LedgerArgs) -> Result<(), Box<dyn Error>> {
    let query = LedgerQuery {
        status: args.status.clone(),
        label: args.label.clone(),
        limit: args.limit,
    };
    let table = ledger_query(&args.ledger, &query)?;
    println!("{}", table.columns.join("\t"));
    for row in &table.rows {
        println!("{}", row.join("\t"));
    }
    Ok(())
}
