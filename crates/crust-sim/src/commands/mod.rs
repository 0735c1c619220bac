pub mod extract;
pub mod ledger;
pub mod sweep;
