#![deny(missing_docs)]
#![doc = "Shared error, identity, and parameter types for crustcool envelope sweeps."]

pub mod errors;
pub mod identity;
pub mod params;

pub use errors::{CrustError, ErrorInfo};
pub use identity::RunId;
pub use params::{format_value, ParameterSet};
