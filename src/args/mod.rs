//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;


pub use cli::AuthArgs;

pub(crate) use parsers::{parse_duration, parse_header};
