//! Core library for the `ec2auth` CLI.
//!
//! The crate exchanges EC2 access/secret credentials for an identity service
//! token. Requests go through an instrumented transport that retries
//! connection failures and can log redacted request/response traffic; the
//! load harness drives the same client from many concurrent tasks and reports
//! throughput and failure rates once per second.
pub mod args;
pub mod auth;
pub mod config;
pub mod error;
pub mod harness;
pub mod logger;
pub mod transport;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;

#[cfg(test)]
mod test_support;
