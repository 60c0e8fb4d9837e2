//! idstore CLI library
//!
//! This library exposes internal modules for integration testing.
//! The main CLI binary is in main.rs.

pub mod args;
pub mod error;
pub mod logging;
pub mod output;
pub mod provision;

pub use args::Cli;
pub use error::{CliError, CliResult};
