//! Speech isolation via the external processing engine
//!
//! The engine is a black-box executable invoked as `<binary> <source-file>`.
//! On success it exits with status 0 and prints
//! `Video processed successfully: <output-path>` on standard output.
//!
//! - [`MediaProcessor`]: interface the pipeline depends on
//! - [`CliMediaProcessor`]: runs the real executable
//! - [`parse_success_marker`]: extracts the output path from captured stdout

mod cli;
mod parser;
mod traits;

pub use cli::CliMediaProcessor;
pub use parser::{SUCCESS_MARKER, parse_success_marker};
pub use traits::MediaProcessor;
