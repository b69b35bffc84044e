//! Output formatting module
//!
//! Renders parsed results as text for the `show` command.

mod compare;
mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
