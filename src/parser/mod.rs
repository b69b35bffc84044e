//! Results reading and parsing
//!
//! Reads wrk output files and turns them into [`BenchmarkResult`] records.
//!
//! [`BenchmarkResult`]: crate::models::BenchmarkResult

mod input;
mod reader;
mod wrk;

pub use input::{load_results, InputSpec};
