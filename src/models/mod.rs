//! Data models for benchmark comparison
//!
//! This module contains the result records shared by the parser, the chart
//! renderer and the report formatter.

mod result;

pub use result::{
    as_ms, BenchmarkResult, LatencyPercentile, LatencyStats, ResultSet, SocketErrors, ThreadStats,
};
