//! Benchmark comparison charts
//!
//! Renders one bar per result for each selected metric into a single PNG.

mod bar;

pub use bar::render_comparison;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{as_ms, BenchmarkResult};

/// Default output path, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "benchmark_comparison.png";

/// Default chart size in pixels
pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 600;

const MIN_SIZE: u32 = 200;
const MAX_SIZE: u32 = 10_000;

/// Chart errors
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No benchmark results to chart")]
    NoResults,

    #[error("Result '{label}' has no {metric} value")]
    MissingMetric { label: String, metric: Metric },

    #[error("Invalid chart size {width}x{height} (each side must be 200-10000 pixels)")]
    InvalidSize { width: u32, height: u32 },

    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Drawing failed: {0}")]
    Drawing(String),
}

/// A chartable metric
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RequestsPerSecond,
    AvgLatency,
    P99Latency,
    Transfer,
}

impl Metric {
    /// Panel caption
    pub fn title(&self) -> &'static str {
        match self {
            Metric::RequestsPerSecond => "Requests per Second",
            Metric::AvgLatency => "Average Latency",
            Metric::P99Latency => "P99 Latency",
            Metric::Transfer => "Transfer Rate",
        }
    }

    /// Y axis description
    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::RequestsPerSecond => "req/s",
            Metric::AvgLatency | Metric::P99Latency => "ms",
            Metric::Transfer => "MB/s",
        }
    }

    /// Value of this metric for a result, if the run reported it
    pub fn value(&self, result: &BenchmarkResult) -> Option<f64> {
        match self {
            Metric::RequestsPerSecond => Some(result.requests_per_second),
            Metric::AvgLatency => Some(result.latency_ms()),
            Metric::P99Latency => result.percentile(99.0).map(as_ms),
            Metric::Transfer => result
                .transfer_per_second
                .map(|bytes| bytes as f64 / (1024.0 * 1024.0)),
        }
    }

    /// Text printed above a bar
    pub fn format_value(&self, value: f64) -> String {
        match self {
            Metric::RequestsPerSecond => format!("{value:.0}"),
            Metric::AvgLatency | Metric::P99Latency | Metric::Transfer => format!("{value:.2}"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::RequestsPerSecond => "requests/sec",
            Metric::AvgLatency => "average latency",
            Metric::P99Latency => "p99 latency",
            Metric::Transfer => "transfer/sec",
        };
        f.write_str(name)
    }
}

/// Which panels to draw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMetrics {
    Rps,
    Latency,
    P99,
    Transfer,
    /// Requests/sec and average latency side by side
    #[default]
    Both,
    All,
}

impl ChartMetrics {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rps" | "throughput" => Some(Self::Rps),
            "latency" | "avg" => Some(Self::Latency),
            "p99" => Some(Self::P99),
            "transfer" => Some(Self::Transfer),
            "both" => Some(Self::Both),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Metrics drawn, in panel order
    pub fn metrics(&self) -> Vec<Metric> {
        match self {
            Self::Rps => vec![Metric::RequestsPerSecond],
            Self::Latency => vec![Metric::AvgLatency],
            Self::P99 => vec![Metric::P99Latency],
            Self::Transfer => vec![Metric::Transfer],
            Self::Both => vec![Metric::RequestsPerSecond, Metric::AvgLatency],
            Self::All => vec![
                Metric::RequestsPerSecond,
                Metric::AvgLatency,
                Metric::P99Latency,
                Metric::Transfer,
            ],
        }
    }
}

/// Chart rendering options
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub metrics: ChartMetrics,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Benchmark Comparison".to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            metrics: ChartMetrics::default(),
        }
    }
}

impl ChartOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_metrics(mut self, metrics: ChartMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        let valid = |side: u32| (MIN_SIZE..=MAX_SIZE).contains(&side);
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ChartError::InvalidSize {
                width: self.width,
                height: self.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatencyPercentile, LatencyStats};
    use std::time::Duration;

    fn result() -> BenchmarkResult {
        let latency = LatencyStats::new(
            Duration::from_millis(4),
            Duration::from_millis(1),
            Duration::from_millis(20),
            80.0,
        );
        BenchmarkResult::new("ip-hash", 2_500.0, latency)
    }

    #[test]
    fn test_chart_metrics_from_str() {
        assert_eq!(ChartMetrics::from_str("rps"), Some(ChartMetrics::Rps));
        assert_eq!(ChartMetrics::from_str("LATENCY"), Some(ChartMetrics::Latency));
        assert_eq!(ChartMetrics::from_str("all"), Some(ChartMetrics::All));
        assert_eq!(ChartMetrics::from_str("bogus"), None);
    }

    #[test]
    fn test_default_metrics() {
        assert_eq!(
            ChartMetrics::default().metrics(),
            vec![Metric::RequestsPerSecond, Metric::AvgLatency]
        );
        assert_eq!(ChartMetrics::All.metrics().len(), 4);
    }

    #[test]
    fn test_metric_values() {
        let mut result = result();
        assert_eq!(Metric::RequestsPerSecond.value(&result), Some(2_500.0));
        assert_eq!(Metric::AvgLatency.value(&result), Some(4.0));
        assert_eq!(Metric::P99Latency.value(&result), None);
        assert_eq!(Metric::Transfer.value(&result), None);

        result.latency_distribution.push(LatencyPercentile {
            percentile: 99.0,
            latency: Duration::from_micros(12_500),
        });
        result.transfer_per_second = Some(3 * 1024 * 1024);
        assert_eq!(Metric::P99Latency.value(&result), Some(12.5));
        assert_eq!(Metric::Transfer.value(&result), Some(3.0));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(Metric::RequestsPerSecond.format_value(1234.56), "1235");
        assert_eq!(Metric::AvgLatency.format_value(1.234), "1.23");
    }

    #[test]
    fn test_options_validate() {
        assert!(ChartOptions::default().validate().is_ok());
        assert!(matches!(
            ChartOptions::default().with_size(0, 600).validate(),
            Err(ChartError::InvalidSize { width: 0, .. })
        ));
        assert!(ChartOptions::default()
            .with_size(1000, 50_000)
            .validate()
            .is_err());
    }
}
