//! Benchmark result models
//!
//! One `BenchmarkResult` per wrk run. Durations serialize as floating-point
//! milliseconds so printed JSON can be read back as chart input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Latency statistics from the wrk "Thread Stats" table
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Average latency
    #[serde(rename = "avg_ms", with = "duration_ms")]
    pub avg: Duration,
    /// Standard deviation
    #[serde(rename = "stdev_ms", with = "duration_ms")]
    pub stdev: Duration,
    /// Maximum latency
    #[serde(rename = "max_ms", with = "duration_ms")]
    pub max: Duration,
    /// Share of samples within one stdev (percent)
    pub within_stdev: f64,
}

impl LatencyStats {
    pub fn new(avg: Duration, stdev: Duration, max: Duration, within_stdev: f64) -> Self {
        Self {
            avg,
            stdev,
            max,
            within_stdev,
        }
    }

    /// Format as summary string
    pub fn format_summary(&self) -> String {
        format!(
            "avg={:.2}ms stdev={:.2}ms max={:.2}ms +/-stdev={:.2}%",
            as_ms(self.avg),
            as_ms(self.stdev),
            as_ms(self.max),
            self.within_stdev
        )
    }
}

/// Per-thread request rate from the "Req/Sec" row
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadStats {
    pub avg: f64,
    pub stdev: f64,
    pub max: f64,
    pub within_stdev: f64,
}

/// A single "Latency Distribution" entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentile {
    /// Percentile (e.g. 99.0)
    pub percentile: f64,
    /// Latency at that percentile
    #[serde(rename = "latency_ms", with = "duration_ms")]
    pub latency: Duration,
}

/// Socket-level errors reported by wrk
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketErrors {
    pub connect: u64,
    pub read: u64,
    pub write: u64,
    pub timeout: u64,
}

impl SocketErrors {
    /// Total error count
    pub fn total(&self) -> u64 {
        self.connect
            .saturating_add(self.read)
            .saturating_add(self.write)
            .saturating_add(self.timeout)
    }
}

/// Result of one wrk run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Label shown on the chart (algorithm, server, build...)
    pub label: String,

    /// Target URL from the "Running ... test @" header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Configured test duration
    #[serde(
        default,
        rename = "test_duration_ms",
        skip_serializing_if = "Option::is_none",
        with = "option_duration_ms"
    )]
    pub test_duration: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<u32>,

    /// Aggregate requests per second
    pub requests_per_second: f64,

    /// Latency statistics
    pub latency: LatencyStats,

    /// Per-thread request rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_requests: Option<ThreadStats>,

    /// Latency percentiles, in the order wrk printed them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub latency_distribution: Vec<LatencyPercentile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_requests: Option<u64>,

    /// Measured run time from the "N requests in ..." line
    #[serde(
        default,
        rename = "elapsed_ms",
        skip_serializing_if = "Option::is_none",
        with = "option_duration_ms"
    )]
    pub elapsed: Option<Duration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_read: Option<u64>,

    /// Transfer rate in bytes per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_per_second: Option<u64>,

    #[serde(default)]
    pub socket_errors: SocketErrors,

    /// Responses outside 2xx/3xx
    #[serde(default)]
    pub non_2xx_3xx: u64,
}

impl BenchmarkResult {
    /// Create a result with the mandatory fields only
    pub fn new(label: impl Into<String>, requests_per_second: f64, latency: LatencyStats) -> Self {
        Self {
            label: label.into(),
            target: None,
            test_duration: None,
            threads: None,
            connections: None,
            requests_per_second,
            latency,
            thread_requests: None,
            latency_distribution: Vec::new(),
            total_requests: None,
            elapsed: None,
            bytes_read: None,
            transfer_per_second: None,
            socket_errors: SocketErrors::default(),
            non_2xx_3xx: 0,
        }
    }

    /// Replace the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Average latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        as_ms(self.latency.avg)
    }

    /// Look up a latency percentile, if wrk ran with `--latency`
    pub fn percentile(&self, target: f64) -> Option<Duration> {
        self.latency_distribution
            .iter()
            .find(|entry| (entry.percentile - target).abs() < 0.0001)
            .map(|entry| entry.latency)
    }

    /// Socket errors plus non-2xx/3xx responses
    pub fn error_count(&self) -> u64 {
        self.socket_errors.total().saturating_add(self.non_2xx_3xx)
    }

    /// Check the record invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("label must not be empty".to_string());
        }
        if !self.requests_per_second.is_finite() || self.requests_per_second < 0.0 {
            return Err(format!(
                "{}: requests_per_second must be a non-negative number, got {}",
                self.label, self.requests_per_second
            ));
        }
        Ok(())
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} req/s, {:.2}ms avg latency",
            self.label,
            self.requests_per_second,
            self.latency_ms()
        )
    }
}

/// A set of results as printed by `show --format json`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultSet {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<BenchmarkResult>,
}

impl ResultSet {
    pub fn new(results: Vec<BenchmarkResult>) -> Self {
        Self {
            generated_at: Utc::now(),
            results,
        }
    }
}

/// Duration as fractional milliseconds
pub fn as_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

fn from_ms(ms: f64) -> Option<Duration> {
    if ms.is_finite() && ms >= 0.0 {
        Some(Duration::from_nanos((ms * 1_000_000.0).round() as u64))
    } else {
        None
    }
}

mod duration_ms {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::as_ms(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        super::from_ms(ms).ok_or_else(|| D::Error::custom(format!("invalid duration: {ms}ms")))
    }
}

mod option_duration_ms {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&super::as_ms(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            Some(ms) => super::from_ms(ms)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid duration: {ms}ms"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BenchmarkResult {
        let latency = LatencyStats::new(
            Duration::from_micros(2_500),
            Duration::from_micros(800),
            Duration::from_millis(40),
            87.5,
        );
        BenchmarkResult::new("round-robin", 12_000.0, latency)
    }

    #[test]
    fn test_latency_ms() {
        assert!((sample().latency_ms() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_lookup() {
        let mut result = sample();
        result.latency_distribution = vec![
            LatencyPercentile {
                percentile: 50.0,
                latency: Duration::from_millis(2),
            },
            LatencyPercentile {
                percentile: 99.0,
                latency: Duration::from_millis(9),
            },
        ];

        assert_eq!(result.percentile(99.0), Some(Duration::from_millis(9)));
        assert_eq!(result.percentile(90.0), None);
    }

    #[test]
    fn test_error_count() {
        let mut result = sample();
        result.socket_errors = SocketErrors {
            connect: 1,
            read: 2,
            write: 0,
            timeout: 3,
        };
        result.non_2xx_3xx = 4;
        assert_eq!(result.error_count(), 10);
    }

    #[test]
    fn test_error_count_saturates() {
        let mut result = sample();
        result.socket_errors = SocketErrors {
            connect: u64::MAX,
            read: 1,
            write: 0,
            timeout: 0,
        };
        result.non_2xx_3xx = u64::MAX;
        assert_eq!(result.socket_errors.total(), u64::MAX);
        assert_eq!(result.error_count(), u64::MAX);
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());
        assert!(sample().with_label("  ").validate().is_err());

        let mut negative = sample();
        negative.requests_per_second = -1.0;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_json_uses_milliseconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["latency"]["avg_ms"], 2.5);
        assert_eq!(json["latency"]["max_ms"], 40.0);
        assert!(json.get("target").is_none());
        assert!(json.get("latency_distribution").is_none());
    }

    #[test]
    fn test_json_rejects_negative_duration() {
        let json = r#"{
            "label": "x",
            "requests_per_second": 1.0,
            "latency": {"avg_ms": -1.0, "stdev_ms": 0.0, "max_ms": 0.0, "within_stdev": 0.0}
        }"#;
        assert!(serde_json::from_str::<BenchmarkResult>(json).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "round-robin: 12000.00 req/s, 2.50ms avg latency"
        );
    }
}
