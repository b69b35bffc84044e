//! Output formatters for benchmark results
//!
//! Provides table, JSON, CSV and markdown output formats.

use anyhow::{Context, Result};
use serde::Serialize;

use super::compare::BenchmarkComparison;
use crate::models::{as_ms, BenchmarkResult, ResultSet};

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonPretty,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// Flat CSV row
#[derive(Serialize)]
struct CsvRow<'a> {
    label: &'a str,
    target: Option<&'a str>,
    threads: Option<u32>,
    connections: Option<u32>,
    requests_per_second: f64,
    latency_avg_ms: f64,
    latency_stdev_ms: f64,
    latency_max_ms: f64,
    latency_p99_ms: Option<f64>,
    total_requests: Option<u64>,
    transfer_per_second: Option<u64>,
    socket_errors: u64,
    non_2xx_3xx: u64,
}

impl<'a> From<&'a BenchmarkResult> for CsvRow<'a> {
    fn from(result: &'a BenchmarkResult) -> Self {
        Self {
            label: &result.label,
            target: result.target.as_deref(),
            threads: result.threads,
            connections: result.connections,
            requests_per_second: result.requests_per_second,
            latency_avg_ms: as_ms(result.latency.avg),
            latency_stdev_ms: as_ms(result.latency.stdev),
            latency_max_ms: as_ms(result.latency.max),
            latency_p99_ms: result.percentile(99.0).map(as_ms),
            total_requests: result.total_requests,
            transfer_per_second: result.transfer_per_second,
            socket_errors: result.socket_errors.total(),
            non_2xx_3xx: result.non_2xx_3xx,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a set of results
    pub fn format(&self, results: &[BenchmarkResult]) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_table(results)),
            OutputFormat::Json => serde_json::to_string(&ResultSet::new(results.to_vec()))
                .context("Failed to serialize results"),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&ResultSet::new(results.to_vec()))
                    .context("Failed to serialize results")
            }
            OutputFormat::Csv => self.format_csv(results),
            OutputFormat::Markdown => Ok(self.format_markdown(results)),
        }
    }

    fn format_table(&self, results: &[BenchmarkResult]) -> String {
        let comparison = BenchmarkComparison::new(results);
        let mut output = String::new();

        output.push_str(
            "\n┌──────┬────────────────────────┬────────────┬──────────┬──────────┬──────────┬──────────┬──────────┐\n",
        );
        output.push_str(
            "│ Rank │ Label                  │      Req/s │ Avg (ms) │ Max (ms) │ P99 (ms) │   Errors │ Relative │\n",
        );
        output.push_str(
            "├──────┼────────────────────────┼────────────┼──────────┼──────────┼──────────┼──────────┼──────────┤\n",
        );

        for ranked in comparison.by_rps() {
            let r = ranked.result;
            let p99 = r
                .percentile(99.0)
                .map(|d| format!("{:.2}", as_ms(d)))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "│ {:>4} │ {:22} │ {:>10.2} │ {:>8.2} │ {:>8.2} │ {:>8} │ {:>8} │ {:>7.1}% │\n",
                ranked.rank,
                truncate(&r.label, 22),
                r.requests_per_second,
                r.latency_ms(),
                as_ms(r.latency.max),
                p99,
                r.error_count(),
                ranked.relative_rps
            ));
        }

        output.push_str(
            "└──────┴────────────────────────┴────────────┴──────────┴──────────┴──────────┴──────────┴──────────┘\n",
        );

        let by_latency: Vec<String> = comparison
            .by_latency()
            .iter()
            .map(|ranked| {
                format!(
                    "{}. {} ({:.2}ms)",
                    ranked.rank,
                    ranked.result.label,
                    ranked.result.latency_ms()
                )
            })
            .collect();
        output.push_str(&format!("Lowest latency: {}\n", by_latency.join(", ")));
        output
    }

    fn format_csv(&self, results: &[BenchmarkResult]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for result in results {
            writer
                .serialize(CsvRow::from(result))
                .context("Failed to write CSV row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {e}"))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }

    fn format_markdown(&self, results: &[BenchmarkResult]) -> String {
        let comparison = BenchmarkComparison::new(results);
        let mut output = String::new();

        output.push_str("# Benchmark Comparison\n\n");
        output.push_str("## Throughput\n\n");
        output.push_str("| Rank | Label | Req/s | Relative | Errors |\n");
        output.push_str("|------|-------|-------|----------|--------|\n");
        for ranked in comparison.by_rps() {
            output.push_str(&format!(
                "| {} | {} | {:.2} | {:.1}% | {} |\n",
                ranked.rank,
                escape_cell(&ranked.result.label),
                ranked.result.requests_per_second,
                ranked.relative_rps,
                ranked.result.error_count()
            ));
        }

        output.push_str("\n## Latency\n\n");
        output.push_str("| Rank | Label | Avg (ms) | Stdev (ms) | Max (ms) |\n");
        output.push_str("|------|-------|----------|------------|----------|\n");
        for ranked in comparison.by_latency() {
            let latency = &ranked.result.latency;
            output.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} | {:.2} |\n",
                ranked.rank,
                escape_cell(&ranked.result.label),
                as_ms(latency.avg),
                as_ms(latency.stdev),
                as_ms(latency.max)
            ));
        }

        output
    }
}

/// Escape a markdown table cell
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Truncate to `width` characters, marking the cut with `…`
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatencyPercentile, LatencyStats};
    use std::time::Duration;

    fn results() -> Vec<BenchmarkResult> {
        let mut fast = BenchmarkResult::new(
            "least-conn",
            2_000.0,
            LatencyStats::new(
                Duration::from_millis(2),
                Duration::from_millis(1),
                Duration::from_millis(10),
                90.0,
            ),
        );
        fast.latency_distribution.push(LatencyPercentile {
            percentile: 99.0,
            latency: Duration::from_millis(8),
        });
        let slow = BenchmarkResult::new(
            "round-robin",
            1_000.0,
            LatencyStats::new(
                Duration::from_millis(4),
                Duration::from_millis(2),
                Duration::from_millis(20),
                85.0,
            ),
        );
        vec![slow, fast]
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert_eq!(OutputFormat::from_str("md"), Some(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_table_ranks_by_throughput() {
        let output = ResultFormatter::new(OutputFormat::Table)
            .format(&results())
            .unwrap();
        let fast = output.find("least-conn").unwrap();
        let slow = output.find("round-robin").unwrap();
        assert!(fast < slow);
        assert!(output.contains("100.0%"));
        assert!(output.contains("50.0%"));
        assert!(output.contains("8.00"));
        assert!(output.contains("Lowest latency: 1. least-conn (2.00ms), 2. round-robin (4.00ms)"));
    }

    #[test]
    fn test_json_round_trips_as_result_set() {
        let output = ResultFormatter::new(OutputFormat::Json)
            .format(&results())
            .unwrap();
        let set: ResultSet = serde_json::from_str(&output).unwrap();
        assert_eq!(set.results, results());
    }

    #[test]
    fn test_csv_output() {
        let output = ResultFormatter::new(OutputFormat::Csv)
            .format(&results())
            .unwrap();
        let mut lines = output.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("label,target,threads,connections,requests_per_second"));
        assert!(lines.next().unwrap().starts_with("round-robin,,,,1000.0,4.0"));
        assert!(lines.next().unwrap().contains(",8.0,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_markdown_sections() {
        let output = ResultFormatter::new(OutputFormat::Markdown)
            .format(&results())
            .unwrap();
        assert!(output.contains("## Throughput"));
        assert!(output.contains("## Latency"));
        assert!(output.contains("| 1 | least-conn | 2000.00 | 100.0% | 0 |"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut results = results();
        results[0].label = "nginx | v1.25".to_string();
        let output = ResultFormatter::new(OutputFormat::Markdown)
            .format(&results)
            .unwrap();
        assert!(output.contains("| 2 | nginx \\| v1.25 | 1000.00 | 50.0% | 0 |"));
        for line in output.lines().filter(|l| l.starts_with("| 2 ")) {
            assert_eq!(line.matches(" | ").count(), 4);
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
