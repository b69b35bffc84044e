//! Ranking of benchmark results

use std::cmp::Ordering;

use crate::models::BenchmarkResult;

/// A result with its position in a ranking
#[derive(Clone, Debug, PartialEq)]
pub struct RankedResult<'a> {
    /// Rank (1 = best)
    pub rank: usize,
    pub result: &'a BenchmarkResult,
    /// Throughput as a percentage of the best result
    pub relative_rps: f64,
}

/// Comparison over a set of results
pub struct BenchmarkComparison<'a> {
    results: &'a [BenchmarkResult],
}

impl<'a> BenchmarkComparison<'a> {
    pub fn new(results: &'a [BenchmarkResult]) -> Self {
        Self { results }
    }

    /// Highest requests/sec in the set
    pub fn best_rps(&self) -> f64 {
        self.results
            .iter()
            .map(|r| r.requests_per_second)
            .fold(0.0, f64::max)
    }

    /// Throughput of `result` relative to the best, in percent
    pub fn relative_rps(&self, result: &BenchmarkResult) -> f64 {
        let best = self.best_rps();
        if best > 0.0 {
            result.requests_per_second / best * 100.0
        } else {
            0.0
        }
    }

    /// Results sorted by requests/sec (descending); ties keep input order
    pub fn by_rps(&self) -> Vec<RankedResult<'a>> {
        let mut sorted: Vec<&BenchmarkResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| cmp_f64(b.requests_per_second, a.requests_per_second));
        self.rank(sorted)
    }

    /// Results sorted by average latency (ascending); ties keep input order
    pub fn by_latency(&self) -> Vec<RankedResult<'a>> {
        let mut sorted: Vec<&BenchmarkResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| a.latency.avg.cmp(&b.latency.avg));
        self.rank(sorted)
    }

    fn rank(&self, sorted: Vec<&'a BenchmarkResult>) -> Vec<RankedResult<'a>> {
        sorted
            .into_iter()
            .enumerate()
            .map(|(i, result)| RankedResult {
                rank: i + 1,
                result,
                relative_rps: self.relative_rps(result),
            })
            .collect()
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatencyStats;
    use std::time::Duration;

    fn result(label: &str, rps: f64, latency_ms: u64) -> BenchmarkResult {
        let latency = LatencyStats::new(
            Duration::from_millis(latency_ms),
            Duration::ZERO,
            Duration::from_millis(latency_ms * 4),
            90.0,
        );
        BenchmarkResult::new(label, rps, latency)
    }

    #[test]
    fn test_by_rps() {
        let results = vec![
            result("round-robin", 800.0, 5),
            result("least-conn", 1_000.0, 4),
            result("random", 500.0, 8),
        ];
        let comparison = BenchmarkComparison::new(&results);
        let ranked = comparison.by_rps();

        let labels: Vec<_> = ranked.iter().map(|r| r.result.label.as_str()).collect();
        assert_eq!(labels, vec!["least-conn", "round-robin", "random"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].relative_rps, 100.0);
        assert_eq!(ranked[1].relative_rps, 80.0);
    }

    #[test]
    fn test_by_latency() {
        let results = vec![
            result("round-robin", 800.0, 5),
            result("least-conn", 1_000.0, 4),
            result("random", 500.0, 8),
        ];
        let ranked = BenchmarkComparison::new(&results).by_latency();

        let labels: Vec<_> = ranked.iter().map(|r| r.result.label.as_str()).collect();
        assert_eq!(labels, vec!["least-conn", "round-robin", "random"]);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let results = vec![result("a", 100.0, 1), result("b", 100.0, 1)];
        let ranked = BenchmarkComparison::new(&results).by_rps();
        assert_eq!(ranked[0].result.label, "a");
        assert_eq!(ranked[1].result.label, "b");
    }

    #[test]
    fn test_zero_throughput() {
        let results = vec![result("idle", 0.0, 1)];
        let comparison = BenchmarkComparison::new(&results);
        assert_eq!(comparison.best_rps(), 0.0);
        assert_eq!(comparison.relative_rps(&results[0]), 0.0);
    }
}
