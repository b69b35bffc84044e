//! Input specs and result loading
//!
//! Each command-line input is `[LABEL=]PATH`. Text files are parsed as wrk
//! output; `.json` files are read back as results printed by
//! `show --format json`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::reader::read_output;
use super::wrk::parse_wrk_output;
use crate::models::{BenchmarkResult, ResultSet};
use crate::utils::Timer;

/// A `[LABEL=]PATH` command-line input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSpec {
    pub label: Option<String>,
    pub path: PathBuf,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            label: None,
            path: path.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether the input holds previously printed JSON results
    pub fn is_json(&self) -> bool {
        self.path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl FromStr for InputSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("input must not be empty".to_string());
        }

        match s.split_once('=') {
            Some((label, path)) => {
                let label = label.trim();
                let path = path.trim();
                if label.is_empty() {
                    return Err(format!("missing label before '=' in {s:?}"));
                }
                if path.is_empty() {
                    return Err(format!("missing path after '=' in {s:?}"));
                }
                Ok(InputSpec::new(path).with_label(label))
            }
            None => Ok(InputSpec::new(s)),
        }
    }
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}={}", label, self.path.display()),
            None => write!(f, "{}", self.path.display()),
        }
    }
}

/// Accepted JSON shapes
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonResults {
    Set(ResultSet),
    List(Vec<BenchmarkResult>),
    Single(BenchmarkResult),
}

impl JsonResults {
    fn into_results(self) -> Vec<BenchmarkResult> {
        match self {
            JsonResults::Set(set) => set.results,
            JsonResults::List(list) => list,
            JsonResults::Single(result) => vec![result],
        }
    }
}

/// Load every input in order
pub fn load_results(inputs: &[InputSpec]) -> Result<Vec<BenchmarkResult>> {
    let timer = Timer::start("load results");
    let mut results = Vec::with_capacity(inputs.len());

    for input in inputs {
        let loaded = load_input(input).with_context(|| format!("Failed to load input '{input}'"))?;
        results.extend(loaded);
    }

    let mut seen = HashSet::new();
    for result in &results {
        if !seen.insert(result.label.as_str()) {
            warn!(label = %result.label, "Duplicate label; bars will share a name");
        }
    }

    info!(
        inputs = inputs.len(),
        results = results.len(),
        elapsed_ms = timer.elapsed_ms(),
        "Loaded benchmark results"
    );
    timer.stop();
    Ok(results)
}

/// Load a single input
pub fn load_input(input: &InputSpec) -> Result<Vec<BenchmarkResult>> {
    let raw = read_output(&input.path)?;

    if input.is_json() {
        let results = parse_json_results(raw.text(), raw.path())?;
        return Ok(relabel(results, input));
    }

    let label = input
        .label
        .clone()
        .unwrap_or_else(|| raw.default_label());
    let result = parse_wrk_output(raw.text(), &label)?;
    Ok(vec![result])
}

fn parse_json_results(text: &str, path: &Path) -> Result<Vec<BenchmarkResult>> {
    let results = serde_json::from_str::<JsonResults>(text)
        .with_context(|| format!("Failed to parse JSON results: {}", path.display()))?
        .into_results();

    for result in &results {
        result
            .validate()
            .map_err(|reason| anyhow::anyhow!("Invalid result in {}: {reason}", path.display()))?;
    }

    debug!(path = %path.display(), count = results.len(), "Loaded JSON results");
    Ok(results)
}

fn relabel(mut results: Vec<BenchmarkResult>, input: &InputSpec) -> Vec<BenchmarkResult> {
    if let Some(label) = &input.label {
        if results.len() == 1 {
            results = results
                .into_iter()
                .map(|result| result.with_label(label.as_str()))
                .collect();
        } else {
            warn!(
                label = %label,
                count = results.len(),
                "Label ignored for a file with several results"
            );
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LatencyStats;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    const WRK_OUTPUT: &str = "\
Running 10s test @ http://127.0.0.1:8080/
  2 threads and 10 connections
    Latency     1.00ms  200.00us   5.00ms   75.00%
Requests/sec:   9000.00
";

    #[test]
    fn test_input_spec_parsing() {
        let spec: InputSpec = "results/rr.txt".parse().unwrap();
        assert_eq!(spec.label, None);
        assert_eq!(spec.path, PathBuf::from("results/rr.txt"));

        let spec: InputSpec = "Round Robin=results/rr.txt".parse().unwrap();
        assert_eq!(spec.label.as_deref(), Some("Round Robin"));
        assert_eq!(spec.path, PathBuf::from("results/rr.txt"));

        let spec: InputSpec = "a=b=c.txt".parse().unwrap();
        assert_eq!(spec.label.as_deref(), Some("a"));
        assert_eq!(spec.path, PathBuf::from("b=c.txt"));
    }

    #[test]
    fn test_input_spec_errors() {
        assert!("".parse::<InputSpec>().is_err());
        assert!("=rr.txt".parse::<InputSpec>().is_err());
        assert!("rr=".parse::<InputSpec>().is_err());
    }

    #[test]
    fn test_input_spec_display() {
        let spec = InputSpec::new("rr.txt").with_label("rr");
        assert_eq!(spec.to_string(), "rr=rr.txt");
    }

    #[test]
    fn test_load_wrk_file_uses_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("least_conn.txt");
        fs::write(&path, WRK_OUTPUT).unwrap();

        let results = load_results(&[InputSpec::new(&path)]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "least_conn");
        assert_eq!(results[0].threads, Some(2));
    }

    #[test]
    fn test_load_keeps_input_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, WRK_OUTPUT).unwrap();
        fs::write(&b, WRK_OUTPUT).unwrap();

        let results = load_results(&[
            InputSpec::new(&b).with_label("second"),
            InputSpec::new(&a).with_label("first"),
        ])
        .unwrap();
        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["second", "first"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = load_results(&[InputSpec::new(dir.path().join("nope.txt"))]).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("nope.txt"));
        assert!(chain.contains("not found"));
    }

    #[test]
    fn test_load_json_result_set() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let latency = LatencyStats::new(
            Duration::from_millis(2),
            Duration::from_millis(1),
            Duration::from_millis(9),
            70.0,
        );
        let set = ResultSet::new(vec![
            BenchmarkResult::new("rr", 100.0, latency.clone()),
            BenchmarkResult::new("lc", 200.0, latency),
        ]);
        fs::write(&path, serde_json::to_string(&set).unwrap()).unwrap();

        let results = load_results(&[InputSpec::new(&path).with_label("ignored")]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "rr");
        assert_eq!(results[1].requests_per_second, 200.0);
        assert_eq!(results[0].latency.avg, Duration::from_millis(2));
    }

    #[test]
    fn test_load_single_json_result_relabels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.json");
        let result = BenchmarkResult::new("old", 50.0, LatencyStats::default());
        fs::write(&path, serde_json::to_string(&result).unwrap()).unwrap();

        let results = load_results(&[InputSpec::new(&path).with_label("new")]).unwrap();
        assert_eq!(results[0].label, "new");
    }

    #[test]
    fn test_zero_response_run_reloads_from_json() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("down.txt");
        fs::write(
            &raw,
            "    Latency     0.00us    0.00us   0.00us    -nan%\nRequests/sec:      0.00\n",
        )
        .unwrap();
        let parsed = load_results(&[InputSpec::new(&raw)]).unwrap();

        let saved = dir.path().join("down.json");
        fs::write(&saved, serde_json::to_string(&ResultSet::new(parsed.clone())).unwrap())
            .unwrap();
        let reloaded = load_results(&[InputSpec::new(&saved)]).unwrap();
        assert_eq!(reloaded, parsed);
    }

    #[test]
    fn test_load_invalid_json_result() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"label": "", "requests_per_second": 1.0,
                 "latency": {"avg_ms": 1.0, "stdev_ms": 0.0, "max_ms": 1.0, "within_stdev": 0.0}}]"#,
        )
        .unwrap();

        assert!(load_results(&[InputSpec::new(&path)]).is_err());
    }
}
