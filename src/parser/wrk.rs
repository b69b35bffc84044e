//! wrk text output parser
//!
//! Extracts a [`BenchmarkResult`] from the report wrk prints on stdout.
//! Lines the parser does not recognize are skipped, so output from Lua
//! scripts (`done()` hooks) may be interleaved freely.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::{BenchmarkResult, LatencyPercentile, LatencyStats, SocketErrors, ThreadStats};

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("No 'Requests/sec:' line found in {0}")]
    MissingRequestsPerSec(String),

    #[error("No latency statistics found in {0}")]
    MissingLatency(String),

    #[error("Invalid value on line {line}: {content:?}")]
    InvalidValue { line: usize, content: String },
}

/// Fields collected while scanning the output
#[derive(Default)]
struct Partial {
    target: Option<String>,
    test_duration: Option<Duration>,
    threads: Option<u32>,
    connections: Option<u32>,
    requests_per_second: Option<f64>,
    latency: Option<LatencyStats>,
    thread_requests: Option<ThreadStats>,
    distribution: Vec<LatencyPercentile>,
    total_requests: Option<u64>,
    elapsed: Option<Duration>,
    bytes_read: Option<u64>,
    transfer_per_second: Option<u64>,
    socket_errors: SocketErrors,
    non_2xx_3xx: u64,
}

/// Parse wrk output into a result labelled `label`
pub fn parse_wrk_output(text: &str, label: &str) -> Result<BenchmarkResult, ParseError> {
    let mut partial = Partial::default();
    let mut in_distribution = false;

    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let invalid = || ParseError::InvalidValue {
            line: idx + 1,
            content: trimmed.to_string(),
        };

        if trimmed.is_empty() {
            in_distribution = false;
            continue;
        }

        if trimmed.starts_with("Latency Distribution") {
            in_distribution = true;
            continue;
        }

        if in_distribution {
            if let Some(entry) = parse_distribution_line(trimmed) {
                partial.distribution.push(entry);
                continue;
            }
            in_distribution = false;
        }

        if let Some(value) = trimmed.strip_prefix("Requests/sec:") {
            let rps = value
                .split_whitespace()
                .next()
                .and_then(|token| token.parse::<f64>().ok())
                .filter(|rps| rps.is_finite() && *rps >= 0.0)
                .ok_or_else(invalid)?;
            partial.requests_per_second = Some(rps);
        } else if let Some(value) = trimmed.strip_prefix("Transfer/sec:") {
            let rate = value
                .split_whitespace()
                .next()
                .and_then(parse_size)
                .ok_or_else(invalid)?;
            partial.transfer_per_second = Some(rate);
        } else if let Some(value) = trimmed.strip_prefix("Socket errors:") {
            partial.socket_errors = parse_socket_errors(value).ok_or_else(invalid)?;
        } else if let Some(value) = trimmed.strip_prefix("Non-2xx or 3xx responses:") {
            partial.non_2xx_3xx = value.trim().parse().map_err(|_| invalid())?;
        } else if let Some(rest) = trimmed.strip_prefix("Running ") {
            if let Some((duration, target)) = rest.split_once(" test @ ") {
                partial.test_duration = Some(parse_duration(duration.trim()).ok_or_else(invalid)?);
                partial.target = Some(target.trim().to_string());
            }
        } else if trimmed.starts_with("Latency ") {
            match parse_latency_row(trimmed) {
                Some(latency) => partial.latency = Some(latency),
                None => debug!(line = idx + 1, "Skipping non-table latency line"),
            }
        } else if trimmed.starts_with("Req/Sec ") {
            match parse_thread_row(trimmed) {
                Some(stats) => partial.thread_requests = Some(stats),
                None => debug!(line = idx + 1, "Skipping non-table Req/Sec line"),
            }
        } else if trimmed.contains(" threads and ") && trimmed.ends_with("connections") {
            let (threads, connections) = parse_threads_line(trimmed).ok_or_else(invalid)?;
            partial.threads = Some(threads);
            partial.connections = Some(connections);
        } else if trimmed.contains(" requests in ") {
            let (total, elapsed, bytes) = parse_totals_line(trimmed).ok_or_else(invalid)?;
            partial.total_requests = Some(total);
            partial.elapsed = Some(elapsed);
            partial.bytes_read = Some(bytes);
        }
    }

    let requests_per_second = partial
        .requests_per_second
        .ok_or_else(|| ParseError::MissingRequestsPerSec(label.to_string()))?;
    let latency = partial
        .latency
        .ok_or_else(|| ParseError::MissingLatency(label.to_string()))?;

    debug!(
        label,
        rps = requests_per_second,
        percentiles = partial.distribution.len(),
        "Parsed wrk output"
    );

    Ok(BenchmarkResult {
        target: partial.target,
        test_duration: partial.test_duration,
        threads: partial.threads,
        connections: partial.connections,
        thread_requests: partial.thread_requests,
        latency_distribution: partial.distribution,
        total_requests: partial.total_requests,
        elapsed: partial.elapsed,
        bytes_read: partial.bytes_read,
        transfer_per_second: partial.transfer_per_second,
        socket_errors: partial.socket_errors,
        non_2xx_3xx: partial.non_2xx_3xx,
        ..BenchmarkResult::new(label, requests_per_second, latency)
    })
}

/// `Latency   635.91us    0.89ms  12.92ms   93.69%`
fn parse_latency_row(line: &str) -> Option<LatencyStats> {
    let mut parts = line.split_whitespace().skip(1);
    let avg = parse_duration(parts.next()?)?;
    let stdev = parse_duration(parts.next()?)?;
    let max = parse_duration(parts.next()?)?;
    let within_stdev = parse_within_stdev(parts.next()?)?;
    Some(LatencyStats::new(avg, stdev, max, within_stdev))
}

/// `Req/Sec    56.20k     8.07k   62.00k    86.54%`
fn parse_thread_row(line: &str) -> Option<ThreadStats> {
    let mut parts = line.split_whitespace().skip(1);
    Some(ThreadStats {
        avg: parse_count(parts.next()?)?,
        stdev: parse_count(parts.next()?)?,
        max: parse_count(parts.next()?)?,
        within_stdev: parse_within_stdev(parts.next()?)?,
    })
}

/// `50%  250.00us` (wrk) or `50.000%  1.23ms` (wrk2)
fn parse_distribution_line(line: &str) -> Option<LatencyPercentile> {
    let mut parts = line.split_whitespace();
    let percentile = parse_percent(parts.next()?)?;
    let latency = parse_duration(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(LatencyPercentile {
        percentile,
        latency,
    })
}

/// `12 threads and 400 connections`
fn parse_threads_line(line: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [threads, "threads", "and", connections, "connections"] => {
            Some((threads.parse().ok()?, connections.parse().ok()?))
        }
        _ => None,
    }
}

/// `22464657 requests in 30.00s, 17.76GB read`
fn parse_totals_line(line: &str) -> Option<(u64, Duration, u64)> {
    let (head, tail) = line.split_once(',')?;
    let parts: Vec<&str> = head.split_whitespace().collect();
    let (total, elapsed) = match parts.as_slice() {
        [total, "requests", "in", elapsed] => (total.parse().ok()?, parse_duration(elapsed)?),
        _ => return None,
    };

    let tail: Vec<&str> = tail.split_whitespace().collect();
    let bytes = match tail.as_slice() {
        [size, "read"] => parse_size(size)?,
        _ => return None,
    };

    Some((total, elapsed, bytes))
}

/// `connect 0, read 0, write 0, timeout 36`
fn parse_socket_errors(value: &str) -> Option<SocketErrors> {
    let mut errors = SocketErrors::default();
    for field in value.split(',') {
        let (name, count) = field.trim().split_once(' ')?;
        let count: u64 = count.trim().parse().ok()?;
        match name {
            "connect" => errors.connect = count,
            "read" => errors.read = count,
            "write" => errors.write = count,
            "timeout" => errors.timeout = count,
            _ => return None,
        }
    }
    Some(errors)
}

/// Split `12.5ms` into `(12.5, "ms")`
fn split_number(token: &str) -> Option<(f64, &str)> {
    let token = token.trim();
    let idx = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(token.len());
    let (value, unit) = token.split_at(idx);
    if value.is_empty() {
        return None;
    }
    Some((value.parse().ok()?, unit))
}

/// Parse a wrk duration such as `635.91us`, `1.20s` or `2.00m`
pub fn parse_duration(token: &str) -> Option<Duration> {
    let (value, unit) = split_number(token)?;
    let nanos = match unit {
        "ns" => value,
        "us" | "µs" | "μs" => value * 1_000.0,
        "ms" => value * 1_000_000.0,
        "s" => value * 1_000_000_000.0,
        "m" => value * 60_000_000_000.0,
        "h" => value * 3_600_000_000_000.0,
        _ => return None,
    };
    Some(Duration::from_nanos(nanos.round() as u64))
}

/// Parse a wrk byte size such as `17.76GB` (binary multiples)
pub fn parse_size(token: &str) -> Option<u64> {
    let (value, unit) = split_number(token)?;
    let scale = match unit {
        "" | "B" => 1.0,
        "K" | "KB" => 1024.0,
        "M" | "MB" => 1024.0 * 1024.0,
        "G" | "GB" => 1024.0 * 1024.0 * 1024.0,
        "T" | "TB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((value * scale).round() as u64)
}

/// Parse a wrk metric count such as `56.20k` (decimal multiples)
fn parse_count(token: &str) -> Option<f64> {
    let (value, unit) = split_number(token)?;
    let scale = match unit {
        "" => 1.0,
        "k" => 1_000.0,
        "M" => 1_000_000.0,
        "G" => 1_000_000_000.0,
        _ => return None,
    };
    Some(value * scale)
}

fn parse_percent(token: &str) -> Option<f64> {
    token
        .strip_suffix('%')?
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
}

/// `+/- Stdev` column; wrk prints `-nan%` when no request completed
fn parse_within_stdev(token: &str) -> Option<f64> {
    let value: f64 = token.strip_suffix('%')?.parse().ok()?;
    Some(if value.is_finite() { value } else { 0.0 })
}
