//! Measurement driver.
//!
//! Each strategy gets its own setup (request + bound listener), then the
//! body runs either a fixed number of times or as many times as it takes to
//! fill the configured benchtime. The listener is dropped when the run ends,
//! however it ends.

use std::hint::black_box;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::alloc_counter::{self, AllocSnapshot};
use crate::config::{HarnessConfig, Iterations};
use crate::error::Result;
use crate::report::{Measurement, Report};
use crate::setup::{setup, Request};
use crate::strategy::Strategy;
use crate::timestamp::{system_clock, Clock};

/// What one measured run hands back to its caller.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub measurement: Measurement,
    /// The last line built, or `None` when zero iterations ran. Callers
    /// consume it so the work cannot be optimized away.
    pub last: Option<String>,
    pub address: SocketAddr,
}

struct Sample {
    iterations: u64,
    elapsed: Duration,
    allocs: AllocSnapshot,
    last: Option<String>,
}

pub struct Harness {
    config: HarnessConfig,
    clock: Clock,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Harness {
            config,
            clock: system_clock,
        })
    }

    /// Replaces the per-iteration timestamp source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn run(&self, strategy: Strategy) -> Result<RunOutcome> {
        let (request, listener) = setup(&self.config)?;
        let addr = *listener.addr();

        let track_allocs = self.config.track_allocs && alloc_counter::is_active();
        if self.config.track_allocs && !track_allocs {
            tracing::warn!("counting allocator is not installed, allocations will not be reported");
        }

        let sample = match self.config.iterations {
            Iterations::Fixed(n) => self.run_n(strategy, &request, &addr, n),
            Iterations::Auto { benchtime } => {
                self.calibrate(strategy, &request, &addr, benchtime)
            }
        };
        drop(listener);

        let mut measurement = Measurement::new(strategy, sample.iterations, sample.elapsed)
            .with_sample(sample.last.clone());
        if track_allocs {
            measurement = measurement.with_allocs(sample.allocs);
        }
        tracing::info!(
            strategy = %strategy,
            iterations = measurement.iterations,
            ns_per_op = measurement.ns_per_op,
            allocs_per_op = ?measurement.allocs_per_op,
            "strategy measured"
        );

        Ok(RunOutcome {
            measurement,
            last: sample.last,
            address: addr,
        })
    }

    /// Runs every strategy in order and collects a report. The first setup
    /// failure aborts the whole run.
    pub fn run_all(&self, strategies: &[Strategy]) -> Result<Report> {
        let mut report = Report::new(self.config.request_id.clone(), String::new());
        for &strategy in strategies {
            let outcome = self.run(strategy)?;
            black_box(&outcome.last);
            if report.address.is_empty() {
                report.address = outcome.address.to_string();
            }
            report.add(outcome.measurement);
        }
        Ok(report)
    }

    fn run_n(&self, strategy: Strategy, request: &Request, addr: &SocketAddr, n: u64) -> Sample {
        let hint = self.config.capacity_hint;
        let clock = self.clock;
        let mut last = None;

        let before = AllocSnapshot::now();
        let start = Instant::now();
        for _ in 0..n {
            let now = clock();
            last = Some(black_box(strategy.build(request, addr, &now, hint)));
        }
        let elapsed = start.elapsed();
        let allocs = AllocSnapshot::now().since(&before);

        Sample {
            iterations: n,
            elapsed,
            allocs,
            last,
        }
    }

    fn calibrate(
        &self,
        strategy: Strategy,
        request: &Request,
        addr: &SocketAddr,
        benchtime: Duration,
    ) -> Sample {
        let max = self.config.max_iterations;
        let mut sample = self.run_n(strategy, request, addr, 1);
        while sample.elapsed < benchtime && sample.iterations < max {
            let n = next_iterations(benchtime, sample.iterations, sample.elapsed, max);
            tracing::trace!(strategy = %strategy, n, "calibrating");
            sample = self.run_n(strategy, request, addr, n);
        }
        sample
    }
}

/// Predicts the iteration count that fills `goal`, given that `prev_iters`
/// took `prev_elapsed`. Overshoots by 20%, grows at most 100x and at least
/// by one, and never exceeds `max`.
pub fn next_iterations(goal: Duration, prev_iters: u64, prev_elapsed: Duration, max: u64) -> u64 {
    let prev_ns = prev_elapsed.as_nanos().max(1);
    let mut n = goal.as_nanos() * prev_iters as u128 / prev_ns;
    n += n / 5;
    n = n.min(100 * prev_iters as u128);
    n = n.max(prev_iters as u128 + 1);
    n.min(max as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn pinned_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_next_iterations_grows_toward_goal() {
        // 10 iterations in 1ms, goal 1s -> 10_000 * 1.2, capped at 100x
        let n = next_iterations(Duration::from_secs(1), 10, Duration::from_millis(1), u64::MAX);
        assert_eq!(n, 1_000);

        let n = next_iterations(
            Duration::from_secs(1),
            1_000,
            Duration::from_millis(500),
            u64::MAX,
        );
        assert_eq!(n, 2_400);
    }

    #[test]
    fn test_next_iterations_always_progresses() {
        let n = next_iterations(Duration::from_nanos(1), 7, Duration::from_secs(1), u64::MAX);
        assert_eq!(n, 8);
    }

    #[test]
    fn test_next_iterations_zero_elapsed_and_cap() {
        let n = next_iterations(Duration::from_secs(1), 1, Duration::ZERO, u64::MAX);
        assert_eq!(n, 100);

        let n = next_iterations(Duration::from_secs(1), 1_000, Duration::from_nanos(1), 5_000);
        assert_eq!(n, 5_000);
    }

    #[test]
    fn test_fixed_run_counts_iterations() {
        let harness = Harness::new(HarnessConfig::default().with_iterations(25))
            .unwrap()
            .with_clock(pinned_clock);
        let outcome = harness.run(Strategy::Bytes).unwrap();
        assert_eq!(outcome.measurement.iterations, 25);
        let last = outcome.last.unwrap();
        assert!(last.starts_with("9001 127.0.0.1:"));
        assert!(last.ends_with(" 2024-01-15 10:30:00.000000000 +0000 UTC"));
        assert_eq!(outcome.measurement.sample.as_deref(), Some(last.as_str()));
    }

    #[test]
    fn test_zero_iterations() {
        let harness = Harness::new(HarnessConfig::default().with_iterations(0)).unwrap();
        let outcome = harness.run(Strategy::Append).unwrap();
        assert_eq!(outcome.measurement.iterations, 0);
        assert_eq!(outcome.measurement.ns_per_op, 0.0);
        assert_eq!(outcome.measurement.allocs_per_op, Some(0));
        assert!(outcome.last.is_none());
    }

    #[test]
    fn test_auto_stops_at_max_iterations() {
        let config = HarnessConfig::default()
            .with_benchtime(Duration::from_secs(3600))
            .with_max_iterations(500);
        let harness = Harness::new(config).unwrap();
        let outcome = harness.run(Strategy::Format).unwrap();
        assert_eq!(outcome.measurement.iterations, 500);
    }

    #[test]
    fn test_auto_reaches_benchtime() {
        let config = HarnessConfig::default().with_benchtime(Duration::from_millis(20));
        let harness = Harness::new(config).unwrap();
        let outcome = harness.run(Strategy::Builder).unwrap();
        assert!(outcome.measurement.elapsed() >= Duration::from_millis(20));
        assert!(outcome.measurement.iterations > 1);
    }

    #[test]
    fn test_without_allocs() {
        let harness =
            Harness::new(HarnessConfig::default().with_iterations(3).without_allocs()).unwrap();
        let outcome = harness.run(Strategy::Write).unwrap();
        assert!(outcome.measurement.allocs_per_op.is_none());
        assert!(outcome.measurement.bytes_per_op.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Harness::new(HarnessConfig::default().with_request_id("a b")).is_err());
    }

    #[test]
    fn test_run_all_builds_report() {
        let harness = Harness::new(HarnessConfig::default().with_iterations(10)).unwrap();
        let report = harness.run_all(&Strategy::ALL).unwrap();
        assert_eq!(report.measurements.len(), 5);
        assert_eq!(report.request_id, "9001");
        assert!(report.address.starts_with("127.0.0.1:"));
    }
}
