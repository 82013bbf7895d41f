use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{BenchError, Result};

pub const DEFAULT_REQUEST_ID: &str = "9001";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:0";
pub const DEFAULT_CAPACITY_HINT: usize = 40;
pub const DEFAULT_BENCHTIME: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000_000;

/// How many times the measured body runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    /// Exactly this many iterations. Zero is allowed and measures nothing.
    Fixed(u64),
    /// Grow the iteration count until one run lasts at least `benchtime`.
    Auto { benchtime: Duration },
}

impl Default for Iterations {
    fn default() -> Self {
        Iterations::Auto {
            benchtime: DEFAULT_BENCHTIME,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub request_id: String,
    pub bind_addr: SocketAddr,
    pub iterations: Iterations,
    pub capacity_hint: usize,
    pub track_allocs: bool,
    pub max_iterations: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            request_id: DEFAULT_REQUEST_ID.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            iterations: Iterations::default(),
            capacity_hint: DEFAULT_CAPACITY_HINT,
            track_allocs: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl HarnessConfig {
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_iterations(mut self, n: u64) -> Self {
        self.iterations = Iterations::Fixed(n);
        self
    }

    pub fn with_benchtime(mut self, benchtime: Duration) -> Self {
        self.iterations = Iterations::Auto { benchtime };
        self
    }

    pub fn with_capacity_hint(mut self, hint: usize) -> Self {
        self.capacity_hint = hint;
        self
    }

    pub fn with_max_iterations(mut self, max: u64) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn without_allocs(mut self) -> Self {
        self.track_allocs = false;
        self
    }

    /// Rejects settings that would break the three-field line layout or stall calibration.
    pub fn validate(&self) -> Result<()> {
        if self.request_id.is_empty() {
            return Err(BenchError::InvalidConfig(
                "request id must not be empty".to_string(),
            ));
        }
        if self.request_id.chars().any(char::is_whitespace) {
            return Err(BenchError::InvalidConfig(format!(
                "request id must not contain whitespace: {:?}",
                self.request_id
            )));
        }
        if let Iterations::Auto { benchtime } = self.iterations {
            if benchtime.is_zero() {
                return Err(BenchError::InvalidConfig(
                    "benchtime must be greater than zero".to_string(),
                ));
            }
        }
        if self.max_iterations == 0 {
            return Err(BenchError::InvalidConfig(
                "max iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn parse_bind_addr(s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| BenchError::InvalidConfig(format!("invalid bind address '{}': {}", s, e)))
}

/// Parses a benchtime given in seconds, e.g. `1`, `0.25`.
pub fn parse_benchtime(s: &str) -> Result<Duration> {
    let secs: f64 = s
        .trim()
        .trim_end_matches('s')
        .parse()
        .map_err(|_| BenchError::InvalidConfig(format!("invalid benchtime: {}", s)))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(BenchError::InvalidConfig(format!(
            "benchtime must be a positive number of seconds: {}",
            s
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}
