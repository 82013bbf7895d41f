use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alloc_counter::AllocSnapshot;
use crate::strategy::Strategy;

/// Result of measuring one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub strategy: Strategy,
    pub iterations: u64,
    pub elapsed_ns: u64,
    pub ns_per_op: f64,
    /// `None` when allocation accounting was disabled or unavailable.
    pub allocs_per_op: Option<u64>,
    pub bytes_per_op: Option<u64>,
    /// Last line produced, kept so the run can be eyeballed.
    pub sample: Option<String>,
}

impl Measurement {
    pub fn new(strategy: Strategy, iterations: u64, elapsed: Duration) -> Self {
        let elapsed_ns = elapsed.as_nanos().min(u64::MAX as u128) as u64;
        let ns_per_op = if iterations == 0 {
            0.0
        } else {
            elapsed_ns as f64 / iterations as f64
        };
        Measurement {
            strategy,
            iterations,
            elapsed_ns,
            ns_per_op,
            allocs_per_op: None,
            bytes_per_op: None,
            sample: None,
        }
    }

    pub fn with_allocs(mut self, total: AllocSnapshot) -> Self {
        let per_op = total.per_op(self.iterations);
        self.allocs_per_op = Some(per_op.allocations);
        self.bytes_per_op = Some(per_op.bytes);
        self
    }

    pub fn with_sample(mut self, sample: Option<String>) -> Self {
        self.sample = sample;
        self
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }

    pub fn ops_per_sec(&self) -> f64 {
        if self.elapsed_ns == 0 {
            0.0
        } else {
            self.iterations as f64 / (self.elapsed_ns as f64 / 1e9)
        }
    }

    pub fn bench_name(&self) -> String {
        format!("concat/{}", self.strategy)
    }

    /// One line in the usual `name  N  ns/op  B/op  allocs/op` shape.
    pub fn line(&self) -> String {
        let mut line = format!(
            "{:<20} {:>12} {:>12.1} ns/op",
            self.bench_name(),
            self.iterations,
            self.ns_per_op
        );
        if let (Some(allocs), Some(bytes)) = (self.allocs_per_op, self.bytes_per_op) {
            line.push_str(&format!(" {:>8} B/op {:>6} allocs/op", bytes, allocs));
        }
        line
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub request_id: String,
    pub address: String,
    pub measurements: Vec<Measurement>,
}

impl Report {
    pub fn new(request_id: impl Into<String>, address: impl Into<String>) -> Self {
        Report {
            run_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            created_at: Utc::now(),
            request_id: request_id.into(),
            address: address.into(),
            measurements: Vec::new(),
        }
    }

    pub fn add(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn get(&self, strategy: Strategy) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.strategy == strategy)
    }

    /// Fastest measurement that actually ran.
    pub fn fastest(&self) -> Option<&Measurement> {
        self.measurements
            .iter()
            .filter(|m| m.iterations > 0)
            .min_by(|a, b| a.ns_per_op.total_cmp(&b.ns_per_op))
    }

    pub fn table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "run {} | {} | id={} addr={}\n",
            self.run_id,
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.request_id,
            self.address
        ));
        out.push_str(&format!("{:-<80}\n", ""));
        for m in &self.measurements {
            out.push_str(&m.line());
            out.push('\n');
        }
        out
    }

    /// Each strategy relative to the fastest one.
    pub fn comparison(&self) -> String {
        let Some(base) = self.fastest() else {
            return "No iterations were measured.\n".to_string();
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{:<12} {:>10} {:>14} {:>10}\n",
            "Strategy", "Relative", "ops/s", "allocs/op"
        ));
        out.push_str(&format!("{:-<50}\n", ""));
        for m in &self.measurements {
            let relative = if m.iterations == 0 || base.ns_per_op == 0.0 {
                "-".to_string()
            } else {
                format!("{:.2}x", m.ns_per_op / base.ns_per_op)
            };
            let allocs = m
                .allocs_per_op
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{:<12} {:>10} {:>14} {:>10}\n",
                m.strategy.name(),
                relative,
                format_rate(m.ops_per_sec()),
                allocs
            ));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_rate(ops: f64) -> String {
    if ops >= 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops >= 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{:.0}", ops)
    }
}
