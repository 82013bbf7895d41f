pub mod alloc_counter;
pub mod builder;
pub mod config;
pub mod error;
pub mod harness;
pub mod logging;
pub mod report;
pub mod setup;
pub mod store;
pub mod strategy;
pub mod timestamp;


// Unit tests need real allocation counts.
#[cfg(test)]
#[global_allocator]
static TEST_ALLOCATOR: alloc_counter::CountingAllocator = alloc_counter::CountingAllocator::system();

pub use alloc_counter::{AllocSnapshot, CountingAllocator};
pub use builder::StringBuilder;
pub use config::{HarnessConfig, Iterations};
pub use error::{BenchError, Result};
pub use harness::{Harness, RunOutcome};
pub use report::{Measurement, Report};
pub use setup::{setup, Listener, Request};
pub use store::ReportStore;
pub use strategy::Strategy;
