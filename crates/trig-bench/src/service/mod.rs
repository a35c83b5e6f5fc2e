//! Service layer: the reference benchmark, the device benchmark, and the
//! runner that sequences them.

pub mod device;
pub mod reference;
pub mod runner;

use std::time::Duration;

pub use runner::{BenchmarkRunner, DeviceOutcome, RunSummary};

/// Result of one benchmark, CPU or device.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Fastest of the timed passes
    pub best: Duration,
    /// Output buffer of the final pass
    pub output: Vec<f32>,
}
