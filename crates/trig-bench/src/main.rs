//! # trig-bench
//!
//! Prints the fastest of `TRIG_BENCH_LOOP_COUNT` passes of the cos/sin
//! workload, first on one CPU thread, then on every compute device.
//!
//! ## Startup Sequence
//!
//! 1. Install tracing (stderr)
//! 2. Load configuration from the environment
//! 3. Run the reference and device benchmarks (stdout)

use anyhow::{Context, Result};
use tracing::info;
use trig_bench::domain::config::log_level_from_env;
use trig_bench::{telemetry, BenchConfig};

fn main() -> Result<()> {
    telemetry::init_tracing(&log_level_from_env())?;

    let config = BenchConfig::from_env().context("loading configuration")?;

    let summary = trig_bench::run(&config).context("benchmark run failed")?;
    info!(devices = summary.devices.len(), "benchmark complete");

    Ok(())
}
