//! # trig-bench: CPU vs. OpenCL Trigonometric Micro-Benchmark
//!
//! Times one floating-point workload, a 100-term cosine/sine accumulation per
//! element, on a single CPU thread and on every compute device the runtime
//! exposes. Each benchmark repeats its pass `loop_count` times and reports
//! the **fastest** pass.
//!
//! ## Runtimes
//!
//! 1. **OpenCL** - every platform and device, via `ocl` (feature `opencl`)
//! 2. **Software** - in-process Rayon device, always available
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): workload formula, timing, configuration
//! - **Ports Layer** (`ports/`): `ComputeRuntime` / `KernelDispatch` traits
//! - **Backends** (`backends/`): OpenCL and software runtimes
//! - **Service Layer** (`service/`): reference, device and runner
//! - `reporter`: console report on stdout
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trig_bench::{run, BenchConfig};
//!
//! let config = BenchConfig::from_env()?;
//! let summary = run(&config)?;
//! println!("reference: {:?}", summary.reference.best);
//! ```

pub mod backends;
pub mod domain;
pub mod error;
pub mod ports;
pub mod reporter;
pub mod service;
pub mod telemetry;

pub use domain::{BenchConfig, RuntimeKind};
pub use error::{BenchError, Result};
pub use ports::{ComputeRuntime, Device, DeviceDescriptor, KernelDispatch, KernelSource};
pub use service::{BenchReport, BenchmarkRunner, DeviceOutcome, RunSummary};

use backends::software::SoftwareRuntime;
use std::io::Write;

/// Run the full benchmark with the runtime `config` selects, reporting to
/// stdout.
pub fn run(config: &BenchConfig) -> Result<RunSummary> {
    config.validate()?;
    let source = KernelSource::load(config.kernel_path.as_deref())?;
    let stdout = std::io::stdout();

    match config.runtime {
        RuntimeKind::Software => run_on(&SoftwareRuntime::new(), config, &source, stdout.lock()),
        RuntimeKind::OpenCL => {
            #[cfg(feature = "opencl")]
            {
                let runtime = backends::opencl::OpenCLRuntime::new();
                run_on(&runtime, config, &source, stdout.lock())
            }
            #[cfg(not(feature = "opencl"))]
            {
                Err(BenchError::InvalidConfig(
                    "built without the `opencl` feature".to_string(),
                ))
            }
        }
    }
}

/// Run the full benchmark against a given runtime and report sink.
pub fn run_on<R, W>(
    runtime: &R,
    config: &BenchConfig,
    source: &KernelSource,
    out: W,
) -> Result<RunSummary>
where
    R: ComputeRuntime,
    W: Write,
{
    BenchmarkRunner::new(runtime, config, source, out).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_rejects_invalid_config_before_loading_kernel() {
        let config = BenchConfig::default()
            .with_buffer_size(0)
            .with_kernel_path("/nonexistent/bench.cl");
        assert!(matches!(run(&config), Err(BenchError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_reports_missing_kernel_file() {
        let config = BenchConfig::default()
            .with_runtime(RuntimeKind::Software)
            .with_buffer_size(4)
            .with_loop_count(1)
            .with_kernel_path("/nonexistent/bench.cl");
        assert!(matches!(run(&config), Err(BenchError::ResourceLoad { .. })));
    }
}
