//! Benchmark orchestration
//!
//! ## Run Sequence
//!
//! 1. Validate configuration
//! 2. Reference benchmark on one CPU thread, reported
//! 3. Optional Rayon reference, reported
//! 4. Enumerate devices (failure is fatal)
//! 5. For each device: report metadata, benchmark, report timing, verify
//!
//! Everything runs on the calling thread, one step after another. The first
//! error ends the run; sections already written stay in the output.

use super::{device, reference, BenchReport};
use crate::domain::{workload, BenchConfig, Verification};
use crate::error::Result;
use crate::ports::{ComputeRuntime, DeviceDescriptor, KernelSource};
use crate::reporter::Reporter;
use std::io::Write;
use tracing::{info, warn};

/// Title of the single-threaded CPU section.
pub const REFERENCE_TITLE: &str = "Reference";

/// Title of the Rayon CPU section.
pub const PARALLEL_REFERENCE_TITLE: &str = "Reference (Rayon)";

/// Outcome of one completed device benchmark.
#[derive(Debug, Clone)]
pub struct DeviceOutcome {
    pub descriptor: DeviceDescriptor,
    pub report: BenchReport,
    /// `None` when verification is disabled
    pub verification: Option<Verification>,
}

/// Everything a successful run measured.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reference: BenchReport,
    pub parallel_reference: Option<BenchReport>,
    pub devices: Vec<DeviceOutcome>,
}

/// Sequences the reference and device benchmarks and reports each one.
pub struct BenchmarkRunner<'a, R: ComputeRuntime, W: Write> {
    runtime: &'a R,
    config: &'a BenchConfig,
    source: &'a KernelSource,
    reporter: Reporter<W>,
}

impl<'a, R: ComputeRuntime, W: Write> BenchmarkRunner<'a, R, W> {
    pub fn new(runtime: &'a R, config: &'a BenchConfig, source: &'a KernelSource, out: W) -> Self {
        Self {
            runtime,
            config,
            source,
            reporter: Reporter::new(out),
        }
    }

    /// Run every benchmark.
    pub fn run(&mut self) -> Result<RunSummary> {
        let config = self.config;
        config.validate()?;

        info!(
            runtime = self.runtime.name(),
            buffer_size = config.buffer_size,
            loop_count = config.loop_count,
            kernel = self.source.origin(),
            "starting benchmark"
        );

        self.reporter.section(REFERENCE_TITLE)?;
        let reference = reference::run(config);
        self.report(&reference)?;

        let parallel_reference = if config.parallel_reference {
            self.reporter.section(PARALLEL_REFERENCE_TITLE)?;
            let report = reference::run_parallel(config);
            self.report(&report)?;
            Some(report)
        } else {
            None
        };

        let devices = self.runtime.enumerate()?;
        info!(count = devices.len(), "devices enumerated");

        let mut outcomes = Vec::with_capacity(devices.len());
        for device in &devices {
            self.reporter.device(&device.descriptor)?;
            let report = device::run(self.runtime, device, self.source, config)?;
            self.report(&report)?;

            let verification = config.verify.then(|| {
                let verification =
                    workload::verify(&reference.output, &report.output, config.tolerance);
                log_verification(&device.descriptor, &verification);
                verification
            });

            outcomes.push(DeviceOutcome {
                descriptor: device.descriptor.clone(),
                report,
                verification,
            });
        }

        Ok(RunSummary {
            reference,
            parallel_reference,
            devices: outcomes,
        })
    }

    /// The report sink, including anything written before a failure.
    pub fn into_writer(self) -> W {
        self.reporter.into_inner()
    }

    fn report(&mut self, report: &BenchReport) -> Result<()> {
        self.reporter.timing(report.best)?;
        if self.config.dump_results {
            self.reporter.results(&report.output)?;
        }
        Ok(())
    }
}

fn log_verification(descriptor: &DeviceDescriptor, verification: &Verification) {
    if verification.is_clean() {
        info!(
            device = %descriptor.device_name,
            checked = verification.checked,
            worst_relative_error = verification.worst_relative_error,
            "device output matches reference"
        );
    } else {
        warn!(
            device = %descriptor.device_name,
            checked = verification.checked,
            mismatches = verification.mismatches,
            worst_relative_error = verification.worst_relative_error,
            "device output differs from reference"
        );
    }
}
