//! Per-device benchmark

use super::BenchReport;
use crate::domain::{measure_best, workload, BenchConfig};
use crate::error::Result;
use crate::ports::{ComputeRuntime, Device, KernelDispatch, KernelSource};

/// Benchmark one device.
///
/// Prepares a session (queue, input/output buffers, compiled kernel), times
/// `loop_count` rounds of dispatch + blocking readback, and keeps the fastest
/// round. The session and everything it holds is released before returning.
pub fn run<R: ComputeRuntime>(
    runtime: &R,
    device: &Device<R::Handle>,
    source: &KernelSource,
    config: &BenchConfig,
) -> Result<BenchReport> {
    let input = workload::init_input(config.buffer_size);
    let mut session = runtime.prepare(device, source, &input)?;
    let mut output = vec![0.0f32; session.element_count()];

    let best = measure_best(config.loop_count, || session.dispatch_and_read(&mut output))?;

    tracing::debug!(
        device = %device.descriptor.device_name,
        best_us = best.as_micros() as u64,
        "device benchmark finished"
    );

    Ok(BenchReport { best, output })
}
