//! Console report
//!
//! ```text
//! ====
//! Reference
//! 1,234.57 ms
//! ====
//! Platform: NVIDIA CUDA
//! Device: NVIDIA GeForce RTX 3080
//! MaxMemAllocSize: 2,625,634,304
//! 12.34 ms
//! ```

use crate::domain::{format_millis, format_thousands, workload};
use crate::ports::DeviceDescriptor;
use std::io::{self, Write};
use std::time::Duration;

const SEPARATOR: &str = "====";

/// Writes benchmark sections to any `Write` sink, normally stdout.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Separator plus a title line, e.g. `Reference`.
    pub fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, "{}", title)
    }

    /// Separator plus platform, device and allocation limit.
    pub fn device(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()> {
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out, "Platform: {}", descriptor.platform_name)?;
        writeln!(self.out, "Device: {}", descriptor.device_name)?;
        writeln!(
            self.out,
            "MaxMemAllocSize: {}",
            format_thousands(descriptor.max_mem_alloc_size)
        )
    }

    /// The fastest pass of a benchmark.
    pub fn timing(&mut self, best: Duration) -> io::Result<()> {
        writeln!(self.out, "{}", format_millis(best))?;
        self.out.flush()
    }

    /// The rendered output buffer.
    pub fn results(&mut self, values: &[f32]) -> io::Result<()> {
        writeln!(self.out, "Results: {}", workload::render_results(values))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
