//! Ports: the capability boundary to the compute runtime
//!
//! The benchmark only needs four things from an accelerator API: list the
//! devices, compile the kernel for one of them, dispatch it over the whole
//! buffer, and read the result back. `ComputeRuntime` and `KernelDispatch`
//! are exactly that surface, so the device benchmark can run against the
//! OpenCL backend or the in-process software backend unchanged.

use crate::domain::ByteOrder;
use crate::error::{BenchError, Result};
use std::path::Path;

/// Kernel function every runtime must find in the source.
pub const KERNEL_ENTRY_POINT: &str = "bench";

const EMBEDDED_KERNEL: &str = include_str!("../../kernels/bench.cl");

/// Read-only metadata of one platform/device pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub platform_name: String,
    pub device_name: String,
    /// Largest single buffer the device accepts, in bytes
    pub max_mem_alloc_size: u64,
    pub byte_order: ByteOrder,
}

/// An enumerated device: its metadata plus the runtime's own handle.
#[derive(Debug, Clone)]
pub struct Device<H> {
    pub descriptor: DeviceDescriptor,
    pub handle: H,
}

/// Kernel program text and where it came from.
#[derive(Debug, Clone)]
pub struct KernelSource {
    origin: String,
    text: String,
}

impl KernelSource {
    /// The `kernels/bench.cl` program compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_text("embedded:bench.cl", EMBEDDED_KERNEL)
    }

    pub fn from_text(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    /// Read a kernel program from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| BenchError::ResourceLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_text(path.display().to_string(), text))
    }

    /// The file at `path` if given, the embedded program otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::embedded()),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the program declares a `__kernel void <name>(` function.
    ///
    /// Only a textual check; the real runtime compiler has the final word.
    pub fn defines_entry_point(&self, name: &str) -> bool {
        let normalized = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        ["__kernel void", "kernel void"].iter().any(|qualifier| {
            normalized.contains(&format!("{} {}(", qualifier, name))
                || normalized.contains(&format!("{} {} (", qualifier, name))
        })
    }
}

/// A compute runtime: device enumeration plus kernel preparation.
pub trait ComputeRuntime {
    /// Runtime-specific device handle.
    type Handle;
    /// Prepared kernel owning its queue, buffers and program.
    type Session: KernelDispatch;

    /// Short name for logs.
    fn name(&self) -> &str;

    /// All devices of all platforms, in runtime order.
    fn enumerate(&self) -> Result<Vec<Device<Self::Handle>>>;

    /// Acquire a queue on `device`, upload `input`, allocate the output
    /// buffer, compile `source`, and bind the kernel arguments
    /// `(input, output, input.len())`.
    ///
    /// Everything acquired here is released when the session is dropped.
    fn prepare(
        &self,
        device: &Device<Self::Handle>,
        source: &KernelSource,
        input: &[f32],
    ) -> Result<Self::Session>;
}

/// A compiled kernel bound to its buffers.
pub trait KernelDispatch {
    /// Elements in the bound buffers.
    fn element_count(&self) -> usize;

    /// Dispatch over the full 1-D range, block until done, then read the
    /// output buffer into `output` in host byte order.
    fn dispatch_and_read(&mut self, output: &mut [f32]) -> Result<()>;
}
