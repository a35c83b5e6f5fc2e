//! Software compute backend using Rayon
//!
//! An in-process stand-in for an accelerator runtime. Each "dispatch" runs
//! the workload across the Rayon pool. It always works, which makes it the
//! default runtime in builds without OpenCL and the runtime the test suite
//! drives. Faults can be injected at enumeration, compilation and dispatch
//! time to exercise the error paths of the benchmark.

use crate::domain::workload;
use crate::domain::ByteOrder;
use crate::error::{BenchError, Result};
use crate::ports::{
    ComputeRuntime, Device, DeviceDescriptor, KernelDispatch, KernelSource, KERNEL_ENTRY_POINT,
};

/// Platform name reported for the default software device.
pub const SOFTWARE_PLATFORM: &str = "trig-bench Software";

/// Allocation limit reported for the default software device (1 GiB).
pub const SOFTWARE_MAX_ALLOC: u64 = 1 << 30;

#[derive(Debug, Clone, Default)]
struct Faults {
    enumeration: Option<String>,
    compile_on: Option<String>,
    /// (device name, passes that succeed before the failing one)
    dispatch_on: Option<(String, usize)>,
}

/// Rayon-backed compute runtime
#[derive(Debug, Clone)]
pub struct SoftwareRuntime {
    devices: Vec<DeviceDescriptor>,
    faults: Faults,
}

impl SoftwareRuntime {
    /// One software device sized to the host's cores.
    pub fn new() -> Self {
        let cores = num_cpus::get();
        Self::empty().with_device(
            SOFTWARE_PLATFORM,
            format!("Rayon ({} cores)", cores),
            SOFTWARE_MAX_ALLOC,
        )
    }

    /// A runtime that enumerates no devices.
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
            faults: Faults::default(),
        }
    }

    /// Add a native-order device.
    pub fn with_device(
        self,
        platform_name: impl Into<String>,
        device_name: impl Into<String>,
        max_mem_alloc_size: u64,
    ) -> Self {
        self.with_descriptor(DeviceDescriptor {
            platform_name: platform_name.into(),
            device_name: device_name.into(),
            max_mem_alloc_size,
            byte_order: ByteOrder::native(),
        })
    }

    pub fn with_descriptor(mut self, descriptor: DeviceDescriptor) -> Self {
        self.devices.push(descriptor);
        self
    }

    /// Make `enumerate` fail with `message`.
    pub fn fail_enumeration(mut self, message: impl Into<String>) -> Self {
        self.faults.enumeration = Some(message.into());
        self
    }

    /// Make kernel compilation fail on the named device.
    pub fn fail_compile_on(mut self, device_name: impl Into<String>) -> Self {
        self.faults.compile_on = Some(device_name.into());
        self
    }

    /// Let `passes` dispatches succeed on the named device, then fail.
    pub fn fail_dispatch_on(mut self, device_name: impl Into<String>, passes: usize) -> Self {
        self.faults.dispatch_on = Some((device_name.into(), passes));
        self
    }
}

impl Default for SoftwareRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeRuntime for SoftwareRuntime {
    type Handle = usize;
    type Session = SoftwareSession;

    fn name(&self) -> &str {
        "software"
    }

    fn enumerate(&self) -> Result<Vec<Device<usize>>> {
        if let Some(message) = &self.faults.enumeration {
            return Err(BenchError::Enumeration(message.clone()));
        }

        Ok(self
            .devices
            .iter()
            .cloned()
            .enumerate()
            .map(|(handle, descriptor)| Device { descriptor, handle })
            .collect())
    }

    fn prepare(
        &self,
        device: &Device<usize>,
        source: &KernelSource,
        input: &[f32],
    ) -> Result<SoftwareSession> {
        let descriptor = self.devices.get(device.handle).ok_or_else(|| {
            BenchError::BufferAllocation {
                device: device.descriptor.device_name.clone(),
                message: format!("unknown software device handle {}", device.handle),
            }
        })?;
        let device_name = descriptor.device_name.clone();

        let bytes = (input.len() * std::mem::size_of::<f32>()) as u64;
        if bytes > descriptor.max_mem_alloc_size {
            return Err(BenchError::BufferAllocation {
                device: device_name,
                message: format!(
                    "{} bytes exceeds max allocation of {} bytes",
                    bytes, descriptor.max_mem_alloc_size
                ),
            });
        }

        if !source.defines_entry_point(KERNEL_ENTRY_POINT) {
            return Err(BenchError::Compilation {
                device: device_name,
                message: format!(
                    "no kernel named `{}` in {}",
                    KERNEL_ENTRY_POINT,
                    source.origin()
                ),
            });
        }
        if self.faults.compile_on.as_deref() == Some(device_name.as_str()) {
            return Err(BenchError::Compilation {
                device: device_name,
                message: "injected build failure".to_string(),
            });
        }

        let remaining_passes = match &self.faults.dispatch_on {
            Some((name, passes)) if *name == device_name => Some(*passes),
            _ => None,
        };

        // Upload: the device buffer holds the input in device byte order.
        let mut device_input = input.to_vec();
        descriptor.byte_order.convert(&mut device_input);

        Ok(SoftwareSession {
            device_name,
            byte_order: descriptor.byte_order,
            device_input,
            device_output: vec![0.0; input.len()],
            remaining_passes,
        })
    }
}

/// Buffers and state of one software device benchmark
pub struct SoftwareSession {
    device_name: String,
    byte_order: ByteOrder,
    device_input: Vec<f32>,
    device_output: Vec<f32>,
    remaining_passes: Option<usize>,
}

impl KernelDispatch for SoftwareSession {
    fn element_count(&self) -> usize {
        self.device_input.len()
    }

    fn dispatch_and_read(&mut self, output: &mut [f32]) -> Result<()> {
        if let Some(remaining) = self.remaining_passes.as_mut() {
            if *remaining == 0 {
                return Err(BenchError::Dispatch {
                    device: self.device_name.clone(),
                    message: "injected dispatch failure".to_string(),
                });
            }
            *remaining -= 1;
        }

        if output.len() != self.device_output.len() {
            return Err(BenchError::Readback {
                device: self.device_name.clone(),
                message: format!(
                    "host buffer holds {} elements, device buffer {}",
                    output.len(),
                    self.device_output.len()
                ),
            });
        }

        // The "device" decodes its input, runs the kernel, and stores the
        // result in its own byte order.
        let mut decoded = self.device_input.clone();
        self.byte_order.convert(&mut decoded);
        workload::par_compute_into(&decoded, &mut self.device_output);
        self.byte_order.convert(&mut self.device_output);

        // Readback, then back to host order.
        output.copy_from_slice(&self.device_output);
        self.byte_order.convert(output);
        Ok(())
    }
}
