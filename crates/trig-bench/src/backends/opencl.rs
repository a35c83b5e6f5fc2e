//! OpenCL compute backend
//!
//! Enumerates every device of every OpenCL platform:
//! - NVIDIA GPUs
//! - AMD GPUs
//! - Intel GPUs and CPUs
//! - Apple GPUs (via OpenCL 1.2)
//!
//! NOTE: `ocl::Kernel` holds raw pointers and is neither `Send` nor `Sync`.
//! Sessions are used from the benchmark thread only.

use crate::domain::ByteOrder;
use crate::error::{BenchError, Result};
use crate::ports::{
    ComputeRuntime, Device, DeviceDescriptor, KernelDispatch, KernelSource, KERNEL_ENTRY_POINT,
};
use ocl::core::{DeviceInfo, DeviceInfoResult};

/// Platform and device pair as seen by `ocl`.
#[derive(Debug, Clone, Copy)]
pub struct OpenCLHandle {
    platform: ocl::Platform,
    device: ocl::Device,
}

/// OpenCL runtime via the `ocl` crate
#[derive(Debug, Default)]
pub struct OpenCLRuntime;

impl OpenCLRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn describe(platform_name: &str, device: &ocl::Device) -> Result<DeviceDescriptor> {
    let device_name = device
        .name()
        .map_err(|e| BenchError::Enumeration(format!("device name query failed: {}", e)))?;

    let max_mem_alloc_size = match device.info(DeviceInfo::MaxMemAllocSize) {
        Ok(DeviceInfoResult::MaxMemAllocSize(n)) => n,
        Ok(other) => {
            return Err(BenchError::Enumeration(format!(
                "unexpected MaxMemAllocSize result on {}: {:?}",
                device_name, other
            )))
        }
        Err(e) => {
            return Err(BenchError::Enumeration(format!(
                "MaxMemAllocSize query failed on {}: {}",
                device_name, e
            )))
        }
    };

    // Devices that do not answer are assumed to match the host.
    let byte_order = device
        .info(DeviceInfo::EndianLittle)
        .ok()
        .and_then(|v| match v {
            DeviceInfoResult::EndianLittle(little) => Some(ByteOrder::from_little_endian(little)),
            _ => None,
        })
        .unwrap_or_else(ByteOrder::native);

    Ok(DeviceDescriptor {
        platform_name: platform_name.to_string(),
        device_name,
        max_mem_alloc_size,
        byte_order,
    })
}

/// Whether a `DeviceInfo::Available` answer allows the device to be used.
///
/// A failed or unexpected query counts as unavailable.
fn reports_available(answer: Option<DeviceInfoResult>) -> bool {
    matches!(answer, Some(DeviceInfoResult::Available(true)))
}

impl ComputeRuntime for OpenCLRuntime {
    type Handle = OpenCLHandle;
    type Session = OpenCLSession;

    fn name(&self) -> &str {
        "opencl"
    }

    fn enumerate(&self) -> Result<Vec<Device<OpenCLHandle>>> {
        // Use ocl::core::get_platform_ids() directly - it returns Result instead of panicking
        let platform_ids = ocl::core::get_platform_ids().map_err(|e| {
            BenchError::Enumeration(format!(
                "Failed to get OpenCL platforms: {}. Is OpenCL installed?",
                e
            ))
        })?;

        let mut devices = Vec::new();
        for platform_id in platform_ids {
            let platform = ocl::Platform::new(platform_id);
            let platform_name = platform
                .name()
                .map_err(|e| BenchError::Enumeration(format!("platform name query failed: {}", e)))?;

            let listed = ocl::Device::list_all(platform)
                .map_err(|e| BenchError::Enumeration(format!("{}: {}", platform_name, e)))?;

            for device in listed {
                if !reports_available(device.info(DeviceInfo::Available).ok()) {
                    tracing::info!(
                        platform = %platform_name,
                        device = %device.name().unwrap_or_default(),
                        "skipping unavailable OpenCL device"
                    );
                    continue;
                }

                let descriptor = describe(&platform_name, &device)?;
                tracing::debug!(
                    platform = %descriptor.platform_name,
                    device = %descriptor.device_name,
                    byte_order = %descriptor.byte_order,
                    "OpenCL device found"
                );
                devices.push(Device {
                    descriptor,
                    handle: OpenCLHandle { platform, device },
                });
            }
        }

        Ok(devices)
    }

    fn prepare(
        &self,
        device: &Device<OpenCLHandle>,
        source: &KernelSource,
        input: &[f32],
    ) -> Result<OpenCLSession> {
        let name = device.descriptor.device_name.clone();
        let OpenCLHandle {
            platform,
            device: cl_device,
        } = device.handle;
        let alloc_err = |e: ocl::Error| BenchError::BufferAllocation {
            device: name.clone(),
            message: e.to_string(),
        };
        let build_err = |e: ocl::Error| BenchError::Compilation {
            device: name.clone(),
            message: e.to_string(),
        };

        let context = ocl::Context::builder()
            .platform(platform)
            .devices(cl_device)
            .build()
            .map_err(alloc_err)?;

        let queue = ocl::Queue::new(&context, cl_device, None).map_err(alloc_err)?;

        let byte_order = device.descriptor.byte_order;
        let mut device_input = input.to_vec();
        byte_order.convert(&mut device_input);

        let input_buf = ocl::Buffer::<f32>::builder()
            .queue(queue.clone())
            .flags(ocl::flags::MemFlags::new().read_only())
            .len(input.len())
            .copy_host_slice(&device_input)
            .build()
            .map_err(alloc_err)?;

        let output_buf = ocl::Buffer::<f32>::builder()
            .queue(queue.clone())
            .flags(ocl::flags::MemFlags::new().write_only())
            .len(input.len())
            .build()
            .map_err(alloc_err)?;

        // Build failures carry the device build log in their message.
        let program = ocl::Program::builder()
            .src(source.text())
            .devices(cl_device)
            .build(&context)
            .map_err(build_err)?;

        let kernel = ocl::Kernel::builder()
            .program(&program)
            .name(KERNEL_ENTRY_POINT)
            .queue(queue.clone())
            .global_work_size(input.len())
            .arg(&input_buf) // 0: in
            .arg(&output_buf) // 1: out
            .arg(input.len() as i32) // 2: n
            .build()
            .map_err(build_err)?;

        tracing::debug!(device = %name, source = source.origin(), "kernel built");

        Ok(OpenCLSession {
            device_name: name,
            byte_order,
            queue,
            kernel,
            _input: input_buf,
            output: output_buf,
            len: input.len(),
        })
    }
}

/// Queue, buffers and kernel of one OpenCL device benchmark
///
/// Dropping the session releases every OpenCL object it holds.
pub struct OpenCLSession {
    device_name: String,
    byte_order: ByteOrder,
    queue: ocl::Queue,
    kernel: ocl::Kernel,
    _input: ocl::Buffer<f32>,
    output: ocl::Buffer<f32>,
    len: usize,
}

impl KernelDispatch for OpenCLSession {
    fn element_count(&self) -> usize {
        self.len
    }

    fn dispatch_and_read(&mut self, output: &mut [f32]) -> Result<()> {
        if output.len() != self.len {
            return Err(BenchError::Readback {
                device: self.device_name.clone(),
                message: format!(
                    "host buffer holds {} elements, device buffer {}",
                    output.len(),
                    self.len
                ),
            });
        }

        // SAFETY: all three kernel arguments were bound at build time to
        // buffers of `self.len` elements owned by this session, and the
        // global work size equals `self.len`.
        unsafe {
            self.kernel.enq().map_err(|e| BenchError::Dispatch {
                device: self.device_name.clone(),
                message: e.to_string(),
            })?;
        }

        self.queue.finish().map_err(|e| BenchError::Dispatch {
            device: self.device_name.clone(),
            message: e.to_string(),
        })?;

        self.output
            .read(&mut output[..])
            .enq()
            .map_err(|e| BenchError::Readback {
                device: self.device_name.clone(),
                message: e.to_string(),
            })?;

        self.byte_order.convert(output);
        Ok(())
    }
}
