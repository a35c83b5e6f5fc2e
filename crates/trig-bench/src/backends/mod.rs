//! Compute backends
//!
//! The software backend always compiles. The OpenCL backend links against
//! the system ICD loader and is only built with the `opencl` feature; it
//! detects platforms and devices at runtime.

pub mod software;

#[cfg(feature = "opencl")]
pub mod opencl;
