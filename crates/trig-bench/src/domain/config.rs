//! Benchmark configuration from environment variables.
//!
//! # Example
//!
//! ```ignore
//! use trig_bench::domain::BenchConfig;
//!
//! let config = BenchConfig::default()
//!     .with_buffer_size(4)
//!     .with_loop_count(1);
//! config.validate()?;
//! ```

use crate::error::{BenchError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Elements per buffer (100 × 1024).
pub const DEFAULT_BUFFER_SIZE: usize = 100 * 1024;

/// Timed repetitions per benchmark.
pub const DEFAULT_LOOP_COUNT: usize = 10;

/// Relative tolerance for CPU/device comparison.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;

const ENV_PREFIX: &str = "TRIG_BENCH_";

/// Which compute runtime supplies the devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    /// OpenCL platforms and devices via `ocl`
    OpenCL,
    /// In-process software device backed by Rayon
    Software,
}

impl Default for RuntimeKind {
    fn default() -> Self {
        if cfg!(feature = "opencl") {
            RuntimeKind::OpenCL
        } else {
            RuntimeKind::Software
        }
    }
}

impl FromStr for RuntimeKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "opencl" | "ocl" | "cl" => Ok(RuntimeKind::OpenCL),
            "software" | "cpu" | "sw" => Ok(RuntimeKind::Software),
            other => Err(BenchError::InvalidConfig(format!(
                "unknown runtime '{}' (expected 'opencl' or 'software')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeKind::OpenCL => write!(f, "opencl"),
            RuntimeKind::Software => write!(f, "software"),
        }
    }
}

/// Complete benchmark configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Elements in the input and output buffers.
    pub buffer_size: usize,
    /// Timed repetitions; the fastest is reported.
    pub loop_count: usize,
    /// Device source.
    pub runtime: RuntimeKind,
    /// Kernel source override; `None` uses the embedded `kernels/bench.cl`.
    pub kernel_path: Option<PathBuf>,
    /// Relative tolerance for device verification.
    pub tolerance: f32,
    /// Compare every device output against the CPU reference.
    pub verify: bool,
    /// Also time the reference pass on the Rayon pool.
    pub parallel_reference: bool,
    /// Print the rendered result buffer after each benchmark.
    pub dump_results: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            loop_count: DEFAULT_LOOP_COUNT,
            runtime: RuntimeKind::default(),
            kernel_path: None,
            tolerance: DEFAULT_TOLERANCE,
            verify: true,
            parallel_reference: false,
            dump_results: false,
        }
    }
}

impl BenchConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TRIG_BENCH_BUFFER_SIZE`: Elements per buffer (default: 102400)
    /// - `TRIG_BENCH_LOOP_COUNT`: Timed repetitions (default: 10)
    /// - `TRIG_BENCH_RUNTIME`: `opencl` or `software`
    /// - `TRIG_BENCH_KERNEL_PATH`: Kernel source file (default: embedded)
    /// - `TRIG_BENCH_TOLERANCE`: Relative tolerance (default: 1e-3)
    /// - `TRIG_BENCH_VERIFY`: Verify device output (default: true)
    /// - `TRIG_BENCH_PARALLEL_REFERENCE`: Time the Rayon reference (default: false)
    /// - `TRIG_BENCH_DUMP_RESULTS`: Print result buffers (default: false)
    ///
    /// The log level is read separately by [`log_level_from_env`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Numeric and boolean values that fail to parse keep their default and
    /// log a warning. An unknown runtime name is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(value) = var("BUFFER_SIZE") {
            config.buffer_size = parse_or("BUFFER_SIZE", &value, config.buffer_size);
        }
        if let Some(value) = var("LOOP_COUNT") {
            config.loop_count = parse_or("LOOP_COUNT", &value, config.loop_count);
        }
        if let Some(value) = var("RUNTIME") {
            config.runtime = value.parse()?;
        }
        if let Some(value) = var("KERNEL_PATH") {
            if !value.trim().is_empty() {
                config.kernel_path = Some(PathBuf::from(value));
            }
        }
        if let Some(value) = var("TOLERANCE") {
            config.tolerance = parse_or("TOLERANCE", &value, config.tolerance);
        }
        if let Some(value) = var("VERIFY") {
            config.verify = flag_or(&value, config.verify);
        }
        if let Some(value) = var("PARALLEL_REFERENCE") {
            config.parallel_reference = flag_or(&value, config.parallel_reference);
        }
        if let Some(value) = var("DUMP_RESULTS") {
            config.dump_results = flag_or(&value, config.dump_results);
        }
        Ok(config)
    }

    /// Reject values the benchmark cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(BenchError::InvalidConfig(
                "buffer_size cannot be 0".to_string(),
            ));
        }

        // The kernel takes the element count as an OpenCL `int`.
        if self.buffer_size > i32::MAX as usize {
            return Err(BenchError::InvalidConfig(format!(
                "buffer_size {} exceeds {}",
                self.buffer_size,
                i32::MAX
            )));
        }

        if self.loop_count == 0 {
            return Err(BenchError::InvalidConfig(
                "loop_count cannot be 0".to_string(),
            ));
        }

        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(BenchError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }

        if self.runtime == RuntimeKind::OpenCL && !cfg!(feature = "opencl") {
            return Err(BenchError::InvalidConfig(
                "runtime 'opencl' requested but this build lacks the `opencl` feature".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style method to set the buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Builder-style method to set the repetition count
    pub fn with_loop_count(mut self, loop_count: usize) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Builder-style method to set the runtime
    pub fn with_runtime(mut self, runtime: RuntimeKind) -> Self {
        self.runtime = runtime;
        self
    }

    /// Builder-style method to set the kernel source path
    pub fn with_kernel_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.kernel_path = Some(path.into());
        self
    }

    pub fn with_parallel_reference(mut self, enabled: bool) -> Self {
        self.parallel_reference = enabled;
        self
    }

    pub fn with_dump_results(mut self, enabled: bool) -> Self {
        self.dump_results = enabled;
        self
    }

    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }
}

/// Log level used when neither `TRIG_BENCH_LOG_LEVEL` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracing filter directives: `TRIG_BENCH_LOG_LEVEL`, then `RUST_LOG`, then
/// `info`.
///
/// Read on its own so tracing can be installed before the rest of the
/// configuration is parsed.
pub fn log_level_from_env() -> String {
    log_level_from_lookup(|key| env::var(key).ok())
}

/// [`log_level_from_env`] over an arbitrary key lookup.
pub fn log_level_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&format!("{}LOG_LEVEL", ENV_PREFIX))
        .or_else(|| lookup("RUST_LOG"))
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn parse_or<T>(name: &str, value: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(
                "{}{}={:?} is not valid, keeping {}",
                ENV_PREFIX,
                name,
                value,
                default
            );
            default
        }
    }
}

fn flag_or(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
