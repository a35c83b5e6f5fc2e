//! Error types for the benchmark

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a benchmark run.
///
/// Nothing is recovered locally: every variant propagates to `main`, after
/// whatever sections were already reported stay on stdout.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    #[error("Failed to load kernel source from {}: {source}", path.display())]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Kernel compilation failed on {device}: {message}")]
    Compilation { device: String, message: String },

    #[error("Buffer or queue allocation failed on {device}: {message}")]
    BufferAllocation { device: String, message: String },

    #[error("Kernel dispatch failed on {device}: {message}")]
    Dispatch { device: String, message: String },

    #[error("Readback failed on {device}: {message}")]
    Readback { device: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Tracing initialization failed: {0}")]
    Telemetry(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
