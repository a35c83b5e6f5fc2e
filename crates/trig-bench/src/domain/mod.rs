//! Domain layer: pure workload, timing and configuration logic, no I/O.

pub mod config;
pub mod timing;
pub mod workload;

pub use config::{BenchConfig, RuntimeKind};
pub use timing::{format_millis, format_thousands, measure_best, BestOf};
pub use workload::{ByteOrder, Verification, TERM_COUNT};
