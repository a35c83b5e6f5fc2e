//! The benchmark workload
//!
//! Every element `x` of the input buffer maps to
//!
//! ```text
//! total = Σ_{j=0}^{99} cos(x * j) * sin(j)
//! ```
//!
//! `x * j` is formed in `f32`, the trigonometry runs in `f64`, and the running
//! total is narrowed back to `f32` after every term. The OpenCL kernel in
//! `kernels/bench.cl` computes the same sum in single precision, so the two
//! paths agree within tolerance rather than bit for bit.

use rayon::prelude::*;
use std::fmt::Write as _;

/// Number of accumulated cos/sin terms per element.
pub const TERM_COUNT: usize = 100;

/// Evaluate the accumulation for a single input value.
pub fn evaluate(x: f32) -> f32 {
    let mut total = 0.0f32;
    for j in 0..TERM_COUNT {
        let term = f64::from(x * j as f32).cos() * (j as f64).sin();
        total = (f64::from(total) + term) as f32;
    }
    total
}

/// Input buffer: `in[i] == i as f32`.
///
/// Every integer up to 2^24 is exact in `f32`, which covers any buffer size
/// this tool allocates by default.
pub fn init_input(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32).collect()
}

/// One full single-threaded pass over the buffer.
pub fn compute_into(input: &[f32], output: &mut [f32]) {
    for (out, &x) in output.iter_mut().zip(input) {
        *out = evaluate(x);
    }
}

/// One full pass split across the Rayon pool.
pub fn par_compute_into(input: &[f32], output: &mut [f32]) {
    output
        .par_iter_mut()
        .zip(input.par_iter())
        .for_each(|(out, &x)| *out = evaluate(x));
}

/// Relative error between two results, with magnitudes below 1 treated as 1.
///
/// Sums that cancel to near zero would otherwise turn evaluation-order noise
/// into huge relative errors.
pub fn relative_error(expected: f32, actual: f32) -> f32 {
    let scale = expected.abs().max(actual.abs()).max(1.0);
    (expected - actual).abs() / scale
}

/// Whether `actual` matches `expected` within relative `tolerance`.
pub fn within_tolerance(expected: f32, actual: f32, tolerance: f32) -> bool {
    relative_error(expected, actual) <= tolerance
}

/// Outcome of comparing a device buffer against the CPU reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Number of element pairs compared
    pub checked: usize,
    /// Pairs outside tolerance, plus any length difference
    pub mismatches: usize,
    /// Largest relative error seen
    pub worst_relative_error: f32,
}

impl Verification {
    pub fn is_clean(&self) -> bool {
        self.mismatches == 0
    }
}

/// Compare `actual` against `expected` element by element.
pub fn verify(expected: &[f32], actual: &[f32], tolerance: f32) -> Verification {
    let mut mismatches = expected.len().abs_diff(actual.len());
    let mut worst = 0.0f32;
    let mut checked = 0;

    for (&e, &a) in expected.iter().zip(actual) {
        checked += 1;
        let err = relative_error(e, a);
        if err.is_nan() || err > tolerance {
            mismatches += 1;
        }
        if err.is_nan() || err > worst {
            worst = err;
        }
    }

    Verification {
        checked,
        mismatches,
        worst_relative_error: worst,
    }
}

/// Render a result buffer as `"%.2f,"` per element.
pub fn render_results(values: &[f32]) -> String {
    let mut rendered = String::with_capacity(values.len() * 8);
    for value in values {
        // Writing into a String cannot fail.
        let _ = write!(rendered, "{:.2},", value);
    }
    rendered
}

/// Byte order of a compute device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Byte order of the host running this process.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn from_little_endian(little: bool) -> Self {
        if little {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    /// Reorder host floats for a device with this byte order.
    ///
    /// The swap is its own inverse, so the same call converts readback data
    /// back into host order.
    pub fn convert(self, values: &mut [f32]) {
        if self != ByteOrder::native() {
            for value in values.iter_mut() {
                *value = f32::from_bits(value.to_bits().swap_bytes());
            }
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteOrder::Little => write!(f, "little-endian"),
            ByteOrder::Big => write!(f, "big-endian"),
        }
    }
}
