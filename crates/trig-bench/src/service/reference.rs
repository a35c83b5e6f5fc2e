//! CPU reference benchmark

use super::BenchReport;
use crate::domain::{measure_best, workload, BenchConfig};
use std::convert::Infallible;

/// Time the single-threaded pass, `loop_count` times, keep the fastest.
pub fn run(config: &BenchConfig) -> BenchReport {
    run_with(config, workload::compute_into)
}

/// Same as [`run`] with each pass split across the Rayon pool.
pub fn run_parallel(config: &BenchConfig) -> BenchReport {
    run_with(config, workload::par_compute_into)
}

fn run_with(config: &BenchConfig, pass: fn(&[f32], &mut [f32])) -> BenchReport {
    let input = workload::init_input(config.buffer_size);
    let mut output = vec![0.0f32; config.buffer_size];

    let best = measure_best(config.loop_count, || {
        pass(&input, &mut output);
        Ok::<(), Infallible>(())
    })
    .unwrap_or_else(|never| match never {});

    BenchReport { best, output }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TERM_COUNT;
    use proptest::prelude::*;

    fn small(buffer_size: usize) -> BenchConfig {
        BenchConfig::default()
            .with_buffer_size(buffer_size)
            .with_loop_count(2)
    }

    #[test]
    fn test_first_element_is_sum_of_sines() {
        let report = run(&small(4));
        let expected: f64 = (0..TERM_COUNT).map(|j| (j as f64).sin()).sum();

        assert_eq!(report.output.len(), 4);
        assert!(workload::within_tolerance(expected as f32, report.output[0], 1e-3));
    }

    #[test]
    fn test_parallel_reference_agrees() {
        let serial = run(&small(1000));
        let parallel = run_parallel(&small(1000));
        assert_eq!(serial.output, parallel.output);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_output_matches_formula(buffer_size in 1usize..300) {
            let report = run(&small(buffer_size));
            prop_assert_eq!(report.output.len(), buffer_size);

            for (i, &value) in report.output.iter().enumerate() {
                let expected: f64 = (0..TERM_COUNT)
                    .map(|j| ((i * j) as f64).cos() * (j as f64).sin())
                    .sum();
                prop_assert!(workload::within_tolerance(expected as f32, value, 1e-3));
            }
        }
    }
}
