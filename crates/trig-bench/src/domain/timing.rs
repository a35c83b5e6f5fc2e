//! Minimum-of-N timing and console number formatting

use std::time::{Duration, Instant};

/// Tracks the fastest of a series of timing samples.
///
/// The reported figure is always the minimum, never the mean or the last
/// sample.
#[derive(Debug, Clone, Default)]
pub struct BestOf {
    best: Option<Duration>,
    samples: usize,
}

impl BestOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample.
    pub fn record(&mut self, sample: Duration) {
        self.samples += 1;
        self.best = Some(match self.best {
            Some(best) => best.min(sample),
            None => sample,
        });
    }

    /// Fastest sample so far, `None` before the first `record`.
    pub fn best(&self) -> Option<Duration> {
        self.best
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Run `pass` `repetitions` times and return the fastest wall-clock duration.
///
/// The first failing pass aborts the measurement. `repetitions` must be at
/// least one; zero yields `Duration::ZERO`.
pub fn measure_best<E, F>(repetitions: usize, mut pass: F) -> Result<Duration, E>
where
    F: FnMut() -> Result<(), E>,
{
    let mut best = BestOf::new();
    for iteration in 0..repetitions {
        let start = Instant::now();
        pass()?;
        let elapsed = start.elapsed();
        tracing::debug!(iteration, elapsed_us = elapsed.as_micros() as u64, "pass finished");
        best.record(elapsed);
    }

    let fastest = best.best().unwrap_or_default();
    tracing::debug!(
        samples = best.samples(),
        best_us = fastest.as_micros() as u64,
        "measurement finished"
    );
    Ok(fastest)
}

/// Format a duration as `"%,.2f ms"`, e.g. `1,234.57 ms`.
pub fn format_millis(duration: Duration) -> String {
    let millis = duration.as_secs_f64() * 1000.0;
    let fixed = format!("{:.2}", millis);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}.{} ms", group_digits(whole), fraction)
}

/// Format an integer with `,` thousands separators, e.g. `1,073,741,824`.
pub fn format_thousands(value: u64) -> String {
    group_digits(&value.to_string())
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_best_of_reports_minimum() {
        let mut best = BestOf::new();
        for sample in [5, 3, 8, 3, 9] {
            best.record(ms(sample));
        }
        assert_eq!(best.best(), Some(ms(3)));
        assert_eq!(best.samples(), 5);
    }

    #[test]
    fn test_best_of_empty() {
        assert_eq!(BestOf::new().best(), None);
    }

    #[test]
    fn test_measure_best_runs_every_repetition() {
        let mut calls = 0;
        let best = measure_best(4, || {
            calls += 1;
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(calls, 4);
        assert!(best < Duration::from_secs(1));
    }

    #[test]
    fn test_measure_best_without_repetitions_is_zero() {
        let best = measure_best(0, || Err::<(), _>("never called")).unwrap();
        assert_eq!(best, Duration::ZERO);
    }

    #[test]
    fn test_measure_best_stops_on_first_error() {
        let mut calls = 0;
        let result = measure_best(10, || {
            calls += 1;
            if calls == 3 {
                Err("boom")
            } else {
                Ok(())
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(Duration::from_micros(1_234_567)), "1,234.57 ms");
        assert_eq!(format_millis(Duration::from_micros(12_340)), "12.34 ms");
        assert_eq!(format_millis(Duration::ZERO), "0.00 ms");
        assert_eq!(format_millis(Duration::from_secs(1_000)), "1,000,000.00 ms");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(1_073_741_824), "1,073,741,824");
    }

    proptest! {
        #[test]
        fn prop_best_of_is_minimum(samples in proptest::collection::vec(0u64..10_000, 1..64)) {
            let mut best = BestOf::new();
            for &sample in &samples {
                best.record(Duration::from_micros(sample));
            }
            let expected = samples.iter().copied().min().map(Duration::from_micros);
            prop_assert_eq!(best.best(), expected);
        }

        #[test]
        fn prop_format_thousands_round_trips(value in any::<u64>()) {
            let formatted = format_thousands(value);
            prop_assert_eq!(formatted.replace(',', "").parse::<u64>().unwrap(), value);
            prop_assert!(formatted.split(',').skip(1).all(|group| group.len() == 3));
        }
    }
}
