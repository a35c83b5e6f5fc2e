//! End-to-end runs of the benchmark against the software runtime.

use trig_bench::backends::software::{SoftwareRuntime, SOFTWARE_MAX_ALLOC};
use trig_bench::domain::workload::{self, TERM_COUNT};
use trig_bench::{run_on, BenchConfig, BenchError, BenchmarkRunner, KernelSource, RuntimeKind};

fn tiny_config() -> BenchConfig {
    BenchConfig::default()
        .with_runtime(RuntimeKind::Software)
        .with_buffer_size(4)
        .with_loop_count(1)
}

fn lines(bytes: Vec<u8>) -> Vec<String> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn is_timing(line: &str) -> bool {
    line.ends_with(" ms")
        && line
            .trim_end_matches(" ms")
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

#[test]
fn four_element_run_agrees_with_formula_on_cpu_and_device() {
    let runtime = SoftwareRuntime::new();
    let config = tiny_config();
    let source = KernelSource::embedded();

    let summary = run_on(&runtime, &config, &source, Vec::new()).unwrap();

    let sum_of_sines: f64 = (0..TERM_COUNT).map(|j| (j as f64).sin()).sum();
    assert!(workload::within_tolerance(
        sum_of_sines as f32,
        summary.reference.output[0],
        1e-3
    ));

    assert_eq!(summary.devices.len(), 1);
    let device = &summary.devices[0];
    assert_eq!(device.report.output.len(), 4);
    for (cpu, dev) in summary.reference.output.iter().zip(&device.report.output) {
        assert!(workload::within_tolerance(*cpu, *dev, 1e-3));
    }
    assert!(device.verification.as_ref().unwrap().is_clean());
}

#[test]
fn report_layout_matches_console_format() {
    let runtime = SoftwareRuntime::empty().with_device("Test Platform", "Test Device", 1_073_741_824);
    let config = tiny_config();
    let source = KernelSource::embedded();
    let mut runner = BenchmarkRunner::new(&runtime, &config, &source, Vec::new());

    runner.run().unwrap();
    let lines = lines(runner.into_writer());

    assert_eq!(lines.len(), 8, "{:?}", lines);
    assert_eq!(lines[0], "====");
    assert_eq!(lines[1], "Reference");
    assert!(is_timing(&lines[2]), "{}", lines[2]);
    assert_eq!(lines[3], "====");
    assert_eq!(lines[4], "Platform: Test Platform");
    assert_eq!(lines[5], "Device: Test Device");
    assert_eq!(lines[6], "MaxMemAllocSize: 1,073,741,824");
    assert!(is_timing(&lines[7]), "{}", lines[7]);
}

#[test]
fn zero_devices_still_runs_reference() {
    let runtime = SoftwareRuntime::empty();
    let config = tiny_config();
    let source = KernelSource::embedded();
    let mut runner = BenchmarkRunner::new(&runtime, &config, &source, Vec::new());

    let summary = runner.run().unwrap();
    assert!(summary.devices.is_empty());
    assert_eq!(summary.reference.output.len(), 4);

    let lines = lines(runner.into_writer());
    assert_eq!(lines.len(), 3);
    assert!(!lines.iter().any(|l| l.starts_with("Platform:")));
}

#[test]
fn every_device_of_every_platform_is_benchmarked_in_order() {
    let runtime = SoftwareRuntime::empty()
        .with_device("Platform A", "A0", SOFTWARE_MAX_ALLOC)
        .with_device("Platform A", "A1", SOFTWARE_MAX_ALLOC)
        .with_device("Platform B", "B0", SOFTWARE_MAX_ALLOC);
    let config = tiny_config();
    let source = KernelSource::embedded();

    let summary = run_on(&runtime, &config, &source, Vec::new()).unwrap();
    let names: Vec<&str> = summary
        .devices
        .iter()
        .map(|d| d.descriptor.device_name.as_str())
        .collect();
    assert_eq!(names, vec!["A0", "A1", "B0"]);
}

#[test]
fn enumeration_failure_aborts_after_reference() {
    let runtime = SoftwareRuntime::new().fail_enumeration("no platforms");
    let config = tiny_config();
    let source = KernelSource::embedded();
    let mut runner = BenchmarkRunner::new(&runtime, &config, &source, Vec::new());

    assert!(matches!(runner.run(), Err(BenchError::Enumeration(_))));

    let lines = lines(runner.into_writer());
    assert_eq!(&lines[..2], &["====", "Reference"]);
    assert_eq!(lines.len(), 3);
}

#[test]
fn compilation_failure_aborts_whole_run() {
    let runtime = SoftwareRuntime::empty()
        .with_device("P", "Good", SOFTWARE_MAX_ALLOC)
        .with_device("P", "Bad", SOFTWARE_MAX_ALLOC)
        .with_device("P", "Never", SOFTWARE_MAX_ALLOC)
        .fail_compile_on("Bad");
    let config = tiny_config();
    let source = KernelSource::embedded();
    let mut runner = BenchmarkRunner::new(&runtime, &config, &source, Vec::new());

    match runner.run() {
        Err(BenchError::Compilation { device, .. }) => assert_eq!(device, "Bad"),
        other => panic!("expected compilation failure, got {:?}", other.map(|_| ())),
    }

    let lines = lines(runner.into_writer());
    assert!(lines.contains(&"Device: Good".to_string()));
    assert!(lines.contains(&"Device: Bad".to_string()));
    assert!(!lines.contains(&"Device: Never".to_string()));
}

#[test]
fn kernel_without_entry_point_fails_to_compile() {
    let runtime = SoftwareRuntime::new();
    let config = tiny_config();
    let source = KernelSource::from_text("empty.cl", "// nothing here");

    let result = run_on(&runtime, &config, &source, Vec::new());
    assert!(matches!(result, Err(BenchError::Compilation { .. })));
}

#[test]
fn dispatch_failure_mid_benchmark_aborts() {
    let runtime = SoftwareRuntime::empty()
        .with_device("P", "Flaky", SOFTWARE_MAX_ALLOC)
        .fail_dispatch_on("Flaky", 3);
    let config = tiny_config().with_loop_count(10);
    let source = KernelSource::embedded();

    let result = run_on(&runtime, &config, &source, Vec::new());
    assert!(matches!(result, Err(BenchError::Dispatch { .. })));
}

#[test]
fn dump_results_prints_each_buffer_once() {
    let runtime = SoftwareRuntime::new();
    let config = tiny_config().with_dump_results(true).with_loop_count(3);
    let source = KernelSource::embedded();
    let mut runner = BenchmarkRunner::new(&runtime, &config, &source, Vec::new());

    let summary = runner.run().unwrap();
    let lines = lines(runner.into_writer());
    let results: Vec<&String> = lines.iter().filter(|l| l.starts_with("Results: ")).collect();

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].as_str(),
        format!("Results: {}", workload::render_results(&summary.reference.output))
    );
}

#[test]
fn kernel_source_override_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.cl");
    std::fs::write(&path, KernelSource::embedded().text()).unwrap();

    let config = tiny_config().with_kernel_path(&path);
    let source = KernelSource::load(config.kernel_path.as_deref()).unwrap();
    assert_eq!(source.origin(), path.display().to_string());

    let summary = run_on(&SoftwareRuntime::new(), &config, &source, Vec::new()).unwrap();
    assert_eq!(summary.devices.len(), 1);
}
