//! End-to-end cross-check runs.

use std::sync::Arc;

use posit8_core::Operation;
use posit8_xcheck::compare::{self, CrossCheck, CrossCheckReport};
use posit8_xcheck::{KernelDevice, table};

use crate::common::{BrokenDevice, ConstantDevice, ReferenceDevice, TestHarness};

const FULL_PAIRS: usize = 255 * 256 / 2;

#[tokio::test]
async fn test_full_table_counts_every_pair() {
    let harness = TestHarness::with_full_table();
    let entries = table::load_values(&harness.table_path).unwrap();
    assert_eq!(entries.len(), 255);

    let check = CrossCheck::new(Arc::new(KernelDevice)).with_echo(false);
    let report = check
        .run("8_bit.csv", &entries, &compare::DEFAULT_OPS)
        .await
        .unwrap();

    assert_eq!(report.tallies.len(), 3);
    assert_eq!(report.tallies[0].op, Operation::Div);
    assert_eq!(report.tallies[1].op, Operation::Add);
    assert_eq!(report.tallies[2].op, Operation::Mul);
    for tally in &report.tallies {
        assert_eq!(tally.total(), FULL_PAIRS, "{}", tally.op);
        assert_eq!(tally.failures, tally.mismatches.len());
    }
}

#[tokio::test]
async fn test_kernel_division_flags_zero_over_zero() {
    let harness = TestHarness::with_full_table();
    let entries = table::load_values(&harness.table_path).unwrap();

    let check = CrossCheck::new(Arc::new(KernelDevice)).with_echo(false);
    let tally = check.run_op(&entries, Operation::Div).await.unwrap();

    let first = &tally.mismatches[0];
    assert_eq!(first.index, 0);
    assert_eq!(first.a, "0.000000");
    assert_eq!(first.device, Some(0.0));
    assert!(first.reference.is_nan());
    assert!(
        tally
            .mismatches
            .windows(2)
            .all(|w| w[0].index < w[1].index)
    );
}

#[tokio::test]
async fn test_reference_device_never_disagrees() {
    let harness = TestHarness::with_full_table();
    let entries = table::load_values(&harness.table_path).unwrap();

    let check = CrossCheck::new(Arc::new(ReferenceDevice))
        .with_jobs(8)
        .with_echo(false);
    let ops = [
        Operation::Div,
        Operation::Add,
        Operation::Mul,
        Operation::Sub,
        Operation::Sigmoid,
    ];
    let report = check.run("8_bit.csv", &entries, &ops).await.unwrap();

    assert_eq!(report.total_failures(), 0);
    assert_eq!(report.tallies[4].total(), 255);
    assert_eq!(
        report.tallies[0].summary_line(),
        format!("we have {FULL_PAIRS} successes, and 0 errors in division mode")
    );
}

#[tokio::test]
async fn test_tally_independent_of_concurrency() {
    let harness = TestHarness::with_values(&["0", "0.5", "1", "1.5", "-3", "48", "0.015625"]);
    let entries = table::load_values(&harness.table_path).unwrap();

    let serial = CrossCheck::new(Arc::new(KernelDevice))
        .with_jobs(1)
        .with_echo(false)
        .run_op(&entries, Operation::Mul)
        .await
        .unwrap();
    let parallel = CrossCheck::new(Arc::new(KernelDevice))
        .with_jobs(16)
        .with_echo(false)
        .run_op(&entries, Operation::Mul)
        .await
        .unwrap();

    assert_eq!(serial.successes, parallel.successes);
    assert_eq!(serial.failures, parallel.failures);
    let serial_idx: Vec<usize> = serial.mismatches.iter().map(|m| m.index).collect();
    let parallel_idx: Vec<usize> = parallel.mismatches.iter().map(|m| m.index).collect();
    assert_eq!(serial_idx, parallel_idx);
}

#[tokio::test]
async fn test_constant_device_is_called_once_per_pair() {
    let harness = TestHarness::with_values(&["1", "2", "4", "8"]);
    let entries = table::load_values(&harness.table_path).unwrap();
    let device = ConstantDevice::new(1.0);

    let check = CrossCheck::new(device.clone()).with_echo(false);
    let tally = check.run_op(&entries, Operation::Add).await.unwrap();

    assert_eq!(device.calls(), 10);
    assert_eq!(tally.total(), 10);
    // no sum of these values is 1
    assert_eq!(tally.successes, 0);
}

#[tokio::test]
async fn test_device_errors_count_as_failures() {
    let harness = TestHarness::with_values(&["1", "2"]);
    let entries = table::load_values(&harness.table_path).unwrap();

    let check = CrossCheck::new(Arc::new(BrokenDevice)).with_echo(false);
    let report = check
        .run("values.csv", &entries, &[Operation::Add])
        .await
        .unwrap();

    let tally = &report.tallies[0];
    assert_eq!(tally.failures, 3);
    assert!(tally.mismatches.iter().all(|m| m.device.is_none()));
    assert!(
        tally.mismatches[0]
            .error
            .as_deref()
            .unwrap()
            .contains("exit status")
    );
}

#[tokio::test]
async fn test_report_written_as_json() {
    let harness = TestHarness::with_values(&["0", "1"]);
    let entries = table::load_values(&harness.table_path).unwrap();

    let check = CrossCheck::new(Arc::new(KernelDevice)).with_echo(false);
    let report = check
        .run("values.csv", &entries, &[Operation::Div])
        .await
        .unwrap();

    let path = harness.path("out/report.json");
    compare::write_report(&path, &report).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let parsed: CrossCheckReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.schema_version, compare::SCHEMA_VERSION);
    assert_eq!(parsed.table, "values.csv");
    assert_eq!(parsed.device, "in-process kernels");
    assert_eq!(parsed.tallies[0].op, Operation::Div);
    assert_eq!(parsed.tallies[0].failures, 1);
    assert!(raw.contains("\"op\": \"div\""));
}
