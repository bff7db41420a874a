//! Subcommand handlers driven with files on disk.

use posit8_core::Operation;
use posit8_core::matrix::Arithmetic;
use posit8_xcheck::XcheckConfig;
use posit8_xcheck::cli::{BenchArgs, Command, RunArgs};
use posit8_xcheck::commands;

use crate::common::TestHarness;

#[tokio::test]
async fn test_cmd_run_from_config() {
    let harness = TestHarness::with_values(&["0.5", "1", "2"]);
    let report_path = harness.path("report.json");
    let config = XcheckConfig {
        table_path: harness.table_path.clone(),
        jobs: Some(2),
        report_path: Some(report_path.clone()),
        ops: vec![Operation::Add, Operation::Mul],
        ..XcheckConfig::default()
    };

    let report = commands::cmd_run(&config, RunArgs::default()).await.unwrap();

    assert_eq!(report.tallies.len(), 2);
    assert!(report.tallies.iter().all(|t| t.total() == 6));
    assert!(report_path.exists());
}

#[tokio::test]
async fn test_cmd_run_flags_override_config() {
    let harness = TestHarness::with_values(&["1", "-1"]);
    let args = RunArgs {
        table: Some(harness.table_path.clone()),
        ops: vec![Operation::Sigmoid],
        quiet: true,
        ..RunArgs::default()
    };

    let report = commands::cmd_run(&XcheckConfig::default(), args)
        .await
        .unwrap();

    assert_eq!(report.tallies.len(), 1);
    assert_eq!(report.tallies[0].op, Operation::Sigmoid);
    assert_eq!(report.tallies[0].total(), 2);
}

#[tokio::test]
async fn test_cmd_run_missing_table() {
    let harness = TestHarness::with_values(&["1"]);
    let args = RunArgs {
        table: Some(harness.path("missing.csv")),
        ..RunArgs::default()
    };

    let result = commands::cmd_run(&XcheckConfig::default(), args).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_execute_table_then_run() {
    let harness = TestHarness::with_values(&["1"]);
    let table_path = harness.path("generated/8_bit.csv");
    commands::execute(
        None,
        Command::Table {
            output: table_path.clone(),
        },
    )
    .await
    .unwrap();

    let args = RunArgs {
        table: Some(table_path),
        ops: vec![Operation::Sub],
        quiet: true,
        ..RunArgs::default()
    };
    let report = commands::cmd_run(&XcheckConfig::default(), args)
        .await
        .unwrap();
    assert_eq!(report.tallies[0].total(), 255 * 256 / 2);
}

#[test]
fn test_cmd_bench_flags() {
    let args = BenchArgs {
        n: Some(5),
        iterations: Some(2),
        seed: Some(9),
        arithmetic: Some(Arithmetic::Reference),
    };
    let result = commands::cmd_bench(&XcheckConfig::default(), args).unwrap();
    assert_eq!(result.n, 5);
    assert_eq!(result.iterations, 2);
    assert!(result.csv_line().contains(','));
}
