//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use posit8_core::Operation;

use crate::bench;
use crate::cli::{BenchArgs, Command, RunArgs};
use crate::compare::{self, CrossCheck, CrossCheckReport};
use crate::config::XcheckConfig;
use crate::config_handlers;
use crate::device::{CommandDevice, Device, KernelDevice};
use crate::error::{Error, Result};
use crate::table;

/// Dispatches a parsed subcommand.
pub async fn execute(config_path: Option<&str>, command: Command) -> Result<()> {
    match command {
        Command::Run(args) => {
            let config = XcheckConfig::load(config_path)?;
            let report = cmd_run(&config, args).await?;
            if report.total_failures() > 0 {
                tracing::warn!(failures = report.total_failures(), "Device disagreed with the reference");
            }
            Ok(())
        }
        Command::Table { output } => {
            table::write_posit8_table(&output)?;
            Ok(())
        }
        Command::Decode { bits, device } => {
            let config = XcheckConfig::load(config_path)?;
            let device = build_device(device.or(config.device_program), config.timeout_secs);
            let value = device.evaluate(Operation::Decode, &bits, None).await?;
            println!("{}", compare::format_number(value));
            Ok(())
        }
        Command::Bench(args) => {
            let config = XcheckConfig::load(config_path)?;
            let result = cmd_bench(&config, args)?;
            println!("{}", result.csv_line());
            Ok(())
        }
        Command::Config { action } => config_handlers::handle_config_command(config_path, action),
    }
}

/// Picks the external program when one is configured, else the in-process
/// kernels.
pub fn build_device(program: Option<PathBuf>, timeout_secs: u64) -> Arc<dyn Device> {
    match program {
        Some(program) => Arc::new(
            CommandDevice::new(program).with_timeout(Duration::from_secs(timeout_secs)),
        ),
        None => Arc::new(KernelDevice),
    }
}

/// Runs the cross-check with command-line options layered over `config`.
pub async fn cmd_run(config: &XcheckConfig, args: RunArgs) -> Result<CrossCheckReport> {
    let settings = merge_run_args(config, args);
    settings.validate()?;

    let device = build_device(settings.device_program.clone(), settings.timeout_secs);
    tracing::info!(
        device = %device.describe(),
        table = %settings.table_path.display(),
        ops = ?settings.ops,
        "Starting cross-check"
    );

    let entries = table::load_values(&settings.table_path)?;
    let mut check = CrossCheck::new(device).with_echo(!settings.quiet_mismatches);
    if let Some(jobs) = settings.jobs {
        check = check.with_jobs(jobs);
    }

    let report = check
        .run(&table_name(&settings.table_path), &entries, &settings.ops)
        .await?;

    if settings.quiet_mismatches {
        for tally in &report.tallies {
            println!("{}", tally.summary_line());
        }
    }
    if let Some(path) = &settings.report_path {
        compare::write_report(path, &report)?;
    }
    Ok(report)
}

/// Runs the benchmark with command-line options layered over `config`.
pub fn cmd_bench(config: &XcheckConfig, args: BenchArgs) -> Result<bench::BenchResult> {
    let n = args.n.unwrap_or(config.bench.n);
    let iterations = args.iterations.unwrap_or(config.bench.iterations);
    let seed = args.seed.unwrap_or(config.bench.seed);
    let arith = args.arithmetic.unwrap_or(config.bench.arithmetic);
    bench::run_matmul(n, iterations, arith, seed)
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
struct RunSettings {
    device_program: Option<PathBuf>,
    table_path: PathBuf,
    ops: Vec<Operation>,
    jobs: Option<usize>,
    timeout_secs: u64,
    report_path: Option<PathBuf>,
    quiet_mismatches: bool,
}

impl RunSettings {
    fn validate(&self) -> Result<()> {
        let config = XcheckConfig {
            jobs: self.jobs,
            timeout_secs: self.timeout_secs,
            ops: self.ops.clone(),
            ..XcheckConfig::default()
        };
        config.validate()?;
        if self.ops.is_empty() {
            return Err(Error::config("no operations selected"));
        }
        Ok(())
    }
}

fn merge_run_args(config: &XcheckConfig, args: RunArgs) -> RunSettings {
    RunSettings {
        device_program: args.device.or_else(|| config.device_program.clone()),
        table_path: args.table.unwrap_or_else(|| config.table_path.clone()),
        ops: if args.ops.is_empty() {
            config.ops.clone()
        } else {
            args.ops
        },
        jobs: args.jobs.or(config.jobs),
        timeout_secs: args.timeout.unwrap_or(config.timeout_secs),
        report_path: args.report.or_else(|| config.report_path.clone()),
        quiet_mismatches: args.quiet,
    }
}

fn table_name(path: &Path) -> String {
    path.display().to_string()
}
