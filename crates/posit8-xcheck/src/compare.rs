//! The cross-validation run.
//!
//! Every operand pair from the upper triangle of a value table is sent to
//! the device and to the reference arithmetic, and the two answers are
//! compared exactly. NaR on both sides counts as agreement.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::stream::{self, StreamExt};
use posit8_core::{Operation, Posit8, protocol};
use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::error::{Error, Result};
use crate::table::TableEntry;

/// Report schema written by [`write_report`].
pub const SCHEMA_VERSION: u8 = 1;

/// Operations checked when none are requested.
pub const DEFAULT_OPS: [Operation; 3] = [Operation::Div, Operation::Add, Operation::Mul];

/// Index pairs `(i, j)` with `i <= j < n`, row by row.
pub fn upper_triangle(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i..n).map(move |j| (i, j)))
}

/// Whether a device answer agrees with the reference.
pub fn agrees(device: f64, reference: f64) -> bool {
    device == reference || (device.is_nan() && reference.is_nan())
}

/// Formats a result for mismatch lines.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:?}")
    }
}

/// One disagreement, or one device failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mismatch {
    /// Position of the pair in enumeration order.
    pub index: usize,
    /// Operation being checked.
    pub op: Operation,
    /// First operand text.
    pub a: String,
    /// Second operand text; absent for unary operations.
    pub b: Option<String>,
    /// What the device answered, if it answered.
    #[serde(with = "nar_json::option")]
    pub device: Option<f64>,
    /// What the reference computed.
    #[serde(with = "nar_json")]
    pub reference: f64,
    /// Device error, when the device failed instead of answering.
    pub error: Option<String>,
}

impl Mismatch {
    /// The line printed for this mismatch.
    pub fn line(&self) -> String {
        match (&self.device, &self.error) {
            (Some(device), _) => {
                format!("{} != {}", format_number(*device), format_number(self.reference))
            }
            (None, Some(error)) => {
                format!("error != {} ({error})", format_number(self.reference))
            }
            (None, None) => format!("? != {}", format_number(self.reference)),
        }
    }
}

/// Outcome counts for one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpTally {
    /// Operation checked.
    pub op: Operation,
    /// Pairs where the device agreed with the reference.
    pub successes: usize,
    /// Pairs where it did not, including device failures.
    pub failures: usize,
    /// The disagreements, in enumeration order.
    pub mismatches: Vec<Mismatch>,
}

impl OpTally {
    /// Total pairs evaluated.
    pub fn total(&self) -> usize {
        self.successes + self.failures
    }

    /// The per-operation summary line.
    pub fn summary_line(&self) -> String {
        format!(
            "we have {} successes, and {} errors in {} mode",
            self.successes,
            self.failures,
            self.op.long_name()
        )
    }
}

/// Results of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheckReport {
    /// Report format version.
    pub schema_version: u8,
    /// Value table the pairs came from.
    pub table: String,
    /// Device under test.
    pub device: String,
    /// When the report was produced.
    pub generated_at_unix_ms: u128,
    /// One tally per operation, in the order they ran.
    pub tallies: Vec<OpTally>,
}

impl CrossCheckReport {
    /// Sum of failures across all operations.
    pub fn total_failures(&self) -> usize {
        self.tallies.iter().map(|t| t.failures).sum()
    }
}

/// Writes a report as pretty JSON, creating parent directories.
pub fn write_report(path: &Path, report: &CrossCheckReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let raw = serde_json::to_string_pretty(report)?;
    std::fs::write(path, raw).map_err(|e| Error::io_with_path(e, path))?;
    tracing::info!(path = %path.display(), "Wrote cross-check report");
    Ok(())
}

/// JSON has no NaN, so NaR results are written as the string `"NaR"`.
mod nar_json {
    use serde::{Deserialize, Deserializer, Serializer};

    const NAR: &str = "NaR";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    impl Repr {
        fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
            match self {
                Repr::Number(v) => Ok(v),
                Repr::Text(t) if t.eq_ignore_ascii_case(NAR) || t.eq_ignore_ascii_case("nan") => {
                    Ok(f64::NAN)
                }
                Repr::Text(t) => Err(E::custom(format!("expected a number or NaR, got '{t}'"))),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str(NAR)
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Repr;

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<Repr>::deserialize(deserializer)?
                .map(Repr::into_f64)
                .transpose()
        }
    }
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

/// Default concurrency: the machine's available parallelism.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Drives a device through the table and tallies its answers.
pub struct CrossCheck {
    device: Arc<dyn Device>,
    jobs: usize,
    echo: bool,
}

impl CrossCheck {
    /// Creates a run against `device` with default concurrency. Mismatch
    /// and summary lines are printed.
    pub fn new(device: Arc<dyn Device>) -> Self {
        Self {
            device,
            jobs: default_jobs(),
            echo: true,
        }
    }

    /// Sets how many evaluations may be in flight at once.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Enables or disables printing to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Decodes the probe pattern through the device.
    pub async fn probe(&self) -> Result<f64> {
        let value = self
            .device
            .evaluate(Operation::Decode, protocol::PROBE_BITS, None)
            .await?;
        tracing::info!(
            device = %self.device.describe(),
            bits = protocol::PROBE_BITS,
            value,
            "Probe decoded"
        );
        Ok(value)
    }

    /// Checks one operation over every pair of the table.
    pub async fn run_op(&self, table: &[TableEntry], op: Operation) -> Result<OpTally> {
        if !op.is_arithmetic() {
            return Err(posit8_core::Error::NotArithmetic(op.name()).into());
        }

        let pairs: Vec<(usize, usize)> = if op.arity() == 1 {
            (0..table.len()).map(|i| (i, i)).collect()
        } else {
            upper_triangle(table.len()).collect()
        };
        tracing::debug!(op = %op, pairs = pairs.len(), jobs = self.jobs, "Checking operation");

        let outcomes: Vec<Option<Mismatch>> = stream::iter(pairs.into_iter().enumerate())
            .map(|(index, (i, j))| self.check_pair(index, op, &table[i], &table[j]))
            .buffer_unordered(self.jobs)
            .collect()
            .await;

        let total = outcomes.len();
        let mut mismatches: Vec<Mismatch> = outcomes.into_iter().flatten().collect();
        mismatches.sort_by_key(|m| m.index);

        let tally = OpTally {
            op,
            successes: total - mismatches.len(),
            failures: mismatches.len(),
            mismatches,
        };

        if self.echo {
            for mismatch in &tally.mismatches {
                println!("{}", mismatch.line());
            }
            println!("{}", tally.summary_line());
        }
        tracing::info!(
            op = %op,
            successes = tally.successes,
            failures = tally.failures,
            "Operation checked"
        );
        Ok(tally)
    }

    /// Probes the device, then checks each operation in turn.
    pub async fn run(
        &self,
        table_name: &str,
        table: &[TableEntry],
        ops: &[Operation],
    ) -> Result<CrossCheckReport> {
        self.probe().await?;

        let mut tallies = Vec::with_capacity(ops.len());
        for &op in ops {
            tallies.push(self.run_op(table, op).await?);
        }

        Ok(CrossCheckReport {
            schema_version: SCHEMA_VERSION,
            table: table_name.to_string(),
            device: self.device.describe(),
            generated_at_unix_ms: now_unix_ms(),
            tallies,
        })
    }

    async fn check_pair(
        &self,
        index: usize,
        op: Operation,
        a: &TableEntry,
        b: &TableEntry,
    ) -> Option<Mismatch> {
        let reference = reference_value(op, a.value, b.value);
        let b_text = (op.arity() == 2).then(|| b.text.clone());

        let (device, error) = match self.device.evaluate(op, &a.text, b_text.as_deref()).await {
            Ok(value) if agrees(value, reference) => return None,
            Ok(value) => (Some(value), None),
            Err(e) => {
                tracing::warn!(op = %op, a = %a.text, error = %e, "Device evaluation failed");
                (None, Some(e.to_string()))
            }
        };

        Some(Mismatch {
            index,
            op,
            a: a.text.clone(),
            b: b_text,
            device,
            reference,
            error,
        })
    }
}

/// The correctly rounded answer for `op` on two table values.
pub fn reference_value(op: Operation, a: f64, b: f64) -> f64 {
    op.apply_reference(Posit8::from_f64(a), Posit8::from_f64(b))
        .map_or(f64::NAN, Posit8::to_f64)
}
