//! Common test utilities for the cross-check integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use posit8_core::{Operation, Posit8};
use posit8_xcheck::compare;
use posit8_xcheck::{Device, Error, Result, table};

/// Temporary workspace holding a value table.
pub struct TestHarness {
    /// Keeps the directory alive for the test's duration
    pub dir: tempfile::TempDir,
    /// Path of the value table
    pub table_path: PathBuf,
}

impl TestHarness {
    /// A harness with the full 255-entry posit8 table.
    pub fn with_full_table() -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let table_path = dir.path().join("8_bit.csv");
        table::write_posit8_table(&table_path).unwrap();
        Self { dir, table_path }
    }

    /// A harness with the given operand texts, one per line.
    pub fn with_values(values: &[&str]) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let table_path = dir.path().join("values.csv");
        std::fs::write(&table_path, values.join("\n")).unwrap();
        Self { dir, table_path }
    }

    /// A path inside the harness directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// A device that answers with the reference arithmetic, so it never
/// disagrees.
pub struct ReferenceDevice;

#[async_trait]
impl Device for ReferenceDevice {
    async fn evaluate(&self, op: Operation, a: &str, b: Option<&str>) -> Result<f64> {
        if op == Operation::Decode {
            return Ok(Posit8::parse_bits(a)?.to_f64());
        }
        let a: f64 = a.parse().map_err(|_| Error::device("bad operand"))?;
        let b: f64 = b.unwrap_or("0").parse().map_err(|_| Error::device("bad operand"))?;
        Ok(compare::reference_value(op, a, b))
    }

    fn describe(&self) -> String {
        "reference".to_string()
    }
}

/// A device that always gives the same answer and counts its calls.
pub struct ConstantDevice {
    /// The answer
    pub value: f64,
    /// Number of evaluations served
    pub calls: AtomicUsize,
}

impl ConstantDevice {
    /// Creates a device answering `value`.
    pub fn new(value: f64) -> Arc<Self> {
        Arc::new(Self {
            value,
            calls: AtomicUsize::new(0),
        })
    }

    /// Evaluations served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Device for ConstantDevice {
    async fn evaluate(&self, _op: Operation, _a: &str, _b: Option<&str>) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }

    fn describe(&self) -> String {
        format!("constant {}", self.value)
    }
}

/// A device that decodes the probe but fails every arithmetic request.
pub struct BrokenDevice;

#[async_trait]
impl Device for BrokenDevice {
    async fn evaluate(&self, op: Operation, _a: &str, _b: Option<&str>) -> Result<f64> {
        match op {
            Operation::Decode => Ok(-1.53125),
            _ => Err(Error::device("exit status: 1")),
        }
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}
