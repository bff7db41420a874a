//! The device seam.
//!
//! A [`Device`] evaluates one protocol operation on operand text and
//! returns the number it printed. [`CommandDevice`] runs an external
//! program per call; [`KernelDevice`] runs the same kernels in process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use posit8_core::{Operation, protocol};
use tokio::process::Command;

use crate::error::{Error, Result};

/// Something that answers device-protocol requests.
#[async_trait]
pub trait Device: Send + Sync {
    /// Evaluates `op` on the operand texts. Conversions take their input in
    /// `a`; a missing `b` is left off the invocation.
    async fn evaluate(&self, op: Operation, a: &str, b: Option<&str>) -> Result<f64>;

    /// Short description for logs and reports.
    fn describe(&self) -> String;
}

// ============================================================================
// External program
// ============================================================================

/// Runs `program <mode> a [b]` once per evaluation.
#[derive(Debug, Clone)]
pub struct CommandDevice {
    program: PathBuf,
    timeout: Duration,
}

impl CommandDevice {
    /// Default per-invocation deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a device backed by `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program being run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout {
                millis: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })?
            .map_err(|e| {
                Error::device_with_source(
                    format!("failed to run '{}'", self.program.display()),
                    e,
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::device(format!(
                "'{}' {} exited with {}: {}",
                self.program.display(),
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Device for CommandDevice {
    async fn evaluate(&self, op: Operation, a: &str, b: Option<&str>) -> Result<f64> {
        let mode = op.mode().to_string();
        let mut args = vec![mode.as_str(), a];
        args.extend(b);

        let stdout = self.run(&args).await?;
        tracing::trace!(op = %op, a, b, stdout = %stdout.trim(), "Device replied");
        parse_reply(op, &stdout)
    }

    fn describe(&self) -> String {
        self.program.display().to_string()
    }
}

/// Interprets device stdout. The encode mode prints a bit string, which is
/// read back as its decoded value.
fn parse_reply(op: Operation, stdout: &str) -> Result<f64> {
    if op == Operation::Encode {
        let posit = posit8_core::Posit8::parse_bits(stdout.trim())?;
        return Ok(posit.to_f64());
    }
    protocol::parse_output(stdout)
        .ok_or_else(|| Error::device(format!("unparseable output '{}'", stdout.trim())))
}

// ============================================================================
// In-process kernels
// ============================================================================

/// Evaluates with the device kernels in process, printing and re-reading
/// the result so it carries the same decimal precision as a subprocess.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelDevice;

#[async_trait]
impl Device for KernelDevice {
    async fn evaluate(&self, op: Operation, a: &str, b: Option<&str>) -> Result<f64> {
        let output = protocol::execute(op, Some(a), b)?;
        parse_reply(op, &output)
    }

    fn describe(&self) -> String {
        "in-process kernels".to_string()
    }
}
