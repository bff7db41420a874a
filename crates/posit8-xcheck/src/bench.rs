//! Matrix multiplication benchmark.

use std::time::Instant;

use posit8_core::matrix::{self, Arithmetic, Matrix};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::error::{Error, Result};

/// Timing for `iterations` squarings of a random `n x n` matrix.
#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    /// Matrix side length.
    pub n: usize,
    /// Number of products timed.
    pub iterations: u32,
    /// Wall-clock seconds for all iterations.
    pub seconds: f64,
    /// Posit operations per second, in billions.
    pub gflops: f64,
}

impl BenchResult {
    /// The `seconds,gflops` line the CLI prints.
    pub fn csv_line(&self) -> String {
        format!("{:.6},{:.6}", self.seconds, self.gflops)
    }
}

/// Posit operations in one `n x n` product: a multiply and an add per term.
pub fn operation_count(n: usize) -> f64 {
    2.0 * (n as f64).powi(3)
}

/// GFLOPS for `ops` operations in `seconds`; zero when no time elapsed.
pub fn gflops(ops: f64, seconds: f64) -> f64 {
    if seconds > 0.0 { ops / seconds * 1e-9 } else { 0.0 }
}

/// Builds a seeded random matrix `A` and times `C = A * A`.
pub fn run_matmul(n: usize, iterations: u32, arith: Arithmetic, seed: u64) -> Result<BenchResult> {
    if n == 0 {
        return Err(Error::config("matrix size must be at least 1"));
    }
    if iterations == 0 {
        return Err(Error::config("iterations must be at least 1"));
    }
    if Matrix::entry_count(n).is_err() {
        return Err(Error::config(format!(
            "matrix size {n} exceeds the limit of {}",
            Matrix::MAX_SIDE
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let a = Matrix::random(n, arith, &mut rng)?;

    let start = Instant::now();
    for _ in 0..iterations {
        let c = matrix::multiply(&a, &a, arith)?;
        std::hint::black_box(c);
    }
    let seconds = start.elapsed().as_secs_f64();

    let result = BenchResult {
        n,
        iterations,
        seconds,
        gflops: gflops(operation_count(n) * f64::from(iterations), seconds),
    };
    tracing::debug!(n, iterations, seconds, gflops = result.gflops, %arith, "Benchmark finished");
    Ok(result)
}
