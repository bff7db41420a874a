//! Square posit8 matrices and the matrix-multiply workload.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Posit8;
use crate::{kernel, reference};

/// Which arithmetic engine a computation runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arithmetic {
    /// Correctly rounded arithmetic.
    Reference,
    /// The device kernels.
    #[default]
    Device,
}

impl Arithmetic {
    fn add(self, a: Posit8, b: Posit8) -> Posit8 {
        match self {
            Arithmetic::Reference => reference::add(a, b),
            Arithmetic::Device => kernel::add(a, b),
        }
    }

    fn mul(self, a: Posit8, b: Posit8) -> Posit8 {
        match self {
            Arithmetic::Reference => reference::mul(a, b),
            Arithmetic::Device => kernel::mul(a, b),
        }
    }

    fn encode(self, value: f64) -> Posit8 {
        match self {
            Arithmetic::Reference => Posit8::from_f64(value),
            Arithmetic::Device => kernel::encode_truncating(value),
        }
    }
}

impl fmt::Display for Arithmetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arithmetic::Reference => f.write_str("reference"),
            Arithmetic::Device => f.write_str("device"),
        }
    }
}

impl FromStr for Arithmetic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "ref" => Ok(Arithmetic::Reference),
            "device" | "kernel" => Ok(Arithmetic::Device),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}

/// A row-major `n x n` matrix of posits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    n: usize,
    data: Vec<Posit8>,
}

impl Matrix {
    /// Largest supported side length (256 MiB of entries).
    pub const MAX_SIDE: usize = 16_384;

    /// Number of entries in an `n x n` matrix, checked against
    /// [`Matrix::MAX_SIDE`] before anything is allocated.
    pub fn entry_count(n: usize) -> Result<usize> {
        let too_large = Error::MatrixTooLarge {
            n,
            max: Self::MAX_SIDE,
        };
        if n > Self::MAX_SIDE {
            return Err(too_large);
        }
        n.checked_mul(n).ok_or(too_large)
    }

    /// An all-zero matrix.
    pub fn zeros(n: usize) -> Result<Self> {
        Ok(Self {
            n,
            data: vec![Posit8::ZERO; Self::entry_count(n)?],
        })
    }

    /// Builds a matrix from `n * n` row-major entries.
    pub fn from_values(n: usize, data: Vec<Posit8>) -> Result<Self> {
        let expected = Self::entry_count(n)?;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    /// Fills a matrix with uniform samples from `[0, 1)`, converted with the
    /// given engine.
    pub fn random<R: Rng>(n: usize, arith: Arithmetic, rng: &mut R) -> Result<Self> {
        let data = (0..Self::entry_count(n)?)
            .map(|_| arith.encode(rng.gen_range(0.0..1.0)))
            .collect();
        Ok(Self { n, data })
    }

    /// Side length.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Entry at `(row, col)`, if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<Posit8> {
        if row >= self.n || col >= self.n {
            return None;
        }
        self.data.get(row * self.n + col).copied()
    }

    /// Row-major entries.
    pub fn as_slice(&self) -> &[Posit8] {
        &self.data
    }
}

/// Computes `a * b`, accumulating each dot product left to right in posit
/// arithmetic.
pub fn multiply(a: &Matrix, b: &Matrix, arith: Arithmetic) -> Result<Matrix> {
    if a.n != b.n {
        return Err(Error::DimensionMismatch {
            expected: a.n,
            actual: b.n,
        });
    }
    let n = a.n;
    let mut out = Matrix::zeros(n)?;
    for i in 0..n {
        for j in 0..n {
            let mut acc = Posit8::ZERO;
            for k in 0..n {
                let product = arith.mul(a.data[i * n + k], b.data[k * n + j]);
                acc = arith.add(acc, product);
            }
            out.data[i * n + j] = acc;
        }
    }
    Ok(out)
}
