//! The posit8 value type.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::{Decoded, decode};
use crate::error::{Error, Result};

/// Largest finite magnitude, `2^6`.
const MAXPOS_VALUE: f64 = 64.0;

/// Smallest non-zero magnitude, `2^-6`.
const MINPOS_VALUE: f64 = 0.015625;

/// An 8-bit posit with exponent size 0, stored as its raw bit pattern.
///
/// Negative values are the two's complement of the corresponding positive
/// pattern. Arithmetic through `std::ops` uses the correctly rounded
/// [`reference`](crate::reference) engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Posit8(u8);

impl Posit8 {
    /// Zero.
    pub const ZERO: Self = Self(0x00);
    /// Not a real.
    pub const NAR: Self = Self(0x80);
    /// One.
    pub const ONE: Self = Self(0x40);
    /// Largest positive value (64).
    pub const MAXPOS: Self = Self(0x7F);
    /// Smallest positive value (1/64).
    pub const MINPOS: Self = Self(0x01);

    /// Wraps a raw bit pattern.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw bit pattern.
    pub const fn to_bits(self) -> u8 {
        self.0
    }

    /// Returns `true` for the zero pattern.
    pub const fn is_zero(self) -> bool {
        self.0 == 0x00
    }

    /// Returns `true` for the NaR pattern.
    pub const fn is_nar(self) -> bool {
        self.0 == 0x80
    }

    /// Returns `true` for negative real values.
    pub const fn is_negative(self) -> bool {
        self.0 & 0x80 != 0 && !self.is_nar()
    }

    /// Two's-complement negation; zero and NaR map to themselves.
    pub const fn negate(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// Absolute value; NaR stays NaR.
    pub const fn abs(self) -> Self {
        if self.is_negative() { self.negate() } else { self }
    }

    /// Iterates over all 256 patterns in ascending bit order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).map(Self)
    }

    /// Decodes to `f64`. Every posit8 value is exact in `f64`; NaR is NaN.
    pub fn to_f64(self) -> f64 {
        match decode(self) {
            Decoded::Zero => 0.0,
            Decoded::NaR => f64::NAN,
            Decoded::Real(fields) => {
                let magnitude = f64::from(fields.significand())
                    * 2f64.powi(fields.k - fields.frac_len as i32);
                if fields.sign { -magnitude } else { magnitude }
            }
        }
    }

    /// Rounds an `f64` to the nearest posit8.
    ///
    /// Ties go to the even bit pattern. Non-zero magnitudes never round to
    /// zero and finite magnitudes never round to NaR.
    pub fn from_f64(value: f64) -> Self {
        if value == 0.0 {
            return Self::ZERO;
        }
        if !value.is_finite() {
            return Self::NAR;
        }

        let magnitude = value.abs();
        let posit = if magnitude >= MAXPOS_VALUE {
            Self::MAXPOS
        } else if magnitude <= MINPOS_VALUE {
            Self::MINPOS
        } else {
            Self(round_magnitude(magnitude))
        };

        if value < 0.0 { posit.negate() } else { posit }
    }

    /// Renders the pattern as eight `0`/`1` characters, MSB first.
    pub fn to_bit_string(self) -> String {
        format!("{:08b}", self.0)
    }

    /// Parses the first eight characters of `input` as a bit pattern.
    ///
    /// A `1` sets the bit; any other character leaves it clear.
    pub fn parse_bits(input: &str) -> Result<Self> {
        let chars: Vec<char> = input.trim().chars().take(8).collect();
        if chars.len() < 8 {
            return Err(Error::invalid_bits(
                input,
                format!("expected 8 characters, got {}", chars.len()),
            ));
        }

        let bits = chars
            .iter()
            .fold(0u8, |acc, ch| (acc << 1) | u8::from(*ch == '1'));
        Ok(Self(bits))
    }
}

impl fmt::Display for Posit8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nar() {
            write!(f, "NaR")
        } else {
            write!(f, "{:.6}", self.to_f64())
        }
    }
}

impl From<Posit8> for f64 {
    fn from(posit: Posit8) -> Self {
        posit.to_f64()
    }
}

impl From<f64> for Posit8 {
    fn from(value: f64) -> Self {
        Posit8::from_f64(value)
    }
}

/// Rounds a magnitude strictly inside `(minpos, maxpos)`.
fn round_magnitude(magnitude: f64) -> u8 {
    let k = binary_exponent(magnitude);
    let (regime, regime_len) = regime_field(k);
    let frac_len = 7 - regime_len;

    // Scaling by powers of two keeps every step exact.
    let scaled = (magnitude / 2f64.powi(k) - 1.0) * f64::from(1u32 << frac_len);
    let whole = scaled.floor();
    let remainder = scaled - whole;

    let mut bits = (regime << frac_len) | whole as u32;
    if remainder > 0.5 || (remainder == 0.5 && bits & 1 == 1) {
        // Incrementing the pattern carries into the regime when needed.
        bits += 1;
    }
    bits as u8
}

/// `floor(log2(x))` for a positive normal `f64`.
fn binary_exponent(value: f64) -> i32 {
    ((value.to_bits() >> 52) & 0x7FF) as i32 - 1023
}

/// Regime bits and their width for scale `k` in `-6..=5`.
fn regime_field(k: i32) -> (u32, u32) {
    if k >= 0 {
        (((1 << (k + 1)) - 1) << 1, (k + 2) as u32)
    } else {
        (1, (1 - k) as u32)
    }
}
