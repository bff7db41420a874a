//! Field decomposition of posit8 bit patterns.

use super::Posit8;

/// Sign, regime scale and fraction of a real-valued posit8.
///
/// With an exponent size of zero the value is
/// `(-1)^sign * 2^k * (1 + frac / 2^frac_len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositFields {
    /// Sign bit of the original pattern
    pub sign: bool,
    /// Scale contributed by the regime run
    pub k: i32,
    /// Fraction bits, without the hidden bit
    pub frac: u8,
    /// Number of fraction bits left after sign and regime
    pub frac_len: u32,
}

impl PositFields {
    /// Fraction with the hidden bit set above its most significant bit.
    pub fn significand(&self) -> u32 {
        u32::from(self.frac) | (1 << self.frac_len)
    }
}

/// Classification of a posit8 pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The all-zero pattern.
    Zero,
    /// Not a real (`0x80`).
    NaR,
    /// Any other pattern.
    Real(PositFields),
}

/// Splits a posit8 into its fields.
///
/// Negative patterns are two's-complemented first, so the fields always
/// describe the magnitude.
pub fn decode(posit: Posit8) -> Decoded {
    match posit.to_bits() {
        0x00 => Decoded::Zero,
        0x80 => Decoded::NaR,
        bits => {
            let sign = bits & 0x80 != 0;
            let magnitude = if sign { bits.wrapping_neg() } else { bits };

            // Drop the sign bit so the regime run starts at the MSB.
            let body = magnitude << 1;
            let zeros = body.leading_zeros();
            let (run, k) = if zeros == 0 {
                let ones = (!body).leading_zeros();
                (ones, ones as i32 - 1)
            } else {
                (zeros, -(zeros as i32))
            };

            let frac_len = 6u32.saturating_sub(run);
            let frac = magnitude & ((1u8 << frac_len) - 1);

            Decoded::Real(PositFields {
                sign,
                k,
                frac,
                frac_len,
            })
        }
    }
}
