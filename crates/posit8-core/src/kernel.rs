//! Hardware-style posit8 kernels.
//!
//! These are the bit-manipulation algorithms the device runs: decode both
//! operands into regime scale and hidden-bit significand, combine them with
//! integer arithmetic, then rebuild the pattern. They deliberately keep the
//! device's shortcuts (truncating conversion, abbreviated rounding checks)
//! so the device can be emulated bit for bit.

use crate::types::{Decoded, Posit8, decode};

/// Widest regime field, leaving no room for fraction bits.
const MAX_REGIME_LEN: i32 = 7;

// ============================================================================
// Conversion
// ============================================================================

/// Converts an `f64` the way the device does, truncating the fraction.
pub fn encode_truncating(value: f64) -> Posit8 {
    if value == 0.0 {
        return Posit8::ZERO;
    }
    if !value.is_finite() {
        return Posit8::NAR;
    }

    let negative = value < 0.0;
    let magnitude = value.abs();
    if magnitude >= 64.0 {
        return signed(Posit8::MAXPOS, negative);
    }
    if magnitude <= 0.015625 {
        return signed(Posit8::MINPOS, negative);
    }

    // Run length of the regime, found by halving or doubling into [1, 2).
    let mut scaled = magnitude;
    let regime_is_ones = magnitude > 1.0;
    let mut run: u32 = if regime_is_ones { 1 } else { 0 };
    if regime_is_ones {
        while scaled >= 2.0 {
            scaled /= 2.0;
            run += 1;
        }
    } else {
        while scaled < 1.0 {
            scaled *= 2.0;
            run += 1;
        }
    }

    if run > 6 {
        let limit = if regime_is_ones {
            Posit8::MAXPOS
        } else {
            Posit8::MINPOS
        };
        return signed(limit, negative);
    }

    let frac_len = 6 - run;
    let fraction = truncate_fraction(scaled - 1.0, frac_len);

    let mut bits: u32 = 0;
    for _ in 0..run {
        bits = (bits << 1) | u32::from(regime_is_ones);
    }
    bits = (bits << 1) | u32::from(!regime_is_ones);
    bits = (bits << frac_len) | fraction;

    signed(Posit8::from_bits((bits & 0xFF) as u8), negative)
}

/// Converts a pattern to `f64` the way the device does. The device has no
/// NaR case, so `0x80` reads as a negative pattern with an empty regime and
/// comes out as `-1.0`.
pub fn to_f64(posit: Posit8) -> f64 {
    if posit.is_nar() {
        return -1.0;
    }
    posit.to_f64()
}

/// Takes `len` binary digits of a fraction in `[0, 1)` without rounding.
fn truncate_fraction(mut fraction: f64, len: u32) -> u32 {
    let mut out = 0;
    let mut step = 1.0;
    for _ in 0..len {
        step /= 2.0;
        out <<= 1;
        if fraction >= step {
            out |= 1;
            fraction -= step;
        }
    }
    out
}

// ============================================================================
// Arithmetic
// ============================================================================

/// Device addition.
pub fn add(a: Posit8, b: Posit8) -> Posit8 {
    let (fa, fb) = match (decode(a), decode(b)) {
        (Decoded::Zero, _) => return b,
        (_, Decoded::Zero) => return a,
        (Decoded::NaR, _) | (_, Decoded::NaR) => return Posit8::NAR,
        (Decoded::Real(fa), Decoded::Real(fb)) => (fa, fb),
    };
    if a.negate() == b {
        return Posit8::ZERO;
    }

    let negative = if a.abs().to_bits() > b.abs().to_bits() {
        fa.sign
    } else {
        fb.sign
    };

    // Align both significands to the larger scale by widening the
    // fraction of the smaller one.
    let mut len_a = fa.frac_len as i32;
    let mut len_b = fb.frac_len as i32;
    let mut k = fa.k;
    if fa.k > fb.k {
        len_b += fa.k - fb.k;
    } else if fa.k < fb.k {
        len_a += fb.k - fa.k;
        k = fb.k;
    }

    let (sig_a, sig_b, mut frac_len) = if len_a > len_b {
        (fa.significand(), fb.significand() << (len_a - len_b), len_a)
    } else {
        (fa.significand() << (len_b - len_a), fb.significand(), len_b)
    };

    let mut sum = if fa.sign == fb.sign {
        sig_a + sig_b
    } else {
        sig_a.abs_diff(sig_b)
    };

    if sum >> (frac_len + 1) > 0 {
        k += 1;
        frac_len += 1;
    } else {
        while sum >> frac_len == 0 && frac_len > 0 {
            k -= 1;
            frac_len -= 1;
        }
    }
    sum &= low_mask(frac_len);

    let result_frac_len = MAX_REGIME_LEN - regime_len(k);
    let shift = frac_len - result_frac_len;
    let dropped = if shift > 0 { sum & low_mask(shift) } else { 0 };
    let half = half_ulp(shift);

    let mut bits = regime_bits(k, result_frac_len);
    if result_frac_len > 0 {
        bits |= shift_fraction(sum, shift);
    }

    let carry = shift > 0 && dropped > half;
    let tie_to_even = shift > 0 && bits & 1 == 1 && dropped == half && bits != 0x7F;
    if carry || tie_to_even {
        bits = bits.wrapping_add(1);
    }

    signed(Posit8::from_bits(bits), negative)
}

/// Device subtraction, `a + (-b)`.
pub fn sub(a: Posit8, b: Posit8) -> Posit8 {
    add(a, b.negate())
}

/// Device multiplication.
pub fn mul(a: Posit8, b: Posit8) -> Posit8 {
    let (fa, fb) = match (decode(a), decode(b)) {
        (Decoded::Zero, _) | (_, Decoded::Zero) => return Posit8::ZERO,
        (Decoded::NaR, _) | (_, Decoded::NaR) => return Posit8::NAR,
        (Decoded::Real(fa), Decoded::Real(fb)) => (fa, fb),
    };

    let negative = fa.sign ^ fb.sign;
    let mut k = fa.k + fb.k;

    let len_a = fa.frac_len as i32;
    let len_b = fb.frac_len as i32;
    let (sig_a, sig_b, mut frac_len) = if len_a > len_b {
        (fa.significand(), fb.significand() << (len_a - len_b), len_a << 1)
    } else {
        (fa.significand() << (len_b - len_a), fb.significand(), len_b << 1)
    };

    let mut product = sig_a * sig_b;
    if product >> (frac_len + 1) > 0 {
        k += 1;
        frac_len += 1;
    }
    product &= low_mask(frac_len);

    let result_frac_len = MAX_REGIME_LEN - regime_len(k);
    let shift = frac_len - result_frac_len;
    let dropped = if shift > 0 { product & low_mask(shift) } else { 0 };
    let half = half_ulp(shift);

    let mut bits = regime_bits(k, result_frac_len);
    if result_frac_len > 0 {
        bits |= shift_fraction(product, shift);
    }

    // A single dropped bit is only considered as a tie.
    let carry = shift > 1 && dropped > half;
    let tie_to_even = shift > 0 && bits & 1 == 1 && dropped == half;
    if bits != 0x7F && (carry || tie_to_even) {
        bits += 1;
    }
    if bits == 0 {
        bits = 1;
    }

    signed(Posit8::from_bits(bits), negative)
}

/// Device division. The device stores a NaN into its 8-bit result when the
/// divisor is zero, which leaves the pattern `0x00`, so `x / 0` is zero.
pub fn div(a: Posit8, b: Posit8) -> Posit8 {
    let (fa, fb) = match (decode(a), decode(b)) {
        (Decoded::Zero, _) | (_, Decoded::Zero) => return Posit8::ZERO,
        (Decoded::NaR, _) | (_, Decoded::NaR) => return Posit8::NAR,
        (Decoded::Real(fa), Decoded::Real(fb)) => (fa, fb),
    };

    let negative = fa.sign ^ fb.sign;
    let mut k = fa.k - fb.k;

    // Both significands are moved so the hidden bit sits at bit 7.
    let sig_a = fa.significand() << (7 - fa.frac_len);
    let sig_b = fb.significand() << (7 - fb.frac_len);
    let dividend = sig_a << 7;
    let mut quotient = dividend / sig_b;
    let remainder = dividend % sig_b;

    if quotient != 0 && quotient >> 7 == 0 {
        k -= 1;
        quotient <<= 1;
    }

    let result_frac_len = MAX_REGIME_LEN - regime_len(k);
    let mut bits = regime_bits(k, result_frac_len);

    // Regime width minus one, before clamping.
    let scale = k.unsigned_abs() + u32::from(k >= 0);
    quotient &= 0x7F;
    bits |= (quotient.checked_shr(scale + 1).unwrap_or(0) & 0xFF) as u8;

    let guard = quotient.checked_shr(scale).unwrap_or(0) & 1 == 1;
    if guard {
        let sticky = quotient & low_mask(scale as i32) != 0;
        if remainder > 0 || sticky || bits & 1 == 1 {
            bits += 1;
        }
    }
    if bits == 0 {
        bits = 1;
    }

    signed(Posit8::from_bits(bits), negative)
}

/// Fast sigmoid approximation: flip the sign bit and shift right twice.
pub fn sigmoid(x: Posit8) -> Posit8 {
    Posit8::from_bits((x.to_bits() ^ 0x80) >> 2)
}

// ============================================================================
// Helpers
// ============================================================================

fn signed(posit: Posit8, negative: bool) -> Posit8 {
    if negative { posit.negate() } else { posit }
}

/// Width of the regime field for scale `k`, capped at seven bits.
fn regime_len(k: i32) -> i32 {
    let len = if k >= 0 { k + 2 } else { 1 - k };
    len.min(MAX_REGIME_LEN)
}

/// Regime field for scale `k`, shifted into place above the fraction.
fn regime_bits(k: i32, result_frac_len: i32) -> u8 {
    let regime: u32 = if k >= 6 {
        0x7F
    } else if k <= -7 {
        0
    } else if k >= 0 {
        (1 << (k + 2)) - 2
    } else {
        1
    };
    ((regime << result_frac_len) & 0xFF) as u8
}

/// Moves an aligned fraction into the result's fraction field.
fn shift_fraction(fraction: u32, shift: i32) -> u8 {
    let placed = if shift > 0 {
        fraction >> shift
    } else {
        fraction << -shift
    };
    (placed & 0xFF) as u8
}

/// Mask of the lowest `n` bits; empty for `n <= 0`.
fn low_mask(n: i32) -> u32 {
    match n {
        n if n <= 0 => 0,
        n if n >= 32 => u32::MAX,
        n => (1 << n) - 1,
    }
}

/// Value of the highest dropped bit, or zero when nothing is dropped.
fn half_ulp(shift: i32) -> u32 {
    if shift > 0 { 1 << (shift - 1) } else { 0 }
}
