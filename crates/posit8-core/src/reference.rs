//! Correctly rounded posit8 arithmetic.
//!
//! Sums and products of two posit8 values are exact in `f64`, so rounding
//! the `f64` result once gives the correctly rounded posit. Quotients are
//! not exact, but an `f64` quotient of two 7-bit significands lies far
//! from any posit8 rounding midpoint it does not equal, so the single
//! rounding is still correct.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::types::Posit8;

/// `a + b`, rounded.
pub fn add(a: Posit8, b: Posit8) -> Posit8 {
    if a.is_nar() || b.is_nar() {
        return Posit8::NAR;
    }
    Posit8::from_f64(a.to_f64() + b.to_f64())
}

/// `a - b`, rounded.
pub fn sub(a: Posit8, b: Posit8) -> Posit8 {
    add(a, b.negate())
}

/// `a * b`, rounded.
pub fn mul(a: Posit8, b: Posit8) -> Posit8 {
    if a.is_nar() || b.is_nar() {
        return Posit8::NAR;
    }
    Posit8::from_f64(a.to_f64() * b.to_f64())
}

/// `a / b`, rounded. Division by zero is NaR.
pub fn div(a: Posit8, b: Posit8) -> Posit8 {
    if a.is_nar() || b.is_nar() || b.is_zero() {
        return Posit8::NAR;
    }
    if a.is_zero() {
        return Posit8::ZERO;
    }
    Posit8::from_f64(a.to_f64() / b.to_f64())
}

/// Logistic function `1 / (1 + e^-x)`, rounded.
pub fn sigmoid(x: Posit8) -> Posit8 {
    if x.is_nar() {
        return Posit8::NAR;
    }
    Posit8::from_f64(1.0 / (1.0 + (-x.to_f64()).exp()))
}

impl Add for Posit8 {
    type Output = Posit8;

    fn add(self, rhs: Posit8) -> Posit8 {
        add(self, rhs)
    }
}

impl Sub for Posit8 {
    type Output = Posit8;

    fn sub(self, rhs: Posit8) -> Posit8 {
        sub(self, rhs)
    }
}

impl Mul for Posit8 {
    type Output = Posit8;

    fn mul(self, rhs: Posit8) -> Posit8 {
        mul(self, rhs)
    }
}

impl Div for Posit8 {
    type Output = Posit8;

    fn div(self, rhs: Posit8) -> Posit8 {
        div(self, rhs)
    }
}

impl Neg for Posit8 {
    type Output = Posit8;

    fn neg(self) -> Posit8 {
        self.negate()
    }
}
