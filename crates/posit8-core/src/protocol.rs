//! The device command-line protocol.
//!
//! A device is invoked as `<mode> [a] [b]`. Operands are decimal numbers
//! converted with the device's truncating conversion; a missing operand is
//! zero. The decode mode takes a bit string instead. Results are printed as
//! the decoded value with six decimals. The device decodes NaR as `-1`, so
//! a NaR result prints as `-1.000000`.

use crate::error::{Error, Result};
use crate::kernel;
use crate::op::Operation;
use crate::types::Posit8;

/// Bit pattern the harness decodes as a liveness probe.
pub const PROBE_BITS: &str = "10101111";

/// Runs one device invocation and returns what the device prints, without
/// a trailing newline.
pub fn execute(op: Operation, a: Option<&str>, b: Option<&str>) -> Result<String> {
    match op {
        Operation::Encode => {
            let value = parse_operand(a.unwrap_or("0"))?;
            Ok(kernel::encode_truncating(value).to_bit_string())
        }
        Operation::Decode => {
            let posit = Posit8::parse_bits(a.unwrap_or_default())?;
            Ok(format_value(posit))
        }
        _ => {
            let x = kernel::encode_truncating(parse_operand(a.unwrap_or("0"))?);
            let y = kernel::encode_truncating(parse_operand(b.unwrap_or("0"))?);
            Ok(format_value(op.apply_device(x, y)?))
        }
    }
}

/// Parses a decimal operand.
pub fn parse_operand(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| Error::invalid_operand(text))
}

/// Formats a result the way the device prints it.
pub fn format_value(posit: Posit8) -> String {
    format!("{:.6}", kernel::to_f64(posit))
}

/// Parses device output back into a number; NaN spellings map to NaN.
pub fn parse_output(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "nan" | "-nan" | "nar" => Some(f64::NAN),
        _ => trimmed.parse::<f64>().ok(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_decodes() {
        let out = execute(Operation::Decode, Some(PROBE_BITS), None).unwrap();
        assert_eq!(out, "-1.531250");
    }

    #[test]
    fn test_encode_prints_bits() {
        let out = execute(Operation::Encode, Some("1.3"), None).unwrap();
        assert_eq!(out, "01001001");
    }

    #[test]
    fn test_binary_operation() {
        let out = execute(Operation::Add, Some("1"), Some("2")).unwrap();
        assert_eq!(out, "3.000000");
    }

    #[test]
    fn test_missing_operand_is_zero() {
        let out = execute(Operation::Mul, Some("5"), None).unwrap();
        assert_eq!(out, "0.000000");
    }

    #[test]
    fn test_division_by_zero_prints_zero() {
        let out = execute(Operation::Div, Some("1"), Some("0")).unwrap();
        assert_eq!(out, "0.000000");
        let out = execute(Operation::Div, Some("-3"), Some("0")).unwrap();
        assert_eq!(out, "0.000000");
    }

    #[test]
    fn test_nar_prints_as_minus_one() {
        assert_eq!(format_value(Posit8::NAR), "-1.000000");
        let out = execute(Operation::Decode, Some("10000000"), None).unwrap();
        assert_eq!(out, "-1.000000");
        let out = execute(Operation::Add, Some("-inf"), Some("1")).unwrap();
        assert_eq!(out, "-1.000000");
    }

    #[test]
    fn test_hyphenated_operands() {
        let out = execute(Operation::Add, Some("-1.5e+00"), Some("1")).unwrap();
        assert_eq!(out, "-0.500000");
        let out = execute(Operation::Mul, Some("-2e-05"), Some("1")).unwrap();
        assert_eq!(out, "-0.015625");
        let out = execute(Operation::Encode, Some("-nan"), None).unwrap();
        assert_eq!(out, "10000000");
    }

    #[test]
    fn test_sigmoid_uses_first_operand() {
        let out = execute(Operation::Sigmoid, Some("0"), None).unwrap();
        assert_eq!(out, "0.500000");
    }

    #[test]
    fn test_bad_operand() {
        let err = execute(Operation::Add, Some("one"), Some("2")).unwrap_err();
        assert!(matches!(err, Error::InvalidOperand { .. }));
    }

    #[test]
    fn test_parse_output() {
        assert_eq!(parse_output("0.015625"), Some(0.015625));
        assert_eq!(parse_output(" -2.500000\n"), Some(-2.5));
        assert!(parse_output("nan").unwrap().is_nan());
        assert!(parse_output("-nan").unwrap().is_nan());
        assert!(parse_output("NaR").unwrap().is_nan());
        assert_eq!(parse_output("garbage"), None);
    }
}
