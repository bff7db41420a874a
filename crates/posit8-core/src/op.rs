//! Operations understood by the device protocol.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Posit8;
use crate::{kernel, reference};

/// A device operation, identified on the command line by its mode code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Convert a double to its bit pattern (`-2`).
    Encode,
    /// Convert a bit pattern to its value (`-1`).
    Decode,
    /// `a + b` (`0`).
    Add,
    /// `a - b` (`1`).
    Sub,
    /// `a * b` (`2`).
    Mul,
    /// `a / b` (`3`).
    Div,
    /// Logistic function of `a` (`4`).
    Sigmoid,
}

impl Operation {
    /// Every operation, in mode-code order.
    pub const ALL: [Operation; 7] = [
        Operation::Encode,
        Operation::Decode,
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Sigmoid,
    ];

    /// The numeric mode passed as the device's first argument.
    pub const fn mode(self) -> i32 {
        match self {
            Operation::Encode => -2,
            Operation::Decode => -1,
            Operation::Add => 0,
            Operation::Sub => 1,
            Operation::Mul => 2,
            Operation::Div => 3,
            Operation::Sigmoid => 4,
        }
    }

    /// Looks up an operation by mode code.
    pub fn from_mode(mode: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mode() == mode)
            .ok_or(Error::UnsupportedMode(mode))
    }

    /// Short snake-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Mul => "mul",
            Operation::Div => "div",
            Operation::Sigmoid => "sigmoid",
        }
    }

    /// Long name used in run summaries.
    pub const fn long_name(self) -> &'static str {
        match self {
            Operation::Encode => "encode",
            Operation::Decode => "decode",
            Operation::Add => "addition",
            Operation::Sub => "subtraction",
            Operation::Mul => "multiplication",
            Operation::Div => "division",
            Operation::Sigmoid => "sigmoid",
        }
    }

    /// Number of posit operands; conversions take raw text instead.
    pub const fn arity(self) -> usize {
        match self {
            Operation::Encode | Operation::Decode => 0,
            Operation::Sigmoid => 1,
            Operation::Add | Operation::Sub | Operation::Mul | Operation::Div => 2,
        }
    }

    /// Returns `true` for operations that compute on posit operands.
    pub const fn is_arithmetic(self) -> bool {
        self.arity() > 0
    }

    /// Evaluates with the correctly rounded engine. `b` is ignored by
    /// unary operations.
    pub fn apply_reference(self, a: Posit8, b: Posit8) -> Result<Posit8> {
        match self {
            Operation::Add => Ok(reference::add(a, b)),
            Operation::Sub => Ok(reference::sub(a, b)),
            Operation::Mul => Ok(reference::mul(a, b)),
            Operation::Div => Ok(reference::div(a, b)),
            Operation::Sigmoid => Ok(reference::sigmoid(a)),
            Operation::Encode | Operation::Decode => Err(Error::NotArithmetic(self.name())),
        }
    }

    /// Evaluates with the device kernels. `b` is ignored by unary
    /// operations.
    pub fn apply_device(self, a: Posit8, b: Posit8) -> Result<Posit8> {
        match self {
            Operation::Add => Ok(kernel::add(a, b)),
            Operation::Sub => Ok(kernel::sub(a, b)),
            Operation::Mul => Ok(kernel::mul(a, b)),
            Operation::Div => Ok(kernel::div(a, b)),
            Operation::Sigmoid => Ok(kernel::sigmoid(a)),
            Operation::Encode | Operation::Decode => Err(Error::NotArithmetic(self.name())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encode" => Ok(Operation::Encode),
            "decode" => Ok(Operation::Decode),
            "add" | "addition" => Ok(Operation::Add),
            "sub" | "subtraction" => Ok(Operation::Sub),
            "mul" | "multiplication" => Ok(Operation::Mul),
            "div" | "division" => Ok(Operation::Div),
            "sigmoid" => Ok(Operation::Sigmoid),
            other => Err(Error::UnknownOperation(other.to_string())),
        }
    }
}
