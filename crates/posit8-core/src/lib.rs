#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! posit8 core library
//!
//! Bit-level representation, conversions and arithmetic for 8-bit posits.

pub mod error;
pub mod kernel;
pub mod matrix;
pub mod op;
pub mod protocol;
pub mod reference;
pub mod types;

// Re-exports for convenience
pub use error::{Error, Result};
pub use matrix::{Arithmetic, Matrix};
pub use op::Operation;
pub use types::{Decoded, Posit8, PositFields, decode};
