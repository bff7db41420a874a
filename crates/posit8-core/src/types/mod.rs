//! Core posit8 types.

mod fields;
mod posit;
mod proptests;

pub use fields::{Decoded, PositFields, decode};
pub use posit::Posit8;
