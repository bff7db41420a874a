//! Property-based tests for the posit8 format and its two engines.
