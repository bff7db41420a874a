//! # posit8-xcheck
//!
//! Cross-validation harness for posit8 devices.
//!
//! This crate provides:
//! - Value tables and the full posit8 table generator
//! - The [`Device`](device::Device) seam, with subprocess and in-process devices
//! - The pairwise cross-check run and its JSON report
//! - A posit8 matrix multiplication benchmark
//! - TOML configuration and the `config` subcommands

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod bench;
pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod config_handlers;
pub mod device;
pub mod error;
pub mod table;

pub use compare::{CrossCheck, CrossCheckReport, Mismatch, OpTally};
pub use config::XcheckConfig;
pub use device::{CommandDevice, Device, KernelDevice};
pub use error::{Error, Result};
