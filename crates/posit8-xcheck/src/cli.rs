//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use posit8_core::Operation;
use posit8_core::matrix::Arithmetic;

/// Cross-validates a posit8 device against correctly rounded arithmetic.
#[derive(Parser, Debug)]
#[command(name = "posit8-xcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "POSIT8_XCHECK_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare the device with the reference over every operand pair
    Run(RunArgs),

    /// Write the table of all real posit8 values
    Table {
        /// Output CSV file
        #[arg(short, long, default_value = "8_bit.csv")]
        output: PathBuf,
    },

    /// Decode a bit pattern through the device
    Decode {
        /// Eight binary digits
        bits: String,

        /// External device program; in-process kernels when omitted
        #[arg(short, long, env = "POSIT8_DEVICE")]
        device: Option<PathBuf>,
    },

    /// Time posit8 matrix multiplication
    Bench(BenchArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for `run`. Unset options fall back to the config file.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// External device program; in-process kernels when omitted
    #[arg(short, long, env = "POSIT8_DEVICE")]
    pub device: Option<PathBuf>,

    /// Value table (first CSV column, no header)
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// Operations to check, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub ops: Vec<Operation>,

    /// Concurrent device evaluations
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-invocation timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write a JSON report here
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Only print summary lines
    #[arg(short, long)]
    pub quiet: bool,
}

/// Options for `bench`. Unset options fall back to the config file.
#[derive(Args, Debug, Default)]
pub struct BenchArgs {
    /// Matrix side length
    #[arg(short, long)]
    pub n: Option<usize>,

    /// Products to time
    #[arg(short, long)]
    pub iterations: Option<u32>,

    /// Seed for the input matrix
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Engine: reference or device
    #[arg(short, long)]
    pub arithmetic: Option<Arithmetic>,
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,

    /// Print a value by dotted key
    Get {
        /// Dotted key, e.g. `bench.n`
        key: String,
    },

    /// Set a value by dotted key
    Set {
        /// Dotted key, e.g. `bench.n`
        key: String,
        /// New value
        value: String,
    },

    /// Create a default config file
    Init {
        /// Where to create it
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
