#![forbid(unsafe_code)]

//! posit8 device
//!
//! Evaluates one posit8 operation per invocation.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use posit8_core::{Operation, protocol};

/// posit8 device: `<mode> [a] [b]`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// Mode: -2 encode, -1 decode, 0 add, 1 sub, 2 mul, 3 div, 4 sigmoid
    mode: i32,

    /// First operand (a bit string in decode mode)
    #[arg(allow_hyphen_values = true)]
    a: Option<String>,

    /// Second operand
    #[arg(allow_hyphen_values = true)]
    b: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let op = Operation::from_mode(args.mode)?;
    tracing::debug!(op = %op, a = ?args.a, b = ?args.b, "Evaluating");

    let output = protocol::execute(op, args.a.as_deref(), args.b.as_deref())
        .with_context(|| format!("{op} failed"))?;

    if op == Operation::Encode {
        println!("{output}");
    } else {
        print!("{output}");
    }
    std::io::stdout().flush()?;
    Ok(())
}
