//! Argument shapes shared by the `ram` and `palgol` binaries.

use std::path::PathBuf;

use clap::Args;

/// Flags and positionals common to both front ends: a source file, an
/// input tape, and the handful of switches that turn on token/program
/// dumps instead of (or in addition to) execution.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// The source file to read.
    pub program: PathBuf,

    /// Input values to provide to the program (space-separated).
    pub input: Vec<i64>,

    /// Parse only; do not execute.
    #[arg(short = 'n', long = "no-execute")]
    pub no_execute: bool,

    /// Dump the token stream instead of (or before) running.
    #[arg(short = 't', long = "tokenize")]
    pub tokenize: bool,

    /// Emit the parsed program in its canonical textual form.
    #[arg(short = 'p', long = "parse")]
    pub parse: bool,

    /// Include diagnostic output: step count, halted flag, final registers.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
