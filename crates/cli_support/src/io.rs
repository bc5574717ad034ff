//! File reading and the handful of dump formats both binaries share.

use std::path::Path;

use lexer_core::Token;
use ram_error::Result;

/// Read a source file into a `String`, surfacing the underlying I/O error
/// through [`ram_error::Error::Io`].
pub fn read_source(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

/// Print one line per token, in `tag@line:column "value"` form, for the
/// `-t/--tokenize` flag.
pub fn dump_tokens(tokens: &[Token]) {
    for token in tokens {
        anstream::println!("{}@{}:{} {:?}", token.tag, token.line, token.column, token.value);
    }
}

/// Print the values an interpreter wrote to its output tape as
/// space-separated integers followed by a single trailing newline, per the
/// CLI's success-output contract.
pub fn print_output(values: &[i64]) {
    let line = values.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
    anstream::println!("{line}");
}

/// Print the `-v/--verbose` diagnostic summary: step count, halted flag,
/// and the final accumulator. Written to the error stream, per §6 — the
/// output tape on stdout is the only thing a caller should have to parse.
pub fn print_diagnostics(steps: usize, halted: bool, accumulator: i64) {
    anstream::eprintln!("steps: {steps}");
    anstream::eprintln!("halted: {halted}");
    anstream::eprintln!("accumulator: {accumulator}");
}
