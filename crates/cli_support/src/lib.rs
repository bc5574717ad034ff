//! Plumbing shared by the `ram` and `palgol` command-line front ends:
//! argument shapes, panic/diagnostic setup, and the small set of dump
//! formats (`-t`, `-p`, `-v`) both commands support.

pub mod args;
pub mod diagnostics;
pub mod io;

pub use args::CommonArgs;
pub use diagnostics::{init_tracing, install};
pub use io::{dump_tokens, print_diagnostics, print_output, read_source};
