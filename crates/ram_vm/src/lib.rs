//! The RAM interpreter: registers, I/O tapes, and the fetch/dispatch loop.

mod io;
mod memory;
mod runner;
mod vm;

pub use io::{Input, Output, StdinInput, StdoutOutput, VecInput, VecOutput};
pub use memory::Memory;
pub use runner::{run_program, run_program_with_max_steps, RunResult};
pub use vm::{VirtualMachine, VirtualMachineBuilder};
