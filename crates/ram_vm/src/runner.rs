//! Convenience functions for running a RAM program end to end from text.

use ram_core::Program;
use ram_error::Result;

use crate::io::{VecInput, VecOutput};
use crate::vm::VirtualMachine;

/// The outcome of running a program to completion.
#[derive(Debug)]
pub struct RunResult {
    pub accumulator: i64,
    pub output: Vec<i64>,
    pub steps: usize,
}

fn collect(vm: VirtualMachine<VecInput, VecOutput>) -> RunResult {
    RunResult { accumulator: vm.accumulator(), output: vm.output.values.clone(), steps: vm.steps() }
}

/// Parse `source` and run it against `input`, returning the final machine
/// state. Runs to completion with no step limit — callers that need to
/// guard against non-terminating programs should build a
/// [`crate::VirtualMachineBuilder`] with `with_max_steps` directly.
pub fn run_program(source: &str, input: Vec<i64>) -> Result<RunResult> {
    let program = ram_parser::parse(source)?;
    run(program, input, None)
}

pub fn run_program_with_max_steps(source: &str, input: Vec<i64>, max_steps: usize) -> Result<RunResult> {
    let program = ram_parser::parse(source)?;
    run(program, input, Some(max_steps))
}

fn run(program: Program, input: Vec<i64>, max_steps: Option<usize>) -> Result<RunResult> {
    let mut vm = VirtualMachine::new(program, VecInput::new(input), VecOutput::new());
    match max_steps {
        Some(max_steps) => vm.run_with_max_steps(max_steps)?,
        None => vm.run()?,
    }
    Ok(collect(vm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_small_program_from_source() {
        let result = run_program("LOAD =5\nADD =10\nWRITE 0\nHALT", vec![]).unwrap();
        assert_eq!(result.output, vec![15]);
        assert_eq!(result.accumulator, 15);
    }

    #[test]
    fn runs_a_program_that_reads_input() {
        let result = run_program("READ 0\nADD =1\nWRITE 0\nHALT", vec![41]).unwrap();
        assert_eq!(result.output, vec![42]);
    }
}
