//! The interpreter proper: fetch, dispatch, execute, repeat.

use ram_core::{Address, Instruction, Opcode, Operand, OperandFlag, Program};
use ram_error::{Error, Result};
use tracing::debug;

use crate::io::{Input, Output};
use crate::memory::Memory;

/// `DIV`'s semantics (AHU §1): quotient truncated toward negative
/// infinity, matching Python's `//`. `i64::div_euclid` is *not* the same
/// operation — it disagrees with floor division whenever the divisor is
/// negative (e.g. `7.div_euclid(-2) == -3`, but `floor(7 / -2) == -4`).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q }
}

/// A random access machine: a program, its registers, an input tape and an
/// output tape. Register 0 doubles as the accumulator, exactly as in the
/// one-accumulator model the RAM is built from — there is no separate
/// accumulator field to keep in sync with it.
pub struct VirtualMachine<I: Input, O: Output> {
    program: Program,
    registers: Memory,
    pc: usize,
    halted: bool,
    steps: usize,
    input: I,
    pub output: O,
}

impl<I: Input, O: Output> VirtualMachine<I, O> {
    pub fn new(program: Program, input: I, output: O) -> Self {
        Self { program, registers: Memory::new(), pc: 0, halted: false, steps: 0, input, output }
    }

    #[must_use]
    pub fn builder(program: Program, input: I, output: O) -> VirtualMachineBuilder<I, O> {
        VirtualMachineBuilder::new(program, input, output)
    }

    pub fn reset(&mut self) {
        self.registers.reset();
        self.pc = 0;
        self.halted = false;
        self.steps = 0;
    }

    /// Run to completion. `HALT` is the only way out — a program with no
    /// reachable `HALT` runs forever, same as the textbook machine.
    pub fn run(&mut self) -> Result<()> {
        while !self.halted {
            self.step()?;
        }
        Ok(())
    }

    /// Run until halted or `max_steps` instructions have executed,
    /// whichever comes first. Useful for driving possibly-nonterminating
    /// programs from a CLI without hanging forever.
    pub fn run_with_max_steps(&mut self, max_steps: usize) -> Result<()> {
        while !self.halted && self.steps < max_steps {
            self.step()?;
        }
        Ok(())
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) -> Result<()> {
        if self.halted {
            return Err(Error::Halt);
        }
        let instruction = self
            .program
            .instructions
            .get(self.pc)
            .ok_or_else(|| Error::Internal(format!("program counter {} out of bounds", self.pc)))?
            .clone();

        debug!(pc = self.pc, opcode = %instruction.opcode, "step");
        self.pc = self.dispatch(&instruction)?;
        self.steps += 1;
        Ok(())
    }

    fn dispatch(&mut self, instruction: &Instruction) -> Result<usize> {
        match instruction.opcode {
            Opcode::Load => {
                let value = self.value_of(self.operand(instruction)?)?;
                self.registers.set(0, value);
                Ok(self.pc + 1)
            }
            Opcode::Store => {
                let operand = self.operand(instruction)?;
                let acc = self.registers.get(0)?;
                let target = match operand.flag {
                    OperandFlag::Indirect => self.registers.get(operand.value)?,
                    _ => operand.value,
                };
                self.registers.set(target, acc);
                Ok(self.pc + 1)
            }
            Opcode::Add => {
                let value = self.value_of(self.operand(instruction)?)?;
                let acc = self.registers.get(0)?;
                self.registers.set(0, acc + value);
                Ok(self.pc + 1)
            }
            Opcode::Sub => {
                let value = self.value_of(self.operand(instruction)?)?;
                let acc = self.registers.get(0)?;
                self.registers.set(0, acc - value);
                Ok(self.pc + 1)
            }
            Opcode::Mult => {
                let value = self.value_of(self.operand(instruction)?)?;
                let acc = self.registers.get(0)?;
                self.registers.set(0, acc * value);
                Ok(self.pc + 1)
            }
            Opcode::Div => {
                let value = self.value_of(self.operand(instruction)?)?;
                let acc = self.registers.get(0)?;
                if value == 0 {
                    return Err(Error::Internal("division by zero".to_string()));
                }
                self.registers.set(0, floor_div(acc, value));
                Ok(self.pc + 1)
            }
            Opcode::Read => {
                let operand = self.operand(instruction)?;
                let value = self.input.read()?;
                let target = match operand.flag {
                    OperandFlag::Indirect => self.registers.get(operand.value)?,
                    _ => operand.value,
                };
                self.registers.set(target, value);
                Ok(self.pc + 1)
            }
            Opcode::Write => {
                let value = self.value_of(self.operand(instruction)?)?;
                self.output.write(value)?;
                Ok(self.pc + 1)
            }
            Opcode::Jump => self.resolve_label(instruction),
            Opcode::Jgtz => {
                if self.registers.get(0)? > 0 {
                    self.resolve_label(instruction)
                } else {
                    Ok(self.pc + 1)
                }
            }
            Opcode::Jzero => {
                if self.registers.get(0)? == 0 {
                    self.resolve_label(instruction)
                } else {
                    Ok(self.pc + 1)
                }
            }
            Opcode::Halt => {
                self.halted = true;
                Ok(self.pc)
            }
        }
    }

    fn operand(&self, instruction: &Instruction) -> Result<Operand> {
        instruction
            .operand()
            .ok_or_else(|| Error::Internal(format!("{} has no operand", instruction.opcode)))
    }

    /// `v(a)`: the value an operand denotes, resolving direct/indirect
    /// addressing through the register file.
    fn value_of(&self, operand: Operand) -> Result<i64> {
        match operand.flag {
            OperandFlag::Literal => Ok(operand.value),
            OperandFlag::Direct => self.registers.get(operand.value),
            OperandFlag::Indirect => {
                let address = self.registers.get(operand.value)?;
                self.registers.get(address)
            }
        }
    }

    fn resolve_label(&self, instruction: &Instruction) -> Result<usize> {
        let Some(Address::Label(label)) = &instruction.address else {
            return Err(Error::Internal(format!("{} has no label operand", instruction.opcode)));
        };
        self.program
            .jumptable
            .get(label)
            .copied()
            .ok_or_else(|| Error::Internal(format!("unresolved label {label}")))
    }

    #[must_use]
    pub fn accumulator(&self) -> i64 {
        self.registers.get(0).unwrap_or(0)
    }

    #[must_use]
    pub fn register(&self, index: i64) -> Result<i64> {
        self.registers.get(index)
    }

    #[must_use]
    pub fn pc(&self) -> usize {
        self.pc
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

/// Builder for a [`VirtualMachine`] with preset register contents, mirroring
/// the fluent construction style used throughout this toolchain.
pub struct VirtualMachineBuilder<I: Input, O: Output> {
    program: Program,
    input: I,
    output: O,
    initial_registers: Vec<(i64, i64)>,
    max_steps: Option<usize>,
}

impl<I: Input, O: Output> VirtualMachineBuilder<I, O> {
    pub fn new(program: Program, input: I, output: O) -> Self {
        Self { program, input, output, initial_registers: Vec::new(), max_steps: None }
    }

    #[must_use]
    pub fn with_register(mut self, address: i64, value: i64) -> Self {
        self.initial_registers.push((address, value));
        self
    }

    #[must_use]
    pub fn with_registers(mut self, values: impl IntoIterator<Item = (i64, i64)>) -> Self {
        self.initial_registers.extend(values);
        self
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    #[must_use]
    pub fn build(self) -> VirtualMachine<I, O> {
        let mut vm = VirtualMachine::new(self.program, self.input, self.output);
        for (address, value) in self.initial_registers {
            vm.registers.set(address, value);
        }
        vm
    }

    pub fn run(self) -> Result<VirtualMachine<I, O>> {
        let max_steps = self.max_steps;
        let mut vm = self.build();
        match max_steps {
            Some(max_steps) => vm.run_with_max_steps(max_steps)?,
            None => vm.run()?,
        }
        Ok(vm)
    }
}

#[cfg(test)]
mod tests {
    use ram_core::{Instruction, JumpTarget};
    use std::collections::HashMap;

    use super::*;
    use crate::io::{VecInput, VecOutput};

    fn program(instructions: Vec<Instruction>, jumptable: HashMap<JumpTarget, usize>) -> Program {
        Program::new(instructions, jumptable).unwrap()
    }

    #[test]
    fn floor_div_truncates_toward_negative_infinity() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(floor_div(-7, -2), 3);
    }

    #[test]
    fn division_by_a_negative_divisor_runs_through_the_vm() {
        let instructions = vec![
            Instruction::with_operand(Opcode::Load, Operand::literal(7)).unwrap(),
            Instruction::with_operand(Opcode::Div, Operand::literal(-2)).unwrap(),
            Instruction::without_operand(Opcode::Halt).unwrap(),
        ];
        let mut vm = VirtualMachine::new(program(instructions, HashMap::new()), VecInput::new(vec![]), VecOutput::new());
        vm.run().unwrap();
        assert_eq!(vm.accumulator(), -4);
    }

    #[test]
    fn load_add_write_halt() {
        let instructions = vec![
            Instruction::with_operand(Opcode::Load, Operand::literal(5)).unwrap(),
            Instruction::with_operand(Opcode::Add, Operand::literal(10)).unwrap(),
            Instruction::with_operand(Opcode::Write, Operand::direct(0)).unwrap(),
            Instruction::without_operand(Opcode::Halt).unwrap(),
        ];
        let mut vm = VirtualMachine::new(program(instructions, HashMap::new()), VecInput::new(vec![]), VecOutput::new());
        vm.run().unwrap();
        assert_eq!(vm.accumulator(), 15);
        assert_eq!(vm.output.values, vec![15]);
        assert!(vm.is_halted());
    }

    #[test]
    fn jzero_loop_sums_the_input_tape_until_a_zero_sentinel() {
        // top: READ 1; LOAD 1; JZERO done; LOAD 0; ADD 1; STORE 0; JUMP top
        // done: HALT
        let mut instructions = vec![
            Instruction::with_operand(Opcode::Read, Operand::direct(1)).unwrap(),
            Instruction::with_operand(Opcode::Load, Operand::direct(1)).unwrap(),
            Instruction::with_label(Opcode::Jzero, "done").unwrap(),
            Instruction::with_operand(Opcode::Load, Operand::direct(0)).unwrap(),
            Instruction::with_operand(Opcode::Add, Operand::direct(1)).unwrap(),
            Instruction::with_operand(Opcode::Store, Operand::direct(0)).unwrap(),
            Instruction::with_label(Opcode::Jump, "top").unwrap(),
        ];
        instructions.push(Instruction::without_operand(Opcode::Halt).unwrap());

        let mut jumptable = HashMap::new();
        jumptable.insert(JumpTarget::new("top"), 0);
        jumptable.insert(JumpTarget::new("done"), instructions.len() - 1);

        let mut vm = VirtualMachine::new(
            program(instructions, jumptable),
            VecInput::new(vec![3, 4, 5, 0]),
            VecOutput::new(),
        );
        vm.registers.set(0, 0);
        vm.run().unwrap();
        assert_eq!(vm.register(0).unwrap(), 12);
    }

    #[test]
    fn reading_an_uninitialized_register_fails() {
        let instructions = vec![
            Instruction::with_operand(Opcode::Load, Operand::direct(7)).unwrap(),
            Instruction::without_operand(Opcode::Halt).unwrap(),
        ];
        let mut vm = VirtualMachine::new(program(instructions, HashMap::new()), VecInput::new(vec![]), VecOutput::new());
        assert!(matches!(vm.run(), Err(Error::UninitializedRegister { register: 7 })));
    }

    #[test]
    fn stepping_a_halted_machine_is_an_error() {
        let instructions = vec![Instruction::without_operand(Opcode::Halt).unwrap()];
        let mut vm = VirtualMachine::new(program(instructions, HashMap::new()), VecInput::new(vec![]), VecOutput::new());
        vm.run().unwrap();
        assert!(matches!(vm.step(), Err(Error::Halt)));
    }

    fn arithmetic_instruction() -> impl proptest::strategy::Strategy<Value = Instruction> {
        use proptest::prelude::*;
        prop_oneof![
            (-20..20i64).prop_map(|v| Instruction::with_operand(Opcode::Load, Operand::literal(v)).unwrap()),
            (-20..20i64).prop_map(|v| Instruction::with_operand(Opcode::Add, Operand::literal(v)).unwrap()),
            (-20..20i64).prop_map(|v| Instruction::with_operand(Opcode::Sub, Operand::literal(v)).unwrap()),
            (-5..5i64).prop_map(|v| Instruction::with_operand(Opcode::Mult, Operand::literal(v)).unwrap()),
            (1..10i64).prop_map(|v| Instruction::with_operand(Opcode::Div, Operand::literal(v)).unwrap()),
            Just(Instruction::with_operand(Opcode::Write, Operand::direct(0)).unwrap()),
            (0..3i64).prop_map(|r| Instruction::with_operand(Opcode::Store, Operand::direct(r)).unwrap()),
            (0..3i64).prop_map(|r| Instruction::with_operand(Opcode::Read, Operand::direct(r)).unwrap()),
        ]
    }

    fn program_and_input() -> impl proptest::strategy::Strategy<Value = (Program, Vec<i64>)> {
        use proptest::prelude::*;
        (
            proptest::collection::vec(arithmetic_instruction(), 1..15),
            proptest::collection::vec(any::<i64>(), 0..10),
        )
            .prop_map(|(mut instructions, input)| {
                instructions.push(Instruction::without_operand(Opcode::Halt).unwrap());
                let program = Program::new(instructions, HashMap::new()).unwrap();
                (program, input)
            })
    }

    proptest::proptest! {
        /// Invariant 4: the same program run against the same input tape
        /// twice produces the same output tape and step count, whether the
        /// run succeeds or hits a fatal error partway through.
        #[test]
        fn running_twice_is_deterministic((program, input) in program_and_input()) {
            let mut vm1 = VirtualMachine::new(program.clone(), VecInput::new(input.clone()), VecOutput::new());
            let mut vm2 = VirtualMachine::new(program, VecInput::new(input), VecOutput::new());
            let r1 = vm1.run_with_max_steps(200);
            let r2 = vm2.run_with_max_steps(200);
            proptest::prop_assert_eq!(r1.is_ok(), r2.is_ok());
            proptest::prop_assert_eq!(vm1.output.values.clone(), vm2.output.values.clone());
            proptest::prop_assert_eq!(vm1.steps(), vm2.steps());
        }
    }
}
