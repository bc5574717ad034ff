use std::collections::HashMap;
use std::fmt;

use ram_error::{Error, Result};

use crate::instruction::Instruction;
use crate::operand::{Address, JumpTarget};

/// A complete RAM program: an ordered list of instructions plus the table
/// mapping each label to the index of the instruction it names.
///
/// [`Program::new`] is the only way to build one, and it enforces the
/// invariant every other module relies on: every label an instruction
/// addresses resolves to a valid index. A [`Program`] that exists is
/// guaranteed jump-consistent; [`ram_vm`] never has to handle an unresolved
/// label at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub jumptable: HashMap<JumpTarget, usize>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>, jumptable: HashMap<JumpTarget, usize>) -> Result<Self> {
        for (label, &index) in &jumptable {
            if index >= instructions.len() {
                return Err(Error::Internal(format!(
                    "label {label} points past the end of the program ({index} >= {})",
                    instructions.len()
                )));
            }
        }
        for instruction in &instructions {
            if let Some(Address::Label(label)) = &instruction.address {
                if !jumptable.contains_key(label) {
                    return Err(Error::Internal(format!("unresolved label {label}")));
                }
            }
        }
        Ok(Self { instructions, jumptable })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The label, if any, attached to the instruction at `index`. Ties
    /// (two labels resolving to the same index) pick one arbitrarily, same
    /// as the reference implementation's dict-comprehension reversal.
    #[must_use]
    pub fn label_at(&self, index: usize) -> Option<&JumpTarget> {
        self.jumptable.iter().find(|(_, &i)| i == index).map(|(label, _)| label)
    }

    /// Render the program back into RAM assembly text, in the same column
    /// layout the reference implementation's serializer produces: labels
    /// left-padded to `max label width + 3`, opcodes left-padded to 7, and
    /// each line right-trimmed.
    #[must_use]
    pub fn serialize(&self) -> String {
        let pad = self.jumptable.keys().map(|label| label.0.len()).max().map_or(0, |w| w + 3);

        let mut lines = Vec::with_capacity(self.instructions.len());
        for (index, instruction) in self.instructions.iter().enumerate() {
            let label = match self.label_at(index) {
                Some(label) => format!("{label}:"),
                None => String::new(),
            };
            let line = format!("{label:<pad$}{instruction}");
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::Operand;
    use crate::opcode::Opcode;

    #[test]
    fn serializes_with_label_and_opcode_columns() {
        let mut jumptable = HashMap::new();
        jumptable.insert(JumpTarget::new("loop"), 1);
        let instructions = vec![
            Instruction::with_operand(Opcode::Load, Operand::literal(0)).unwrap(),
            Instruction::with_operand(Opcode::Write, Operand::direct(0)).unwrap(),
            Instruction::without_operand(Opcode::Halt).unwrap(),
        ];
        let program = Program::new(instructions, jumptable).unwrap();
        let text = program.serialize();
        let pad = "loop".len() + 3;
        let expected = format!(
            "{:<pad$}LOAD   =0\n{:<pad$}WRITE  0\n{:<pad$}HALT",
            "",
            "loop:",
            "",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn rejects_an_unresolved_label() {
        let instructions = vec![Instruction::with_label(Opcode::Jump, "nowhere").unwrap()];
        assert!(Program::new(instructions, HashMap::new()).is_err());
    }

    #[test]
    fn rejects_a_jumptable_entry_past_the_end() {
        let mut jumptable = HashMap::new();
        jumptable.insert(JumpTarget::new("loop"), 5);
        let instructions = vec![Instruction::without_operand(Opcode::Halt).unwrap()];
        assert!(Program::new(instructions, jumptable).is_err());
    }
}
