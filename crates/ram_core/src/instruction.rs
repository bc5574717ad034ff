use std::fmt;

use ram_error::{Error, Result};

use crate::operand::{Address, Operand, OperandFlag};
use crate::opcode::Opcode;

/// A single RAM instruction: an opcode and the address it acts on.
///
/// Instructions are immutable and self-contained once constructed — a
/// [`Program`](crate::Program) never rewrites one. [`Instruction::new`]
/// enforces the addressing-mode rules that are local to a single
/// instruction (arity, and which [`OperandFlag`]s an opcode accepts);
/// resolving jump labels against a jump table is [`crate::Program`]'s job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub address: Option<Address>,
}

impl Instruction {
    /// Build an instruction, validating arity and addressing mode.
    pub fn new(opcode: Opcode, address: Option<Address>) -> Result<Self> {
        match (opcode, &address) {
            (Opcode::Halt, None) => {}
            (Opcode::Halt, Some(_)) => {
                return Err(Error::compile(format!("{opcode} takes no operand")));
            }
            (op, None) if op.takes_operand() => {
                return Err(Error::compile(format!("{opcode} requires an operand")));
            }
            (op, Some(Address::Label(_))) if !op.takes_jump_target() => {
                return Err(Error::compile(format!("{opcode} cannot address a label")));
            }
            (op, Some(Address::Operand(_))) if op.takes_jump_target() => {
                return Err(Error::compile(format!("{opcode} requires a label operand")));
            }
            (Opcode::Store | Opcode::Read, Some(Address::Operand(operand)))
                if operand.flag == OperandFlag::Literal =>
            {
                return Err(Error::compile(format!(
                    "{opcode} cannot target a literal operand"
                )));
            }
            _ => {}
        }
        Ok(Self { opcode, address })
    }

    #[must_use]
    pub fn without_operand(opcode: Opcode) -> Result<Self> {
        Self::new(opcode, None)
    }

    #[must_use]
    pub fn with_operand(opcode: Opcode, operand: Operand) -> Result<Self> {
        Self::new(opcode, Some(Address::Operand(operand)))
    }

    #[must_use]
    pub fn with_label(opcode: Opcode, label: impl Into<String>) -> Result<Self> {
        Self::new(opcode, Some(Address::Label(crate::operand::JumpTarget::new(label))))
    }

    /// The [`Operand`] this instruction addresses, if any and if resolved.
    #[must_use]
    pub fn operand(&self) -> Option<Operand> {
        match &self.address {
            Some(Address::Operand(operand)) => Some(*operand),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{:<7}{address}", self.opcode.as_str()),
            None => write!(f, "{}", self.opcode.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halt_rejects_an_operand() {
        assert!(Instruction::with_operand(Opcode::Halt, Operand::direct(1)).is_err());
    }

    #[test]
    fn store_rejects_a_literal_target() {
        assert!(Instruction::with_operand(Opcode::Store, Operand::literal(1)).is_err());
        assert!(Instruction::with_operand(Opcode::Store, Operand::direct(1)).is_ok());
    }

    #[test]
    fn jumps_require_a_label() {
        assert!(Instruction::with_operand(Opcode::Jump, Operand::direct(1)).is_err());
        assert!(Instruction::with_label(Opcode::Jump, "loop").is_ok());
    }

    fn any_opcode() -> impl proptest::strategy::Strategy<Value = Opcode> {
        proptest::sample::select(Opcode::ALL.to_vec())
    }

    fn any_operand() -> impl proptest::strategy::Strategy<Value = Operand> {
        use proptest::prelude::*;
        prop_oneof![
            any::<i64>().prop_map(Operand::literal),
            any::<i64>().prop_map(Operand::direct),
            any::<i64>().prop_map(Operand::indirect),
        ]
    }

    proptest::proptest! {
        /// §3.2's addressing-mode rules hold for every (opcode, operand)
        /// pair, not just the handful of examples above: a jump opcode
        /// never accepts an `Operand` address, a non-jump opcode never
        /// accepts a `JumpTarget`, and `STORE`/`READ` never accept a
        /// literal regardless of which register or value it names.
        #[test]
        fn addressing_mode_rules_hold_for_any_operand(opcode in any_opcode(), operand in any_operand()) {
            let result = Instruction::with_operand(opcode, operand);
            if opcode.takes_jump_target() {
                prop_assert!(result.is_err());
            } else if matches!(opcode, Opcode::Store | Opcode::Read) && operand.is_literal() {
                prop_assert!(result.is_err());
            } else if opcode == Opcode::Halt {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
            }
        }

        #[test]
        fn jump_opcodes_never_accept_a_resolved_operand(opcode in any_opcode(), operand in any_operand()) {
            if opcode.takes_jump_target() {
                prop_assert!(Instruction::new(opcode, Some(Address::Operand(operand))).is_err());
            }
        }
    }
}
