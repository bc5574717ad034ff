use std::fmt;

/// How an [`Operand`]'s integer addresses memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandFlag {
    /// `=v` — the value `v` itself.
    Literal,
    /// `v` — register `v`.
    Direct,
    /// `*v` — the register named by the contents of register `v`.
    Indirect,
}

/// A resolved operand: an integer paired with the addressing mode that
/// decides what the integer means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operand {
    pub flag: OperandFlag,
    pub value: i64,
}

impl Operand {
    #[must_use]
    pub fn literal(value: i64) -> Self {
        Self { flag: OperandFlag::Literal, value }
    }

    #[must_use]
    pub fn direct(value: i64) -> Self {
        Self { flag: OperandFlag::Direct, value }
    }

    #[must_use]
    pub fn indirect(value: i64) -> Self {
        Self { flag: OperandFlag::Indirect, value }
    }

    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self.flag, OperandFlag::Literal)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.flag {
            OperandFlag::Literal => write!(f, "={}", self.value),
            OperandFlag::Direct => write!(f, "{}", self.value),
            OperandFlag::Indirect => write!(f, "*{}", self.value),
        }
    }
}

/// The name of a jump label, distinct from an [`Operand`] since it addresses
/// an instruction index rather than a memory cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JumpTarget(pub String);

impl JumpTarget {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl fmt::Display for JumpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An instruction's address: either a resolved [`Operand`] or a label still
/// waiting to be resolved against a [`crate::Program`]'s jump table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    Operand(Operand),
    Label(JumpTarget),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Operand(operand) => write!(f, "{operand}"),
            Address::Label(label) => write!(f, "{label}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_the_right_sigil() {
        assert_eq!(Operand::literal(5).to_string(), "=5");
        assert_eq!(Operand::direct(5).to_string(), "5");
        assert_eq!(Operand::indirect(5).to_string(), "*5");
    }
}
