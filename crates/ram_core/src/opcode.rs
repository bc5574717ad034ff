use std::fmt;

use ram_error::{Error, Result};

/// The closed set of RAM instruction opcodes (Aho, Hopcroft & Ullman,
/// *The Design and Analysis of Computer Algorithms*, ch. 1). There is no
/// plugin mechanism here on purpose: the instruction set is part of the
/// model, not an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Load,
    Store,
    Add,
    Sub,
    Mult,
    Div,
    Read,
    Write,
    Jump,
    Jgtz,
    Jzero,
    Halt,
}

impl Opcode {
    pub const ALL: [Opcode; 12] = [
        Opcode::Load,
        Opcode::Store,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mult,
        Opcode::Div,
        Opcode::Read,
        Opcode::Write,
        Opcode::Jump,
        Opcode::Jgtz,
        Opcode::Jzero,
        Opcode::Halt,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mult => "MULT",
            Opcode::Div => "DIV",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Jump => "JUMP",
            Opcode::Jgtz => "JGTZ",
            Opcode::Jzero => "JZERO",
            Opcode::Halt => "HALT",
        }
    }

    /// Only `HALT` takes no address.
    #[must_use]
    pub fn takes_operand(self) -> bool {
        !matches!(self, Opcode::Halt)
    }

    /// `JUMP`, `JGTZ` and `JZERO` address a label rather than an operand.
    #[must_use]
    pub fn takes_jump_target(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Jgtz | Opcode::Jzero)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::compile(format!("unknown opcode {s:?}")))
    }
}
