//! Register file for the RAM virtual machine.

use rustc_hash::FxHashMap;

use ram_error::{Error, Result};

/// The machine's registers, keyed by integer address.
///
/// Unlike a conventional sparse array that defaults missing entries to
/// zero, reading a register that has never been written is an error —
/// `c(i)` in the reference model is a partial function. Register 0 (the
/// accumulator) is the only one pre-initialized, matching a fresh machine
/// starting with an accumulator of zero.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: FxHashMap<i64, i64>,
}

impl Memory {
    #[must_use]
    pub fn new() -> Self {
        let mut cells = FxHashMap::default();
        cells.insert(0, 0);
        Self { cells }
    }

    pub fn get(&self, address: i64) -> Result<i64> {
        self.cells.get(&address).copied().ok_or(Error::UninitializedRegister { register: address })
    }

    pub fn set(&mut self, address: i64, value: i64) {
        self.cells.insert(address, value);
    }

    pub fn reset(&mut self) {
        self.cells.clear();
        self.cells.insert(0, 0);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
