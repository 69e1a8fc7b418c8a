use crate::runtime::runtime_error::RuntimeError;
use serde::{Deserialize, Serialize};

/// Mutable machine state for one run attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    accumulator: i64,
    instruction_pointer: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulator(&self) -> i64 {
        self.accumulator
    }

    pub fn instruction_pointer(&self) -> usize {
        self.instruction_pointer
    }

    pub fn accumulate(&mut self, amount: i64) {
        self.accumulator = self.accumulator.wrapping_add(amount);
    }

    pub fn advance(&mut self) {
        self.instruction_pointer += 1;
    }

    /// Move the pointer by `offset`. A target below zero is a bounds error
    /// and leaves the context untouched.
    pub fn jump(&mut self, offset: i64) -> Result<(), RuntimeError> {
        let from = self.instruction_pointer;
        let target = isize::try_from(offset)
            .ok()
            .and_then(|delta| from.checked_add_signed(delta))
            .ok_or(RuntimeError::Bounds { from, offset })?;

        self.instruction_pointer = target;
        Ok(())
    }
}
