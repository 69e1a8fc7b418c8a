use super::instruction::Instruction;
use crate::frontend::load_error::LoadError;
use crate::frontend::parser::Parser;
use crate::runtime::runtime_error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything the interpreter can fetch instructions from.
///
/// Indices are stable for the lifetime of a run: instructions are never
/// reordered, at most replaced by an override layer.
pub trait InstructionSource {
    /// Instruction at `index`. Fetching past the end is an error, the
    /// interpreter never does so while the pointer is in bounds.
    fn fetch(&self, index: usize) -> Result<Instruction, RuntimeError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// PROGRAM - eagerly parsed instruction sequence
// =============================================================================

/// A parsed handheld program, indexed `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Parse program text, one instruction per non-blank line.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let instructions = Parser::new(source).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { instructions })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }
}

impl InstructionSource for Program {
    fn fetch(&self, index: usize) -> Result<Instruction, RuntimeError> {
        self.instructions
            .get(index)
            .copied()
            .ok_or(RuntimeError::MissingInstruction {
                index,
                len: self.instructions.len(),
            })
    }

    fn len(&self) -> usize {
        self.instructions.len()
    }
}

// =============================================================================
// PATCHED - transparent override layer
// =============================================================================

/// A borrowed program with a sparse set of positional overrides.
///
/// The base program is never mutated, so it stays valid for every repair
/// attempt. At most one override is active at a time.
#[derive(Debug, Clone)]
pub struct Patched<'a> {
    base: &'a Program,
    overrides: HashMap<usize, Instruction>,
}

impl<'a> Patched<'a> {
    pub fn new(base: &'a Program) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
        }
    }

    /// Install `instruction` at `index`, replacing any override already set.
    pub fn set_override(
        &mut self,
        index: usize,
        instruction: Instruction,
    ) -> Result<(), RuntimeError> {
        if index >= self.base.len() {
            return Err(RuntimeError::MissingInstruction {
                index,
                len: self.base.len(),
            });
        }
        self.overrides.clear();
        self.overrides.insert(index, instruction);
        Ok(())
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn override_at(&self, index: usize) -> Option<Instruction> {
        self.overrides.get(&index).copied()
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }
}

impl InstructionSource for Patched<'_> {
    fn fetch(&self, index: usize) -> Result<Instruction, RuntimeError> {
        match self.overrides.get(&index) {
            Some(instruction) => Ok(*instruction),
            None => self.base.fetch(index),
        }
    }

    fn len(&self) -> usize {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Program {
        Program::from_instructions(vec![
            Instruction::nop(0),
            Instruction::acc(1),
            Instruction::jmp(-2),
        ])
    }

    #[test]
    fn test_fetch_in_bounds() {
        let program = sample();
        assert_eq!(program.fetch(1).unwrap(), Instruction::acc(1));
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_fetch_past_end() {
        let program = sample();
        assert!(matches!(
            program.fetch(3),
            Err(RuntimeError::MissingInstruction { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_parse_skips_blank_lines_for_length() {
        let program = Program::parse("nop +0\n\n   \nacc +1\n").unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_override_shadows_base() {
        let program = sample();
        let mut patched = Patched::new(&program);
        patched.set_override(2, Instruction::nop(-2)).unwrap();

        assert_eq!(patched.fetch(2).unwrap(), Instruction::nop(-2));
        assert_eq!(patched.fetch(0).unwrap(), Instruction::nop(0));
        assert_eq!(program.fetch(2).unwrap(), Instruction::jmp(-2));
        assert_eq!(patched.len(), program.len());
    }

    #[test]
    fn test_second_override_replaces_first() {
        let program = sample();
        let mut patched = Patched::new(&program);
        patched.set_override(0, Instruction::jmp(0)).unwrap();
        patched.set_override(2, Instruction::nop(-2)).unwrap();

        assert_eq!(patched.override_at(0), None);
        assert_eq!(patched.fetch(0).unwrap(), Instruction::nop(0));
        assert_eq!(patched.override_at(2), Some(Instruction::nop(-2)));
    }

    #[test]
    fn test_clear_restores_base_at_every_index() {
        let program = sample();
        let mut patched = Patched::new(&program);
        patched.set_override(1, Instruction::jmp(5)).unwrap();
        patched.clear_overrides();

        assert!(!patched.has_overrides());
        for index in 0..program.len() {
            assert_eq!(patched.fetch(index).unwrap(), program.fetch(index).unwrap());
        }
    }

    #[test]
    fn test_override_out_of_range_rejected() {
        let program = sample();
        let mut patched = Patched::new(&program);
        assert!(patched.set_override(3, Instruction::nop(0)).is_err());
        assert!(!patched.has_overrides());
    }
}
