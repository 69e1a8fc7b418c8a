use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// OPCODE - the closed instruction set
// =============================================================================

/// Operation kind of a handheld instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// `acc`: add the operand to the accumulator, then advance by one.
    Acc,

    /// `jmp`: relative jump. The operand alone decides the next pointer,
    /// `jmp +1` continues with the following instruction and `jmp +0` spins.
    Jmp,

    /// `nop`: do nothing and advance by one. The operand is kept so the
    /// instruction can be flipped into a `jmp` during repair.
    Nop,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Acc => "acc",
            Opcode::Jmp => "jmp",
            Opcode::Nop => "nop",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Returned when a mnemonic is not one of `acc`, `jmp` or `nop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOpcode(pub String);

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acc" => Ok(Opcode::Acc),
            "jmp" => Ok(Opcode::Jmp),
            "nop" => Ok(Opcode::Nop),
            other => Err(UnknownOpcode(other.to_string())),
        }
    }
}

// =============================================================================
// INSTRUCTION
// =============================================================================

/// A single decoded instruction. Identity is positional: two equal
/// instructions at different indices are still different program points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: i64,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: i64) -> Self {
        Self { opcode, operand }
    }

    pub fn acc(operand: i64) -> Self {
        Self::new(Opcode::Acc, operand)
    }

    pub fn jmp(operand: i64) -> Self {
        Self::new(Opcode::Jmp, operand)
    }

    pub fn nop(operand: i64) -> Self {
        Self::new(Opcode::Nop, operand)
    }

    /// The repair substitution for this instruction: `jmp` and `nop` swap,
    /// keeping the operand. `acc` is never a repair candidate.
    pub fn flipped(&self) -> Option<Instruction> {
        match self.opcode {
            Opcode::Jmp => Some(Instruction::nop(self.operand)),
            Opcode::Nop => Some(Instruction::jmp(self.operand)),
            Opcode::Acc => None,
        }
    }
}

impl std::fmt::Display for Instruction {
    /// Formats using the source grammar, sign always written.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:+}", self.opcode, self.operand)
    }
}
