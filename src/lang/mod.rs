//! # Handheld data model
//!
//! Instructions and programs for the three-opcode handheld machine.
//!
//! ## Conventions
//!
//! - Source lines are `<opcode> <signed operand>`, e.g. `jmp -4`.
//! - Program indices start at 0 and never change during a run.

pub mod instruction;
pub mod program;

pub use instruction::{Instruction, Opcode};
pub use program::{InstructionSource, Patched, Program};
