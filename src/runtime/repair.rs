//! Single-instruction repair.
//!
//! A looping program with exactly one corrupted `jmp` or `nop` is fixed by
//! flipping that instruction. The corrupted instruction must lie on the path
//! executed before the loop closed, so candidates are taken from the visit
//! log, newest first. The first flip that makes the program halt exactly at
//! its end wins.

use crate::lang::instruction::Instruction;
use crate::lang::program::{InstructionSource, Patched, Program};
use crate::runtime::config::MachineConfig;
use crate::runtime::detector::{Outcome, VisitLog, run};
use crate::runtime::runtime_error::RuntimeError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A successful repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    /// Index of the flipped instruction.
    pub index: usize,
    pub original: Instruction,
    pub replacement: Instruction,
    /// Accumulator after the repaired program halted.
    pub accumulator: i64,
    /// Number of candidate flips run, including the successful one.
    pub attempts: usize,
}

/// Repair candidates in search order: every visited `jmp`/`nop`, most
/// recently executed first, paired with its flipped form.
pub fn candidates<'a, S: InstructionSource + ?Sized>(
    visits: &'a VisitLog,
    source: &'a S,
) -> impl Iterator<Item = Result<(usize, Instruction, Instruction), RuntimeError>> {
    visits.iter_rev().filter_map(move |index| match source.fetch(index) {
        Ok(original) => original
            .flipped()
            .map(|replacement| Ok((index, original, replacement))),
        Err(e) => Some(Err(e)),
    })
}

/// Find the single flip that makes `program` terminate.
pub fn repair(program: &Program, config: &MachineConfig) -> Result<Repair, RuntimeError> {
    let visits = match run(program, config)? {
        Outcome::LoopDetected {
            accumulator,
            repeated,
            visits,
        } => {
            debug!(
                repeated,
                acc = accumulator,
                visited = visits.len(),
                "unmodified program loops, searching for repair"
            );
            visits
        }
        Outcome::Halted { accumulator, .. } => {
            return Err(RuntimeError::NotLooping { accumulator });
        }
    };

    let len = program.len();
    let mut patched = Patched::new(program);
    let mut attempts = 0;

    for candidate in candidates(&visits, program) {
        let (index, original, replacement) = candidate?;
        attempts += 1;

        patched.set_override(index, replacement)?;
        let trial = run(&patched, config);
        patched.clear_overrides();

        match trial {
            Ok(outcome) if outcome.halted_normally(len) => {
                debug!(index, %original, %replacement, attempts, "repair found");
                return Ok(Repair {
                    index,
                    original,
                    replacement,
                    accumulator: outcome.accumulator(),
                    attempts,
                });
            }
            Ok(Outcome::Halted { pointer, .. }) => {
                debug!(index, %replacement, pointer, len, "candidate halts past the end");
            }
            Ok(Outcome::LoopDetected { repeated, .. }) => {
                debug!(index, %replacement, repeated, "candidate still loops");
            }
            Err(RuntimeError::Bounds { from, offset }) => {
                warn!(index, %replacement, from, offset, "candidate jumps before the start");
            }
            Err(e) => return Err(e),
        }
    }

    Err(RuntimeError::NoRepairFound {
        candidates: attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "nop +0\nacc +1\njmp +4\nacc +3\njmp -3\nacc -99\nacc +1\njmp -4\nacc +6";

    fn repair_source(source: &str) -> Result<Repair, RuntimeError> {
        let program = Program::parse(source).expect("program should parse");
        repair(&program, &MachineConfig::default())
    }

    #[test]
    fn test_sample_repair() {
        let fix = repair_source(SAMPLE).unwrap();
        assert_eq!(fix.index, 7);
        assert_eq!(fix.original, Instruction::jmp(-4));
        assert_eq!(fix.replacement, Instruction::nop(-4));
        assert_eq!(fix.accumulator, 8);
        // jmp -3 at index 4 is tried first and still loops.
        assert_eq!(fix.attempts, 2);
    }

    #[test]
    fn test_candidate_order_skips_acc() {
        let program = Program::parse(SAMPLE).unwrap();
        let visits = match run(&program, &MachineConfig::default()).unwrap() {
            Outcome::LoopDetected { visits, .. } => visits,
            other => panic!("expected loop, got {:?}", other),
        };
        let order: Vec<usize> = candidates(&visits, &program)
            .map(|c| c.unwrap().0)
            .collect();
        assert_eq!(order, vec![4, 7, 2, 0]);
    }

    #[test]
    fn test_nop_flipped_to_jmp() {
        // Flipping the jmp -1 still loops through jmp -2, so the nop is the fix.
        let fix = repair_source("nop +3\njmp -1\njmp -2\nacc +4").unwrap();
        assert_eq!(fix.index, 0);
        assert_eq!(fix.original, Instruction::nop(3));
        assert_eq!(fix.replacement, Instruction::jmp(3));
        assert_eq!(fix.accumulator, 4);
        assert_eq!(fix.attempts, 2);
    }

    #[test]
    fn test_already_halting_program() {
        assert_eq!(
            repair_source("acc +5"),
            Err(RuntimeError::NotLooping { accumulator: 5 })
        );
    }

    #[test]
    fn test_no_repair_found() {
        // Both instructions are corrupted, one flip is never enough.
        assert_eq!(
            repair_source("jmp +0\njmp -1"),
            Err(RuntimeError::NoRepairFound { candidates: 1 })
        );
    }

    #[test]
    fn test_jump_before_start_is_rejected() {
        // Flipping nop -5 at index 2 would jump before index 0. The search
        // moves on and finds nop +5 at index 0.
        let fix = repair_source("nop +5\njmp +1\nnop -5\njmp -3\njmp -4\nacc +9").unwrap();
        assert_eq!(fix.index, 0);
        assert_eq!(fix.replacement, Instruction::jmp(5));
        assert_eq!(fix.accumulator, 9);
        assert_eq!(fix.attempts, 4);
    }

    #[test]
    fn test_overshooting_end_is_not_a_repair() {
        // nop +7 flipped lands at 8 in a 4-instruction program.
        assert_eq!(
            repair_source("acc +1\nnop +7\njmp -2\njmp -3"),
            Err(RuntimeError::NoRepairFound { candidates: 2 })
        );
    }

    #[test]
    fn test_repeated_repair_is_stable() {
        let first = repair_source(SAMPLE).unwrap();
        let second = repair_source(SAMPLE).unwrap();
        assert_eq!(first, second);
    }
}
