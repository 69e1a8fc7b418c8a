//! Loop detection over the handheld interpreter.
//!
//! Two strategies are provided:
//!
//! - [`run`] records every executed pointer in a [`VisitLog`] and stops on the
//!   first repeat. It reports the exact accumulator at loop entry and the path
//!   that led there, which is what repair needs.
//! - [`tortoise_hare`] uses Floyd's two-pointer scheme with O(1) extra memory.
//!   It only reports where the pointers met (or where the fast one left the
//!   program), not the loop entry or the accumulator at that point.

use crate::lang::program::InstructionSource;
use crate::runtime::config::MachineConfig;
use crate::runtime::context::Context;
use crate::runtime::interpreter::{StepBudget, step};
use crate::runtime::runtime_error::RuntimeError;
use serde::{Deserialize, Serialize};
use tracing::debug;

// =============================================================================
// VISIT LOG
// =============================================================================

/// Executed instruction pointers in execution order, with O(1) membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitLog {
    order: Vec<usize>,
    seen: Vec<bool>,
}

impl VisitLog {
    pub fn with_capacity(program_len: usize) -> Self {
        VisitLog {
            order: Vec::new(),
            seen: vec![false; program_len],
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.seen.get(index).copied().unwrap_or(false)
    }

    /// Record `index` as executed. Returns false if it was already present.
    pub fn record(&mut self, index: usize) -> bool {
        if index >= self.seen.len() {
            self.seen.resize(index + 1, false);
        }
        if self.seen[index] {
            return false;
        }
        self.seen[index] = true;
        self.order.push(index);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Most recently executed first.
    pub fn iter_rev(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().rev().copied()
    }
}

// =============================================================================
// VISITED-SET STRATEGY
// =============================================================================

/// How a visited-set run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The pointer left the program at or past its end.
    Halted { accumulator: i64, pointer: usize },

    /// The pointer came back to `repeated`. `accumulator` is the value just
    /// before the repeated instruction would run again.
    LoopDetected {
        accumulator: i64,
        repeated: usize,
        visits: VisitLog,
    },
}

impl Outcome {
    pub fn accumulator(&self) -> i64 {
        match self {
            Outcome::Halted { accumulator, .. } | Outcome::LoopDetected { accumulator, .. } => {
                *accumulator
            }
        }
    }

    /// True only when the pointer landed exactly one past the last instruction.
    pub fn halted_normally(&self, program_len: usize) -> bool {
        matches!(self, Outcome::Halted { pointer, .. } if *pointer == program_len)
    }
}

/// Run `source` from a fresh context until it halts or revisits an instruction.
pub fn run<S: InstructionSource + ?Sized>(
    source: &S,
    config: &MachineConfig,
) -> Result<Outcome, RuntimeError> {
    let len = source.len();
    let mut ctx = Context::new();
    let mut visits = VisitLog::with_capacity(len);
    let mut budget = StepBudget::new(config);

    loop {
        let ip = ctx.instruction_pointer();

        if visits.contains(ip) {
            debug!(
                repeated = ip,
                acc = ctx.accumulator(),
                visited = visits.len(),
                "loop detected"
            );
            return Ok(Outcome::LoopDetected {
                accumulator: ctx.accumulator(),
                repeated: ip,
                visits,
            });
        }

        if ip >= len {
            debug!(pointer = ip, len, acc = ctx.accumulator(), "halted");
            return Ok(Outcome::Halted {
                accumulator: ctx.accumulator(),
                pointer: ip,
            });
        }

        budget.spend(1)?;
        visits.record(ip);
        step(source, &mut ctx)?;
    }
}

// =============================================================================
// TORTOISE / HARE STRATEGY
// =============================================================================

/// Result of a two-pointer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rendezvous {
    /// The fast pointer left the program. Its accumulator is exact for the
    /// path it took.
    Escaped { pointer: usize, accumulator: i64 },

    /// Both pointers met at `pointer` after `rounds` rounds. The meeting
    /// point lies on the cycle but is not necessarily its entry.
    Cycle { pointer: usize, rounds: usize },
}

/// Floyd's cycle detection: the slow context advances one instruction per
/// round, the fast one two.
pub fn tortoise_hare<S: InstructionSource + ?Sized>(
    source: &S,
    config: &MachineConfig,
) -> Result<Rendezvous, RuntimeError> {
    let len = source.len();
    let mut slow = Context::new();
    let mut fast = Context::new();
    let mut budget = StepBudget::new(config);
    let mut rounds = 0;

    if len == 0 {
        return Ok(Rendezvous::Escaped {
            pointer: 0,
            accumulator: 0,
        });
    }

    loop {
        budget.spend(1)?;
        step(source, &mut slow)?;

        budget.spend(1)?;
        step(source, &mut fast)?;
        if fast.instruction_pointer() >= len {
            return Ok(escaped(&fast, len));
        }

        budget.spend(1)?;
        step(source, &mut fast)?;
        rounds += 1;

        if slow.instruction_pointer() == fast.instruction_pointer() {
            debug!(pointer = fast.instruction_pointer(), rounds, "pointers met");
            return Ok(Rendezvous::Cycle {
                pointer: fast.instruction_pointer(),
                rounds,
            });
        }

        if fast.instruction_pointer() >= len {
            return Ok(escaped(&fast, len));
        }
    }
}

fn escaped(fast: &Context, len: usize) -> Rendezvous {
    debug!(pointer = fast.instruction_pointer(), len, "fast pointer left the program");
    Rendezvous::Escaped {
        pointer: fast.instruction_pointer(),
        accumulator: fast.accumulator(),
    }
}
