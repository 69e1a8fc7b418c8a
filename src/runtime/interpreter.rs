use crate::lang::instruction::{Instruction, Opcode};
use crate::lang::program::InstructionSource;
use crate::runtime::config::MachineConfig;
use crate::runtime::context::Context;
use crate::runtime::runtime_error::RuntimeError;
use tracing::trace;

/// Apply one instruction to `ctx`.
///
/// | op  | effect            | pointer       |
/// |-----|-------------------|---------------|
/// | acc | acc += operand    | +1            |
/// | jmp | -                 | += operand    |
/// | nop | -                 | +1            |
pub fn execute(instruction: &Instruction, ctx: &mut Context) -> Result<(), RuntimeError> {
    match instruction.opcode {
        Opcode::Acc => {
            ctx.accumulate(instruction.operand);
            ctx.advance();
        }
        Opcode::Jmp => ctx.jump(instruction.operand)?,
        Opcode::Nop => ctx.advance(),
    }
    Ok(())
}

/// Fetch the instruction at the context pointer and execute it.
pub fn step<S: InstructionSource + ?Sized>(
    source: &S,
    ctx: &mut Context,
) -> Result<(), RuntimeError> {
    let ip = ctx.instruction_pointer();
    let instruction = source.fetch(ip)?;

    trace!(ip, %instruction, acc = ctx.accumulator(), "exec");

    execute(&instruction, ctx)
}

/// Per-attempt step counter enforcing [`MachineConfig::max_steps`].
#[derive(Debug)]
pub struct StepBudget {
    max: Option<usize>,
    steps: usize,
}

impl StepBudget {
    pub fn new(config: &MachineConfig) -> Self {
        StepBudget {
            max: config.max_steps,
            steps: 0,
        }
    }

    /// Count `n` executed instructions.
    pub fn spend(&mut self, n: usize) -> Result<(), RuntimeError> {
        self.steps += n;

        if let Some(max) = self.max {
            if self.steps > max {
                return Err(RuntimeError::StepLimit(max));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::program::Program;

    fn exec_one(instruction: Instruction, ctx: &mut Context) {
        execute(&instruction, ctx).expect("execution should succeed");
    }

    #[test]
    fn test_acc_adds_and_advances() {
        let mut ctx = Context::new();
        exec_one(Instruction::acc(7), &mut ctx);
        assert_eq!(ctx.accumulator(), 7);
        assert_eq!(ctx.instruction_pointer(), 1);
    }

    #[test]
    fn test_nop_only_advances() {
        let mut ctx = Context::new();
        exec_one(Instruction::nop(-50), &mut ctx);
        assert_eq!(ctx.accumulator(), 0);
        assert_eq!(ctx.instruction_pointer(), 1);
    }

    #[test]
    fn test_jmp_does_not_add_one() {
        let mut ctx = Context::new();
        exec_one(Instruction::jmp(3), &mut ctx);
        assert_eq!(ctx.instruction_pointer(), 3);

        exec_one(Instruction::jmp(0), &mut ctx);
        assert_eq!(ctx.instruction_pointer(), 3);
    }

    #[test]
    fn test_jmp_before_start_is_bounds_error() {
        let mut ctx = Context::new();
        assert!(matches!(
            execute(&Instruction::jmp(-1), &mut ctx),
            Err(RuntimeError::Bounds { from: 0, offset: -1 })
        ));
    }

    #[test]
    fn test_step_fetches_at_pointer() {
        let program = Program::from_instructions(vec![
            Instruction::jmp(2),
            Instruction::acc(100),
            Instruction::acc(1),
        ]);
        let mut ctx = Context::new();
        step(&program, &mut ctx).unwrap();
        step(&program, &mut ctx).unwrap();
        assert_eq!(ctx.accumulator(), 1);
        assert_eq!(ctx.instruction_pointer(), 3);
    }

    #[test]
    fn test_step_past_end_fails() {
        let program = Program::from_instructions(vec![Instruction::nop(0)]);
        let mut ctx = Context::new();
        step(&program, &mut ctx).unwrap();
        assert!(matches!(
            step(&program, &mut ctx),
            Err(RuntimeError::MissingInstruction { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_step_budget() {
        let mut budget = StepBudget::new(&MachineConfig::with_max_steps(2));
        assert!(budget.spend(1).is_ok());
        assert!(budget.spend(1).is_ok());
        assert_eq!(budget.spend(1), Err(RuntimeError::StepLimit(2)));
    }
}
