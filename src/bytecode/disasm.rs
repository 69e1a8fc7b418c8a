use crate::lang::{Instruction, Opcode, Program};

/// Where a relative jump from `ip` lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    /// Exactly one past the last instruction: a normal halt.
    End,
    /// Before the start or past the end.
    OutOfRange(i128),
}

pub fn jump_target(ip: usize, offset: i64, len: usize) -> Target {
    let target = ip as i128 + offset as i128;
    if target < 0 || target > len as i128 {
        Target::OutOfRange(target)
    } else if target as usize == len {
        Target::End
    } else {
        Target::Index(target as usize)
    }
}

fn collect_jump_targets(program: &Program) -> Vec<usize> {
    let mut targets = Vec::new();

    for (ip, instruction) in program.iter().enumerate() {
        if instruction.opcode != Opcode::Jmp {
            continue;
        }
        if let Target::Index(target) = jump_target(ip, instruction.operand, program.len()) {
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    targets
}

/// Render a program listing.
///
/// Jump targets get a marker line, every `jmp` shows its absolute
/// destination and every `nop` shows where it would go if flipped.
pub fn disassemble(program: &Program) -> String {
    let jump_targets = collect_jump_targets(program);
    let mut out = String::new();

    out.push_str("════════════════════════════════════════\n");
    out.push_str(" program\n");
    out.push_str(&format!(" {} instructions\n", program.len()));
    out.push_str("════════════════════════════════════════\n");

    for (ip, instruction) in program.iter().enumerate() {
        let is_target = jump_targets.contains(&ip);

        if is_target {
            out.push_str("      ┌──────────────────────────────────\n");
        }

        let marker = if is_target { "► " } else { "  " };
        out.push_str(&format!(
            "{:04} {}{}\n",
            ip,
            marker,
            format_instruction(instruction, ip, program.len())
        ));
    }

    out
}

fn format_instruction(instruction: &Instruction, ip: usize, len: usize) -> String {
    let operand = instruction.operand;

    match instruction.opcode {
        Opcode::Acc => format!("ACC   {:+}", operand),
        Opcode::Jmp => {
            let direction = if operand < 0 { "↑" } else { "↓" };
            format!(
                "JMP   {:+} {} ({})",
                operand,
                direction,
                describe(jump_target(ip, operand, len))
            )
        }
        Opcode::Nop => format!(
            "NOP   {:+}   ; flip {}",
            operand,
            describe(jump_target(ip, operand, len))
        ),
    }
}

fn describe(target: Target) -> String {
    match target {
        Target::Index(index) => format!("→ {:04}", index),
        Target::End => "→ end".to_string(),
        Target::OutOfRange(target) => format!("→ {} out of range", target),
    }
}

/// Print the listing to stdout.
pub fn print_program(program: &Program) {
    print!("{}", disassemble(program));
}
