use crate::frontend::load_error::LoadError;
use crate::lang::instruction::{Instruction, Opcode};

/// Line-oriented parser for handheld program text.
///
/// Yields one instruction per non-blank line, in order. Blank and
/// whitespace-only lines are skipped but still counted for error positions.
pub struct Parser<'a> {
    lines: std::str::Lines<'a>,
    line: usize,
    failed: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lines: source.lines(),
            line: 0,
            failed: false,
        }
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Instruction, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let raw = self.lines.next()?;
            self.line += 1;

            let text = raw.trim();
            if text.is_empty() {
                continue;
            }

            let result = parse_line(text, self.line);
            // The first load error ends the stream, it is not recoverable.
            self.failed = result.is_err();
            return Some(result);
        }
    }
}

/// Parse a single trimmed, non-empty line.
pub fn parse_line(text: &str, line: usize) -> Result<Instruction, LoadError> {
    let malformed = || LoadError::Malformed {
        line,
        text: text.to_string(),
    };

    let (mnemonic, operand) = text.split_once(' ').ok_or_else(malformed)?;

    if mnemonic.len() != 3 || !mnemonic.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(malformed());
    }

    let opcode: Opcode = mnemonic.parse().map_err(|_| LoadError::UnknownOpcode {
        line,
        mnemonic: mnemonic.to_string(),
    })?;

    let digits = match operand.as_bytes().first() {
        Some(b'+') | Some(b'-') => &operand[1..],
        Some(c) if c.is_ascii_digit() => {
            return Err(LoadError::MissingSign {
                line,
                operand: operand.to_string(),
            });
        }
        _ => return Err(malformed()),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let value = operand
        .parse::<i64>()
        .map_err(|_| LoadError::OperandOutOfRange {
            line,
            operand: operand.to_string(),
        })?;

    Ok(Instruction::new(opcode, value))
}
