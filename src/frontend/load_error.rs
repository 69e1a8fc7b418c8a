use std::path::PathBuf;
use thiserror::Error;

/// A program that could not be loaded.
///
/// `line` is 1-based and counts blank lines, so it matches what an editor
/// shows. Load errors are fatal: nothing is executed from a program that
/// failed to parse.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The line is not `<opcode> <signed integer>`.
    #[error("{line}: malformed instruction '{text}' (expected `<op> <+|-><digits>`)")]
    Malformed { line: usize, text: String },

    #[error("{line}: unknown opcode '{mnemonic}' (expected acc, jmp or nop)")]
    UnknownOpcode { line: usize, mnemonic: String },

    /// Operands must carry an explicit `+` or `-`.
    #[error("{line}: operand '{operand}' is missing its sign")]
    MissingSign { line: usize, operand: String },

    #[error("{line}: operand '{operand}' does not fit in a 64-bit integer")]
    OperandOutOfRange { line: usize, operand: String },

    #[error("'{}' is not valid UTF-8 text", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Source line the error points at, if it came from parsing.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::Malformed { line, .. }
            | LoadError::UnknownOpcode { line, .. }
            | LoadError::MissingSign { line, .. }
            | LoadError::OperandOutOfRange { line, .. } => Some(*line),
            LoadError::InvalidUtf8 { .. } | LoadError::Io { .. } => None,
        }
    }
}
