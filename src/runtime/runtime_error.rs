use thiserror::Error;

/// Failures while running or repairing a program.
///
/// A loop is not an error: the detectors report it as an
/// [`Outcome`](crate::runtime::detector::Outcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A jump would move the pointer before the first instruction
    /// (or past the addressable range).
    #[error("jump {offset:+} from instruction {from} leaves the program")]
    Bounds { from: usize, offset: i64 },

    /// An instruction was requested past the end of the program.
    #[error("no instruction at index {index} (program has {len})")]
    MissingInstruction { index: usize, len: usize },

    #[error("execution step limit exceeded ({0})")]
    StepLimit(usize),

    /// Repair needs a program that loops when unmodified.
    #[error("program already halts (accumulator {accumulator}), nothing to repair")]
    NotLooping { accumulator: i64 },

    /// Every flip along the executed path was tried and none halted.
    #[error("no single-instruction repair found ({candidates} candidates tried)")]
    NoRepairFound { candidates: usize },
}
