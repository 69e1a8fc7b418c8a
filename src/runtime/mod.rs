pub mod config;
pub mod context;
pub mod detector;
pub mod interpreter;
pub mod repair;
pub mod runtime_error;

pub use config::MachineConfig;
pub use context::Context;
pub use detector::{Outcome, Rendezvous, VisitLog};
pub use repair::Repair;
pub use runtime_error::RuntimeError;
