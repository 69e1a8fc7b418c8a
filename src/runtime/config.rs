/// Limits applied to every run attempt.
#[derive(Debug, Clone, Default)]
pub struct MachineConfig {
    /// Hard cap on executed instructions per run attempt. Loop detection
    /// already guarantees termination, this only bounds work on huge inputs.
    pub max_steps: Option<usize>,
}

impl MachineConfig {
    pub fn with_max_steps(max_steps: usize) -> Self {
        MachineConfig {
            max_steps: Some(max_steps),
        }
    }
}
