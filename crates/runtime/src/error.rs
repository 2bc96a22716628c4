use multiverse_kernel::KernelError;

use crate::ConfigError;

/// Errors surfaced by the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
    #[error("{0} supervised task(s) panicked")]
    TasksPanicked(usize),
}
