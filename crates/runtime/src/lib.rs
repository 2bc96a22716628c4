//! Multiverse runtime: one tokio task per universe plus the periodic drivers
//! (growth, fluctuations, council, observer) and the operator console.
//!
//! # Invariants
//! - Registry critical sections are synchronous; no lock guard crosses an
//!   `.await`.
//! - Tasks are spawned only after the registry lock is released.
//! - Every task is supervised and stops at its next suspension point once
//!   shutdown is triggered.

pub mod config;
pub mod console;
pub mod drivers;
mod error;
mod multiverse;
mod population;
mod shutdown;
mod supervisor;
pub mod task;

pub use config::{ConfigError, MillisRange, RuntimeConfig};
pub use console::{CommandEffect, apply_command, run_console};
pub use error::RuntimeError;
pub use multiverse::{Multiverse, RunReport};
pub use population::Population;
pub use shutdown::Shutdown;
pub use supervisor::Supervisor;
