//! Developer tooling: multiverse inspector, registry dumps.
//!
//! # Invariants
//! - Tools only read; they never mutate the registry.

pub mod inspector;

pub use inspector::{
    BlackHoleInfo, MultiverseInspector, MultiverseSummary, RegistryDump, UniverseInfo,
};

pub fn crate_info() -> &'static str {
    "multiverse-tools v0.1.0"
}
