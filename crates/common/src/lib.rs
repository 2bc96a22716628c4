//! Shared types for the multiverse workspace: identities, state labels, RNG.

pub mod rng;
pub mod types;

pub use rng::{SimRng, create_rng, derive_rng};
pub use types::{BlackHoleId, CosmicState, UniverseId};
