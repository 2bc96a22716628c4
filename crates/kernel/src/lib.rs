//! Multiverse kernel: the shared registry of universes and black holes, the
//! per-universe lifecycle step, cross-universe interactions and the council.
//!
//! # Invariants
//! - Both mappings live behind one lock; every read and write takes it.
//! - Functions that run under the lock take `&mut Registry` and never lock.
//! - A universe leaves the live mapping through its own collapse (exactly one
//!   absorption into a new black hole) or through explicit deletion.
//! - Black hole mass equals the sum of absorbed entropies and never decreases.

pub mod council;
mod error;
pub mod interaction;
pub mod lifecycle;
mod physics;
pub mod registry;
mod universe;

pub use council::{CouncilReport, convene};
pub use error::KernelError;
pub use interaction::{SplitOutcome, Wormhole, cosmic_string, exchange, fluctuation_split};
pub use lifecycle::StepOutcome;
pub use physics::Physics;
pub use registry::{CollapseRecord, Lifeline, Registry, SharedRegistry};
pub use universe::{BlackHole, Universe};
