use multiverse_common::{BlackHoleId, UniverseId};

/// Errors from registry mutations.
///
/// Missing pairing targets and empty registries are not errors; they show up
/// as outcome values instead.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("universe {0} is already live")]
    UniverseExists(UniverseId),
    #[error("black hole {0} already exists")]
    BlackHoleExists(BlackHoleId),
    #[error("no vacant universe id left in an id space of {capacity}")]
    IdSpaceExhausted { capacity: u32 },
    #[error("invalid physics: {0}")]
    InvalidPhysics(&'static str),
}
