use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a live universe. Unique among live universes only; the id of a
/// collapsed universe may be handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UniverseId(pub u32);

/// Identity of a black hole. Unique among all black holes ever created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlackHoleId(pub u32);

impl fmt::Display for UniverseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BlackHoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symbolic state label of a universe.
///
/// Purely observable: the label is re-rolled every lifecycle step and has no
/// effect on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CosmicState {
    Initialized,
    Expanding,
    Collapsing,
    Exploding,
    ReversingTime,
    Frozen,
    Splitting,
    Merging,
    Heating,
    Cooling,
    Entangled,
    Chaotic,
}

impl CosmicState {
    /// Labels a running universe can roll into. `Initialized` is only ever
    /// assigned at creation.
    pub const ACTIVE: [CosmicState; 11] = [
        CosmicState::Expanding,
        CosmicState::Collapsing,
        CosmicState::Exploding,
        CosmicState::ReversingTime,
        CosmicState::Frozen,
        CosmicState::Splitting,
        CosmicState::Merging,
        CosmicState::Heating,
        CosmicState::Cooling,
        CosmicState::Entangled,
        CosmicState::Chaotic,
    ];

    /// Label given to both ends of a wormhole.
    pub const LINKED: CosmicState = CosmicState::Entangled;

    /// Sample an active label uniformly.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ACTIVE[rng.gen_range(0..Self::ACTIVE.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::Expanding => "Expanding",
            Self::Collapsing => "Collapsing",
            Self::Exploding => "Exploding",
            Self::ReversingTime => "Reversing Time",
            Self::Frozen => "Frozen",
            Self::Splitting => "Splitting",
            Self::Merging => "Merging",
            Self::Heating => "Heating",
            Self::Cooling => "Cooling",
            Self::Entangled => "Entangled",
            Self::Chaotic => "Chaotic",
        }
    }
}

impl fmt::Display for CosmicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn random_never_yields_initialized() {
        let mut rng = create_rng(3);
        for _ in 0..500 {
            assert_ne!(CosmicState::random(&mut rng), CosmicState::Initialized);
        }
    }

    #[test]
    fn random_covers_every_active_label() {
        let mut rng = create_rng(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..2_000 {
            seen.insert(CosmicState::random(&mut rng));
        }
        assert_eq!(seen.len(), CosmicState::ACTIVE.len());
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(CosmicState::ReversingTime.to_string(), "Reversing Time");
        assert_eq!(format!("{}", UniverseId(42)), "42");
        assert_eq!(format!("{}", BlackHoleId(7)), "7");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&UniverseId(5)).unwrap();
        assert_eq!(json, "5");
    }
}
