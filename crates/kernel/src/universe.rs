use multiverse_common::{BlackHoleId, CosmicState, UniverseId};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Physics;

/// A live universe.
///
/// Owned by the registry. Entropy and state are mutated by the universe's own
/// lifecycle task or by interaction events, always under the registry lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub id: UniverseId,
    pub state: CosmicState,
    pub entropy: f64,
    /// Fixed at creation.
    pub wormhole_capable: bool,
    /// Assigned by the registry on insert. Distinguishes this universe from a
    /// later one that re-uses the same id.
    pub incarnation: u64,
}

impl Universe {
    /// A freshly born universe with random entropy in `[0, 1)` and random
    /// wormhole capability.
    pub fn spawn(id: UniverseId, physics: &Physics, rng: &mut impl Rng) -> Self {
        Self {
            id,
            state: CosmicState::Initialized,
            entropy: rng.gen_range(0.0..1.0),
            wormhole_capable: rng.gen_bool(physics.wormhole_capable_chance),
            incarnation: 0,
        }
    }

    /// A universe with fully specified fields, for seeding scenarios.
    pub fn with_entropy(id: UniverseId, state: CosmicState, entropy: f64) -> Self {
        Self {
            id,
            state,
            entropy,
            wormhole_capable: false,
            incarnation: 0,
        }
    }
}

/// A black hole: the permanent remnant of collapsed universes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackHole {
    pub id: BlackHoleId,
    /// Sum of the entropies of every absorbed universe. Never decreases.
    pub mass: f64,
    /// Absorbed universe ids in absorption order. Append-only.
    pub absorbed: Vec<UniverseId>,
}

impl BlackHole {
    pub fn new(id: BlackHoleId) -> Self {
        Self {
            id,
            mass: 0.0,
            absorbed: Vec::new(),
        }
    }

    /// Absorb a universe: its entropy becomes mass and its id is recorded.
    pub fn consume(&mut self, universe: &Universe) {
        self.mass += universe.entropy;
        self.absorbed.push(universe.id);
    }
}
