use multiverse_common::{BlackHoleId, CosmicState, UniverseId};
use multiverse_kernel::{BlackHole, Registry, Universe};
use serde::Serialize;

/// Multiverse inspector for operators and developer tooling.
///
/// Read-only queries against a registry the caller has already locked.
pub struct MultiverseInspector;

impl MultiverseInspector {
    /// Produce a summary of the registry.
    pub fn summary(registry: &Registry) -> MultiverseSummary {
        let (universes, black_holes) = registry.counts();
        MultiverseSummary {
            universes,
            black_holes,
            total_mass: registry.black_holes().values().map(|b| b.mass).sum(),
        }
    }

    /// Details of one live universe.
    pub fn inspect_universe(registry: &Registry, id: UniverseId) -> Option<UniverseInfo> {
        registry.universe(id).map(|u| UniverseInfo {
            id: u.id,
            state: u.state,
            entropy: u.entropy,
            wormhole_capable: u.wormhole_capable,
        })
    }

    /// Details of one black hole.
    pub fn inspect_black_hole(registry: &Registry, id: BlackHoleId) -> Option<BlackHoleInfo> {
        registry.black_hole(id).map(|b| BlackHoleInfo {
            id: b.id,
            mass: b.mass,
            absorbed: b.absorbed.len(),
        })
    }

    /// List all live universe ids.
    pub fn list_universes(registry: &Registry) -> Vec<UniverseId> {
        registry.universe_ids()
    }

    /// One line per live universe, then one per black hole, in id order.
    pub fn listing(registry: &Registry) -> Vec<String> {
        let universes = Self::list_universes(registry)
            .into_iter()
            .filter_map(|id| Self::inspect_universe(registry, id))
            .map(|info| info.to_string());
        let black_holes = registry
            .black_holes()
            .keys()
            .filter_map(|&id| Self::inspect_black_hole(registry, id))
            .map(|info| info.to_string());
        universes.chain(black_holes).collect()
    }

    /// Owned copy of the whole registry, ready for serialization once the
    /// lock is released.
    pub fn dump(registry: &Registry) -> RegistryDump {
        RegistryDump {
            universes: registry.universes().values().cloned().collect(),
            black_holes: registry.black_holes().values().cloned().collect(),
        }
    }
}

/// Counts of live universes and black holes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultiverseSummary {
    pub universes: usize,
    pub black_holes: usize,
    pub total_mass: f64,
}

impl std::fmt::Display for MultiverseSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Multiverse: universes={} black_holes={} total_mass={:.2}",
            self.universes, self.black_holes, self.total_mass
        )
    }
}

/// Detailed info about a single universe.
#[derive(Debug, Clone)]
pub struct UniverseInfo {
    pub id: UniverseId,
    pub state: CosmicState,
    pub entropy: f64,
    pub wormhole_capable: bool,
}

impl std::fmt::Display for UniverseInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Universe {} is {} (Entropy: {:.2}){}",
            self.id,
            self.state,
            self.entropy,
            if self.wormhole_capable { " [wormhole]" } else { "" }
        )
    }
}

/// Detailed info about a single black hole.
#[derive(Debug, Clone)]
pub struct BlackHoleInfo {
    pub id: BlackHoleId,
    pub mass: f64,
    pub absorbed: usize,
}

impl std::fmt::Display for BlackHoleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Black Hole {} (Mass: {:.2}, universes consumed: {})",
            self.id, self.mass, self.absorbed
        )
    }
}

/// Serializable copy of the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryDump {
    pub universes: Vec<Universe>,
    pub black_holes: Vec<BlackHole>,
}

impl RegistryDump {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
