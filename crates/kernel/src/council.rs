use multiverse_common::UniverseId;

use crate::{Physics, Registry};

/// Result of one council pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouncilReport {
    pub inspected: usize,
    /// Universes whose entropy was reset, in id order.
    pub reset: Vec<UniverseId>,
}

/// Cosmic council: reset every universe above the high-water mark to the
/// low value. One pass over the whole registry inside one critical section.
pub fn convene(registry: &mut Registry, physics: &Physics) -> CouncilReport {
    let mut report = CouncilReport::default();
    for universe in registry.universes_mut() {
        report.inspected += 1;
        if universe.entropy > physics.council_threshold {
            universe.entropy = physics.council_reset;
            report.reset.push(universe.id);
        }
    }
    report
}
