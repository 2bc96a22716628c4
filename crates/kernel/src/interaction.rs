//! Cross-universe events: wormhole exchange and fluctuation splitting.

use multiverse_common::{CosmicState, UniverseId};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{KernelError, Lifeline, Physics, Registry, SharedRegistry, Universe};

/// A wormhole opened between two live universes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wormhole {
    pub from: UniverseId,
    pub to: UniverseId,
}

/// Outcome of a fluctuation split.
#[derive(Debug, Default)]
pub struct SplitOutcome {
    /// The universe the fluctuation was observed in. `None` if the registry
    /// was empty; nothing is created in that case.
    pub source: Option<UniverseId>,
    /// Universes born from the fluctuation.
    pub born: Vec<Lifeline>,
    /// Births that failed, e.g. because the id space is full.
    pub failed: Vec<KernelError>,
}

/// Swap entropy and state between two universes, leaving every other field
/// alone. Applying it twice restores both.
pub fn cosmic_string(a: &mut Universe, b: &mut Universe) {
    std::mem::swap(&mut a.entropy, &mut b.entropy);
    std::mem::swap(&mut a.state, &mut b.state);
}

/// Registry-level exchange between two distinct live universes.
///
/// Runs inside the caller's critical section. Returns false (and changes
/// nothing) if the ids are equal or either universe is missing.
pub fn exchange(registry: &mut Registry, a: UniverseId, b: UniverseId) -> bool {
    match registry.pair_mut(a, b) {
        Some((ua, ub)) => {
            cosmic_string(ua, ub);
            true
        }
        None => false,
    }
}

/// Try to open a wormhole from `from` to a random candidate id.
///
/// Both ends are marked [`CosmicState::LINKED`] and then exchanged. A
/// candidate that is absent or equal to `from` means no wormhole.
pub fn open_wormhole(
    registry: &mut Registry,
    from: UniverseId,
    physics: &Physics,
    rng: &mut impl Rng,
) -> Option<Wormhole> {
    let to = UniverseId(rng.gen_range(0..physics.id_space));
    if to == from || registry.universe(to).is_none() {
        return None;
    }
    for id in [from, to] {
        if let Some(u) = registry.universe_mut(id) {
            u.state = CosmicState::LINKED;
        }
    }
    exchange(registry, from, to).then_some(Wormhole { from, to })
}

/// Pick the universe a fluctuation is observed in, uniformly at random.
pub fn fluctuation_source(registry: &Registry, rng: &mut impl Rng) -> Option<UniverseId> {
    registry.universe_ids().choose(rng).copied()
}

/// Fluctuation split: observe a random source universe, then bring exactly two
/// new universes into being through the normal creation path.
///
/// Locks internally and releases between the read and each birth; callers
/// must not hold the lock. The source universe is left untouched.
pub fn fluctuation_split(
    registry: &SharedRegistry,
    physics: &Physics,
    rng: &mut impl Rng,
) -> SplitOutcome {
    let Some(source) = registry.with(|r| fluctuation_source(r, &mut *rng)) else {
        tracing::info!("quantum fluctuation found no universes to split");
        return SplitOutcome::default();
    };

    let mut outcome = SplitOutcome {
        source: Some(source),
        ..SplitOutcome::default()
    };
    for _ in 0..2 {
        match registry.insert_random_universe(physics, rng) {
            Ok(lifeline) => outcome.born.push(lifeline),
            Err(e) => outcome.failed.push(e),
        }
    }
    let born: Vec<u32> = outcome.born.iter().map(|l| l.id.0).collect();
    tracing::info!(source = %source, ?born, "quantum fluctuation split a universe");
    outcome
}
