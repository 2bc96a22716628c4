use multiverse_common::{BlackHoleId, UniverseId};
use parking_lot::Mutex;
use std::cmp::Ordering;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{BlackHole, KernelError, Physics, Universe};

/// Random draws attempted before falling back to a linear scan for a free id.
const ID_DRAW_ATTEMPTS: usize = 32;

/// Handle a lifecycle task holds on its universe: the id plus the incarnation
/// it was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lifeline {
    pub id: UniverseId,
    pub incarnation: u64,
}

/// Result of a collapse: the universe as it was absorbed and the black hole
/// holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseRecord {
    pub universe: Universe,
    pub black_hole: BlackHoleId,
    pub mass: f64,
}

/// The authoritative multiverse state.
///
/// Plain data; callers reach it through [`SharedRegistry`], which serializes
/// every access behind one lock. Methods taking `&mut self` therefore always
/// run inside a critical section and never lock anything themselves.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct Registry {
    universes: BTreeMap<UniverseId, Universe>,
    black_holes: BTreeMap<BlackHoleId, BlackHole>,
    next_incarnation: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(live universes, black holes)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.universes.len(), self.black_holes.len())
    }

    pub fn universe(&self, id: UniverseId) -> Option<&Universe> {
        self.universes.get(&id)
    }

    pub fn universe_mut(&mut self, id: UniverseId) -> Option<&mut Universe> {
        self.universes.get_mut(&id)
    }

    /// Mutable access to two distinct live universes at once, in argument
    /// order. `None` if the ids are equal or either is missing.
    pub fn pair_mut(
        &mut self,
        a: UniverseId,
        b: UniverseId,
    ) -> Option<(&mut Universe, &mut Universe)> {
        let (lo, hi) = match a.cmp(&b) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => return None,
        };
        let mut span = self.universes.range_mut(lo..=hi);
        let (&first_id, first) = span.next()?;
        let (&last_id, last) = span.next_back()?;
        if first_id != lo || last_id != hi {
            return None;
        }
        Some(if a == lo { (first, last) } else { (last, first) })
    }

    /// The universe a lifeline points at, if that exact incarnation is alive.
    pub fn living_mut(&mut self, lifeline: Lifeline) -> Option<&mut Universe> {
        self.universes
            .get_mut(&lifeline.id)
            .filter(|u| u.incarnation == lifeline.incarnation)
    }

    pub fn universes(&self) -> &BTreeMap<UniverseId, Universe> {
        &self.universes
    }

    pub(crate) fn universes_mut(&mut self) -> impl Iterator<Item = &mut Universe> {
        self.universes.values_mut()
    }

    pub fn universe_ids(&self) -> Vec<UniverseId> {
        self.universes.keys().copied().collect()
    }

    pub fn black_hole(&self, id: BlackHoleId) -> Option<&BlackHole> {
        self.black_holes.get(&id)
    }

    pub fn black_holes(&self) -> &BTreeMap<BlackHoleId, BlackHole> {
        &self.black_holes
    }

    /// Insert a universe under its own id. Fails if a live universe already
    /// holds that id. Returns the lifeline for the new incarnation.
    pub fn insert_universe(&mut self, mut universe: Universe) -> Result<Lifeline, KernelError> {
        if self.universes.contains_key(&universe.id) {
            return Err(KernelError::UniverseExists(universe.id));
        }
        self.next_incarnation += 1;
        universe.incarnation = self.next_incarnation;
        let lifeline = Lifeline {
            id: universe.id,
            incarnation: universe.incarnation,
        };
        self.universes.insert(universe.id, universe);
        Ok(lifeline)
    }

    /// Spawn a universe under a random vacant id in one step, so no other
    /// mutator can claim the id in between.
    pub fn insert_random_universe(
        &mut self,
        physics: &Physics,
        rng: &mut impl Rng,
    ) -> Result<Lifeline, KernelError> {
        let id = self.vacant_universe_id(physics.id_space, rng)?;
        self.insert_universe(Universe::spawn(id, physics, rng))
    }

    /// Draw a random id in `0..id_space` that no live universe holds.
    pub fn vacant_universe_id(
        &self,
        id_space: u32,
        rng: &mut impl Rng,
    ) -> Result<UniverseId, KernelError> {
        for _ in 0..ID_DRAW_ATTEMPTS {
            let id = UniverseId(rng.gen_range(0..id_space));
            if !self.universes.contains_key(&id) {
                return Ok(id);
            }
        }
        (0..id_space)
            .map(UniverseId)
            .find(|id| !self.universes.contains_key(id))
            .ok_or(KernelError::IdSpaceExhausted { capacity: id_space })
    }

    pub fn remove_universe(&mut self, id: UniverseId) -> Option<Universe> {
        self.universes.remove(&id)
    }

    /// Delete an arbitrary live universe (the lowest id) without creating a
    /// black hole.
    pub fn destroy_any(&mut self) -> Option<Universe> {
        self.universes.pop_first().map(|(_, u)| u)
    }

    /// Insert a black hole. Existing black holes are never overwritten.
    pub fn insert_black_hole(&mut self, black_hole: BlackHole) -> Result<(), KernelError> {
        if self.black_holes.contains_key(&black_hole.id) {
            return Err(KernelError::BlackHoleExists(black_hole.id));
        }
        self.black_holes.insert(black_hole.id, black_hole);
        Ok(())
    }

    /// Collapse a universe: remove it and absorb it into a brand-new black
    /// hole with a fresh random id. Returns `None` if the universe is gone.
    pub fn collapse(&mut self, id: UniverseId, rng: &mut impl Rng) -> Option<CollapseRecord> {
        let universe = self.universes.get(&id)?.clone();
        let bh_id = loop {
            let candidate = BlackHoleId(rng.r#gen());
            if !self.black_holes.contains_key(&candidate) {
                break candidate;
            }
        };
        let mut black_hole = BlackHole::new(bh_id);
        black_hole.consume(&universe);
        let mass = black_hole.mass;
        // The universe only leaves once its black hole is in place.
        self.insert_black_hole(black_hole).ok()?;
        self.universes.remove(&id);
        Some(CollapseRecord {
            universe,
            black_hole: bh_id,
            mass,
        })
    }
}

/// Shared handle to the registry: one process-wide lock around both mappings.
///
/// Every method holds the lock for its own duration only. Compound operations
/// go through [`SharedRegistry::with`], whose closure receives `&mut Registry`
/// and so cannot re-acquire the lock. The guard is never held across an
/// `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SharedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_registry(registry: Registry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Run a compound operation as a single critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// True while some caller holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    pub fn insert_universe(&self, universe: Universe) -> Result<Lifeline, KernelError> {
        self.with(|r| r.insert_universe(universe))
    }

    pub fn insert_random_universe(
        &self,
        physics: &Physics,
        rng: &mut impl Rng,
    ) -> Result<Lifeline, KernelError> {
        self.with(|r| r.insert_random_universe(physics, rng))
    }

    pub fn remove_universe(&self, id: UniverseId) -> Option<Universe> {
        self.with(|r| r.remove_universe(id))
    }

    /// Copy of the universe at `id`, if live.
    pub fn universe(&self, id: UniverseId) -> Option<Universe> {
        self.with(|r| r.universe(id).cloned())
    }

    pub fn snapshot_ids(&self) -> Vec<UniverseId> {
        self.with(|r| r.universe_ids())
    }

    pub fn counts(&self) -> (usize, usize) {
        self.with(|r| r.counts())
    }

    pub fn destroy_any(&self) -> Option<Universe> {
        self.with(|r| r.destroy_any())
    }
}
