use multiverse_common::{UniverseId, derive_rng};
use multiverse_kernel::{
    KernelError, Lifeline, SharedRegistry, SplitOutcome, Universe, fluctuation_split,
};
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::task::LifecycleTask;
use crate::{RuntimeConfig, Shutdown, Supervisor};

/// RNG streams below this are reserved for drivers; lifecycle tasks count up
/// from here.
const FIRST_TASK_STREAM: u64 = 1 << 16;

/// Population controller: the only path by which universes come into being.
///
/// Every creation inserts under the registry lock, releases it, and only then
/// starts the universe's lifecycle task.
#[derive(Clone)]
pub struct Population {
    registry: SharedRegistry,
    config: Arc<RuntimeConfig>,
    supervisor: Supervisor,
    shutdown: Shutdown,
    next_stream: Arc<AtomicU64>,
}

impl Population {
    pub fn new(
        registry: SharedRegistry,
        config: Arc<RuntimeConfig>,
        supervisor: Supervisor,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            registry,
            config,
            supervisor,
            shutdown,
            next_stream: Arc::new(AtomicU64::new(FIRST_TASK_STREAM)),
        }
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Create a universe with a specific id. Fails if that id is live.
    pub fn create(&self, id: UniverseId, rng: &mut impl Rng) -> Result<Lifeline, KernelError> {
        let universe = Universe::spawn(id, &self.config.physics, rng);
        let lifeline = self.registry.insert_universe(universe)?;
        info!(universe = %id, "a new universe has been born");
        self.adopt(lifeline);
        Ok(lifeline)
    }

    /// Create a universe under a random vacant id.
    pub fn create_random(&self, rng: &mut impl Rng) -> Result<Lifeline, KernelError> {
        let lifeline = self
            .registry
            .insert_random_universe(&self.config.physics, rng)?;
        info!(universe = %lifeline.id, "a new universe has been born");
        self.adopt(lifeline);
        Ok(lifeline)
    }

    /// Big bang: create a randomized cluster of universes.
    pub fn burst_create(&self, rng: &mut impl Rng) -> Vec<Lifeline> {
        let count = rng.gen_range(self.config.burst_min..=self.config.burst_max);
        info!(count, "big bang event: creating a cluster of universes");
        (0..count)
            .filter_map(|_| match self.create_random(&mut *rng) {
                Ok(lifeline) => Some(lifeline),
                Err(e) => {
                    warn!(error = %e, "universe creation skipped");
                    None
                }
            })
            .collect()
    }

    /// Quantum fluctuation: two new universes, each with its own lifecycle.
    pub fn fluctuate(&self, rng: &mut impl Rng) -> SplitOutcome {
        let outcome = fluctuation_split(&self.registry, &self.config.physics, rng);
        for e in &outcome.failed {
            warn!(error = %e, "fluctuation birth skipped");
        }
        for &lifeline in &outcome.born {
            self.adopt(lifeline);
        }
        outcome
    }

    /// Start the lifecycle task for a universe already in the registry.
    /// Does nothing in inspection mode.
    pub fn adopt(&self, lifeline: Lifeline) {
        if !self.config.spawn_tasks {
            return;
        }
        let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
        let task = LifecycleTask {
            registry: self.registry.clone(),
            lifeline,
            physics: self.config.physics.clone(),
            step_delay: self.config.step_delay,
            rng: derive_rng(self.config.seed, stream),
            shutdown: self.shutdown.clone(),
        };
        self.supervisor.spawn(async move {
            task.run().await;
        });
    }
}
