use multiverse_common::SimRng;
use multiverse_kernel::lifecycle::{self, StepOutcome, dilate, jitter_at};
use multiverse_kernel::{Lifeline, Physics, SharedRegistry};
use std::ops::ControlFlow;
use tokio::time::Instant;
use tracing::{debug, info, info_span};

use crate::{MillisRange, Shutdown};

/// How a lifecycle task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEnd {
    Collapsed,
    Vanished,
    Shutdown,
}

/// Everything a lifecycle task owns.
pub struct LifecycleTask {
    pub registry: SharedRegistry,
    pub lifeline: Lifeline,
    pub physics: Physics,
    pub step_delay: MillisRange,
    pub rng: SimRng,
    pub shutdown: Shutdown,
}

impl LifecycleTask {
    /// Drive the universe until it collapses, disappears, or shutdown.
    ///
    /// Each iteration is one critical section followed by logging and a
    /// dilated sleep with the lock released.
    pub async fn run(mut self) -> LifecycleEnd {
        let started = Instant::now();
        loop {
            let entropy = match self.advance(jitter_at(started.elapsed())) {
                ControlFlow::Continue(entropy) => entropy,
                ControlFlow::Break(end) => return end,
            };

            let delay = dilate(self.step_delay.sample(&mut self.rng), entropy);
            tokio::select! {
                _ = self.shutdown.wait() => return LifecycleEnd::Shutdown,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One lifecycle step, logged once the lock is released. Continues with
    /// the new entropy or breaks with how the task ended.
    fn advance(&mut self, jitter: f64) -> ControlFlow<LifecycleEnd, f64> {
        let id = self.lifeline.id;
        let _span = info_span!("lifecycle_step", universe = %id).entered();
        let outcome = self.registry.with(|r| {
            lifecycle::step(r, self.lifeline, &self.physics, jitter, &mut self.rng)
        });

        match outcome {
            StepOutcome::Advanced {
                state,
                entropy,
                wormhole,
            } => {
                if let Some(w) = wormhole {
                    info!(universe = %w.from, target = %w.to, "universe opened a wormhole");
                }
                info!(
                    universe = %id,
                    %state,
                    entropy = format_args!("{entropy:.2}"),
                    "universe advanced"
                );
                ControlFlow::Continue(entropy)
            }
            StepOutcome::Collapsed(record) => {
                info!(
                    universe = %id,
                    entropy = format_args!("{:.2}", record.universe.entropy),
                    "universe reached max entropy and collapsed"
                );
                info!(
                    black_hole = %record.black_hole,
                    universe = %id,
                    mass = format_args!("{:.2}", record.mass),
                    "black hole consumed universe"
                );
                ControlFlow::Break(LifecycleEnd::Collapsed)
            }
            StepOutcome::Vanished => {
                debug!(universe = %id, "universe no longer exists; lifecycle ends");
                ControlFlow::Break(LifecycleEnd::Vanished)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiverse_common::{CosmicState, UniverseId, create_rng};
    use multiverse_kernel::Universe;
    use std::time::Duration;

    fn task(registry: &SharedRegistry, lifeline: Lifeline, shutdown: &Shutdown) -> LifecycleTask {
        LifecycleTask {
            registry: registry.clone(),
            lifeline,
            physics: Physics::default(),
            step_delay: MillisRange::new(500, 1500),
            rng: create_rng(1),
            shutdown: shutdown.clone(),
        }
    }

    #[test]
    fn advance_reports_entropy_then_disappearance() {
        let registry = SharedRegistry::new();
        let lifeline = registry
            .insert_universe(Universe::with_entropy(UniverseId(2), CosmicState::Initialized, 0.3))
            .unwrap();
        let mut runner = task(&registry, lifeline, &Shutdown::new());
        assert_eq!(runner.advance(0.0), ControlFlow::Continue(0.3));
        assert!(!registry.is_locked());

        registry.remove_universe(UniverseId(2));
        let end = runner.advance(0.0);
        assert_eq!(end, ControlFlow::Break(LifecycleEnd::Vanished));
    }

    #[tokio::test(start_paused = true)]
    async fn hot_universe_collapses_on_first_step() {
        let registry = SharedRegistry::new();
        let lifeline = registry
            .insert_universe(Universe::with_entropy(UniverseId(5), CosmicState::Initialized, 1.2))
            .unwrap();
        let end = task(&registry, lifeline, &Shutdown::new()).run().await;
        assert_eq!(end, LifecycleEnd::Collapsed);
        assert_eq!(registry.counts(), (0, 1));
        assert!(!registry.is_locked());
    }

    #[tokio::test(start_paused = true)]
    async fn universe_eventually_collapses() {
        let registry = SharedRegistry::new();
        let lifeline = registry
            .insert_universe(Universe::with_entropy(UniverseId(1), CosmicState::Initialized, 0.0))
            .unwrap();
        let end = task(&registry, lifeline, &Shutdown::new()).run().await;
        assert_eq!(end, LifecycleEnd::Collapsed);
        let (live, holes) = registry.counts();
        assert_eq!((live, holes), (0, 1));
        let bh = registry
            .with(|r| r.black_holes().values().next().cloned())
            .unwrap();
        assert_eq!(bh.absorbed, vec![UniverseId(1)]);
        assert!(bh.mass > 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn deleted_universe_ends_task() {
        let registry = SharedRegistry::new();
        let lifeline = registry
            .insert_universe(Universe::with_entropy(UniverseId(3), CosmicState::Initialized, 0.1))
            .unwrap();
        let handle = tokio::spawn(task(&registry, lifeline, &Shutdown::new()).run());
        tokio::time::sleep(Duration::from_millis(10)).await;
        registry.remove_universe(UniverseId(3));
        assert_eq!(handle.await.unwrap(), LifecycleEnd::Vanished);
        assert_eq!(registry.counts(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_sleep() {
        let registry = SharedRegistry::new();
        let lifeline = registry
            .insert_universe(Universe::with_entropy(UniverseId(3), CosmicState::Initialized, 0.1))
            .unwrap();
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(task(&registry, lifeline, &shutdown).run());
        tokio::task::yield_now().await;
        shutdown.trigger();
        assert_eq!(handle.await.unwrap(), LifecycleEnd::Shutdown);
        assert_eq!(registry.counts(), (1, 0));
    }
}
