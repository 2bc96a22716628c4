//! Periodic drivers: organic growth, quantum fluctuations, the cosmic
//! council and the observer. Each runs on its own timer until shutdown.

use multiverse_common::SimRng;
use multiverse_kernel::{CouncilReport, SharedRegistry, convene};
use multiverse_tools::{MultiverseInspector, MultiverseSummary};
use rand::Rng;
use std::sync::Arc;
use tracing::{info, info_span};

use crate::{MillisRange, Population, RuntimeConfig, Shutdown};

/// Sleep for a randomized interval. Returns false if shutdown arrived first.
async fn pause(interval: MillisRange, rng: &mut SimRng, shutdown: &Shutdown) -> bool {
    let delay = interval.sample(rng);
    tokio::select! {
        _ = shutdown.wait() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Organic growth: each tick is either a big bang or a single birth.
pub async fn genesis(
    population: Population,
    config: Arc<RuntimeConfig>,
    mut rng: SimRng,
    shutdown: Shutdown,
) {
    while pause(config.genesis_interval, &mut rng, &shutdown).await {
        grow_once(&population, &config, &mut rng);
    }
}

/// One growth tick. Returns the number of universes born.
pub fn grow_once(population: &Population, config: &RuntimeConfig, rng: &mut SimRng) -> usize {
    if rng.gen_bool(config.burst_chance) {
        population.burst_create(rng).len()
    } else {
        match population.create_random(rng) {
            Ok(_) => 1,
            Err(e) => {
                tracing::warn!(error = %e, "universe creation skipped");
                0
            }
        }
    }
}

/// Quantum fluctuations on their own timer.
pub async fn fluctuations(
    population: Population,
    interval: MillisRange,
    mut rng: SimRng,
    shutdown: Shutdown,
) {
    while pause(interval, &mut rng, &shutdown).await {
        population.fluctuate(&mut rng);
    }
}

/// Run one council pass under a single critical section.
pub fn council_once(registry: &SharedRegistry, config: &RuntimeConfig) -> CouncilReport {
    let _span = info_span!("cosmic_council").entered();
    let report = registry.with(|r| convene(r, &config.physics));
    let reset: Vec<u32> = report.reset.iter().map(|id| id.0).collect();
    info!(inspected = report.inspected, ?reset, "cosmic council convened");
    report
}

/// The cosmic council on its own timer.
pub async fn council(
    registry: SharedRegistry,
    config: Arc<RuntimeConfig>,
    mut rng: SimRng,
    shutdown: Shutdown,
) {
    while pause(config.council_interval, &mut rng, &shutdown).await {
        council_once(&registry, &config);
    }
}

/// Read both mapping sizes under the lock, then report.
pub fn observe_once(registry: &SharedRegistry) -> MultiverseSummary {
    let summary = registry.with(|r| MultiverseInspector::summary(r));
    info!(
        universes = summary.universes,
        black_holes = summary.black_holes,
        "{summary}"
    );
    summary
}

/// Observer: a read-only summary on a fixed period.
pub async fn observer(registry: SharedRegistry, period: std::time::Duration, shutdown: Shutdown) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown.wait() => return,
            _ = ticker.tick() => {
                observe_once(&registry);
            }
        }
    }
}
