use multiverse_common::{UniverseId, derive_rng};
use multiverse_kernel::SharedRegistry;
use multiverse_tools::{MultiverseInspector, MultiverseSummary, RegistryDump};
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tracing::{info, warn};

use crate::console::run_console;
use crate::drivers::{council, fluctuations, genesis, observer};
use crate::{Population, RuntimeConfig, RuntimeError, Shutdown, Supervisor};

/// RNG stream ids for the drivers (lifecycle tasks use their own range).
const SEED_STREAM: u64 = 1;
const GENESIS_STREAM: u64 = 2;
const FLUCTUATION_STREAM: u64 = 3;
const COUNCIL_STREAM: u64 = 4;
const CONSOLE_STREAM: u64 = 5;

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: MultiverseSummary,
    pub dump: RegistryDump,
    pub tasks_spawned: u64,
}

/// A running multiverse: registry, population controller, drivers and the
/// supervisor that tracks every task.
pub struct Multiverse {
    config: Arc<RuntimeConfig>,
    registry: SharedRegistry,
    population: Population,
    supervisor: Supervisor,
    shutdown: Shutdown,
}

impl Multiverse {
    /// Validate the configuration and build an empty multiverse.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        let config = Arc::new(config);
        let registry = SharedRegistry::new();
        let supervisor = Supervisor::new();
        let shutdown = Shutdown::new();
        let population = Population::new(
            registry.clone(),
            Arc::clone(&config),
            supervisor.clone(),
            shutdown.clone(),
        );
        Ok(Self {
            config,
            registry,
            population,
            supervisor,
            shutdown,
        })
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Handle that stops the run when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Initial population with ids `0..initial_population`.
    pub fn seed_population(&self) -> Result<usize, RuntimeError> {
        let mut rng = derive_rng(self.config.seed, SEED_STREAM);
        for id in 0..self.config.initial_population {
            self.population.create(UniverseId(id), &mut rng)?;
        }
        info!(count = self.config.initial_population, "initial multiverse created");
        Ok(self.config.initial_population as usize)
    }

    /// Start the growth, fluctuation, council and observer drivers.
    pub fn start_drivers(&self) {
        let seed = self.config.seed;
        self.supervisor.spawn(genesis(
            self.population.clone(),
            Arc::clone(&self.config),
            derive_rng(seed, GENESIS_STREAM),
            self.shutdown.clone(),
        ));
        self.supervisor.spawn(fluctuations(
            self.population.clone(),
            self.config.fluctuation_interval,
            derive_rng(seed, FLUCTUATION_STREAM),
            self.shutdown.clone(),
        ));
        self.supervisor.spawn(council(
            self.registry.clone(),
            Arc::clone(&self.config),
            derive_rng(seed, COUNCIL_STREAM),
            self.shutdown.clone(),
        ));
        self.supervisor.spawn(observer(
            self.registry.clone(),
            self.config.observer_period,
            self.shutdown.clone(),
        ));
    }

    /// Accept operator commands from `reader`.
    pub fn attach_console<R>(&self, reader: R)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        self.supervisor.spawn(run_console(
            reader,
            self.population.clone(),
            derive_rng(self.config.seed, CONSOLE_STREAM),
            self.shutdown.clone(),
        ));
    }

    /// Wait for shutdown (or, if every task finishes on its own, quiescence),
    /// then stop and join all tasks.
    pub async fn run(&self) -> Result<RunReport, RuntimeError> {
        tokio::select! {
            _ = self.shutdown.wait() => info!("shutdown requested; stopping all tasks"),
            _ = self.supervisor.wait_idle() => info!("multiverse reached quiescence"),
        }
        self.shutdown.trigger();
        self.supervisor.wait_idle().await;

        let panicked = self.supervisor.panicked();
        if panicked > 0 {
            warn!(panicked, "supervised tasks panicked");
            return Err(RuntimeError::TasksPanicked(panicked));
        }
        let (summary, dump) = self.registry.with(|r| {
            (MultiverseInspector::summary(r), MultiverseInspector::dump(r))
        });
        info!(%summary, "multiverse stopped");
        Ok(RunReport {
            summary,
            dump,
            tasks_spawned: self.supervisor.spawned(),
        })
    }
}
