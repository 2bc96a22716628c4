use multiverse_kernel::{KernelError, Physics};
use rand::Rng;
use std::time::Duration;

/// Errors from runtime configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: min ({min} ms) must not exceed max ({max} ms)")]
    InvertedRange { name: &'static str, min: u64, max: u64 },
    #[error("{name} must be non-zero")]
    ZeroPeriod { name: &'static str },
    #[error("{name} must lie in [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error(transparent)]
    Physics(#[from] KernelError),
}

/// Inclusive range of milliseconds a randomized wait is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MillisRange {
    pub min: u64,
    pub max: u64,
}

impl MillisRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        Duration::from_millis(rng.gen_range(self.min..=self.max))
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvertedRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        if self.max == 0 {
            return Err(ConfigError::ZeroPeriod { name });
        }
        Ok(())
    }
}

/// Runtime configuration: scheduling of every periodic driver plus the
/// kernel physics.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Seed every random stream in the run is derived from.
    pub seed: u64,
    /// Universes created at start with ids `0..initial_population`.
    pub initial_population: u32,
    pub physics: Physics,
    /// Base pause between lifecycle steps, before time dilation.
    pub step_delay: MillisRange,
    /// Pause between organic growth ticks.
    pub genesis_interval: MillisRange,
    /// Chance that a growth tick is a burst rather than a single birth.
    pub burst_chance: f64,
    /// Burst size bounds (inclusive).
    pub burst_min: u32,
    pub burst_max: u32,
    pub fluctuation_interval: MillisRange,
    pub council_interval: MillisRange,
    pub observer_period: Duration,
    /// When false, universes are inserted but no lifecycle task starts
    /// (inspection mode).
    pub spawn_tasks: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            initial_population: 10,
            physics: Physics::default(),
            step_delay: MillisRange::new(500, 1500),
            genesis_interval: MillisRange::new(1000, 4000),
            burst_chance: 0.2,
            burst_min: 5,
            burst_max: 14,
            fluctuation_interval: MillisRange::new(2000, 7000),
            council_interval: MillisRange::new(10_000, 25_000),
            observer_period: Duration::from_secs(2),
            spawn_tasks: true,
        }
    }
}

impl RuntimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.step_delay.validate("step_delay")?;
        self.genesis_interval.validate("genesis_interval")?;
        self.fluctuation_interval.validate("fluctuation_interval")?;
        self.council_interval.validate("council_interval")?;
        if self.observer_period.is_zero() {
            return Err(ConfigError::ZeroPeriod {
                name: "observer_period",
            });
        }
        if !(0.0..=1.0).contains(&self.burst_chance) {
            return Err(ConfigError::Probability {
                name: "burst_chance",
                value: self.burst_chance,
            });
        }
        if self.burst_min > self.burst_max {
            return Err(ConfigError::InvertedRange {
                name: "burst size",
                min: self.burst_min.into(),
                max: self.burst_max.into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiverse_common::create_rng;

    #[test]
    fn defaults_are_valid() {
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn sample_stays_in_range() {
        let mut rng = create_rng(2);
        let range = MillisRange::new(1000, 4000);
        for _ in 0..200 {
            let d = range.sample(&mut rng);
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(4000));
        }
    }

    #[test]
    fn inverted_interval_rejected() {
        let config = RuntimeConfig {
            council_interval: MillisRange::new(5, 1),
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { name: "council_interval", .. })
        ));
    }

    #[test]
    fn zero_observer_period_rejected() {
        let config = RuntimeConfig {
            observer_period: Duration::ZERO,
            ..RuntimeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroPeriod { .. })));
    }

    #[test]
    fn bad_burst_chance_rejected() {
        let config = RuntimeConfig {
            burst_chance: -0.1,
            ..RuntimeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Probability { .. })));
    }

    #[test]
    fn invalid_physics_surfaces() {
        let mut config = RuntimeConfig::default();
        config.physics.id_space = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Physics(_))));
    }
}
