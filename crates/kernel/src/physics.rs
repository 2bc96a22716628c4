use std::cmp::Ordering;

use crate::KernelError;

/// Tunable constants of the simulated multiverse.
///
/// Everything that shapes control flow (thresholds, probabilities, identity
/// space) lives here so scenarios can pin it down.
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    /// Entropy strictly above this collapses a universe into a black hole.
    pub collapse_threshold: f64,
    /// Council high-water mark: entropy strictly above this gets reset.
    pub council_threshold: f64,
    /// Value the council resets high-entropy universes to.
    pub council_reset: f64,
    /// Lower bound of the per-step entropy drift (before jitter scaling).
    pub drift_min: f64,
    /// Upper bound (exclusive) of the per-step entropy drift.
    pub drift_max: f64,
    /// Probability that a new universe is wormhole-capable.
    pub wormhole_capable_chance: f64,
    /// Per-step probability that a capable universe attempts a wormhole.
    pub pairing_chance: f64,
    /// Universe ids and wormhole candidates are drawn from `0..id_space`.
    pub id_space: u32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            collapse_threshold: 1.0,
            council_threshold: 0.8,
            council_reset: 0.1,
            drift_min: -0.05,
            drift_max: 0.15,
            wormhole_capable_chance: 0.2,
            pairing_chance: 0.1,
            id_space: 1000,
        }
    }
}

impl Physics {
    /// Reject settings that would make the random draws panic or the
    /// council push universes upward.
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.drift_min.partial_cmp(&self.drift_max) != Some(Ordering::Less) {
            return Err(KernelError::InvalidPhysics("drift_min must be below drift_max"));
        }
        for p in [self.wormhole_capable_chance, self.pairing_chance] {
            if !(0.0..=1.0).contains(&p) {
                return Err(KernelError::InvalidPhysics("probabilities must lie in [0, 1]"));
            }
        }
        if self.council_reset < 0.0 || self.council_reset > self.council_threshold {
            return Err(KernelError::InvalidPhysics(
                "council_reset must lie in [0, council_threshold]",
            ));
        }
        if self.id_space == 0 {
            return Err(KernelError::InvalidPhysics("id_space must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Physics::default().validate().is_ok());
    }

    #[test]
    fn inverted_drift_rejected() {
        let physics = Physics {
            drift_min: 0.2,
            drift_max: 0.1,
            ..Physics::default()
        };
        assert!(matches!(physics.validate(), Err(KernelError::InvalidPhysics(_))));
    }

    #[test]
    fn out_of_range_probability_rejected() {
        let physics = Physics {
            pairing_chance: 1.5,
            ..Physics::default()
        };
        assert!(physics.validate().is_err());
    }

    #[test]
    fn reset_above_threshold_rejected() {
        let physics = Physics {
            council_reset: 0.9,
            ..Physics::default()
        };
        assert!(physics.validate().is_err());
    }
}
