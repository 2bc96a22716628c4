//! Per-universe state machine: `Initialized -> Active* -> Collapsed`.
//!
//! One call to [`step`] is one lifecycle iteration. It runs entirely inside a
//! single critical section; the caller logs the outcome and sleeps after the
//! lock is released.

use multiverse_common::CosmicState;
use rand::Rng;
use std::time::Duration;

use crate::interaction::{Wormhole, open_wormhole};
use crate::{CollapseRecord, Lifeline, Physics, Registry};

/// What a lifecycle step did.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The universe is still live. `state` and `entropy` are read after any
    /// wormhole exchange.
    Advanced {
        state: CosmicState,
        entropy: f64,
        wormhole: Option<Wormhole>,
    },
    /// Entropy crossed the threshold; the universe is now part of a black
    /// hole. Terminal.
    Collapsed(CollapseRecord),
    /// The universe was deleted (or its id re-used) by someone else. Terminal.
    Vanished,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Advanced { .. })
    }
}

/// Advance one universe by one step.
///
/// `jitter` scales the entropy drift; `0.0` freezes entropy, which is how
/// scenarios pin a universe at a known value.
pub fn step(
    registry: &mut Registry,
    lifeline: Lifeline,
    physics: &Physics,
    jitter: f64,
    rng: &mut impl Rng,
) -> StepOutcome {
    let (entropy, capable) = {
        let Some(universe) = registry.living_mut(lifeline) else {
            return StepOutcome::Vanished;
        };
        universe.state = CosmicState::random(rng);
        let drift = rng.gen_range(physics.drift_min..physics.drift_max) * jitter;
        universe.entropy = (universe.entropy + drift).max(0.0);
        (universe.entropy, universe.wormhole_capable)
    };

    if entropy > physics.collapse_threshold {
        return match registry.collapse(lifeline.id, rng) {
            Some(record) => StepOutcome::Collapsed(record),
            None => StepOutcome::Vanished,
        };
    }

    let wormhole = if capable && rng.gen_bool(physics.pairing_chance) {
        open_wormhole(registry, lifeline.id, physics, rng)
    } else {
        None
    };

    match registry.universe(lifeline.id) {
        Some(u) => StepOutcome::Advanced {
            state: u.state,
            entropy: u.entropy,
            wormhole,
        },
        None => StepOutcome::Vanished,
    }
}

/// Time dilation: the higher the entropy, the shorter the pause before the
/// next step.
pub fn dilate(base: Duration, entropy: f64) -> Duration {
    base.div_f64(1.0 + entropy.max(0.0))
}

/// Jitter factor in `[0.5, 1.5]` derived from time since the task started.
pub fn jitter_at(elapsed: Duration) -> f64 {
    1.0 + 0.5 * elapsed.as_secs_f64().sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SharedRegistry, Universe};
    use multiverse_common::{UniverseId, create_rng};

    fn single(entropy: f64) -> (Registry, Lifeline) {
        let mut r = Registry::new();
        let lifeline = r
            .insert_universe(Universe::with_entropy(
                UniverseId(999),
                CosmicState::Initialized,
                entropy,
            ))
            .unwrap();
        (r, lifeline)
    }

    #[test]
    fn over_threshold_collapses_into_black_hole() {
        let (mut r, lifeline) = single(1.1);
        let mut rng = create_rng(7);
        let outcome = step(&mut r, lifeline, &Physics::default(), 0.0, &mut rng);

        let StepOutcome::Collapsed(record) = outcome else {
            panic!("expected collapse, got {outcome:?}");
        };
        assert!(r.universe(UniverseId(999)).is_none());
        assert_eq!(r.counts(), (0, 1));
        let bh = r.black_hole(record.black_hole).unwrap();
        assert_eq!(bh.absorbed, vec![UniverseId(999)]);
        assert_eq!(bh.mass, 1.1);
    }

    #[test]
    fn collapse_through_shared_registry_releases_lock() {
        let shared = SharedRegistry::new();
        let lifeline = shared
            .insert_universe(Universe::with_entropy(
                UniverseId(999),
                CosmicState::Initialized,
                1.1,
            ))
            .unwrap();
        assert!(!shared.is_locked());
        let mut rng = create_rng(3);
        let outcome = shared.with(|r| step(r, lifeline, &Physics::default(), 0.0, &mut rng));
        assert!(outcome.is_terminal());
        assert!(!shared.is_locked());
        assert_eq!(shared.counts(), (0, 1));
    }

    #[test]
    fn entropy_is_clamped_at_zero() {
        let physics = Physics {
            drift_min: -0.5,
            drift_max: -0.4,
            ..Physics::default()
        };
        let (mut r, lifeline) = single(0.01);
        let mut rng = create_rng(1);
        let outcome = step(&mut r, lifeline, &physics, 1.0, &mut rng);
        assert!(matches!(outcome, StepOutcome::Advanced { entropy, .. } if entropy == 0.0));
    }

    #[test]
    fn entropy_never_negative_over_many_steps() {
        let (mut r, lifeline) = single(0.0);
        let mut rng = create_rng(12);
        for i in 0..500 {
            let jitter = jitter_at(Duration::from_millis(i * 137));
            match step(&mut r, lifeline, &Physics::default(), jitter, &mut rng) {
                StepOutcome::Advanced { entropy, state, .. } => {
                    assert!(entropy >= 0.0);
                    assert_ne!(state, CosmicState::Initialized);
                }
                StepOutcome::Collapsed(record) => {
                    assert!(record.mass > 1.0);
                    return;
                }
                StepOutcome::Vanished => panic!("universe vanished unexpectedly"),
            }
        }
    }

    #[test]
    fn removal_matches_exactly_one_absorption() {
        let mut r = Registry::new();
        let mut rng = create_rng(99);
        let mut lifelines = Vec::new();
        for _ in 0..30 {
            let lifeline = r.insert_random_universe(&Physics::default(), &mut rng);
            lifelines.push(lifeline.unwrap());
        }
        let mut alive = lifelines.clone();
        while !alive.is_empty() {
            alive.retain(|&lifeline| {
                let (before_live, before_bh) = r.counts();
                let absorbed_before: usize =
                    r.black_holes().values().map(|b| b.absorbed.len()).sum();
                let outcome = step(&mut r, lifeline, &Physics::default(), 1.0, &mut rng);
                let (after_live, after_bh) = r.counts();
                let absorbed_after: usize =
                    r.black_holes().values().map(|b| b.absorbed.len()).sum();
                match outcome {
                    StepOutcome::Collapsed(_) => {
                        assert_eq!(after_live, before_live - 1);
                        assert_eq!(after_bh, before_bh + 1);
                        assert_eq!(absorbed_after, absorbed_before + 1);
                        false
                    }
                    StepOutcome::Advanced { .. } => {
                        assert_eq!((after_live, after_bh), (before_live, before_bh));
                        assert_eq!(absorbed_after, absorbed_before);
                        true
                    }
                    StepOutcome::Vanished => panic!("no external deletions in this test"),
                }
            });
        }
        assert_eq!(r.counts(), (0, 30));
        for bh in r.black_holes().values() {
            assert!(bh.mass > 1.0);
            assert_eq!(bh.absorbed.len(), 1);
        }
    }

    #[test]
    fn deleted_universe_vanishes() {
        let (mut r, lifeline) = single(0.5);
        r.remove_universe(lifeline.id);
        let mut rng = create_rng(1);
        assert_eq!(
            step(&mut r, lifeline, &Physics::default(), 1.0, &mut rng),
            StepOutcome::Vanished
        );
    }

    #[test]
    fn stale_lifeline_does_not_drive_new_incarnation() {
        let (mut r, old) = single(0.5);
        r.remove_universe(old.id);
        r.insert_universe(Universe::with_entropy(old.id, CosmicState::Frozen, 0.4))
            .unwrap();
        let mut rng = create_rng(1);
        assert_eq!(
            step(&mut r, old, &Physics::default(), 1.0, &mut rng),
            StepOutcome::Vanished
        );
        let u = r.universe(old.id).unwrap();
        assert_eq!((u.state, u.entropy), (CosmicState::Frozen, 0.4));
    }

    #[test]
    fn capable_universe_eventually_opens_wormhole() {
        let physics = Physics {
            pairing_chance: 1.0,
            id_space: 2,
            drift_min: 0.0,
            drift_max: 1e-9,
            ..Physics::default()
        };
        let mut r = Registry::new();
        let mut a = Universe::with_entropy(UniverseId(0), CosmicState::Initialized, 0.2);
        a.wormhole_capable = true;
        let lifeline = r.insert_universe(a).unwrap();
        r.insert_universe(Universe::with_entropy(UniverseId(1), CosmicState::Frozen, 0.6))
            .unwrap();

        let mut rng = create_rng(17);
        let mut opened = None;
        for _ in 0..64 {
            let outcome = step(&mut r, lifeline, &physics, 0.0, &mut rng);
            if let StepOutcome::Advanced { wormhole, .. } = outcome {
                opened = wormhole;
            }
            if opened.is_some() {
                break;
            }
        }
        let expected = Wormhole {
            from: UniverseId(0),
            to: UniverseId(1),
        };
        assert_eq!(opened, Some(expected));
        let partner = r.universe(UniverseId(1)).unwrap();
        assert_eq!(partner.state, CosmicState::Entangled);
    }

    #[test]
    fn higher_entropy_means_shorter_delay() {
        let base = Duration::from_millis(1000);
        assert_eq!(dilate(base, 0.0), base);
        assert!(dilate(base, 0.9) < dilate(base, 0.1));
        assert_eq!(dilate(base, 1.0), Duration::from_millis(500));
    }

    #[test]
    fn jitter_stays_bounded() {
        for ms in (0..20_000).step_by(97) {
            let j = jitter_at(Duration::from_millis(ms));
            assert!((0.5..=1.5).contains(&j));
        }
    }
}
