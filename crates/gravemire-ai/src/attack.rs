//! Interruptible attack sequencer.
//!
//! One timed cycle per trigger: wind-up, effect application, cooldown. The
//! effect variant (melee strike, projectile volley, summon wave) is rolled
//! once when the trigger is accepted and never re-rolled mid-sequence.
//! Taking damage cancels the cycle at any point before the effect lands and
//! imposes a hit-reaction lockout.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// How an agent's attacks resolve, chosen per archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Single melee strike after wind-up, re-validated against range and
    /// visibility at the moment it lands.
    Melee,
    /// One projectile per trigger.
    SingleShot,
    /// Even-odds roll between one projectile and a volley of `shots`.
    BurstOrSingle {
        /// Number of projectiles in the volley branch.
        shots: u32,
        /// Seconds between volley projectiles.
        shot_delay: f32,
    },
    /// Weighted roll between one projectile and a wave of summoned adds.
    SummonOrSingle {
        /// Minimum adds per summon wave.
        min_adds: u32,
        /// Maximum adds per summon wave.
        max_adds: u32,
        /// Seconds between summons in a wave.
        spawn_delay: f32,
        /// Probability of the summon branch, in `0.0..=1.0`.
        summon_chance: f32,
    },
}

/// Concrete effect resolved from an [`AttackStyle`] roll, fixed per trigger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttackPlan {
    /// One melee strike.
    Strike,
    /// `count` projectiles spaced `delay` seconds apart.
    Volley {
        /// Number of projectiles.
        count: u32,
        /// Seconds between shots.
        delay: f32,
    },
    /// `count` adds spawned `delay` seconds apart.
    Summon {
        /// Number of adds.
        count: u32,
        /// Seconds between spawns.
        delay: f32,
    },
}

impl AttackStyle {
    /// Rolls the concrete plan for one trigger.
    #[must_use]
    pub fn roll(self, rng: &mut fastrand::Rng) -> AttackPlan {
        match self {
            Self::Melee => AttackPlan::Strike,
            Self::SingleShot => AttackPlan::Volley { count: 1, delay: 0.0 },
            Self::BurstOrSingle { shots, shot_delay } => {
                if rng.bool() {
                    AttackPlan::Volley {
                        count: shots,
                        delay: shot_delay,
                    }
                } else {
                    AttackPlan::Volley { count: 1, delay: 0.0 }
                }
            }
            Self::SummonOrSingle {
                min_adds,
                max_adds,
                spawn_delay,
                summon_chance,
            } => {
                if rng.f32() < summon_chance {
                    AttackPlan::Summon {
                        count: rng.u32(min_adds..=max_adds.max(min_adds)),
                        delay: spawn_delay,
                    }
                } else {
                    AttackPlan::Volley { count: 1, delay: 0.0 }
                }
            }
        }
    }
}

/// Effect emitted by the sequencer; the caller attaches world context
/// (damage numbers, directions, spawn positions) and forwards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackEvent {
    /// A melee strike landed.
    Strike,
    /// A projectile left the agent.
    ProjectileFired,
    /// An add was summoned.
    AddSummoned,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Windup { remaining: f32, plan: AttackPlan },
    Executing { plan: AttackPlan, emitted: u32, until_next: f32 },
    Cooldown { remaining: f32 },
    HitReact { remaining: f32 },
}

/// Attack cycle state for one agent.
///
/// A trigger is accepted only from idle; while winding up, executing, or
/// cooling down, further triggers are silent no-ops.
#[derive(Debug, Clone)]
pub struct AttackSequencer {
    phase: Phase,
    windup: f32,
    cooldown: f32,
    hit_react: f32,
}

impl AttackSequencer {
    /// Creates an idle sequencer with the given phase durations.
    #[must_use]
    pub fn new(windup: f32, cooldown: f32, hit_react: f32) -> Self {
        Self {
            phase: Phase::Idle,
            windup,
            cooldown,
            hit_react,
        }
    }

    /// Whether a cycle is in flight (winding up or emitting effects).
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        matches!(self.phase, Phase::Windup { .. } | Phase::Executing { .. })
    }

    /// Whether a new trigger would be accepted right now.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Starts a cycle with an already-rolled plan.
    ///
    /// Returns `false` (no-op) unless the sequencer is idle.
    pub fn trigger(&mut self, plan: AttackPlan) -> bool {
        if !self.can_attack() {
            return false;
        }
        trace!(?plan, "attack triggered");
        self.phase = Phase::Windup {
            remaining: self.windup,
            plan,
        };
        true
    }

    /// Cancels an in-flight cycle without the hit-reaction lockout.
    ///
    /// The pending effect never fires; the cycle is spent and goes
    /// straight to cooldown. No-op unless winding up or executing, so a
    /// cooldown or hit-react already in progress keeps its remaining time.
    pub fn cancel(&mut self) {
        if self.is_attacking() {
            trace!("attack cancelled");
            self.phase = Phase::Cooldown {
                remaining: self.cooldown,
            };
        }
    }

    /// Cancels any in-flight cycle and imposes the hit-reaction lockout.
    ///
    /// A pending effect never fires after this. The lockout extends but
    /// never shortens a cooldown already in progress.
    pub fn interrupt(&mut self) {
        let floor = match self.phase {
            Phase::Cooldown { remaining } | Phase::HitReact { remaining } => remaining,
            _ => 0.0,
        };
        if self.is_attacking() {
            trace!("attack interrupted mid-cycle");
        }
        self.phase = Phase::HitReact {
            remaining: self.hit_react.max(floor),
        };
    }

    /// Advances the cycle, appending any effects that land this tick.
    ///
    /// `target_valid` is the melee gate: a strike whose wind-up completes
    /// while the target is out of range or out of sight is dropped, and the
    /// cycle proceeds straight to cooldown. Projectiles and summons launch
    /// regardless; they resolve in the world, not here.
    pub fn tick(&mut self, dt: f32, target_valid: bool, out: &mut Vec<AttackEvent>) {
        match &mut self.phase {
            Phase::Idle => {}
            Phase::Windup { remaining, plan } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    let plan = *plan;
                    match plan {
                        AttackPlan::Strike => {
                            if target_valid {
                                out.push(AttackEvent::Strike);
                            } else {
                                trace!("strike whiffed, target left range");
                            }
                            self.phase = Phase::Cooldown {
                                remaining: self.cooldown,
                            };
                        }
                        AttackPlan::Volley { delay, .. } => {
                            out.push(AttackEvent::ProjectileFired);
                            self.advance_execution(plan, 1, delay);
                        }
                        AttackPlan::Summon { delay, .. } => {
                            out.push(AttackEvent::AddSummoned);
                            self.advance_execution(plan, 1, delay);
                        }
                    }
                }
            }
            Phase::Executing {
                plan,
                emitted,
                until_next,
            } => {
                *until_next -= dt;
                if *until_next <= 0.0 {
                    let (plan, emitted) = (*plan, *emitted + 1);
                    match plan {
                        AttackPlan::Volley { delay, .. } => {
                            out.push(AttackEvent::ProjectileFired);
                            self.advance_execution(plan, emitted, delay);
                        }
                        AttackPlan::Summon { delay, .. } => {
                            out.push(AttackEvent::AddSummoned);
                            self.advance_execution(plan, emitted, delay);
                        }
                        AttackPlan::Strike => {
                            // Strikes never enter Executing
                            self.phase = Phase::Cooldown {
                                remaining: self.cooldown,
                            };
                        }
                    }
                }
            }
            Phase::Cooldown { remaining } | Phase::HitReact { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.phase = Phase::Idle;
                }
            }
        }
    }

    fn advance_execution(&mut self, plan: AttackPlan, emitted: u32, delay: f32) {
        let total = match plan {
            AttackPlan::Volley { count, .. } | AttackPlan::Summon { count, .. } => count,
            AttackPlan::Strike => 1,
        };
        if emitted >= total {
            self.phase = Phase::Cooldown {
                remaining: self.cooldown,
            };
        } else {
            self.phase = Phase::Executing {
                plan,
                emitted,
                until_next: delay,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(seq: &mut AttackSequencer, dt: f32, target_valid: bool) -> Vec<AttackEvent> {
        let mut out = Vec::new();
        seq.tick(dt, target_valid, &mut out);
        out
    }

    #[test]
    fn test_melee_strike_after_windup() {
        let mut seq = AttackSequencer::new(0.5, 1.5, 1.0);
        assert!(seq.trigger(AttackPlan::Strike));
        assert!(seq.is_attacking());
        assert!(!seq.can_attack());

        assert!(drain(&mut seq, 0.3, true).is_empty());
        let events = drain(&mut seq, 0.3, true);
        assert_eq!(events, vec![AttackEvent::Strike]);
        assert!(!seq.is_attacking());
        assert!(!seq.can_attack()); // cooling down

        drain(&mut seq, 1.6, true);
        assert!(seq.can_attack());
    }

    #[test]
    fn test_trigger_while_busy_is_noop() {
        let mut seq = AttackSequencer::new(0.5, 1.5, 1.0);
        assert!(seq.trigger(AttackPlan::Strike));
        assert!(!seq.trigger(AttackPlan::Strike));
        // Exactly one strike comes out of the whole cycle
        let mut all = Vec::new();
        for _ in 0..10 {
            seq.tick(0.2, true, &mut all);
        }
        assert_eq!(all, vec![AttackEvent::Strike]);
    }

    #[test]
    fn test_interrupt_during_windup_cancels_strike() {
        // Damage 0.1s into a 0.5s wind-up: no strike ever fires and the
        // lockout holds for the hit-reaction duration.
        let mut seq = AttackSequencer::new(0.5, 1.5, 1.0);
        seq.trigger(AttackPlan::Strike);
        assert!(drain(&mut seq, 0.1, true).is_empty());

        seq.interrupt();
        assert!(!seq.is_attacking());
        assert!(!seq.can_attack());

        // Run well past where the wind-up would have completed
        let mut all = Vec::new();
        seq.tick(0.5, true, &mut all);
        assert!(all.is_empty());
        assert!(!seq.can_attack()); // still locked out (1.0s react)

        seq.tick(0.6, true, &mut all);
        assert!(all.is_empty());
        assert!(seq.can_attack());
    }

    #[test]
    fn test_cancel_drops_pending_windup_without_lockout() {
        let mut seq = AttackSequencer::new(0.5, 1.5, 1.0);
        seq.trigger(AttackPlan::Strike);
        drain(&mut seq, 0.2, true);

        seq.cancel();
        assert!(!seq.is_attacking());

        // Nothing fires, and the lockout is the attack cooldown (1.5s),
        // not the hit-reaction duration
        let mut all = Vec::new();
        seq.tick(1.0, true, &mut all);
        assert!(all.is_empty());
        assert!(!seq.can_attack());
        seq.tick(0.6, true, &mut all);
        assert!(all.is_empty());
        assert!(seq.can_attack());
    }

    #[test]
    fn test_cancel_while_cooling_down_is_noop() {
        let mut seq = AttackSequencer::new(0.0, 2.0, 1.0);
        seq.trigger(AttackPlan::Strike);
        drain(&mut seq, 0.1, true); // strike lands, cooldown begins
        drain(&mut seq, 1.5, true); // ~0.4s of cooldown left
        seq.cancel();
        drain(&mut seq, 0.5, true);
        assert!(seq.can_attack());
    }

    #[test]
    fn test_interrupt_mid_volley_stops_remaining_shots() {
        let mut seq = AttackSequencer::new(0.2, 1.0, 0.23);
        seq.trigger(AttackPlan::Volley {
            count: 3,
            delay: 0.3,
        });
        let first = drain(&mut seq, 0.25, true);
        assert_eq!(first, vec![AttackEvent::ProjectileFired]);

        seq.interrupt();
        let mut rest = Vec::new();
        for _ in 0..20 {
            seq.tick(0.1, true, &mut rest);
        }
        assert!(rest.is_empty());
        assert!(seq.can_attack());
    }

    #[test]
    fn test_volley_spacing() {
        let mut seq = AttackSequencer::new(0.0, 1.0, 0.23);
        seq.trigger(AttackPlan::Volley {
            count: 3,
            delay: 0.3,
        });
        let mut shots = 0;
        let mut t = 0.0;
        let mut fire_times = Vec::new();
        while shots < 3 {
            let events = drain(&mut seq, 0.05, true);
            t += 0.05;
            shots += events.len();
            for _ in events {
                fire_times.push(t);
            }
        }
        // Three shots roughly 0.3s apart
        assert_eq!(fire_times.len(), 3);
        assert!(fire_times[1] - fire_times[0] >= 0.3 - 1e-3);
        assert!(fire_times[2] - fire_times[1] >= 0.3 - 1e-3);
    }

    #[test]
    fn test_summon_wave_count() {
        let mut seq = AttackSequencer::new(0.0, 1.0, 0.5);
        seq.trigger(AttackPlan::Summon {
            count: 3,
            delay: 0.5,
        });
        let mut all = Vec::new();
        for _ in 0..40 {
            seq.tick(0.1, true, &mut all);
        }
        assert_eq!(all, vec![AttackEvent::AddSummoned; 3]);
    }

    #[test]
    fn test_whiffed_strike_still_cools_down() {
        let mut seq = AttackSequencer::new(0.2, 1.0, 1.0);
        seq.trigger(AttackPlan::Strike);
        let events = drain(&mut seq, 0.3, false);
        assert!(events.is_empty());
        assert!(!seq.can_attack());
        drain(&mut seq, 1.1, false);
        assert!(seq.can_attack());
    }

    #[test]
    fn test_plan_rolled_once_per_trigger() {
        // Seeded rolls are deterministic, and the roll happens at trigger
        // time only; the sequence never re-rolls mid-flight.
        let style = AttackStyle::BurstOrSingle {
            shots: 3,
            shot_delay: 0.3,
        };
        let mut rng_a = fastrand::Rng::with_seed(42);
        let mut rng_b = fastrand::Rng::with_seed(42);
        for _ in 0..16 {
            assert_eq!(style.roll(&mut rng_a), style.roll(&mut rng_b));
        }
    }

    #[test]
    fn test_summon_or_single_respects_weights() {
        let style = AttackStyle::SummonOrSingle {
            min_adds: 1,
            max_adds: 3,
            spawn_delay: 0.5,
            summon_chance: 0.2,
        };
        let mut rng = fastrand::Rng::with_seed(7);
        let mut summons = 0;
        for _ in 0..1000 {
            match style.roll(&mut rng) {
                AttackPlan::Summon { count, .. } => {
                    assert!((1..=3).contains(&count));
                    summons += 1;
                }
                AttackPlan::Volley { count: 1, .. } => {}
                other => panic!("unexpected plan {other:?}"),
            }
        }
        // ~200 expected; generous band to keep this seed-stable
        assert!((100..=320).contains(&summons), "summons = {summons}");
    }

    #[test]
    fn test_interrupt_does_not_shorten_cooldown() {
        let mut seq = AttackSequencer::new(0.0, 2.0, 0.23);
        seq.trigger(AttackPlan::Strike);
        drain(&mut seq, 0.1, true); // strike lands, 2.0s cooldown begins
        seq.interrupt();
        drain(&mut seq, 1.0, true);
        assert!(!seq.can_attack()); // ~0.9s of the original cooldown left
        drain(&mut seq, 1.0, true);
        assert!(seq.can_attack());
    }
}
