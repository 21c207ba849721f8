//! Status effects: burn and poison damage-over-time, and movement slow.
//!
//! Effects do not restack: applying one that is already active is a no-op,
//! so a fire patch cannot refresh itself into a permanent burn. DoT damage
//! is routed through the owner's take-damage path, which means a tick of
//! burn interrupts an attack wind-up exactly like a weapon hit.

use serde::{Deserialize, Serialize};

/// Seconds between DoT damage ticks.
const DOT_TICK_PERIOD: f32 = 1.0;
/// Damage per DoT tick.
const DOT_TICK_DAMAGE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct DotState {
    remaining: f32,
    until_tick: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct SlowState {
    remaining: f32,
    multiplier: f32,
}

/// Active status effects on one agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    burn: Option<DotState>,
    poison: Option<DotState>,
    slow: Option<SlowState>,
}

impl StatusEffects {
    /// Creates an empty effect set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a burn for `duration` seconds. No-op if already burning.
    pub fn apply_burn(&mut self, duration: f32) {
        if self.burn.is_none() {
            self.burn = Some(DotState {
                remaining: duration,
                until_tick: DOT_TICK_PERIOD,
            });
        }
    }

    /// Applies a poison for `duration` seconds. No-op if already poisoned.
    pub fn apply_poison(&mut self, duration: f32) {
        if self.poison.is_none() {
            self.poison = Some(DotState {
                remaining: duration,
                until_tick: DOT_TICK_PERIOD,
            });
        }
    }

    /// Applies a movement slow. No-op if a slow is already active.
    pub fn apply_slow(&mut self, duration: f32, multiplier: f32) {
        if self.slow.is_none() {
            self.slow = Some(SlowState {
                remaining: duration,
                multiplier: multiplier.clamp(0.0, 1.0),
            });
        }
    }

    /// Whether the agent is burning.
    #[must_use]
    pub fn is_burning(&self) -> bool {
        self.burn.is_some()
    }

    /// Whether the agent is poisoned.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poison.is_some()
    }

    /// Current movement speed multiplier (1.0 when not slowed).
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.slow.map_or(1.0, |s| s.multiplier)
    }

    /// Advances effect timers, returning the DoT damage accrued this tick.
    pub fn tick(&mut self, dt: f32) -> i32 {
        let mut damage = 0;
        for dot in [&mut self.burn, &mut self.poison] {
            if let Some(state) = dot {
                state.until_tick -= dt;
                while state.until_tick <= 0.0 {
                    damage += DOT_TICK_DAMAGE;
                    state.until_tick += DOT_TICK_PERIOD;
                }
                state.remaining -= dt;
                if state.remaining <= 0.0 {
                    *dot = None;
                }
            }
        }
        if let Some(slow) = &mut self.slow {
            slow.remaining -= dt;
            if slow.remaining <= 0.0 {
                self.slow = None;
            }
        }
        damage
    }
}
