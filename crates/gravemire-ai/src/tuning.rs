//! Per-agent tuning values and archetype presets.

use crate::attack::AttackStyle;
use serde::{Deserialize, Serialize};

/// Hostile agent archetype, selecting a tuning preset and attack style.
///
/// Variants differ only in data; there is one agent type parametrized by
/// [`AgentTuning`], not a hierarchy of per-archetype agent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Melee chaser with a short detection radius.
    Skeleton,
    /// Slower, tougher melee chaser.
    Zombie,
    /// Ranged boss alternating single arrows and triple volleys.
    BossSkeleton,
    /// Ranged boss mixing fireballs with summoned adds.
    BossMage,
}

impl Archetype {
    /// All archetypes, for iteration over counters and presets.
    pub const ALL: [Self; 4] = [
        Self::Skeleton,
        Self::Zombie,
        Self::BossSkeleton,
        Self::BossMage,
    ];

    /// Returns the tuning preset for this archetype.
    #[must_use]
    pub fn tuning(self) -> AgentTuning {
        match self {
            Self::Skeleton => AgentTuning::skeleton(),
            Self::Zombie => AgentTuning::zombie(),
            Self::BossSkeleton => AgentTuning::boss_skeleton(),
            Self::BossMage => AgentTuning::boss_mage(),
        }
    }
}

/// Tuning parameters for one agent instance.
///
/// Distances are world units, times are seconds. Melee archetypes leave
/// `retreat_distance` at `None` and use `sight_range` as their single
/// detection radius with `lose_sight_range` as the drop radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTuning {
    /// Movement speed while patrolling.
    pub patrol_speed: f32,
    /// Movement speed while chasing or retreating.
    pub chase_speed: f32,
    /// Detection radius for acquiring the target.
    pub sight_range: f32,
    /// Radius beyond which the target is dropped.
    pub lose_sight_range: f32,
    /// Maximum distance at which an attack can land.
    pub attack_range: f32,
    /// Ranged bosses back away when the target is closer than this.
    pub retreat_distance: Option<f32>,
    /// Damage applied per strike or projectile hit.
    pub attack_damage: i32,
    /// Delay between an attack trigger and its effect.
    pub windup: f32,
    /// Lockout after an attack completes.
    pub attack_cooldown: f32,
    /// Lockout imposed when the agent takes damage.
    pub hit_react_cooldown: f32,
    /// Seconds between patrol target resamples.
    pub patrol_interval: f32,
    /// Radius of the patrol disk around the anchor.
    pub patrol_radius: f32,
    /// Minimum spacing between this agent's own path requests.
    pub path_refresh_interval: f32,
    /// Starting and maximum health.
    pub max_health: i32,
    /// How this agent's attacks resolve.
    pub attack_style: AttackStyle,
}

impl AgentTuning {
    /// Standard melee skeleton.
    #[must_use]
    pub fn skeleton() -> Self {
        Self {
            patrol_speed: 1.5,
            chase_speed: 2.5,
            sight_range: 5.0,
            lose_sight_range: 10.0,
            attack_range: 1.5,
            retreat_distance: None,
            attack_damage: 1,
            windup: 0.5,
            attack_cooldown: 1.5,
            hit_react_cooldown: 1.0,
            patrol_interval: 3.0,
            patrol_radius: 5.0,
            path_refresh_interval: 0.75,
            max_health: 3,
            attack_style: AttackStyle::Melee,
        }
    }

    /// Slow, durable melee zombie.
    #[must_use]
    pub fn zombie() -> Self {
        Self {
            patrol_speed: 1.0,
            chase_speed: 1.8,
            attack_damage: 2,
            max_health: 6,
            ..Self::skeleton()
        }
    }

    /// Ranged skeleton boss: 50/50 single arrow or triple volley.
    #[must_use]
    pub fn boss_skeleton() -> Self {
        Self {
            patrol_speed: 1.5,
            chase_speed: 2.5,
            sight_range: 12.0,
            lose_sight_range: 16.0,
            attack_range: 8.0,
            retreat_distance: Some(3.0),
            attack_damage: 1,
            windup: 0.5,
            attack_cooldown: 2.0,
            hit_react_cooldown: 0.23,
            patrol_interval: 3.0,
            patrol_radius: 5.0,
            path_refresh_interval: 0.75,
            max_health: 12,
            attack_style: AttackStyle::BurstOrSingle {
                shots: 3,
                shot_delay: 0.3,
            },
        }
    }

    /// Mage boss: mostly fireballs, sometimes a wave of summoned adds.
    #[must_use]
    pub fn boss_mage() -> Self {
        Self {
            attack_range: 9.0,
            hit_react_cooldown: 0.5,
            max_health: 15,
            attack_style: AttackStyle::SummonOrSingle {
                min_adds: 1,
                max_adds: 3,
                spawn_delay: 0.5,
                summon_chance: 0.2,
            },
            ..Self::boss_skeleton()
        }
    }

    /// Overrides the attack style.
    #[must_use]
    pub fn with_attack_style(mut self, style: AttackStyle) -> Self {
        self.attack_style = style;
        self
    }

    /// Overrides the detection and drop radii.
    #[must_use]
    pub fn with_sight(mut self, sight: f32, lose_sight: f32) -> Self {
        self.sight_range = sight;
        self.lose_sight_range = lose_sight;
        self
    }

    /// Overrides the attack range.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range;
        self
    }

    /// Overrides starting health.
    #[must_use]
    pub fn with_max_health(mut self, health: i32) -> Self {
        self.max_health = health;
        self
    }
}
