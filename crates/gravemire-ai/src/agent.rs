//! Agent behavior state machine.
//!
//! One parametrized agent type covers every archetype; differences live in
//! [`AgentTuning`](crate::tuning::AgentTuning) and its attack style. Each
//! tick decides the state transition first, then executes the state's
//! action, so an agent is in exactly one state when its action runs.

use crate::attack::{AttackEvent, AttackSequencer};
use crate::events::{CueKind, EventBus, GameEvent};
use crate::status::StatusEffects;
use crate::tuning::{AgentTuning, Archetype};
use gravemire_common::{AgentId, Vec2};
use gravemire_nav::grid::TileGrid;
use gravemire_nav::los::line_of_sight;
use gravemire_nav::scheduler::{PathScheduler, PathSlot};
use gravemire_nav::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Distance at which a waypoint counts as reached.
const WAYPOINT_EPSILON: f32 = 0.05;
/// Attempts at sampling an open patrol point before falling back.
const PATROL_SAMPLE_ATTEMPTS: u32 = 10;

/// Behavior state. An agent is in exactly one at any tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    /// Wander inside the anchor disk.
    Patrol,
    /// Close distance to the target.
    Chase,
    /// Stand and run the attack sequencer.
    Attack,
    /// Back directly away from the target (ranged bosses).
    Retreat,
}

/// Perception seam between agents and the host simulation.
///
/// Collaborators not being ready is a normal condition: a `None` target
/// means the agent patrols this tick, never an error.
pub trait AgentWorld {
    /// Live position of the tracked target, if one exists.
    fn target_position(&self) -> Option<Vec2>;
    /// Line-of-sight check between two world positions.
    fn can_see(&self, from: Vec2, to: Vec2) -> bool;
    /// Whether the cell containing a position is open.
    fn is_walkable(&self, pos: Vec2) -> bool;
}

/// Canonical grid-backed world: sight and walkability come from the tile
/// grid, the target from the host.
#[derive(Debug)]
pub struct GridWorld<'a> {
    grid: &'a TileGrid,
    target: Option<Vec2>,
}

impl<'a> GridWorld<'a> {
    /// Wraps a grid and an optional target position.
    #[must_use]
    pub fn new(grid: &'a TileGrid, target: Option<Vec2>) -> Self {
        Self { grid, target }
    }
}

impl AgentWorld for GridWorld<'_> {
    fn target_position(&self) -> Option<Vec2> {
        self.target
    }

    fn can_see(&self, from: Vec2, to: Vec2) -> bool {
        line_of_sight(self.grid, from, to)
    }

    fn is_walkable(&self, pos: Vec2) -> bool {
        self.grid.is_walkable(pos)
    }
}

/// One hostile agent: position, health, state machine, attack cycle.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    archetype: Archetype,
    tuning: AgentTuning,
    position: Vec2,
    facing: Vec2,
    health: i32,
    state: AgentState,
    anchor: Vec2,
    patrol_target: Vec2,
    patrol_timer: f32,
    path: Option<Path>,
    path_index: usize,
    path_slot: PathSlot,
    path_refresh: f32,
    sequencer: AttackSequencer,
    status: StatusEffects,
    rng: fastrand::Rng,
}

impl Agent {
    /// Creates an agent of the given archetype anchored at `position`.
    #[must_use]
    pub fn new(archetype: Archetype, position: Vec2) -> Self {
        Self::with_tuning(archetype, position, archetype.tuning())
    }

    /// Creates an agent with explicit tuning overrides.
    #[must_use]
    pub fn with_tuning(archetype: Archetype, position: Vec2, tuning: AgentTuning) -> Self {
        let id = AgentId::new();
        Self {
            id,
            archetype,
            position,
            facing: Vec2::X,
            health: tuning.max_health,
            state: AgentState::Patrol,
            anchor: position,
            patrol_target: position,
            patrol_timer: 0.0,
            path: None,
            path_index: 0,
            path_slot: PathSlot::new(),
            path_refresh: 0.0,
            sequencer: AttackSequencer::new(
                tuning.windup,
                tuning.attack_cooldown,
                tuning.hit_react_cooldown,
            ),
            status: StatusEffects::new(),
            rng: fastrand::Rng::with_seed(id.raw()),
            tuning,
        }
    }

    /// Reseeds the agent's RNG, for reproducible tests and replays.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Agent ID.
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Archetype this agent was spawned as.
    #[must_use]
    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Whether health has reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Whether an attack cycle is in flight.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.sequencer.is_attacking()
    }

    /// Whether a new attack trigger would be accepted.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.sequencer.can_attack()
    }

    /// The patrol anchor (position at last Patrol entry).
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Waypoints of the currently held path, if any.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Active status effects.
    #[must_use]
    pub fn status(&self) -> &StatusEffects {
        &self.status
    }

    /// Mutable status effects, for applying burns/poisons/slows.
    pub fn status_mut(&mut self) -> &mut StatusEffects {
        &mut self.status
    }

    /// Reduces health and interrupts any in-flight attack.
    ///
    /// The hit-reaction lockout applies on every hit, mid wind-up included.
    pub fn apply_damage(&mut self, amount: i32, events: &EventBus) {
        self.health -= amount;
        self.sequencer.interrupt();
        if self.health > 0 {
            events.publish(GameEvent::CueRequested {
                agent: self.id,
                cue: CueKind::HitReact,
            });
        }
        debug!(id = self.id.raw(), amount, health = self.health, "agent damaged");
    }

    /// Advances the agent by one tick.
    pub fn tick<W: AgentWorld>(
        &mut self,
        dt: f32,
        scheduler: &mut PathScheduler,
        world: &W,
        events: &EventBus,
    ) {
        if self.is_dead() {
            return;
        }

        let dot = self.status.tick(dt);
        if dot > 0 {
            self.apply_damage(dot, events);
            if self.is_dead() {
                return;
            }
        }

        self.adopt_delivered_path(scheduler);
        self.path_refresh = (self.path_refresh - dt).max(0.0);

        let target = world.target_position();
        let next = self.decide(target, world);
        self.enter(next);

        let target_valid = match target {
            Some(t) => {
                self.position.distance(t) <= self.tuning.attack_range
                    && world.can_see(self.position, t)
            }
            None => false,
        };

        match self.state {
            AgentState::Patrol => self.tick_patrol(dt, scheduler, world),
            AgentState::Chase => {
                if let Some(t) = target {
                    self.refresh_path_to(scheduler, t);
                }
                self.follow_path(dt, self.tuning.chase_speed);
            }
            AgentState::Retreat => {
                if let Some(t) = target {
                    let away = self.position + (self.position - t);
                    self.refresh_path_to(scheduler, away);
                }
                self.follow_path(dt, self.tuning.chase_speed);
            }
            AgentState::Attack => {
                if let Some(t) = target {
                    let to_target = t - self.position;
                    if to_target.length_squared() > 0.0 {
                        self.facing = to_target.normalize();
                    }
                }
                if self.sequencer.can_attack() {
                    let plan = self.tuning.attack_style.roll(&mut self.rng);
                    if self.sequencer.trigger(plan) {
                        events.publish(GameEvent::CueRequested {
                            agent: self.id,
                            cue: CueKind::AttackWindup,
                        });
                    }
                }
            }
        }

        // Cooldowns keep running outside Attack
        let mut effects = Vec::new();
        self.sequencer.tick(dt, target_valid, &mut effects);
        for effect in effects {
            self.publish_attack_effect(effect, world, events);
        }
    }

    /// Picks the next state from distance and visibility, in priority
    /// order: retreat, attack, chase, drop to patrol, else stay.
    fn decide<W: AgentWorld>(&self, target: Option<Vec2>, world: &W) -> AgentState {
        let Some(t) = target else {
            return AgentState::Patrol;
        };
        let d = self.position.distance(t);
        let visible = world.can_see(self.position, t);

        if let Some(retreat) = self.tuning.retreat_distance {
            if d < retreat {
                return AgentState::Retreat;
            }
        }
        if d <= self.tuning.attack_range && visible {
            return AgentState::Attack;
        }
        if d <= self.tuning.sight_range && visible {
            return AgentState::Chase;
        }
        if d > self.tuning.lose_sight_range {
            return AgentState::Patrol;
        }
        self.state
    }

    /// Applies a state change: any change drops the held path, and
    /// entering Patrol re-anchors the patrol disk at the current position.
    fn enter(&mut self, next: AgentState) {
        if next == self.state {
            return;
        }
        trace!(id = self.id.raw(), from = ?self.state, to = ?next, "state change");
        self.path = None;
        self.path_index = 0;
        // Entering Attack or Retreat kills any wind-up left over from a
        // previous state; the pending effect must not fire afterwards
        if matches!(next, AgentState::Attack | AgentState::Retreat) {
            self.sequencer.cancel();
        }
        if next == AgentState::Patrol {
            self.anchor = self.position;
            self.patrol_target = self.position;
            self.patrol_timer = 0.0;
        }
        self.state = next;
    }

    fn tick_patrol<W: AgentWorld>(
        &mut self,
        dt: f32,
        scheduler: &mut PathScheduler,
        world: &W,
    ) {
        self.patrol_timer -= dt;
        let exhausted = self.path_finished();
        if (self.patrol_timer <= 0.0 || exhausted) && self.path_refresh <= 0.0 {
            self.patrol_target = self.sample_patrol_target(world);
            self.request_path(scheduler, self.patrol_target);
            self.patrol_timer = self.tuning.patrol_interval;
        }
        self.follow_path(dt, self.tuning.patrol_speed);
    }

    /// Samples an open point in the anchor disk, falling back to the
    /// anchor itself after bounded attempts.
    fn sample_patrol_target<W: AgentWorld>(&mut self, world: &W) -> Vec2 {
        for _ in 0..PATROL_SAMPLE_ATTEMPTS {
            let angle = self.rng.f32() * std::f32::consts::TAU;
            let radius = self.tuning.patrol_radius * self.rng.f32().sqrt();
            let candidate = self.anchor + Vec2::new(angle.cos(), angle.sin()) * radius;
            if world.is_walkable(candidate) {
                return candidate;
            }
        }
        self.anchor
    }

    /// Requests a path toward `goal` if this agent's own spacing allows.
    fn refresh_path_to(&mut self, scheduler: &mut PathScheduler, goal: Vec2) {
        if self.path_refresh <= 0.0 {
            self.request_path(scheduler, goal);
        }
    }

    fn request_path(&mut self, scheduler: &mut PathScheduler, goal: Vec2) {
        let slot = self.path_slot.clone();
        scheduler.request(self.position, goal, move |outcome| slot.deliver(outcome));
        self.path_refresh = self.tuning.path_refresh_interval;
    }

    /// Adopts a delivered path, replacing the held one wholesale. An
    /// unreachable patrol goal falls back to pathing to the anchor, so the
    /// agent always has a goal; Chase/Retreat hold their last path instead.
    fn adopt_delivered_path(&mut self, scheduler: &mut PathScheduler) {
        match self.path_slot.take() {
            Some(Some(path)) => {
                self.path = Some(path);
                self.path_index = 0;
            }
            Some(None) => {
                trace!(id = self.id.raw(), state = ?self.state, "path unreachable");
                if self.state == AgentState::Patrol && self.patrol_target != self.anchor {
                    self.patrol_target = self.anchor;
                    self.request_path(scheduler, self.anchor);
                }
            }
            None => {}
        }
    }

    fn path_finished(&self) -> bool {
        self.path
            .as_ref()
            .map_or(true, |p| self.path_index >= p.len())
    }

    /// Walks the held path by `speed * dt`, consuming waypoints within
    /// epsilon. End of path with no fresher one means holding position.
    fn follow_path(&mut self, dt: f32, speed: f32) {
        let mut budget = speed * self.status.speed_multiplier() * dt;
        while budget > 0.0 {
            let Some(waypoint) = self.path.as_ref().and_then(|p| p.waypoint(self.path_index))
            else {
                break;
            };
            let to = waypoint - self.position;
            let dist = to.length();
            if dist <= WAYPOINT_EPSILON {
                self.path_index += 1;
                continue;
            }
            self.facing = to / dist;
            if dist <= budget {
                self.position = waypoint;
                budget -= dist;
                self.path_index += 1;
            } else {
                self.position += to / dist * budget;
                budget = 0.0;
            }
        }
    }

    fn publish_attack_effect<W: AgentWorld>(
        &mut self,
        effect: AttackEvent,
        world: &W,
        events: &EventBus,
    ) {
        match effect {
            AttackEvent::Strike => events.publish(GameEvent::DamageDealt {
                source: self.id,
                amount: self.tuning.attack_damage,
            }),
            AttackEvent::ProjectileFired => events.publish(GameEvent::ProjectileFired {
                agent: self.id,
                origin: self.position,
                direction: self.facing,
            }),
            AttackEvent::AddSummoned => {
                let position = self.sample_spawn_point(world);
                events.publish(GameEvent::AddSummoned {
                    summoner: self.id,
                    position,
                });
            }
        }
    }

    /// Picks an open spawn point near the agent for a summoned add.
    fn sample_spawn_point<W: AgentWorld>(&mut self, world: &W) -> Vec2 {
        for _ in 0..4 {
            let angle = self.rng.f32() * std::f32::consts::TAU;
            let candidate = self.position + Vec2::new(angle.cos(), angle.sin()) * 1.5;
            if world.is_walkable(candidate) {
                return candidate;
            }
        }
        self.position
    }
}
