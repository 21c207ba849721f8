//! Event bus handing agent side effects to external collaborators.
//!
//! The agent layer never mutates the world directly: damage, projectiles,
//! summons, loot, audio/animation cues, and kill persistence all cross the
//! boundary as events. The manager publishes; the host drains once per frame.

use crate::tuning::Archetype;
use crossbeam_channel::{bounded, Receiver, Sender};
use gravemire_common::{AgentId, Vec2};
use serde::{Deserialize, Serialize};

/// Animation/audio cue kinds an agent can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueKind {
    /// Attack wind-up started.
    AttackWindup,
    /// Agent staggered from a hit.
    HitReact,
    /// Agent died.
    Death,
}

/// Events published by the agent layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An agent's melee strike connected with the target.
    DamageDealt {
        /// Attacking agent
        source: AgentId,
        /// Damage amount
        amount: i32,
    },
    /// An agent fired a projectile.
    ProjectileFired {
        /// Firing agent
        agent: AgentId,
        /// Launch position
        origin: Vec2,
        /// Normalized flight direction
        direction: Vec2,
    },
    /// A boss summoned an add.
    AddSummoned {
        /// Summoning agent
        summoner: AgentId,
        /// Spawn position
        position: Vec2,
    },
    /// An agent requests an animation/audio cue.
    CueRequested {
        /// Requesting agent
        agent: AgentId,
        /// Cue kind
        cue: CueKind,
    },
    /// A dying agent rolled a loot drop.
    LootDropped {
        /// Dead agent
        agent: AgentId,
        /// Drop position
        position: Vec2,
    },
    /// An agent died; the persistence collaborator records the kill.
    AgentDied {
        /// Dead agent
        agent: AgentId,
        /// Archetype, for kill-count bookkeeping
        archetype: Archetype,
        /// Death position
        position: Vec2,
    },
}

/// Bounded event bus; publishing to a full bus drops the event.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<GameEvent>,
    receiver: Receiver<GameEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates an event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event. Non-blocking; dropped if the bus is full.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events in publish order.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a sender handle for publishing from elsewhere.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}
