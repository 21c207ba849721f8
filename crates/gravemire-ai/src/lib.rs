//! # Gravemire AI
//!
//! Agent layer for Gravemire: hostile-agent behavior on top of the nav
//! crate's pathfinding.
//!
//! This crate provides:
//! - Patrol/Chase/Attack/Retreat behavior state machine
//! - Interruptible attack sequencer (melee strikes, projectile volleys,
//!   summon waves)
//! - Archetype tuning presets (skeleton, zombie, boss variants)
//! - Status effects: burn/poison damage-over-time and movement slow
//! - Agent manager with kill counters and death side effects
//! - Event bus handing damage, cues, loot, and kills to the host
//!
//! ## Boundaries
//!
//! Agents never mutate the world. Perception comes in through the
//! [`agent::AgentWorld`] trait; every side effect goes out as a
//! [`events::GameEvent`]. The host drives everything through
//! [`manager::AgentManager::tick`] once per frame.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod attack;
pub mod events;
pub mod manager;
pub mod status;
pub mod tuning;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::*;
    pub use crate::attack::*;
    pub use crate::events::*;
    pub use crate::manager::*;
    pub use crate::status::*;
    pub use crate::tuning::*;
}

pub use prelude::*;
