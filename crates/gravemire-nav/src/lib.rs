//! # Gravemire Nav
//!
//! Grid pathfinding engine for Gravemire.
//!
//! This crate provides the navigation layer the AI crate sits on:
//! - Tile grid occupancy model with world/cell conversion
//! - Indexed binary min-heap supporting O(log n) priority updates
//! - A* solver with pooled working structures and blocked-endpoint fast-fail
//! - Throttled FIFO request scheduler serializing solves through one solver
//! - DDA line-of-sight queries
//!
//! ## Request Flow
//!
//! Agents never call the solver directly. They enqueue a request on the
//! [`scheduler::PathScheduler`] with a completion callback and keep moving on
//! their current path; the scheduler serves at most one request per tick,
//! spaced by a minimum interval, and fires the callback with the outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod astar;
pub mod grid;
pub mod heap;
pub mod los;
pub mod scheduler;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::astar::*;
    pub use crate::grid::*;
    pub use crate::heap::*;
    pub use crate::los::*;
    pub use crate::scheduler::*;
}

pub use prelude::*;
