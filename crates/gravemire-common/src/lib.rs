//! # Gravemire Common
//!
//! Foundational types shared across the Gravemire AI core:
//! - Cell coordinates on the uniform tile grid
//! - Agent ID type
//! - The world-position vector type (re-exported from `glam`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod ids;

pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::ids::*;
    pub use crate::Vec2;
}

pub use prelude::*;
