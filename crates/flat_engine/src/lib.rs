//! # Flat Engine
//!
//! The 2D collision core of a modular game engine: colliders, physics
//! bodies, raycasting, and tile-derived geometry, with no rendering or
//! resolution pass attached.
//!
//! ## Features
//!
//! - **SAT collision**: Circle and polygon colliders report minimum
//!   translation vectors and containment via the separating axis theorem
//! - **Raycasting**: Finite-length rays against any collider shape
//! - **Collision layers**: Bitmask filtering with per-collider overrides
//! - **Tile bodies**: Colliders derived from tile grids, with collinear
//!   edge merging and per-side layer overrides
//! - **Lazy world geometry**: Collider caches invalidate by generation
//!   counter, so moving a body costs nothing until someone asks
//!
//! ## Quick Start
//!
//! ```rust
//! use flat_engine::prelude::*;
//!
//! let mut player = SimplePhysicsBody::new(Collider::circle(0.5));
//! player.initialize().expect("simple bodies always initialize");
//! player.state().set_position(Vec2::new(2.0, 0.0));
//!
//! let mut wall = SimplePhysicsBody::new(Collider::rectangle(
//!     Vec2::new(2.0, -2.0),
//!     Vec2::new(3.0, 2.0),
//! ));
//! wall.initialize().expect("simple bodies always initialize");
//!
//! if let Some(hit) = player.collider().collides_with(wall.collider()) {
//!     // Push the player out of the wall.
//!     let position = player.state().world_position(Vec2::zeros());
//!     player.state().set_position(position + hit.minimum_translation);
//! }
//! ```

pub mod core;
pub mod foundation;
pub mod physics;

pub use physics::PhysicsError;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::PhysicsConfig,
        foundation::math::{Transform2D, Vec2},
        physics::{
            BoundingArea, Collider, CollisionInfo, DynamicPhysicsBody, EdgeOverride,
            EdgeOverrides, Layers, PhysicsBody, PhysicsError, QuadBody, Ray, RaycastHit,
            SimplePhysicsBody, SparseTileGrid, TileGrid, TileableBoxBody, TileableEdgeBody,
            TileableLineBody, TriangleBody,
        },
    };
}
