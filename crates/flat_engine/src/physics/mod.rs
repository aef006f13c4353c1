//! 2D collision detection core
//!
//! Narrow-phase collision queries for a 2D game scene: colliders project
//! onto separating axes to produce minimum-translation vectors, rays march
//! against collider geometry, and bodies tie colliders to a shared world
//! transform. Broad-phase indexing and collision response live outside
//! this module; everything here is pure geometry plus layer filtering.

pub mod body;
pub mod bounding_area;
pub mod collider;
pub mod layers;
pub mod raycast;
pub mod tile_body;

pub use body::{
    BodyCore, BodyPhase, BodyState, DynamicPhysicsBody, EdgeOverride, EdgeOverrides, PhysicsBody,
    PhysicsMaterial, QuadBody, SimplePhysicsBody, TriangleBody,
};
pub use bounding_area::{BoundingArea, Projection};
pub use collider::{Collider, ColliderShape, CollisionInfo};
pub use layers::Layers;
pub use raycast::{Ray, RaycastHit};
pub use tile_body::{
    SparseTileGrid, TileGrid, TileableBoxBody, TileableEdgeBody, TileableLineBody,
};

/// Errors raised by the physics subsystem
///
/// Degenerate geometry (unbound colliders, zero radii, too few vertices)
/// is deliberately not an error: those queries answer with empty areas and
/// `None` so scene setup order never panics a frame. Only genuine
/// misconfiguration surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// A tile-derived body was initialized without a grid attached
    #[error("tile body initialized without a tile grid attached")]
    MissingTileGrid,
}
