//! Math utilities and types
//!
//! Provides fundamental math types for 2D collision detection and physics.

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Integer tile coordinate (column, row)
pub type TileCoord = (i32, i32);

/// 2D scalar cross product (z component of the 3D cross product)
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Counter-clockwise perpendicular of a vector
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Transform representing position and rotation in 2D space
///
/// Scale is intentionally absent: collider geometry is authored in world
/// units and bodies only translate and rotate it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,

    /// Rotation in radians, counter-clockwise
    pub rotation: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
        }
    }
}

impl Transform2D {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Apply this transform to a local-space point (rotate, then translate)
    pub fn apply(&self, local: Vec2) -> Vec2 {
        if self.rotation == 0.0 {
            return self.position + local;
        }

        let (sin, cos) = self.rotation.sin_cos();
        self.position
            + Vec2::new(
                local.x * cos - local.y * sin,
                local.x * sin + local.y * cos,
            )
    }
}
