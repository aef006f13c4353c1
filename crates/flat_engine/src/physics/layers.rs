//! Collision layer system for filtering collision detection
//!
//! Layers categorize colliders so that queries and the (external)
//! resolution pass can cheaply skip pairs that should never interact.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Collision layer bitmask
    ///
    /// A collider's *effective* layers are its own override when that
    /// override is non-empty, otherwise the owning body's layers. See
    /// [`Collider::layers`](crate::physics::Collider::layers).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Layers: u32 {
        /// Player character layer
        const PLAYER = 1 << 0;
        /// Enemy character layer
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, thrown objects, etc.)
        const PROJECTILE = 1 << 2;
        /// Static environment geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes (events only, no physical response)
        const TRIGGER = 1 << 4;
        /// Debris and small physics objects
        const DEBRIS = 1 << 5;
        /// Pickups and collectibles
        const PICKUP = 1 << 6;

        // User-defined custom layers
        const CUSTOM_7 = 1 << 7;
        const CUSTOM_8 = 1 << 8;
        const CUSTOM_9 = 1 << 9;
        const CUSTOM_10 = 1 << 10;
        const CUSTOM_11 = 1 << 11;
        const CUSTOM_12 = 1 << 12;
        const CUSTOM_13 = 1 << 13;
        const CUSTOM_14 = 1 << 14;
        const CUSTOM_15 = 1 << 15;
    }
}

impl Layers {
    /// Check if two colliders should interact based on layers and masks
    ///
    /// Mutual test: A's layer must be in B's mask and B's layer in A's mask.
    pub fn should_collide(layer_a: Self, mask_a: Self, layer_b: Self, mask_b: Self) -> bool {
        layer_a.intersects(mask_b) && layer_b.intersects(mask_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collide_requires_mutual_masks() {
        assert!(Layers::should_collide(
            Layers::PLAYER,
            Layers::ENEMY,
            Layers::ENEMY,
            Layers::PLAYER
        ));

        // Enemy does not mask the player back.
        assert!(!Layers::should_collide(
            Layers::PLAYER,
            Layers::ENEMY,
            Layers::ENEMY,
            Layers::PROJECTILE
        ));
    }

    #[test]
    fn layers_round_trip_through_serde() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Wrapper {
            layers: Layers,
        }

        let wrapper = Wrapper {
            layers: Layers::PLAYER | Layers::ENVIRONMENT,
        };
        let encoded = toml::to_string(&wrapper).unwrap();
        let decoded: Wrapper = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, wrapper);
    }

    #[test]
    fn empty_layers_never_collide() {
        assert!(!Layers::should_collide(
            Layers::empty(),
            Layers::all(),
            Layers::ENVIRONMENT,
            Layers::all()
        ));
    }
}
