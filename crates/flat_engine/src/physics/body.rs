//! Physics bodies
//!
//! A body owns one or more colliders, supplies them a world transform, and
//! resolves collision layers. Transform propagation uses a monotonically
//! increasing generation counter on the shared [`BodyState`] instead of
//! event subscriptions: colliders compare the counter on every read, so
//! there are no handlers to leak when colliders are swapped.

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{Transform2D, Vec2};
use crate::physics::bounding_area::BoundingArea;
use crate::physics::collider::Collider;
use crate::physics::layers::Layers;
use crate::physics::PhysicsError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Surface properties used by an external resolution pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Sliding friction coefficient
    pub friction: f32,
    /// Restitution applied on impact
    pub bounce: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 1.0,
            bounce: 0.0,
        }
    }
}

/// Lifecycle phase of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyPhase {
    /// Constructed but not yet bound into the scene
    #[default]
    Uninitialized,
    /// Colliders are built and bound
    Initialized,
    /// Colliders have been released
    Deinitialized,
}

/// State a body shares with its colliders
///
/// Held behind an `Rc` by the body and every collider it owns. All
/// interior mutability is `Cell`-based; the subsystem is single-threaded
/// by contract.
#[derive(Debug)]
pub struct BodyState {
    transform: Cell<Transform2D>,
    layers: Cell<Layers>,
    generation: Cell<u64>,
    config: PhysicsConfig,
}

impl BodyState {
    /// Create fresh body state with an identity transform
    pub fn new(config: PhysicsConfig) -> Rc<Self> {
        Rc::new(Self {
            transform: Cell::new(Transform2D::default()),
            layers: Cell::new(Layers::all()),
            generation: Cell::new(1),
            config,
        })
    }

    /// The body's current world transform
    pub fn transform(&self) -> Transform2D {
        self.transform.get()
    }

    /// Replace the world transform, invalidating dependent collider caches
    pub fn set_transform(&self, transform: Transform2D) {
        self.transform.set(transform);
        self.generation.set(self.generation.get() + 1);
    }

    /// Move the body, keeping its rotation
    pub fn set_position(&self, position: Vec2) {
        let mut transform = self.transform.get();
        transform.position = position;
        self.set_transform(transform);
    }

    /// The body-level collision layers
    pub fn layers(&self) -> Layers {
        self.layers.get()
    }

    /// Replace the body-level collision layers
    ///
    /// Layers do not affect geometry, so caches stay valid.
    pub fn set_layers(&self, layers: Layers) {
        self.layers.set(layers);
    }

    /// Monotonic transform generation; bumps on every transform change
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// World position of a local offset under the current transform
    pub fn world_position(&self, offset: Vec2) -> Vec2 {
        self.transform.get().apply(offset)
    }

    /// The physics configuration this body was created with
    pub fn config(&self) -> PhysicsConfig {
        self.config
    }
}

/// Bookkeeping shared by every concrete body type
#[derive(Debug)]
pub struct BodyCore {
    state: Rc<BodyState>,
    is_trigger: bool,
    material: PhysicsMaterial,
    update_order: i32,
    phase: BodyPhase,
    structure_generation: u64,
}

impl BodyCore {
    /// Create body bookkeeping with the given configuration
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            state: BodyState::new(config),
            is_trigger: false,
            material: PhysicsMaterial::default(),
            update_order: 0,
            phase: BodyPhase::Uninitialized,
            structure_generation: 0,
        }
    }

    /// The state shared with this body's colliders
    pub fn state(&self) -> &Rc<BodyState> {
        &self.state
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> BodyPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: BodyPhase) {
        self.phase = phase;
    }

    /// Record that the collider set itself changed (swap, regeneration)
    pub(crate) fn mark_structure_changed(&mut self) {
        self.structure_generation += 1;
    }

    pub(crate) fn structure_generation(&self) -> u64 {
        self.structure_generation
    }
}

/// A body that owns colliders and answers spatial queries
///
/// The `change_count` stands in for a bounding-area-changed notification:
/// it moves whenever the body's transform changes or its collider set is
/// rebuilt, so an external spatial index can poll it to decide when to
/// reposition the body.
pub trait PhysicsBody {
    /// Shared bookkeeping for this body
    fn core(&self) -> &BodyCore;

    /// Mutable shared bookkeeping for this body
    fn core_mut(&mut self) -> &mut BodyCore;

    /// Every collider this body currently owns
    fn colliders(&self) -> Vec<&Collider>;

    /// Build and bind this body's colliders
    fn initialize(&mut self) -> Result<(), PhysicsError>;

    /// Release this body's colliders
    fn deinitialize(&mut self);

    /// Per-frame maintenance; regenerating bodies override this
    fn update(&mut self) {}

    /// The state shared with this body's colliders
    fn state(&self) -> &Rc<BodyState> {
        self.core().state()
    }

    /// Whether at least one owned collider is bound to this body
    fn has_collider(&self) -> bool {
        let state = self.core().state();
        self.colliders()
            .iter()
            .any(|collider| collider.is_bound_to(state))
    }

    /// Combined bounding area of every owned collider
    fn bounding_area(&self) -> BoundingArea {
        self.colliders()
            .iter()
            .fold(BoundingArea::empty(), |area, collider| {
                area.combine(&collider.bounding_area())
            })
    }

    /// Whether this body only raises events instead of blocking movement
    fn is_trigger(&self) -> bool {
        self.core().is_trigger
    }

    /// Mark this body as a trigger volume
    fn set_trigger(&mut self, is_trigger: bool) {
        self.core_mut().is_trigger = is_trigger;
    }

    /// Surface material for the external resolution pass
    fn material(&self) -> PhysicsMaterial {
        self.core().material
    }

    /// Replace the surface material
    fn set_material(&mut self, material: PhysicsMaterial) {
        self.core_mut().material = material;
    }

    /// Relative ordering among bodies in the scene update pass
    fn update_order(&self) -> i32 {
        self.core().update_order
    }

    /// Set the relative update ordering
    fn set_update_order(&mut self, update_order: i32) {
        self.core_mut().update_order = update_order;
    }

    /// Counter that moves whenever this body's bounding area may have
    /// changed (transform change or collider rebuild)
    fn change_count(&self) -> u64 {
        self.core().state().generation() + self.core().structure_generation()
    }
}

/// A body with a single user-authored collider
#[derive(Debug)]
pub struct SimplePhysicsBody {
    core: BodyCore,
    collider: Collider,
}

impl SimplePhysicsBody {
    /// Create a body owning the given collider
    pub fn new(collider: Collider) -> Self {
        Self::with_config(collider, PhysicsConfig::default())
    }

    /// Create a body with an explicit physics configuration
    pub fn with_config(collider: Collider, config: PhysicsConfig) -> Self {
        Self {
            core: BodyCore::new(config),
            collider,
        }
    }

    /// The owned collider
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Mutable access to the owned collider
    pub fn collider_mut(&mut self) -> &mut Collider {
        &mut self.collider
    }

    /// Swap in a new collider
    ///
    /// The old collider is deinitialized first so it stops tracking this
    /// body; the new one is bound immediately when the body is live.
    pub fn set_collider(&mut self, mut collider: Collider) {
        self.collider.deinitialize();
        if self.core.phase() == BodyPhase::Initialized {
            collider.initialize(Rc::clone(self.core.state()));
        }

        self.collider = collider;
        self.core.mark_structure_changed();
    }
}

impl PhysicsBody for SimplePhysicsBody {
    fn core(&self) -> &BodyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BodyCore {
        &mut self.core
    }

    fn colliders(&self) -> Vec<&Collider> {
        vec![&self.collider]
    }

    fn initialize(&mut self) -> Result<(), PhysicsError> {
        self.collider.initialize(Rc::clone(self.core.state()));
        self.core.set_phase(BodyPhase::Initialized);
        Ok(())
    }

    fn deinitialize(&mut self) {
        self.collider.deinitialize();
        self.core.set_phase(BodyPhase::Deinitialized);
    }
}

/// A simple body carrying motion state for an external integrator
///
/// The collision core never integrates velocity itself; these fields are
/// value state the resolution pass reads and writes.
#[derive(Debug)]
pub struct DynamicPhysicsBody {
    inner: SimplePhysicsBody,
    velocity: Vec2,
    mass: f32,
    is_kinematic: bool,
}

impl DynamicPhysicsBody {
    /// Create a dynamic body owning the given collider
    pub fn new(collider: Collider) -> Self {
        Self {
            inner: SimplePhysicsBody::new(collider),
            velocity: Vec2::zeros(),
            mass: 1.0,
            is_kinematic: false,
        }
    }

    /// Current velocity
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set the current velocity
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Body mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set the body mass
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    /// Whether the body is moved directly rather than by forces
    pub fn is_kinematic(&self) -> bool {
        self.is_kinematic
    }

    /// Set whether the body is kinematic
    pub fn set_kinematic(&mut self, is_kinematic: bool) {
        self.is_kinematic = is_kinematic;
    }

    /// The owned collider
    pub fn collider(&self) -> &Collider {
        self.inner.collider()
    }

    /// Swap in a new collider
    pub fn set_collider(&mut self, collider: Collider) {
        self.inner.set_collider(collider);
    }
}

impl PhysicsBody for DynamicPhysicsBody {
    fn core(&self) -> &BodyCore {
        self.inner.core()
    }

    fn core_mut(&mut self) -> &mut BodyCore {
        self.inner.core_mut()
    }

    fn colliders(&self) -> Vec<&Collider> {
        self.inner.colliders()
    }

    fn initialize(&mut self) -> Result<(), PhysicsError> {
        self.inner.initialize()
    }

    fn deinitialize(&mut self) {
        self.inner.deinitialize();
    }
}

/// Layer override slot for one edge of a quad-like body
///
/// Disabled: the edge inherits the body's layers. Enabled with non-empty
/// layers: the edge's collider carries that override. Enabled with empty
/// layers: the edge is omitted entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeOverride {
    /// Whether this slot overrides the body's layers
    pub enabled: bool,
    /// The layers to apply when enabled
    pub layers: Layers,
}

impl EdgeOverride {
    /// Create an enabled override with the given layers
    pub fn with_layers(layers: Layers) -> Self {
        Self {
            enabled: true,
            layers,
        }
    }

    /// Create an enabled override that suppresses the edge entirely
    pub fn omitted() -> Self {
        Self {
            enabled: true,
            layers: Layers::empty(),
        }
    }

    /// Resolve this slot into a collider decision: `None` omits the edge,
    /// `Some(None)` inherits the body layers, `Some(Some(..))` overrides
    pub(crate) fn resolve(&self) -> Option<Option<Layers>> {
        if !self.enabled {
            Some(None)
        } else if self.layers.is_empty() {
            None
        } else {
            Some(Some(self.layers))
        }
    }
}

/// Per-edge layer override slots for quad-like bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeOverrides {
    /// Left edge slot
    pub left: EdgeOverride,
    /// Right edge slot
    pub right: EdgeOverride,
    /// Top edge slot
    pub top: EdgeOverride,
    /// Bottom edge slot
    pub bottom: EdgeOverride,
}

/// An axis-aligned quad of four independent edge colliders
///
/// The quad spans from the body position to `(width, height)` in local
/// space. Each edge is its own line collider so layers can differ per
/// side (one-way platforms, walls that only block projectiles, etc.).
#[derive(Debug)]
pub struct QuadBody {
    core: BodyCore,
    width: f32,
    height: f32,
    overrides: EdgeOverrides,
    colliders: Vec<Collider>,
}

impl QuadBody {
    /// Create a quad body of the given dimensions
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            core: BodyCore::new(PhysicsConfig::default()),
            width,
            height,
            overrides: EdgeOverrides::default(),
            colliders: Vec::new(),
        }
    }

    /// Quad width in world units
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Quad height in world units
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Resize the quad, rebuilding its edge colliders
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.rebuild();
    }

    /// The per-edge override slots
    pub fn overrides(&self) -> &EdgeOverrides {
        &self.overrides
    }

    /// Replace the per-edge override slots, rebuilding edge colliders
    pub fn set_overrides(&mut self, overrides: EdgeOverrides) {
        self.overrides = overrides;
        self.rebuild();
    }

    fn edge_segments(&self) -> [(Vec2, Vec2, EdgeOverride); 4] {
        let w = self.width;
        let h = self.height;
        [
            (Vec2::new(0.0, 0.0), Vec2::new(0.0, h), self.overrides.left),
            (Vec2::new(w, 0.0), Vec2::new(w, h), self.overrides.right),
            (Vec2::new(0.0, h), Vec2::new(w, h), self.overrides.top),
            (Vec2::new(0.0, 0.0), Vec2::new(w, 0.0), self.overrides.bottom),
        ]
    }

    fn rebuild(&mut self) {
        if self.core.phase() != BodyPhase::Initialized {
            return;
        }

        self.colliders.clear();
        for (start, end, slot) in self.edge_segments() {
            let Some(layer_override) = slot.resolve() else {
                continue;
            };

            let mut collider = Collider::line(start, end);
            collider.set_layer_override(layer_override);
            collider.initialize(Rc::clone(self.core.state()));
            self.colliders.push(collider);
        }

        self.core.mark_structure_changed();
    }
}

impl PhysicsBody for QuadBody {
    fn core(&self) -> &BodyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BodyCore {
        &mut self.core
    }

    fn colliders(&self) -> Vec<&Collider> {
        self.colliders.iter().collect()
    }

    fn initialize(&mut self) -> Result<(), PhysicsError> {
        self.core.set_phase(BodyPhase::Initialized);
        self.rebuild();
        Ok(())
    }

    fn deinitialize(&mut self) {
        for collider in &mut self.colliders {
            collider.deinitialize();
        }
        self.colliders.clear();
        self.core.set_phase(BodyPhase::Deinitialized);
    }
}

/// A right-triangle body of three edge colliders
///
/// Local vertices are `(0, 0)`, `(0, height)`, and `(width, 0)`. The
/// override slots reuse the quad layout: `left` is the vertical edge,
/// `bottom` the horizontal one, and `right` the hypotenuse.
#[derive(Debug)]
pub struct TriangleBody {
    core: BodyCore,
    width: f32,
    height: f32,
    overrides: EdgeOverrides,
    colliders: Vec<Collider>,
}

impl TriangleBody {
    /// Create a triangle body of the given leg lengths
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            core: BodyCore::new(PhysicsConfig::default()),
            width,
            height,
            overrides: EdgeOverrides::default(),
            colliders: Vec::new(),
        }
    }

    /// The per-edge override slots
    pub fn overrides(&self) -> &EdgeOverrides {
        &self.overrides
    }

    /// Replace the per-edge override slots, rebuilding edge colliders
    pub fn set_overrides(&mut self, overrides: EdgeOverrides) {
        self.overrides = overrides;
        self.rebuild();
    }

    fn rebuild(&mut self) {
        if self.core.phase() != BodyPhase::Initialized {
            return;
        }

        let w = self.width;
        let h = self.height;
        let edges = [
            (Vec2::new(0.0, 0.0), Vec2::new(0.0, h), self.overrides.left),
            (Vec2::new(0.0, 0.0), Vec2::new(w, 0.0), self.overrides.bottom),
            (Vec2::new(0.0, h), Vec2::new(w, 0.0), self.overrides.right),
        ];

        self.colliders.clear();
        for (start, end, slot) in edges {
            let Some(layer_override) = slot.resolve() else {
                continue;
            };

            let mut collider = Collider::line(start, end);
            collider.set_layer_override(layer_override);
            collider.initialize(Rc::clone(self.core.state()));
            self.colliders.push(collider);
        }

        self.core.mark_structure_changed();
    }
}

impl PhysicsBody for TriangleBody {
    fn core(&self) -> &BodyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BodyCore {
        &mut self.core
    }

    fn colliders(&self) -> Vec<&Collider> {
        self.colliders.iter().collect()
    }

    fn initialize(&mut self) -> Result<(), PhysicsError> {
        self.core.set_phase(BodyPhase::Initialized);
        self.rebuild();
        Ok(())
    }

    fn deinitialize(&mut self) {
        for collider in &mut self.colliders {
            collider.deinitialize();
        }
        self.colliders.clear();
        self.core.set_phase(BodyPhase::Deinitialized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_body_answers_degenerate_queries() {
        let body = SimplePhysicsBody::new(Collider::circle(1.0));
        assert!(!body.has_collider());
        assert!(body.bounding_area().is_empty());
    }

    #[test]
    fn initialize_binds_the_collider() {
        let mut body = SimplePhysicsBody::new(Collider::circle(1.0));
        body.initialize().unwrap();

        assert!(body.has_collider());
        assert!(!body.bounding_area().is_empty());
        assert_eq!(body.core().phase(), BodyPhase::Initialized);
    }

    #[test]
    fn deinitialize_releases_the_collider() {
        let mut body = SimplePhysicsBody::new(Collider::circle(1.0));
        body.initialize().unwrap();
        body.deinitialize();

        assert!(!body.has_collider());
        assert!(body.bounding_area().is_empty());
        assert_eq!(body.core().phase(), BodyPhase::Deinitialized);
    }

    #[test]
    fn collider_swap_unbinds_the_old_collider() {
        let mut body = SimplePhysicsBody::new(Collider::circle(1.0));
        body.initialize().unwrap();

        let before = body.change_count();
        body.set_collider(Collider::rectangle(
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 1.0),
        ));

        assert!(body.has_collider());
        assert!(body.change_count() > before);
        assert_eq!(body.bounding_area().maximum, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn change_count_moves_with_the_transform() {
        let mut body = SimplePhysicsBody::new(Collider::circle(1.0));
        body.initialize().unwrap();

        let before = body.change_count();
        body.state().set_position(Vec2::new(4.0, 0.0));
        assert!(body.change_count() > before);
    }

    #[test]
    fn quad_body_builds_four_edges_by_default() {
        let mut body = QuadBody::new(2.0, 1.0);
        body.initialize().unwrap();

        assert_eq!(body.colliders().len(), 4);
        let area = body.bounding_area();
        assert_eq!(area.minimum, Vec2::new(0.0, 0.0));
        assert_eq!(area.maximum, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn quad_edge_override_inherits_replaces_or_omits() {
        let mut body = QuadBody::new(2.0, 2.0);
        body.state().set_layers(Layers::ENVIRONMENT);
        body.initialize().unwrap();

        // Disabled override: the left edge inherits the body's layers.
        assert!(body
            .colliders()
            .iter()
            .all(|collider| collider.layers() == Layers::ENVIRONMENT));

        // Non-empty override replaces the mask on that edge only.
        body.set_overrides(EdgeOverrides {
            left: EdgeOverride::with_layers(Layers::TRIGGER),
            ..EdgeOverrides::default()
        });
        assert_eq!(body.colliders().len(), 4);
        assert_eq!(
            body.colliders()
                .iter()
                .filter(|collider| collider.layers() == Layers::TRIGGER)
                .count(),
            1
        );

        // Enabled empty override removes the edge from the collider set.
        body.set_overrides(EdgeOverrides {
            left: EdgeOverride::omitted(),
            ..EdgeOverrides::default()
        });
        assert_eq!(body.colliders().len(), 3);
    }

    #[test]
    fn triangle_body_builds_three_edges() {
        let mut body = TriangleBody::new(3.0, 4.0);
        body.initialize().unwrap();

        assert_eq!(body.colliders().len(), 3);
        let area = body.bounding_area();
        assert_eq!(area.maximum, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn dynamic_body_carries_motion_state_without_integrating() {
        let mut body = DynamicPhysicsBody::new(Collider::circle(0.5));
        body.initialize().unwrap();
        body.set_velocity(Vec2::new(1.0, 2.0));
        body.set_mass(4.0);

        assert_eq!(body.velocity(), Vec2::new(1.0, 2.0));
        assert_eq!(body.mass(), 4.0);
        assert!(!body.is_kinematic());

        // The body does not move on its own.
        let area = body.bounding_area();
        body.update();
        assert_eq!(body.bounding_area(), area);
    }
}
