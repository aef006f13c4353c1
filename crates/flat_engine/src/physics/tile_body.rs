//! Tile-derived physics bodies
//!
//! These bodies do not own authored geometry: they observe a tile grid and
//! regenerate their collider set whenever the grid's active-tile set (or
//! the body's own transform) changes. The edge variants extract one unit
//! segment per exposed tile edge and then merge collinear contiguous
//! segments so a long wall costs one collider instead of dozens.

use crate::core::config::PhysicsConfig;
use crate::foundation::math::{TileCoord, Vec2};
use crate::physics::body::{BodyCore, BodyPhase, EdgeOverrides, PhysicsBody};
use crate::physics::collider::Collider;
use crate::physics::layers::Layers;
use crate::physics::PhysicsError;
use log::debug;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// A tile grid the physics core can derive colliders from
///
/// Implemented by the engine's tile-map layer; [`SparseTileGrid`] is a
/// ready-made implementation for tests and simple maps.
pub trait TileGrid {
    /// Whether the given tile is active
    fn has_tile(&self, tile: TileCoord) -> bool;

    /// Every active tile; order must be deterministic
    fn active_tiles(&self) -> Vec<TileCoord>;

    /// Component-wise minimum and maximum of the active tiles, if any
    fn tile_bounds(&self) -> Option<(TileCoord, TileCoord)>;

    /// World position of a tile's lower-left corner
    fn tile_to_world(&self, tile: TileCoord) -> Vec2;

    /// Size of one tile in world units
    fn tile_size(&self) -> Vec2;

    /// Counter that moves on every change to the active-tile set
    fn generation(&self) -> u64;
}

/// HashSet-backed tile grid
#[derive(Debug, Clone)]
pub struct SparseTileGrid {
    tiles: HashSet<TileCoord>,
    origin: Vec2,
    tile_size: Vec2,
    generation: u64,
}

impl SparseTileGrid {
    /// Create an empty grid with the given world origin and tile size
    pub fn new(origin: Vec2, tile_size: Vec2) -> Self {
        Self {
            tiles: HashSet::new(),
            origin,
            tile_size,
            generation: 1,
        }
    }

    /// Create an empty grid at the world origin with unit tiles
    pub fn unit() -> Self {
        Self::new(Vec2::zeros(), Vec2::new(1.0, 1.0))
    }

    /// Activate a tile
    pub fn add_tile(&mut self, tile: TileCoord) {
        if self.tiles.insert(tile) {
            self.generation += 1;
        }
    }

    /// Deactivate a tile
    pub fn remove_tile(&mut self, tile: TileCoord) {
        if self.tiles.remove(&tile) {
            self.generation += 1;
        }
    }
}

impl TileGrid for SparseTileGrid {
    fn has_tile(&self, tile: TileCoord) -> bool {
        self.tiles.contains(&tile)
    }

    fn active_tiles(&self) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self.tiles.iter().copied().collect();
        tiles.sort_unstable();
        tiles
    }

    fn tile_bounds(&self) -> Option<(TileCoord, TileCoord)> {
        if self.tiles.is_empty() {
            return None;
        }

        let mut minimum = (i32::MAX, i32::MAX);
        let mut maximum = (i32::MIN, i32::MIN);
        for &(x, y) in &self.tiles {
            minimum = (minimum.0.min(x), minimum.1.min(y));
            maximum = (maximum.0.max(x), maximum.1.max(y));
        }

        Some((minimum, maximum))
    }

    fn tile_to_world(&self, tile: TileCoord) -> Vec2 {
        self.origin
            + Vec2::new(
                tile.0 as f32 * self.tile_size.x,
                tile.1 as f32 * self.tile_size.y,
            )
    }

    fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// A line segment between tile-corner coordinates, tagged with the layer
/// override its collider should carry (`None` inherits the body's layers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridSegment {
    start: TileCoord,
    end: TileCoord,
    layers: Option<Layers>,
}

/// Sort key that groups segments by layer tag deterministically
fn layers_key(layers: Option<Layers>) -> u64 {
    layers.map_or(u64::MAX, |l| u64::from(l.bits()))
}

fn gcd(a: i32, b: i32) -> i32 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Reduced integer direction of a segment
fn direction(segment: &GridSegment) -> (i32, i32) {
    let dx = segment.end.0 - segment.start.0;
    let dy = segment.end.1 - segment.start.1;
    let divisor = gcd(dx, dy).max(1);
    (dx / divisor, dy / divisor)
}

/// One unit segment per exposed cardinal edge of every active tile
///
/// An edge is exposed when the neighboring tile in that direction is
/// inactive. Each override slot decides whether segments on that side are
/// emitted, and which layer tag they carry.
fn extract_edge_segments<G: TileGrid>(grid: &G, overrides: &EdgeOverrides) -> Vec<GridSegment> {
    let mut segments = Vec::new();
    let left = overrides.left.resolve();
    let right = overrides.right.resolve();
    let top = overrides.top.resolve();
    let bottom = overrides.bottom.resolve();

    for (x, y) in grid.active_tiles() {
        if !grid.has_tile((x - 1, y)) {
            if let Some(layers) = left {
                segments.push(GridSegment {
                    start: (x, y),
                    end: (x, y + 1),
                    layers,
                });
            }
        }

        if !grid.has_tile((x + 1, y)) {
            if let Some(layers) = right {
                segments.push(GridSegment {
                    start: (x + 1, y),
                    end: (x + 1, y + 1),
                    layers,
                });
            }
        }

        if !grid.has_tile((x, y + 1)) {
            if let Some(layers) = top {
                segments.push(GridSegment {
                    start: (x, y + 1),
                    end: (x + 1, y + 1),
                    layers,
                });
            }
        }

        if !grid.has_tile((x, y - 1)) {
            if let Some(layers) = bottom {
                segments.push(GridSegment {
                    start: (x, y),
                    end: (x + 1, y),
                    layers,
                });
            }
        }
    }

    segments
}

/// Merge axis-aligned runs that share a row or column and a layer tag
///
/// Expects segments normalized so that `start <= end` on the varying axis
/// and sorted so contiguous runs are adjacent.
fn merge_runs(sorted: Vec<GridSegment>, horizontal: bool) -> Vec<GridSegment> {
    let mut merged: Vec<GridSegment> = Vec::new();
    for segment in sorted {
        if let Some(last) = merged.last_mut() {
            let contiguous = if horizontal {
                last.start.1 == segment.start.1 && last.end.0 == segment.start.0
            } else {
                last.start.0 == segment.start.0 && last.end.1 == segment.start.1
            };
            if contiguous && last.layers == segment.layers {
                last.end = segment.end;
                continue;
            }
        }
        merged.push(segment);
    }
    merged
}

/// Greedily chain diagonal segments that meet end-to-start with an
/// identical direction and layer tag
fn merge_chains(mut segments: Vec<GridSegment>) -> Vec<GridSegment> {
    segments.sort_unstable_by_key(|s| (layers_key(s.layers), s.start, s.end));

    let mut merged = Vec::new();
    while !segments.is_empty() {
        let mut chain = segments.remove(0);
        let chain_direction = direction(&chain);
        while let Some(index) = segments.iter().position(|s| {
            s.layers == chain.layers
                && direction(s) == chain_direction
                && (s.start == chain.end || s.end == chain.start)
        }) {
            let link = segments.remove(index);
            if link.start == chain.end {
                chain.end = link.end;
            } else {
                chain.start = link.start;
            }
        }
        merged.push(chain);
    }
    merged
}

/// Merge unit segments into contiguous runs
///
/// Horizontal segments sharing a row (and layer tag) merge when the end of
/// one is the start of the next, vertical segments likewise per column, and
/// anything else merges only when exactly chained end-to-start with an
/// identical direction. Greedy rather than globally optimal; the collider
/// count stays predictable and boundaries always land on tile corners.
fn merge_segments(segments: Vec<GridSegment>) -> Vec<GridSegment> {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    let mut irregular = Vec::new();

    for mut segment in segments {
        if segment.start.1 == segment.end.1 {
            if segment.start.0 > segment.end.0 {
                std::mem::swap(&mut segment.start, &mut segment.end);
            }
            horizontal.push(segment);
        } else if segment.start.0 == segment.end.0 {
            if segment.start.1 > segment.end.1 {
                std::mem::swap(&mut segment.start, &mut segment.end);
            }
            vertical.push(segment);
        } else {
            irregular.push(segment);
        }
    }

    horizontal.sort_unstable_by_key(|s| (layers_key(s.layers), s.start.1, s.start.0));
    vertical.sort_unstable_by_key(|s| (layers_key(s.layers), s.start.0, s.start.1));

    let mut merged = merge_runs(horizontal, true);
    merged.extend(merge_runs(vertical, false));
    merged.extend(merge_chains(irregular));
    merged
}

/// Grid attachment plus the generations the colliders were last built from
#[derive(Debug)]
struct GridWatch<G: TileGrid> {
    grid: Option<Rc<RefCell<G>>>,
    grid_generation: u64,
    transform_generation: u64,
}

impl<G: TileGrid> GridWatch<G> {
    fn new() -> Self {
        Self {
            grid: None,
            grid_generation: 0,
            transform_generation: 0,
        }
    }

    fn require(&self) -> Result<(), PhysicsError> {
        if self.grid.is_some() {
            Ok(())
        } else {
            Err(PhysicsError::MissingTileGrid)
        }
    }

    fn is_stale(&self, core: &BodyCore) -> bool {
        let grid_generation = self
            .grid
            .as_ref()
            .map_or(0, |grid| grid.borrow().generation());
        grid_generation != self.grid_generation
            || core.state().generation() != self.transform_generation
    }

    fn mark_fresh(&mut self, core: &BodyCore) {
        self.grid_generation = self
            .grid
            .as_ref()
            .map_or(0, |grid| grid.borrow().generation());
        self.transform_generation = core.state().generation();
    }
}

/// Deinitializes and rebuilds a collider list from merged grid segments
fn build_segment_colliders<G: TileGrid>(
    core: &BodyCore,
    grid: &G,
    overrides: &EdgeOverrides,
    colliders: &mut Vec<Collider>,
) {
    for collider in colliders.iter_mut() {
        collider.deinitialize();
    }
    colliders.clear();

    let origin = core.state().world_position(Vec2::zeros());
    for segment in merge_segments(extract_edge_segments(grid, overrides)) {
        let start = grid.tile_to_world(segment.start) - origin;
        let end = grid.tile_to_world(segment.end) - origin;
        let mut collider = Collider::line(start, end);
        collider.set_layer_override(segment.layers);
        collider.initialize(Rc::clone(core.state()));
        colliders.push(collider);
    }
}

/// A tile body with a single rectangle collider over the grid's bounds
///
/// The cheapest tile-derived shape: interior holes and concavities are
/// ignored, which is exactly right for solid platforms and crates.
#[derive(Debug)]
pub struct TileableBoxBody<G: TileGrid> {
    core: BodyCore,
    watch: GridWatch<G>,
    collider: Option<Collider>,
}

impl<G: TileGrid> TileableBoxBody<G> {
    /// Create a box body with no grid attached
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a box body with an explicit physics configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            core: BodyCore::new(config),
            watch: GridWatch::new(),
            collider: None,
        }
    }

    /// Attach the tile grid this body derives its collider from
    pub fn set_grid(&mut self, grid: Rc<RefCell<G>>) {
        self.watch.grid = Some(grid);
        self.regenerate();
    }

    fn regenerate(&mut self) {
        if self.core.phase() != BodyPhase::Initialized {
            return;
        }

        if let Some(collider) = &mut self.collider {
            collider.deinitialize();
        }
        self.collider = None;

        if let Some(grid) = self.watch.grid.as_ref().map(Rc::clone) {
            let grid = grid.borrow();
            if let Some((minimum, maximum)) = grid.tile_bounds() {
                let origin = self.core.state().world_position(Vec2::zeros());
                let low = grid.tile_to_world(minimum) - origin;
                let high = grid.tile_to_world((maximum.0 + 1, maximum.1 + 1)) - origin;

                let mut collider = Collider::rectangle(low, high);
                collider.initialize(Rc::clone(self.core.state()));
                self.collider = Some(collider);
            }
        }

        self.watch.mark_fresh(&self.core);
        self.core.mark_structure_changed();
    }
}

impl<G: TileGrid> Default for TileableBoxBody<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TileGrid> PhysicsBody for TileableBoxBody<G> {
    fn core(&self) -> &BodyCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BodyCore {
        &mut self.core
    }

    fn colliders(&self) -> Vec<&Collider> {
        self.collider.iter().collect()
    }

    fn initialize(&mut self) -> Result<(), PhysicsError> {
        self.watch.require()?;
        self.core.set_phase(BodyPhase::Initialized);
        self.regenerate();
        Ok(())
    }

    fn deinitialize(&mut self) {
        if let Some(collider) = &mut self.collider {
            collider.deinitialize();
        }
        self.collider = None;
        self.core.set_phase(BodyPhase::Deinitialized);
    }

    fn update(&mut self) {
        if self.core.phase() == BodyPhase::Initialized && self.watch.is_stale(&self.core) {
            self.regenerate();
        }
    }
}

/// A tile body tracing the grid boundary with merged line colliders
///
/// Every collider inherits the body's layers. Use [`TileableEdgeBody`]
/// when individual sides need their own layer masks.
#[derive(Debug)]
pub struct TileableLineBody<G: TileGrid> {
    core: BodyCore,
    watch: GridWatch<G>,
    colliders: Vec<Collider>,
}

impl<G: TileGrid> TileableLineBody<G> {
    /// Create a line body with no grid attached
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a line body with an explicit physics configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            core: BodyCore::new(config),
            watch: GridWatch::new(),
            colliders: Vec::new(),
        }
    }

    /// Attach the tile grid this body derives its colliders from
    pub fn set_grid(&mut self, grid: Rc<RefCell<G>>) {
        self.watch.grid = Some(grid);
        self.regenerate();
    }

    fn regenerate(&mut self) {
        if self.core.phase() != BodyPhase::Initialized {
            return;
        }

        if let Some(grid) = self.watch.grid.as_ref().map(Rc::clone) {
            let grid = grid.borrow();
            build_segment_colliders(
                &self.core,
                &*grid,
                &EdgeOverrides::default(),
                &mut self.colliders,
            );
            debug!(
                "rebuilt {} boundary colliders from {} active tiles",
                self.colliders.len(),
                grid.active_tiles().len()
            );
        }

        self.watch.mark_fresh(&self.core);
        self.core.mark_structure_changed();
    }
}

impl<G: TileGrid> Default for TileableLineBody<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TileGrid> PhysicsBody for TileableLineBody<G> {
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
        self.watch.require()?;
        self.core.set_phase(BodyPhase::Initialized);
        self.regenerate();
        Ok(())
    }

    fn deinitialize(&mut self) {
        for collider in &mut self.colliders {
            collider.deinitialize();
        }
        self.colliders.clear();
        self.core.set_phase(BodyPhase::Deinitialized);
    }

    fn update(&mut self) {
        if self.core.phase() == BodyPhase::Initialized && self.watch.is_stale(&self.core) {
            self.regenerate();
        }
    }
}

/// A tile body tracing the grid boundary with per-side layer overrides
///
/// Each cardinal side carries an [`EdgeOverride`](super::EdgeOverride)
/// slot, so the top of a tile run can be a one-way platform while its
/// sides stay solid. Segments only merge with segments carrying the same
/// layer tag.
#[derive(Debug)]
pub struct TileableEdgeBody<G: TileGrid> {
    core: BodyCore,
    watch: GridWatch<G>,
    overrides: EdgeOverrides,
    colliders: Vec<Collider>,
}

impl<G: TileGrid> TileableEdgeBody<G> {
    /// Create an edge body with no grid attached
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create an edge body with an explicit physics configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            core: BodyCore::new(config),
            watch: GridWatch::new(),
            overrides: EdgeOverrides::default(),
            colliders: Vec::new(),
        }
    }

    /// Attach the tile grid this body derives its colliders from
    pub fn set_grid(&mut self, grid: Rc<RefCell<G>>) {
        self.watch.grid = Some(grid);
        self.regenerate();
    }

    /// The per-side override slots
    pub fn overrides(&self) -> &EdgeOverrides {
        &self.overrides
    }

    /// Replace the per-side override slots, rebuilding colliders
    pub fn set_overrides(&mut self, overrides: EdgeOverrides) {
        self.overrides = overrides;
        self.regenerate();
    }

    fn regenerate(&mut self) {
        if self.core.phase() != BodyPhase::Initialized {
            return;
        }

        if let Some(grid) = self.watch.grid.as_ref().map(Rc::clone) {
            let grid = grid.borrow();
            build_segment_colliders(&self.core, &*grid, &self.overrides, &mut self.colliders);
            debug!(
                "rebuilt {} edge colliders from {} active tiles",
                self.colliders.len(),
                grid.active_tiles().len()
            );
        }

        self.watch.mark_fresh(&self.core);
        self.core.mark_structure_changed();
    }
}

impl<G: TileGrid> Default for TileableEdgeBody<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TileGrid> PhysicsBody for TileableEdgeBody<G> {
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
        self.watch.require()?;
        self.core.set_phase(BodyPhase::Initialized);
        self.regenerate();
        Ok(())
    }

    fn deinitialize(&mut self) {
        for collider in &mut self.colliders {
            collider.deinitialize();
        }
        self.colliders.clear();
        self.core.set_phase(BodyPhase::Deinitialized);
    }

    fn update(&mut self) {
        if self.core.phase() == BodyPhase::Initialized && self.watch.is_stale(&self.core) {
            self.regenerate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::EdgeOverride;

    fn row_grid(length: i32) -> Rc<RefCell<SparseTileGrid>> {
        let mut grid = SparseTileGrid::unit();
        for x in 0..length {
            grid.add_tile((x, 0));
        }
        Rc::new(RefCell::new(grid))
    }

    fn segment(start: TileCoord, end: TileCoord) -> GridSegment {
        GridSegment {
            start,
            end,
            layers: None,
        }
    }

    #[test]
    fn row_of_tiles_merges_to_four_segments() {
        let grid = {
            let mut grid = SparseTileGrid::unit();
            grid.add_tile((0, 0));
            grid.add_tile((1, 0));
            grid.add_tile((2, 0));
            grid
        };
        let merged = merge_segments(extract_edge_segments(&grid, &EdgeOverrides::default()));

        assert_eq!(merged.len(), 4);
        assert!(merged.contains(&segment((0, 0), (3, 0))));
        assert!(merged.contains(&segment((0, 1), (3, 1))));
        assert!(merged.contains(&segment((0, 0), (0, 1))));
        assert!(merged.contains(&segment((3, 0), (3, 1))));
    }

    #[test]
    fn gap_in_a_row_splits_the_runs() {
        let grid = {
            let mut grid = SparseTileGrid::unit();
            grid.add_tile((0, 0));
            grid.add_tile((2, 0));
            grid
        };
        let merged = merge_segments(extract_edge_segments(&grid, &EdgeOverrides::default()));

        // Two isolated tiles, four exposed sides each.
        assert_eq!(merged.len(), 8);
        assert!(merged.contains(&segment((0, 1), (1, 1))));
        assert!(merged.contains(&segment((2, 1), (3, 1))));
    }

    #[test]
    fn vertical_runs_merge_per_column() {
        let grid = {
            let mut grid = SparseTileGrid::unit();
            grid.add_tile((0, 0));
            grid.add_tile((0, 1));
            grid.add_tile((0, 2));
            grid
        };
        let merged = merge_segments(extract_edge_segments(&grid, &EdgeOverrides::default()));

        assert_eq!(merged.len(), 4);
        assert!(merged.contains(&segment((0, 0), (0, 3))));
        assert!(merged.contains(&segment((1, 0), (1, 3))));
    }

    #[test]
    fn diagonal_segments_chain_end_to_start() {
        let merged = merge_chains(vec![
            segment((1, 1), (2, 2)),
            segment((0, 0), (1, 1)),
            segment((2, 2), (3, 3)),
        ]);

        assert_eq!(merged, vec![segment((0, 0), (3, 3))]);
    }

    #[test]
    fn opposed_diagonals_stay_separate() {
        let merged = merge_chains(vec![segment((0, 0), (1, 1)), segment((2, 2), (1, 1))]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn differing_layer_tags_never_merge() {
        let tagged = GridSegment {
            start: (1, 0),
            end: (2, 0),
            layers: Some(Layers::TRIGGER),
        };
        let merged = merge_segments(vec![segment((0, 0), (1, 0)), tagged]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn initialize_without_a_grid_fails() {
        let mut body = TileableEdgeBody::<SparseTileGrid>::new();
        assert!(matches!(
            body.initialize(),
            Err(PhysicsError::MissingTileGrid)
        ));
        assert!(!body.has_collider());
    }

    #[test]
    fn edge_body_builds_merged_boundary_colliders() {
        let grid = row_grid(3);
        let mut body = TileableEdgeBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        assert_eq!(body.colliders().len(), 4);
        let area = body.bounding_area();
        assert_eq!(area.minimum, Vec2::new(0.0, 0.0));
        assert_eq!(area.maximum, Vec2::new(3.0, 1.0));

        // The top run spans the full row as a single collider.
        let top_spans: Vec<Vec<Vec2>> = body
            .colliders()
            .iter()
            .map(|collider| collider.world_points())
            .filter(|points| points.iter().all(|p| (p.y - 1.0).abs() < 1e-6))
            .collect();
        assert_eq!(top_spans.len(), 1);
        assert_eq!(top_spans[0], vec![Vec2::new(0.0, 1.0), Vec2::new(3.0, 1.0)]);
    }

    #[test]
    fn edge_overrides_retag_or_omit_sides() {
        let grid = row_grid(2);
        let mut body = TileableEdgeBody::new();
        body.state().set_layers(Layers::ENVIRONMENT);
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        body.set_overrides(EdgeOverrides {
            top: EdgeOverride::with_layers(Layers::TRIGGER),
            bottom: EdgeOverride::omitted(),
            ..EdgeOverrides::default()
        });

        // Bottom omitted: top run plus the two vertical sides remain.
        assert_eq!(body.colliders().len(), 3);
        assert_eq!(
            body.colliders()
                .iter()
                .filter(|collider| collider.layers() == Layers::TRIGGER)
                .count(),
            1
        );
        assert_eq!(
            body.colliders()
                .iter()
                .filter(|collider| collider.layers() == Layers::ENVIRONMENT)
                .count(),
            2
        );
    }

    #[test]
    fn line_body_regenerates_when_the_grid_changes() {
        // Capture the regeneration debug output in the test harness.
        let _ = env_logger::builder().is_test(true).try_init();

        let grid = row_grid(1);
        let mut body = TileableLineBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        assert_eq!(body.colliders().len(), 4);
        let before = body.change_count();

        grid.borrow_mut().add_tile((1, 0));
        body.update();

        assert!(body.change_count() > before);
        assert_eq!(body.bounding_area().maximum, Vec2::new(2.0, 1.0));

        // No grid change, no rebuild.
        let settled = body.change_count();
        body.update();
        assert_eq!(body.change_count(), settled);
    }

    #[test]
    fn box_body_covers_the_grid_bounds() {
        let grid = {
            let mut grid = SparseTileGrid::unit();
            grid.add_tile((0, 0));
            grid.add_tile((1, 1));
            Rc::new(RefCell::new(grid))
        };

        let mut body = TileableBoxBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        assert_eq!(body.colliders().len(), 1);
        let area = body.bounding_area();
        assert_eq!(area.minimum, Vec2::new(0.0, 0.0));
        assert_eq!(area.maximum, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn box_body_with_an_empty_grid_has_no_collider() {
        let grid = Rc::new(RefCell::new(SparseTileGrid::unit()));
        let mut body = TileableBoxBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        assert!(!body.has_collider());
        assert!(body.bounding_area().is_empty());
    }

    #[test]
    fn moved_body_regenerates_local_geometry() {
        let grid = row_grid(1);
        let mut body = TileableEdgeBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        // The grid stays in world space, so the colliders' world area does
        // not move with the body.
        body.state().set_position(Vec2::new(10.0, 0.0));
        body.update();

        let area = body.bounding_area();
        assert_eq!(area.minimum, Vec2::new(0.0, 0.0));
        assert_eq!(area.maximum, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn scaled_grid_produces_world_sized_colliders() {
        let grid = {
            let mut grid = SparseTileGrid::new(Vec2::new(4.0, 0.0), Vec2::new(2.0, 2.0));
            grid.add_tile((0, 0));
            Rc::new(RefCell::new(grid))
        };

        let mut body = TileableLineBody::new();
        body.set_grid(Rc::clone(&grid));
        body.initialize().unwrap();

        let area = body.bounding_area();
        assert_eq!(area.minimum, Vec2::new(4.0, 0.0));
        assert_eq!(area.maximum, Vec2::new(6.0, 2.0));
    }
}
