// Spatial hit testing - which selectable is under the pointer ray
use bevy::prelude::*;

use crate::math_utils::ray_sphere_distance;
use crate::types::HitSurface;

use super::config::{HitTestConfig, RaycastMode};

/// One ray intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub distance: f32,
    pub selectable: bool,
}

/// Ray picker with a fixed-size multi-hit buffer.
///
/// The buffer is sized from `max_hits` and only reallocated when that setting changes.
/// Like a non-allocating physics raycast, hits beyond the buffer size are dropped in
/// surface order, not by distance.
pub struct SpatialHitTester {
    buffer: Vec<RayHit>,
    capacity: usize,
}

impl SpatialHitTester {
    pub fn new(max_hits: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_hits),
            capacity: max_hits,
        }
    }

    /// Resize the hit buffer if the configured size changed
    pub fn configure(&mut self, max_hits: usize) {
        if self.capacity != max_hits {
            debug!("Resizing selection hit buffer {} -> {}", self.capacity, max_hits);
            self.buffer = Vec::with_capacity(max_hits);
            self.capacity = max_hits;
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Hits from the last query, in surface order
    pub fn hits(&self) -> &[RayHit] {
        &self.buffer
    }

    /// Resolve the selectable under `ray` according to the raycast mode.
    /// Returns None when nothing valid is hit; that is a normal outcome.
    pub fn try_get_selectable(
        &mut self,
        ray: Ray3d,
        surfaces: &[HitSurface],
        config: &HitTestConfig,
    ) -> Option<Entity> {
        self.configure(config.max_hits);

        match config.mode {
            RaycastMode::SingleHit => {
                // Closest surface wins even if it can't be selected
                let closest = surfaces
                    .iter()
                    .filter_map(|surface| intersect(ray, surface, config))
                    .min_by(|a, b| a.distance.total_cmp(&b.distance))?;
                closest.selectable.then_some(closest.entity)
            }
            RaycastMode::Nearest | RaycastMode::Furthest => {
                self.fill(ray, surfaces, config);
                let valid = self.buffer.iter().filter(|hit| hit.selectable);
                let extremal = if config.mode == RaycastMode::Nearest {
                    valid.min_by(|a, b| a.distance.total_cmp(&b.distance))
                } else {
                    valid.max_by(|a, b| a.distance.total_cmp(&b.distance))
                };
                extremal.map(|hit| hit.entity)
            }
        }
    }

    /// Every selectable under `ray`, nearest first (stable for equal distances)
    pub fn selectables_along_ray(
        &mut self,
        ray: Ray3d,
        surfaces: &[HitSurface],
        config: &HitTestConfig,
    ) -> Vec<Entity> {
        self.configure(config.max_hits);
        self.fill(ray, surfaces, config);

        let mut hits: Vec<RayHit> = self.buffer.iter().filter(|hit| hit.selectable).copied().collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.into_iter().map(|hit| hit.entity).collect()
    }

    fn fill(&mut self, ray: Ray3d, surfaces: &[HitSurface], config: &HitTestConfig) {
        self.buffer.clear();
        for surface in surfaces {
            if self.buffer.len() >= self.capacity {
                break;
            }
            if let Some(hit) = intersect(ray, surface, config) {
                self.buffer.push(hit);
            }
        }
    }
}

fn intersect(ray: Ray3d, surface: &HitSurface, config: &HitTestConfig) -> Option<RayHit> {
    if surface.category & config.category_mask == 0 {
        return None;
    }
    let distance = ray_sphere_distance(ray, surface.center, surface.radius)?;
    if distance > config.max_distance {
        return None;
    }
    Some(RayHit {
        entity: surface.entity,
        distance,
        selectable: surface.selectable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(world: &mut World, z: f32, selectable: bool) -> HitSurface {
        HitSurface {
            entity: world.spawn_empty().id(),
            center: Vec3::new(0.0, 0.0, -z),
            radius: 1.0,
            category: 1,
            selectable,
            screen_pos: None,
            depth: z,
        }
    }

    fn config(mode: RaycastMode) -> HitTestConfig {
        HitTestConfig {
            mode,
            max_hits: 8,
            max_distance: 100.0,
            category_mask: u32::MAX,
        }
    }

    fn ray() -> Ray3d {
        Ray3d::new(Vec3::ZERO, Dir3::NEG_Z)
    }

    #[test]
    fn nearest_skips_non_selectable_blockers() {
        let mut world = World::new();
        let blocker = surface(&mut world, 5.0, false);
        let near = surface(&mut world, 10.0, true);
        let far = surface(&mut world, 20.0, true);
        let surfaces = [far, blocker, near];

        let mut tester = SpatialHitTester::new(8);
        assert_eq!(tester.try_get_selectable(ray(), &surfaces, &config(RaycastMode::Nearest)), Some(near.entity));
        assert_eq!(tester.try_get_selectable(ray(), &surfaces, &config(RaycastMode::Furthest)), Some(far.entity));
    }

    #[test]
    fn single_hit_is_blocked_by_closest_surface() {
        let mut world = World::new();
        let blocker = surface(&mut world, 5.0, false);
        let unit = surface(&mut world, 10.0, true);

        let mut tester = SpatialHitTester::new(8);
        let single = config(RaycastMode::SingleHit);
        assert_eq!(tester.try_get_selectable(ray(), &[unit, blocker], &single), None);
        assert_eq!(tester.try_get_selectable(ray(), &[unit], &single), Some(unit.entity));
    }

    #[test]
    fn max_distance_and_category_limit_hits() {
        let mut world = World::new();
        let mut unit = surface(&mut world, 50.0, true);

        let mut tester = SpatialHitTester::new(8);
        let short = HitTestConfig { max_distance: 10.0, ..config(RaycastMode::Nearest) };
        assert_eq!(tester.try_get_selectable(ray(), &[unit], &short), None);

        unit.category = 0b10;
        let masked = HitTestConfig { category_mask: 0b01, ..config(RaycastMode::Nearest) };
        assert_eq!(tester.try_get_selectable(ray(), &[unit], &masked), None);
    }

    #[test]
    fn buffer_is_bounded_and_resized_on_config_change() {
        let mut world = World::new();
        let surfaces: Vec<HitSurface> = (1..=5).map(|i| surface(&mut world, i as f32 * 3.0, true)).collect();

        let mut tester = SpatialHitTester::new(8);
        let two = HitTestConfig { max_hits: 2, ..config(RaycastMode::Furthest) };
        // Only the first two surfaces fit in the buffer
        assert_eq!(tester.try_get_selectable(ray(), &surfaces, &two), Some(surfaces[1].entity));
        assert_eq!(tester.capacity(), 2);
        assert_eq!(tester.hits().len(), 2);

        tester.clear();
        assert!(tester.hits().is_empty());
    }

    #[test]
    fn selectables_along_ray_are_nearest_first() {
        let mut world = World::new();
        let a = surface(&mut world, 9.0, true);
        let b = surface(&mut world, 3.0, true);
        let blocker = surface(&mut world, 1.5, false);
        let c = surface(&mut world, 6.0, true);

        let mut tester = SpatialHitTester::new(8);
        let all = tester.selectables_along_ray(ray(), &[a, blocker, b, c], &config(RaycastMode::SingleHit));
        assert_eq!(all, vec![b.entity, c.entity, a.entity]);
    }

    #[test]
    fn miss_returns_none() {
        let mut tester = SpatialHitTester::new(4);
        assert_eq!(tester.try_get_selectable(ray(), &[], &config(RaycastMode::Nearest)), None);
    }
}
