// Drag-area evaluation - which selectables a box drag encloses
use bevy::prelude::*;

use crate::math_utils::{rect_contains, screen_rect};
use crate::types::HitSurface;

/// Capability the Drag state needs: track a screen-space drag and report the enclosed
/// selectables. Swap in a different evaluator for lasso or world-space boxes.
pub trait DragAreaEvaluator: Send + Sync + 'static {
    /// Whether a drag may begin at this pointer position
    fn should_start_drag(&self, _pointer: Vec2) -> bool {
        true
    }
    fn start_drag(&mut self, start: Vec2);
    fn update_drag(&mut self, end: Vec2);
    fn stop_drag(&mut self);
    fn is_dragging(&self) -> bool;
    /// Current drag rectangle in viewport pixels, for visuals
    fn area(&self) -> Option<Rect>;
    /// Selectables currently enclosed, closest to the camera first
    fn enclosed(&self, surfaces: &[HitSurface], category_mask: u32) -> Vec<Entity>;
}

/// Axis-aligned screen rectangle; a unit is enclosed when its projected center is inside
#[derive(Clone, Debug, Default)]
pub struct ScreenRectDragArea {
    start: Option<Vec2>,
    end: Vec2,
}

impl DragAreaEvaluator for ScreenRectDragArea {
    fn start_drag(&mut self, start: Vec2) {
        self.start = Some(start);
        self.end = start;
    }

    fn update_drag(&mut self, end: Vec2) {
        self.end = end;
    }

    fn stop_drag(&mut self) {
        self.start = None;
    }

    fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    fn area(&self) -> Option<Rect> {
        self.start.map(|start| screen_rect(start, self.end))
    }

    fn enclosed(&self, surfaces: &[HitSurface], category_mask: u32) -> Vec<Entity> {
        let Some(rect) = self.area() else { return Vec::new() };

        let mut inside: Vec<&HitSurface> = surfaces
            .iter()
            .filter(|s| s.selectable && s.category & category_mask != 0)
            .filter(|s| s.screen_pos.is_some_and(|p| rect_contains(rect, p)))
            .collect();
        inside.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        inside.into_iter().map(|s| s.entity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(world: &mut World, screen: Option<Vec2>, depth: f32, selectable: bool) -> HitSurface {
        HitSurface {
            entity: world.spawn_empty().id(),
            center: Vec3::ZERO,
            radius: 1.0,
            category: 1,
            selectable,
            screen_pos: screen,
            depth,
        }
    }

    #[test]
    fn encloses_projected_centers_nearest_first() {
        let mut world = World::new();
        let far = surface(&mut world, Some(Vec2::new(20.0, 20.0)), 30.0, true);
        let near = surface(&mut world, Some(Vec2::new(40.0, 40.0)), 10.0, true);
        let outside = surface(&mut world, Some(Vec2::new(200.0, 20.0)), 5.0, true);
        let offscreen = surface(&mut world, None, 5.0, true);
        let blocker = surface(&mut world, Some(Vec2::new(30.0, 30.0)), 5.0, false);

        let mut area = ScreenRectDragArea::default();
        area.start_drag(Vec2::new(100.0, 100.0));
        area.update_drag(Vec2::new(0.0, 0.0));

        let enclosed = area.enclosed(&[far, near, outside, offscreen, blocker], u32::MAX);
        assert_eq!(enclosed, vec![near.entity, far.entity]);
    }

    #[test]
    fn category_mask_applies() {
        let mut world = World::new();
        let unit = surface(&mut world, Some(Vec2::splat(5.0)), 1.0, true);

        let mut area = ScreenRectDragArea::default();
        area.start_drag(Vec2::ZERO);
        area.update_drag(Vec2::splat(10.0));
        assert!(area.enclosed(&[unit], 0b10).is_empty());
    }

    #[test]
    fn stopped_drag_encloses_nothing() {
        let mut world = World::new();
        let unit = surface(&mut world, Some(Vec2::splat(5.0)), 1.0, true);

        let mut area = ScreenRectDragArea::default();
        area.start_drag(Vec2::ZERO);
        area.update_drag(Vec2::splat(10.0));
        area.stop_drag();

        assert!(!area.is_dragging());
        assert_eq!(area.area(), None);
        assert!(area.enclosed(&[unit], u32::MAX).is_empty());
    }
}
