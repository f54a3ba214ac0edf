// Selector state machine - Idle / Hover / Drag / Click, advanced once per frame
use bevy::prelude::*;

use crate::errors::{SelectionError, SelectionResult};
use crate::types::{HitSurface, PointerFrame};

use super::active::ActiveSelections;
use super::config::SelectorConfig;
use super::double_click::DoubleClickDetector;
use super::drag_area::{DragAreaEvaluator, ScreenRectDragArea};
use super::hit_test::SpatialHitTester;
use super::selectable::SelectableWorld;

/// Current interaction state of the selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SelectorState {
    #[default]
    Idle,
    Hover,
    Drag,
    Click,
}

/// Everything one tick reads or mutates. Built fresh each frame; there is no global
/// "focused" state, so several selectors can run side by side.
pub struct TickContext<'a> {
    pub frame: &'a PointerFrame,
    pub surfaces: &'a [HitSurface],
    pub config: &'a SelectorConfig,
    pub store: &'a mut ActiveSelections,
    pub world: &'a mut dyn SelectableWorld,
}

/// Per-drag scratch state, reset whenever the selector returns to Idle
#[derive(Clone, Copy, Debug, Default)]
struct DragTracking {
    pointer_down: bool,     // Press accepted, Drag not yet resolved
    in_progress: bool,      // Evaluator agreed to start a drag
    start: Vec2,
    end: Vec2,
    beyond_threshold: bool, // Once true, release commits a box selection instead of a click
}

/// Selector resource - owns the state machine and its leaf helpers
#[derive(Resource)]
pub struct Selector {
    state: SelectorState,
    hit_tester: SpatialHitTester,
    double_click: DoubleClickDetector,
    drag_area: Option<Box<dyn DragAreaEvaluator>>,
    drag: DragTracking,
}

impl Selector {
    /// Selector with the default screen-rectangle drag evaluator
    pub fn from_config(config: &SelectorConfig) -> Self {
        Self::without_drag_area(config).with_drag_area(ScreenRectDragArea::default())
    }

    /// Selector with no drag evaluator; entering Drag is then a fatal misconfiguration
    pub fn without_drag_area(config: &SelectorConfig) -> Self {
        Self {
            state: SelectorState::Idle,
            hit_tester: SpatialHitTester::new(config.max_hits),
            double_click: DoubleClickDetector::new(config.double_click_interval),
            drag_area: None,
            drag: DragTracking::default(),
        }
    }

    pub fn with_drag_area(mut self, evaluator: impl DragAreaEvaluator) -> Self {
        self.drag_area = Some(Box::new(evaluator));
        self
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    /// Drag rectangle once the drag has passed the click threshold
    pub fn drag_rect(&self) -> Option<Rect> {
        if self.state != SelectorState::Drag || !self.drag.beyond_threshold {
            return None;
        }
        self.drag_area.as_ref().and_then(|area| area.area())
    }

    /// Advance the machine by one frame
    pub fn tick(&mut self, ctx: &mut TickContext) -> SelectionResult<()> {
        let frame = ctx.frame;

        if frame.cancel_pressed {
            if self.state == SelectorState::Drag {
                debug!("Box selection cancelled");
                ctx.store.clear_highlights(ctx.world);
                self.transition(SelectorState::Idle, ctx)?;
            } else {
                ctx.store.deselect_all(ctx.world);
            }
        }

        // Click lasts exactly one tick
        if self.state == SelectorState::Click {
            self.transition(SelectorState::Idle, ctx)?;
        }

        // Accept a new press as the start of a potential drag
        if frame.pressed
            && ctx.config.selection_enabled
            && !frame.over_ui
            && frame.position.is_some()
            && matches!(self.state, SelectorState::Idle | SelectorState::Hover)
        {
            self.drag.pointer_down = true;
        }

        if matches!(self.state, SelectorState::Idle | SelectorState::Hover) {
            let next = if self.drag.pointer_down {
                SelectorState::Drag
            } else if ctx.config.selection_enabled && ctx.config.hover_enabled {
                SelectorState::Hover
            } else {
                SelectorState::Idle
            };
            if next != self.state {
                self.transition(next, ctx)?;
            }
        }

        match self.state {
            SelectorState::Idle | SelectorState::Click => Ok(()),
            SelectorState::Hover => {
                self.hover_tick(ctx);
                Ok(())
            }
            SelectorState::Drag => self.drag_tick(ctx),
        }
    }

    fn transition(&mut self, next: SelectorState, ctx: &mut TickContext) -> SelectionResult<()> {
        debug!("Selector {:?} -> {:?}", self.state, next);
        self.exit_state(next, ctx);
        self.state = next;
        match next {
            SelectorState::Idle => {
                self.enter_idle();
                Ok(())
            }
            SelectorState::Hover => {
                self.hit_tester.configure(ctx.config.max_hits);
                self.hit_tester.clear();
                Ok(())
            }
            SelectorState::Drag => self.enter_drag(ctx),
            SelectorState::Click => {
                self.enter_click(ctx);
                Ok(())
            }
        }
    }

    fn exit_state(&mut self, next: SelectorState, ctx: &mut TickContext) {
        if self.state == SelectorState::Hover {
            self.hit_tester.clear();
            // Drag takes over the hovered highlight and releases it itself
            if next != SelectorState::Drag {
                ctx.store.remove_hovering_unit(ctx.world);
            }
        }
    }

    // ---- Idle ----

    fn enter_idle(&mut self) {
        if self.drag.in_progress {
            if let Some(area) = self.drag_area.as_mut() {
                area.stop_drag();
            }
        }
        self.drag = DragTracking::default();
    }

    // ---- Hover ----

    fn hover_tick(&mut self, ctx: &mut TickContext) {
        let frame = ctx.frame;
        if frame.over_ui {
            ctx.store.remove_hovering_unit(ctx.world);
            return;
        }

        let hit = frame
            .ray
            .and_then(|ray| self.hit_tester.try_get_selectable(ray, ctx.surfaces, &ctx.config.hit_test()));
        match hit {
            Some(unit) => ctx.store.set_hovering_unit(unit, ctx.world),
            None => ctx.store.remove_hovering_unit(ctx.world),
        }
    }

    // ---- Drag ----

    fn enter_drag(&mut self, ctx: &mut TickContext) -> SelectionResult<()> {
        let Some(area) = self.drag_area.as_mut() else {
            error!("Selector has no drag-area evaluator configured");
            self.state = SelectorState::Idle;
            self.drag = DragTracking::default();
            return Err(SelectionError::MissingDragArea);
        };

        let Some(pointer) = ctx.frame.position else { return Ok(()) };
        if area.should_start_drag(pointer) {
            area.start_drag(pointer);
            self.drag.in_progress = true;
            self.drag.start = pointer;
            self.drag.end = pointer;
        }
        Ok(())
    }

    fn drag_tick(&mut self, ctx: &mut TickContext) -> SelectionResult<()> {
        let frame = ctx.frame;
        let config = ctx.config;
        let Some(area) = self.drag_area.as_mut() else {
            return Err(SelectionError::MissingDragArea);
        };

        if self.drag.in_progress {
            if let Some(pointer) = frame.position {
                self.drag.end = pointer;
                area.update_drag(pointer);
            }
            if !self.drag.beyond_threshold && self.drag.start.distance(self.drag.end) >= config.drag_threshold {
                self.drag.beyond_threshold = true;
                debug!("Box selection started");
            }
        }

        if self.drag.beyond_threshold && config.highlight_during_drag {
            let enclosed = area.enclosed(ctx.surfaces, config.category_mask);
            ctx.store.highlight(&enclosed, frame.modify_held, ctx.world);
        }
        if self.drag.beyond_threshold {
            // Hover released here so a unit the box also covers keeps its highlight
            ctx.store.remove_hovering_unit(ctx.world);
        }

        if !frame.released {
            return Ok(());
        }

        // Drag finished
        self.drag.pointer_down = false;
        if !self.drag.beyond_threshold {
            return self.transition(SelectorState::Click, ctx);
        }

        let enclosed = area.enclosed(ctx.surfaces, config.category_mask);
        if frame.modify_held {
            ctx.store.add_selection(&enclosed, ctx.world);
            ctx.store.clear_highlights(ctx.world);
        } else {
            ctx.store.replace_selection(&enclosed, true, ctx.world);
        }
        self.transition(SelectorState::Idle, ctx)
    }

    // ---- Click ----

    fn enter_click(&mut self, ctx: &mut TickContext) {
        if self.drag.in_progress {
            if let Some(area) = self.drag_area.as_mut() {
                area.stop_drag();
            }
            self.drag.in_progress = false;
        }

        let frame = ctx.frame;
        if frame.over_ui || !ctx.config.selection_enabled {
            return;
        }

        let hit_config = ctx.config.hit_test();
        let Some(ray) = frame.ray else { return };
        let Some(unit) = self.hit_tester.try_get_selectable(ray, ctx.surfaces, &hit_config) else {
            // A miss breaks any double-click sequence
            ctx.store.clear_clicked_unit();
            self.double_click.reset();
            if !frame.modify_held {
                ctx.store.deselect_all(ctx.world);
            }
            return;
        };

        let same_target = ctx.store.clicked_unit() == Some(unit);
        let is_double = if same_target {
            self.double_click.handle_click(frame.time)
        } else {
            self.double_click.restart(frame.time);
            false
        };

        if is_double && ctx.config.double_click_enabled {
            // Everything stacked under the cursor, nearest first; the sorter refines it
            let under_cursor = self.hit_tester.selectables_along_ray(ray, ctx.surfaces, &hit_config);
            debug!("Double click on {:?}: {} unit(s) under cursor", unit, under_cursor.len());
            if frame.modify_held {
                ctx.store.add_selection(&under_cursor, ctx.world);
            } else {
                ctx.store.replace_selection(&under_cursor, true, ctx.world);
            }
            ctx.store.clear_clicked_unit();
        } else {
            if frame.modify_held {
                ctx.store.toggle_single_selection(unit, ctx.world);
            } else {
                ctx.store.replace_selection(&[unit], true, ctx.world);
            }
            ctx.store.set_clicked_unit(unit);
        }
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default())
    }
}
