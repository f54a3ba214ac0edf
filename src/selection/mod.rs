// Selection module - RTS-style unit selection driven by a per-frame state machine
//
// Submodules:
// - config: SelectorConfig resource, raycast modes and input bindings
// - selectable: SelectableWorld capability and its ECS implementation
// - pipeline: Selection filters and sorters
// - active: ActiveSelections store (selected / highlighted / hovered)
// - hit_test: Ray picking with a bounded hit buffer
// - double_click: Double-click timing
// - drag_area: Box-select evaluators
// - quick_access: Saved selections on number keys
// - state: Selector state machine (Idle / Hover / Drag / Click)
// - input: PointerFrame and SelectionCandidates gathering
// - systems: Bevy systems wrapping the state machine and store
// - visuals: Rings and the box-select rectangle

pub mod active;
pub mod config;
pub mod double_click;
pub mod drag_area;
pub mod hit_test;
mod input;
pub mod pipeline;
pub mod quick_access;
pub mod selectable;
pub mod state;
mod systems;
mod visuals;

use bevy::prelude::*;

use crate::types::*;

// Re-export main types for external use
pub use active::{ActiveSelections, SelectionNotification};
pub use config::{HitTestConfig, RaycastMode, SelectionBindings, SelectorConfig};
pub use double_click::DoubleClickDetector;
pub use drag_area::{DragAreaEvaluator, ScreenRectDragArea};
pub use hit_test::{RayHit, SpatialHitTester};
pub use pipeline::{
    CategoryFilter, DistanceSorter, PredicateFilter, PreferCategoryFilter, SelectionFilter, SelectionIntent,
    SelectionPipeline, SelectionSorter,
};
pub use quick_access::QuickAccessSlots;
pub use selectable::{SelectableUnits, SelectableWorld};
pub use state::{Selector, SelectorState, TickContext};

// Re-export systems so apps can order their own systems around them
pub use input::{gather_pointer_input, gather_selection_candidates};
pub use systems::{publish_selection_events, quick_access_system, selection_cleanup_system, selector_tick_system};
pub use visuals::{box_selection_visual_system, selection_visual_system, BoxSelectionVisual};

/// Ordering of the selection systems inside `Update`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionSet {
    /// Snapshot input and pickable surfaces
    Gather,
    /// Cleanup, selector tick, quick slots
    Tick,
    /// Store notifications become events
    Publish,
    /// Rings and drag rectangle
    Visuals,
}

/// Core selection plugin: resources, events and the selector systems.
/// Reads `PointerFrame` and `SelectionCandidates`; add `SelectionInputPlugin` to fill
/// them from a window and camera, or write them yourself.
#[derive(Default)]
pub struct SelectionPlugin {
    pub config: SelectorConfig,
}

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        let config = match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(err) => {
                error!("{}; using default selector configuration", err);
                SelectorConfig::default()
            }
        };

        app.insert_resource(ActiveSelections::from_config(&config))
            .insert_resource(Selector::from_config(&config))
            .insert_resource(QuickAccessSlots::new(config.quick_slot_count))
            .insert_resource(config)
            .init_resource::<PointerFrame>()
            .init_resource::<SelectionCandidates>()
            .init_resource::<SelectionBindings>()
            .add_event::<SelectionChanged>()
            .add_event::<HighlightChanged>()
            .add_event::<HoverChanged>()
            .configure_sets(
                Update,
                (
                    SelectionSet::Gather,
                    SelectionSet::Tick,
                    SelectionSet::Publish,
                    SelectionSet::Visuals,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (selection_cleanup_system, selector_tick_system, quick_access_system)
                    .chain()
                    .in_set(SelectionSet::Tick),
            )
            .add_systems(Update, publish_selection_events.in_set(SelectionSet::Publish));
    }
}

/// Fills `PointerFrame` and `SelectionCandidates` from the primary window and the
/// `SelectionCamera`
pub struct SelectionInputPlugin;

impl Plugin for SelectionInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (gather_pointer_input, gather_selection_candidates)
                .chain()
                .in_set(SelectionSet::Gather),
        );
    }
}

/// Gizmo rings and the box-select rectangle
pub struct SelectionVisualsPlugin;

impl Plugin for SelectionVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (selection_visual_system, box_selection_visual_system).in_set(SelectionSet::Visuals),
        );
    }
}
