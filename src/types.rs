use bevy::prelude::*;

use crate::constants::CATEGORY_INFANTRY;

/// A world object that can take part in selection.
///
/// The flags are written by `ActiveSelections` through `SelectableWorld`; gameplay code
/// reads them but never writes them directly. Removing the component (or despawning the
/// entity) deregisters the unit and triggers cleanup of every reference to it.
#[derive(Component, Clone, Debug)]
pub struct Selectable {
    pub selected: bool,
    pub highlighted: bool,
    pub radius: f32,           // Pick sphere radius around the unit's origin
    pub category: u32,         // Bitmask matched against SelectorConfig::category_mask
    pub group: Option<Entity>, // Owning group entity, if any
}

impl Selectable {
    pub fn new(radius: f32) -> Self {
        Self {
            selected: false,
            highlighted: false,
            radius,
            category: CATEGORY_INFANTRY,
            group: None,
        }
    }

    pub fn with_category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    pub fn in_group(mut self, group: Entity) -> Self {
        self.group = Some(group);
        self
    }
}

impl Default for Selectable {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Group entity - selecting any member selects the group instead.
/// The group entity itself carries a `Selectable` so it can sit in the selection lists.
#[derive(Component, Clone, Debug, Default)]
pub struct SelectableGroup {
    pub members: Vec<Entity>,
}

/// Pick surface that is hit by pointer rays but cannot be selected (buildings, props).
/// In single-hit mode it hides selectables behind it.
#[derive(Component, Clone, Copy, Debug)]
pub struct SelectionBlocker {
    pub radius: f32,
    pub category: u32,
}

/// Marker for the camera that pointer rays and box selection are projected through
#[derive(Component)]
pub struct SelectionCamera;

/// One pickable thing in the world, flattened for the hit tester and drag evaluator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitSurface {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub category: u32,
    pub selectable: bool,
    pub screen_pos: Option<Vec2>, // Viewport position of the center, if on screen
    pub depth: f32,               // Distance from the selection camera
}

/// Per-frame snapshot of everything the selector reads from the input devices.
#[derive(Resource, Clone, Debug, Default)]
pub struct PointerFrame {
    pub position: Option<Vec2>,         // Cursor position in viewport pixels
    pub ray: Option<Ray3d>,             // World ray through the cursor
    pub pressed: bool,                  // Primary button went down this frame
    pub released: bool,                 // Primary button went up this frame
    pub modify_held: bool,              // "Modify selection" key (Shift)
    pub cancel_pressed: bool,           // "Cancel selection" key (Escape)
    pub quick_save_held: bool,          // "Quick save" key (Ctrl)
    pub quick_slot_pressed: Option<usize>,
    pub over_ui: bool,                  // A UI element sits under the cursor
    pub time: f64,                      // Seconds since startup
}

/// Pickable surfaces gathered this frame
#[derive(Resource, Clone, Debug, Default)]
pub struct SelectionCandidates {
    pub surfaces: Vec<HitSurface>,
}

// ============================================================================
// Events - published once per frame after the selector tick
// ============================================================================

/// The selected set changed; carries the full new selection in order
#[derive(Event, Clone, Debug, PartialEq)]
pub struct SelectionChanged {
    pub selected: Vec<Entity>,
}

/// The highlighted set changed
#[derive(Event, Clone, Debug, PartialEq)]
pub struct HighlightChanged {
    pub highlighted: Vec<Entity>,
}

/// The unit under the pointer changed
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct HoverChanged {
    pub unit: Option<Entity>,
}
