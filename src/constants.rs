// Selection tuning defaults. SelectorConfig::default() is built from these.

// Selector behaviour
pub const SELECTION_ENABLED: bool = true;
pub const HOVER_ENABLED: bool = true;                 // Highlight whatever the pointer rests on
pub const HIGHLIGHT_DURING_DRAG: bool = true;         // Preview the box selection while dragging
pub const BOX_SELECT_DRAG_THRESHOLD: f32 = 8.0;       // Pixels before a press turns into a box select

// Double click
pub const DOUBLE_CLICK_ENABLED: bool = true;
pub const DOUBLE_CLICK_INTERVAL: f64 = 0.3;           // Seconds between clicks on the same unit

// Selection capacity
pub const MAX_ACTIVE_SELECTIONS: usize = 50;
pub const SELECTION_CAP_ENABLED: bool = true;
pub const GROUP_SUPPORT_ENABLED: bool = true;         // Selecting a grouped unit selects its group
pub const FILTER_HIGHLIGHTS: bool = true;             // Run selection filters over highlight candidates too

// Raycast settings
pub const SELECTION_MAX_HITS: usize = 16;             // Size of the multi-hit buffer
pub const SELECTION_MAX_DISTANCE: f32 = 1000.0;       // World units along the pointer ray
pub const SELECTION_CATEGORY_ALL: u32 = u32::MAX;

// Quick-access slots (Ctrl+1..9 to save, 1..9 to recall)
pub const QUICK_SLOT_COUNT: usize = 9;

// Unit categories used by the sandbox and the built-in filters
pub const CATEGORY_INFANTRY: u32 = 1 << 0;
pub const CATEGORY_VEHICLE: u32 = 1 << 1;
pub const CATEGORY_BUILDING: u32 = 1 << 2;

// Visuals
pub const SELECTION_RING_COLOR: bevy::prelude::Color = bevy::prelude::Color::srgba(0.2, 0.9, 1.0, 0.9); // Cyan
pub const HIGHLIGHT_RING_COLOR: bevy::prelude::Color = bevy::prelude::Color::srgba(1.0, 1.0, 1.0, 0.6); // White
pub const GROUP_RING_COLOR: bevy::prelude::Color = bevy::prelude::Color::srgba(1.0, 0.9, 0.2, 0.9);     // Yellow
pub const SELECTION_RING_PADDING: f32 = 0.5;          // Ring radius beyond the unit's pick radius
