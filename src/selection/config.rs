// Selector configuration and input bindings
use bevy::prelude::*;

use crate::constants::*;
use crate::errors::{SelectionError, SelectionResult};

/// How the hit tester resolves several surfaces under the cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RaycastMode {
    /// Closest surface only; a non-selectable surface in front blocks the pick
    SingleHit,
    /// Closest selectable among all hits
    #[default]
    Nearest,
    /// Furthest selectable among all hits
    Furthest,
}

/// Hit-test slice of the configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitTestConfig {
    pub mode: RaycastMode,
    pub max_hits: usize,
    pub max_distance: f32,
    pub category_mask: u32,
}

/// Selector configuration resource. Loaded once at startup; the selector reads it
/// every tick but nothing changes it mid-operation.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SelectorConfig {
    pub selection_enabled: bool,
    pub hover_enabled: bool,
    pub highlight_during_drag: bool,
    pub double_click_enabled: bool,
    pub double_click_interval: f64, // Seconds
    pub max_active_selections: usize,
    pub cap_enabled: bool,
    pub drag_threshold: f32,        // Pixels
    pub raycast_mode: RaycastMode,
    pub max_hits: usize,
    pub max_distance: f32,
    pub category_mask: u32,
    pub group_support: bool,
    pub filter_highlights: bool,
    pub quick_slot_count: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            selection_enabled: SELECTION_ENABLED,
            hover_enabled: HOVER_ENABLED,
            highlight_during_drag: HIGHLIGHT_DURING_DRAG,
            double_click_enabled: DOUBLE_CLICK_ENABLED,
            double_click_interval: DOUBLE_CLICK_INTERVAL,
            max_active_selections: MAX_ACTIVE_SELECTIONS,
            cap_enabled: SELECTION_CAP_ENABLED,
            drag_threshold: BOX_SELECT_DRAG_THRESHOLD,
            raycast_mode: RaycastMode::default(),
            max_hits: SELECTION_MAX_HITS,
            max_distance: SELECTION_MAX_DISTANCE,
            category_mask: SELECTION_CATEGORY_ALL,
            group_support: GROUP_SUPPORT_ENABLED,
            filter_highlights: FILTER_HIGHLIGHTS,
            quick_slot_count: QUICK_SLOT_COUNT,
        }
    }
}

impl SelectorConfig {
    pub fn hit_test(&self) -> HitTestConfig {
        HitTestConfig {
            mode: self.raycast_mode,
            max_hits: self.max_hits,
            max_distance: self.max_distance,
            category_mask: self.category_mask,
        }
    }

    /// Reject values the selector cannot run with
    pub fn validate(&self) -> SelectionResult<()> {
        if self.max_hits == 0 {
            return Err(SelectionError::InvalidConfig("max_hits must be at least 1".into()));
        }
        if !(self.max_distance > 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "max_distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(self.drag_threshold >= 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "drag_threshold must not be negative, got {}",
                self.drag_threshold
            )));
        }
        if !(self.double_click_interval >= 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "double_click_interval must not be negative, got {}",
                self.double_click_interval
            )));
        }
        Ok(())
    }
}

/// Which physical inputs drive the named selection actions
#[derive(Resource, Clone, Debug)]
pub struct SelectionBindings {
    pub primary: MouseButton,
    pub modify: Vec<KeyCode>,
    pub cancel: KeyCode,
    pub quick_save: Vec<KeyCode>,
    pub quick_slots: Vec<KeyCode>, // Index in this list is the slot index
}

impl Default for SelectionBindings {
    fn default() -> Self {
        Self {
            primary: MouseButton::Left,
            modify: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            cancel: KeyCode::Escape,
            quick_save: vec![KeyCode::ControlLeft, KeyCode::ControlRight],
            quick_slots: vec![
                KeyCode::Digit1,
                KeyCode::Digit2,
                KeyCode::Digit3,
                KeyCode::Digit4,
                KeyCode::Digit5,
                KeyCode::Digit6,
                KeyCode::Digit7,
                KeyCode::Digit8,
                KeyCode::Digit9,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SelectorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_max_hits_is_rejected() {
        let config = SelectorConfig { max_hits: 0, ..default() };
        assert!(matches!(config.validate(), Err(SelectionError::InvalidConfig(_))));
    }

    #[test]
    fn nan_distance_is_rejected() {
        let config = SelectorConfig { max_distance: f32::NAN, ..default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn bindings_cover_every_quick_slot() {
        assert_eq!(SelectionBindings::default().quick_slots.len(), QUICK_SLOT_COUNT);
    }
}
