//! Error handling
//!
//! Misses (nothing under the cursor, an empty drag box, an unused quick slot) are not
//! errors and never show up here. These are programmer errors in how the selector was
//! wired or configured, and they abort the tick that hit them.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// The Drag state was entered without a drag-area evaluator installed
    #[error("selector entered Drag without a drag-area evaluator; install one with Selector::with_drag_area")]
    MissingDragArea,

    #[error("quick-access slot {index} is out of range (slot count: {slot_count})")]
    InvalidQuickSlot { index: usize, slot_count: usize },

    #[error("invalid selector configuration: {0}")]
    InvalidConfig(String),
}

pub type SelectionResult<T> = Result<T, SelectionError>;
