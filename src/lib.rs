// RTS unit selection for Bevy: hover, click, double click, box select, quick-access slots
pub mod constants;
pub mod errors;
pub mod math_utils;
pub mod selection;
pub mod types;

pub mod prelude {
    pub use crate::errors::{SelectionError, SelectionResult};
    pub use crate::selection::*;
    pub use crate::types::*;
}
