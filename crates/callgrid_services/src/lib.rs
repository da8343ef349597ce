//! Callgrid Services Layer
//!
//! Settings loading and pointer input for the wall.

pub mod input;
pub mod settings;

pub use input::{HoverTracker, PointerEvent, Tooltip};
pub use settings::{RuntimeSettings, Settings, SettingsError};
