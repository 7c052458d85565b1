//! CPU compositing of keyboard frames onto an RGB canvas.

/// Optional rectangle keyboard drawn beneath the animations.
pub mod backdrop;
/// Output frame buffer.
pub mod canvas;
pub(crate) mod composite;
/// Per-tick frame assembly.
pub mod compositor;
/// Progress text overlay.
pub mod overlay;
