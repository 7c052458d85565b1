//! 88-key keyboard geometry.

pub mod keyboard;
