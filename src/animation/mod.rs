//! Per-key one-shot animation state driven by the note timeline.

pub mod key_state;
