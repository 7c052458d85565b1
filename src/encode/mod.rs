//! Encoding sinks. Sinks consume finished canvases in frame order.

/// `ffmpeg`-based MP4 output.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
