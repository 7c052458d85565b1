//! pianoreel renders a MIDI score as a keyboard animation video.
//!
//! The pipeline is built once per run and then driven at a fixed timestep:
//!
//! - Build a [`Timeline`] from a Standard MIDI File under a fixed [`Tempo`]
//! - Load [`KeyAssets`] (still images or clips) into frame banks
//! - Create a [`RenderSession`] and stream every tick into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

/// Per-key animation state machine.
pub mod animation;
/// Asset decoding into frame banks.
pub mod assets;
/// Encoding sinks.
pub mod encode;
/// Keyboard geometry.
pub mod layout;
/// Canvas compositing.
pub mod render;
/// MIDI score to timeline conversion.
pub mod score;
/// Configuration and the render loop.
pub mod session;

pub use crate::foundation::core::{CanvasSize, Fps, FrameIndex, Rgb8};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::key_state::{KeyAnimationState, Simulation};
pub use crate::assets::bank::{AssetSource, FrameBank, LoadOpts};
pub use crate::assets::frame::{Frame, Pixels};
pub use crate::assets::key_assets::{KeyAssetSources, KeyAssets};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::keyboard::{KeyPosition, KeyboardLayout, LayoutConfig, is_black_key};
pub use crate::render::canvas::Canvas;
pub use crate::render::compositor::{Compositor, CompositorOpts, LayerOffset, Progress};
pub use crate::render::overlay::Overlay;
pub use crate::score::timeline::{NoteEvent, NoteKind, Tempo, Timeline, TimelineMode};
pub use crate::session::config::RenderConfig;
pub use crate::session::render_session::{CancelToken, RenderSession, RenderStats};
