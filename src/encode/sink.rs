use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::canvas::Canvas;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Consumer of finished canvases.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex`, between one
/// `begin` and one `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, canvas: &Canvas) -> ReelResult<()>;
    fn end(&mut self) -> ReelResult<()>;
}

/// Keeps every pushed frame as raw RGB24 bytes.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Vec<u8>)>,
    ended: bool,
}

impl InMemorySink {
    /// Create an empty sink that keeps every pushed frame.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames in push order with their indices.
    pub fn frames(&self) -> &[(FrameIndex, Vec<u8>)] {
        &self.frames
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// RGB of one pixel of a captured frame.
    pub fn pixel(&self, frame: usize, x: u32, y: u32) -> Option<[u8; 3]> {
        let cfg = self.cfg?;
        if x >= cfg.width || y >= cfg.height {
            return None;
        }
        let (_, data) = self.frames.get(frame)?;
        let i = (y as usize * cfg.width as usize + x as usize) * 3;
        Some([data[i], data[i + 1], data[i + 2]])
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, canvas: &Canvas) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(ReelError::encode("in-memory sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(ReelError::encode(format!(
                "out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, canvas.data().to_vec()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }
}
