use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::animation::key_state::Simulation;
use crate::assets::key_assets::KeyAssets;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{CanvasSize, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::keyboard::KeyboardLayout;
use crate::render::canvas::Canvas;
use crate::render::compositor::{Compositor, Progress};
use crate::render::overlay::Overlay;
use crate::score::timeline::Timeline;
use crate::session::config::RenderConfig;

/// Cooperative stop flag checked once per tick.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Ticks the full render would produce.
    pub frames_total: u64,
    /// Frames accepted by the sink.
    pub frames_written: u64,
    pub cancelled: bool,
    /// Timeline events fed to the key state machine.
    pub events_applied: u64,
}

/// One render run: the timeline, the loaded assets and the fixed-timestep loop around them.
pub struct RenderSession {
    timeline: Timeline,
    compositor: Compositor,
    canvas: CanvasSize,
    fps: Fps,
    trailing_secs: f64,
}

impl RenderSession {
    /// Validate `cfg` and lay out the keyboard for its canvas.
    pub fn new(cfg: &RenderConfig, timeline: Timeline, assets: KeyAssets) -> ReelResult<Self> {
        cfg.validate()?;
        let canvas = cfg.canvas();
        let layout = KeyboardLayout::new(&cfg.layout, canvas)?;
        let compositor = Compositor::new(layout, assets, cfg.compositor_opts());
        Ok(Self {
            timeline,
            compositor,
            canvas,
            fps: cfg.output.fps,
            trailing_secs: cfg.trailing_secs,
        })
    }

    /// Replace the overlay renderer (`None` turns it off).
    pub fn with_overlay(mut self, overlay: Option<Overlay>) -> Self {
        self.compositor = self.compositor.with_overlay(overlay);
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// `round((total_duration + trailing) * fps)`, at least one.
    pub fn total_frames(&self) -> u64 {
        self.fps
            .secs_to_frames_round(self.timeline.total_duration() + self.trailing_secs)
            .max(1)
    }

    /// Simulation time of tick `i`: `(i + 1) / fps`.
    pub fn tick_time(&self, tick: u64) -> f64 {
        self.fps.frames_to_secs(tick + 1)
    }

    /// Run every tick into `sink`.
    ///
    /// The sink is ended even when a tick fails or the run is cancelled; the first error wins.
    #[tracing::instrument(skip_all, fields(frames = self.total_frames()))]
    pub fn render(
        &mut self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> ReelResult<RenderStats> {
        let mut stats = RenderStats {
            frames_total: self.total_frames(),
            ..RenderStats::default()
        };
        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
        })?;

        let run = self.run_ticks(sink, cancel, &mut stats);
        let end = sink.end();
        match (run, end) {
            (Err(err), end) => {
                if let Err(end_err) = end {
                    tracing::warn!(error = %end_err, "sink finalization failed after render error");
                }
                Err(err)
            }
            (Ok(()), Err(err)) => Err(err),
            (Ok(()), Ok(())) => {
                tracing::info!(
                    frames_written = stats.frames_written,
                    frames_total = stats.frames_total,
                    cancelled = stats.cancelled,
                    events_applied = stats.events_applied,
                    "render finished"
                );
                Ok(stats)
            }
        }
    }

    /// Render a single tick, replaying the simulation from the start.
    pub fn render_frame(&mut self, tick: u64) -> ReelResult<Canvas> {
        let total = self.total_frames();
        if tick >= total {
            return Err(ReelError::validation(format!(
                "tick {tick} is past the last frame ({})",
                total - 1
            )));
        }

        let mut canvas = Canvas::new(self.canvas)?;
        let mut sim = Simulation::new(&self.timeline);
        let assets = self.compositor.assets().clone();
        let frame_count = |note: u8| assets.frame_count(note);
        for i in 0..tick {
            sim.apply_due(self.fps.frames_to_secs(i + 1), frame_count);
            sim.advance(frame_count);
        }
        let t = self.tick_time(tick);
        sim.apply_due(t, frame_count);
        let progress = self.progress(t);
        self.compositor.draw(&mut canvas, &sim, progress);
        Ok(canvas)
    }

    fn progress(&self, elapsed_secs: f64) -> Progress {
        Progress {
            elapsed_secs,
            total_secs: self.timeline.total_duration(),
            bpm: self.timeline.tempo().bpm(),
        }
    }

    fn run_ticks(
        &mut self,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
        stats: &mut RenderStats,
    ) -> ReelResult<()> {
        let mut canvas = Canvas::new(self.canvas)?;
        let mut sim = Simulation::new(&self.timeline);
        let assets = self.compositor.assets().clone();
        let frame_count = |note: u8| assets.frame_count(note);
        let progress_every = (self.fps.as_f64().round() as u64).max(1) * 10;

        for tick in 0..stats.frames_total {
            if cancel.is_cancelled() {
                tracing::warn!(tick, "render cancelled");
                stats.cancelled = true;
                break;
            }

            let t = self.fps.frames_to_secs(tick + 1);
            stats.events_applied += sim.apply_due(t, frame_count) as u64;
            let progress = self.progress(t);
            self.compositor.draw(&mut canvas, &sim, progress);
            sink.push_frame(FrameIndex(tick), &canvas)?;
            stats.frames_written += 1;
            sim.advance(frame_count);

            if (tick + 1) % progress_every == 0 {
                tracing::debug!(
                    tick = tick + 1,
                    of = stats.frames_total,
                    playing = sim.playing_notes().count(),
                    "render progress"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
