use std::path::Path;

use anyhow::Context as _;

use crate::assets::bank::LoadOpts;
use crate::foundation::core::{CanvasSize, Fps, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::layout::keyboard::LayoutConfig;
use crate::render::compositor::{CompositorOpts, LayerOffset};
use crate::score::timeline::{Tempo, TimelineMode};

/// Output video parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// `ffmpeg` video encoder name.
    pub codec: String,
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: Fps { num: 30, den: 1 },
            codec: "libx264".to_owned(),
            overwrite: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TempoConfig {
    /// Fixed tempo applied to the whole score; tempo changes in the file are ignored.
    pub bpm: f64,
    pub mode: TimelineMode,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            mode: TimelineMode::OneShot,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// Uniform rescale applied to every asset frame.
    pub scale: f64,
    pub still_duration_secs: f64,
    pub white_offset: LayerOffset,
    pub black_offset: LayerOffset,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            still_duration_secs: 1.0,
            white_offset: LayerOffset::default(),
            black_offset: LayerOffset::new(0, -20),
        }
    }
}

/// Everything a render needs apart from the input files.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub output: OutputConfig,
    pub tempo: TempoConfig,
    pub layout: LayoutConfig,
    pub assets: AssetConfig,
    pub background_rgb: Rgb8,
    /// Extra time rendered after the last event so animations can finish.
    pub trailing_secs: f64,
    pub overlay: bool,
    pub backdrop: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            tempo: TempoConfig::default(),
            layout: LayoutConfig::default(),
            assets: AssetConfig::default(),
            background_rgb: Rgb8::new(20, 20, 30),
            trailing_secs: 3.0,
            overlay: true,
            backdrop: false,
        }
    }
}

impl RenderConfig {
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
            .map_err(|e| ReelError::validation(format!("'{}': {e}", path.display())))
    }

    /// Parse and validate JSON. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| ReelError::validation(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ReelResult<()> {
        let out = &self.output;
        if out.width == 0 || out.height == 0 {
            return Err(ReelError::validation("output width/height must be non-zero"));
        }
        if !out.width.is_multiple_of(2) || !out.height.is_multiple_of(2) {
            return Err(ReelError::validation(format!(
                "output size {}x{} must be even",
                out.width, out.height
            )));
        }
        Fps::new(out.fps.num, out.fps.den)?;
        if out.codec.trim().is_empty() {
            return Err(ReelError::validation("codec must not be empty"));
        }

        Tempo::new(self.tempo.bpm)?;
        self.layout.validate()?;
        self.load_opts().validate()?;

        if !self.trailing_secs.is_finite() || self.trailing_secs < 0.0 {
            return Err(ReelError::validation(format!(
                "trailing_secs must be finite and >= 0 (got {})",
                self.trailing_secs
            )));
        }
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.output.width,
            height: self.output.height,
        }
    }

    pub fn tempo(&self) -> ReelResult<Tempo> {
        Tempo::new(self.tempo.bpm)
    }

    pub fn load_opts(&self) -> LoadOpts {
        LoadOpts {
            scale: self.assets.scale,
            fps: self.output.fps,
            still_duration_secs: self.assets.still_duration_secs,
        }
    }

    pub fn compositor_opts(&self) -> CompositorOpts {
        CompositorOpts {
            background: self.background_rgb,
            white_offset: self.assets.white_offset,
            black_offset: self.assets.black_offset,
            overlay: self.overlay,
            backdrop: self.backdrop,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
