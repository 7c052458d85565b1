use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{RawSample, compose_masked, decode_still, normalize_sample};
use crate::assets::frame::Frame;
use crate::assets::media::{decode_clip_samples, probe_clip};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

const STILL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];
const CLIP_EXTENSIONS: &[&str] = &["avi", "mp4", "mov", "mkv", "webm"];

/// Where a key's animation frames come from. Chosen once, from the file extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    Still(PathBuf),
    /// Clip with its own pixel format; alpha is kept when the format has it.
    Clip(PathBuf),
    /// Opaque color clip whose alpha comes from a separate single-channel mask clip.
    MaskedClip { color: PathBuf, mask: PathBuf },
}

impl AssetSource {
    pub fn from_path(path: impl Into<PathBuf>) -> ReelResult<Self> {
        let path = path.into();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if STILL_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Still(path))
        } else if CLIP_EXTENSIONS.contains(&ext.as_str()) {
            Ok(Self::Clip(path))
        } else {
            Err(ReelError::asset(format!(
                "unsupported asset type '{}' (expected one of: {}, {})",
                path.display(),
                STILL_EXTENSIONS.join(", "),
                CLIP_EXTENSIONS.join(", ")
            )))
        }
    }

    pub fn masked(color: impl Into<PathBuf>, mask: impl Into<PathBuf>) -> ReelResult<Self> {
        let (color, mask) = (color.into(), mask.into());
        for p in [&color, &mask] {
            if !matches!(Self::from_path(p.clone())?, Self::Clip(_)) {
                return Err(ReelError::asset(format!(
                    "masked assets need clip inputs, got '{}'",
                    p.display()
                )));
            }
        }
        Ok(Self::MaskedClip { color, mask })
    }

    /// Primary path, used in log and error messages.
    pub fn path(&self) -> &Path {
        match self {
            Self::Still(p) | Self::Clip(p) => p,
            Self::MaskedClip { color, .. } => color,
        }
    }
}

/// Knobs applied uniformly while loading an asset.
#[derive(Clone, Copy, Debug)]
pub struct LoadOpts {
    pub scale: f64,
    pub fps: Fps,
    /// How long a still image stays on screen once triggered.
    pub still_duration_secs: f64,
}

impl LoadOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ReelError::validation(format!(
                "asset scale must be finite and > 0 (got {})",
                self.scale
            )));
        }
        if !self.still_duration_secs.is_finite() || self.still_duration_secs < 0.0 {
            return Err(ReelError::validation(format!(
                "still duration must be finite and >= 0 (got {})",
                self.still_duration_secs
            )));
        }
        Ok(())
    }
}

/// Ordered, same-sized animation frames for one key slot.
#[derive(Clone, Debug)]
pub enum FrameBank {
    /// One decoded image shown for `count` consecutive indices.
    Still { frame: Arc<Frame>, count: usize },
    /// One decoded frame per source sample.
    Sequence(Vec<Frame>),
}

impl FrameBank {
    #[tracing::instrument(skip(opts), fields(path = %source.path().display()))]
    pub fn load(source: &AssetSource, opts: &LoadOpts) -> ReelResult<Self> {
        opts.validate()?;
        let bank = match source {
            AssetSource::Still(path) => load_still(path, opts),
            AssetSource::Clip(path) => load_clip(path, opts),
            AssetSource::MaskedClip { color, mask } => load_masked_clip(color, mask, opts),
        }?;

        let (w, h) = bank.size();
        tracing::debug!(
            frames = bank.frame_count(),
            width = w,
            height = h,
            alpha = bank.first().is_some_and(Frame::has_alpha),
            "asset loaded"
        );
        Ok(bank)
    }

    /// Repeat one image for `count` logical frames.
    pub fn still(frame: Frame, count: usize) -> Self {
        Self::Still {
            frame: Arc::new(frame),
            count,
        }
    }

    /// Build a sequence bank; every frame must share the first frame's size.
    pub fn from_frames(frames: Vec<Frame>) -> ReelResult<Self> {
        let Some(first) = frames.first() else {
            return Err(ReelError::asset("frame sequence is empty"));
        };
        let (w, h) = (first.width(), first.height());
        if let Some((i, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.width() != w || f.height() != h)
        {
            return Err(ReelError::asset(format!(
                "frame {i} is {}x{}, expected {w}x{h}",
                f.width(),
                f.height()
            )));
        }
        Ok(Self::Sequence(frames))
    }

    /// Number of logical frames one trigger plays through.
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Still { count, .. } => *count,
            Self::Sequence(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn frame(&self, idx: usize) -> Option<&Frame> {
        match self {
            Self::Still { frame, count } => (idx < *count).then_some(frame.as_ref()),
            Self::Sequence(frames) => frames.get(idx),
        }
    }

    /// Pixel size shared by every frame.
    pub fn size(&self) -> (u32, u32) {
        match self {
            Self::Still { frame, .. } => (frame.width(), frame.height()),
            Self::Sequence(frames) => frames
                .first()
                .map_or((0, 0), |f| (f.width(), f.height())),
        }
    }

    fn first(&self) -> Option<&Frame> {
        match self {
            Self::Still { frame, .. } => Some(frame.as_ref()),
            Self::Sequence(frames) => frames.first(),
        }
    }
}

fn load_still(path: &Path, opts: &LoadOpts) -> ReelResult<FrameBank> {
    let sample = decode_still(path)?;
    let (src_w, src_h) = (sample.width, sample.height);
    let frame = normalize_sample(sample, opts.scale)?.ok_or_else(|| {
        ReelError::asset(format!(
            "'{}': scale {} collapses {src_w}x{src_h} to an empty image",
            path.display(),
            opts.scale
        ))
    })?;

    let count = opts.fps.secs_to_frames_round(opts.still_duration_secs);
    let count = usize::try_from(count)
        .map_err(|_| ReelError::validation("still duration is too long"))?;
    if count == 0 {
        tracing::warn!(
            path = %path.display(),
            duration_secs = opts.still_duration_secs,
            "still asset covers zero frames; keys using it will never render"
        );
    }
    Ok(FrameBank::still(frame, count))
}

fn load_clip(path: &Path, opts: &LoadOpts) -> ReelResult<FrameBank> {
    let info = probe_clip(path)?;
    let samples = decode_clip_samples(&info, opts.fps, info.channels())?;
    finish_sequence(path, samples, opts.scale)
}

fn load_masked_clip(color: &Path, mask: &Path, opts: &LoadOpts) -> ReelResult<FrameBank> {
    let color_info = probe_clip(color)?;
    let mask_info = probe_clip(mask)?;
    let color_samples = decode_clip_samples(&color_info, opts.fps, 3)?;
    let mask_samples = decode_clip_samples(&mask_info, opts.fps, 1)?;
    if color_samples.len() != mask_samples.len() {
        tracing::warn!(
            color_frames = color_samples.len(),
            mask_frames = mask_samples.len(),
            "color and mask clips differ in length; using the shorter"
        );
    }

    let pairs = color_samples.len().min(mask_samples.len());
    let samples: Vec<RawSample> = color_samples
        .into_iter()
        .zip(mask_samples.iter())
        .filter_map(|(c, m)| compose_masked(c, m))
        .collect();
    if samples.len() < pairs {
        tracing::warn!(
            skipped = pairs - samples.len(),
            "mask frames that do not match their color frame were skipped"
        );
    }
    finish_sequence(color, samples, opts.scale)
}

fn finish_sequence(path: &Path, samples: Vec<RawSample>, scale: f64) -> ReelResult<FrameBank> {
    let decoded = samples.len();
    let frames: Vec<Frame> = samples
        .into_par_iter()
        .map(|s| normalize_sample(s, scale))
        .collect::<ReelResult<Vec<Option<Frame>>>>()?
        .into_iter()
        .flatten()
        .collect();

    if frames.len() < decoded {
        tracing::warn!(
            path = %path.display(),
            skipped = decoded - frames.len(),
            decoded,
            "clip frames with unsupported channel layout or collapsed size were skipped"
        );
    }
    if frames.is_empty() {
        return Err(ReelError::asset(format!(
            "'{}' produced no usable frames",
            path.display()
        )));
    }
    FrameBank::from_frames(frames)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bank.rs"]
mod tests;
