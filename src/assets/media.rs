use std::path::{Path, PathBuf};

use crate::assets::decode::RawSample;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};

/// Basic metadata about a source clip.
#[derive(Clone, Debug)]
pub struct ClipInfo {
    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// ffmpeg pixel format name of the first video stream (e.g. `yuva420p`).
    pub pix_fmt: String,
}

impl ClipInfo {
    /// Channel count a sample of this clip decodes to.
    pub fn channels(&self) -> u8 {
        channels_for_pix_fmt(&self.pix_fmt)
    }
}

/// Map an ffmpeg pixel format to the channel layout we request when decoding.
///
/// Formats with an alpha plane decode as RGBA, gray formats as a single channel, everything else
/// as RGB.
pub fn channels_for_pix_fmt(pix_fmt: &str) -> u8 {
    let f = pix_fmt.to_ascii_lowercase();
    let has_alpha = f.starts_with("yuva")
        || f.starts_with("rgba")
        || f.starts_with("bgra")
        || f.starts_with("argb")
        || f.starts_with("abgr")
        || f.starts_with("gbrap")
        || f.starts_with("ya8")
        || f.starts_with("ya16")
        || f.starts_with("rgba64")
        || f.starts_with("bgra64")
        || f == "pal8";
    if has_alpha {
        4
    } else if f.starts_with("gray") {
        1
    } else {
        3
    }
}

fn ffmpeg_pix_fmt_for_channels(channels: u8) -> ReelResult<&'static str> {
    match channels {
        1 => Ok("gray"),
        3 => Ok("rgb24"),
        4 => Ok("rgba"),
        n => Err(ReelError::asset(format!(
            "no raw pixel format for {n}-channel output"
        ))),
    }
}

/// Probe clip metadata through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_clip(source_path: &Path) -> ReelResult<ClipInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        pix_fmt: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(source_path)
        .output()
        .map_err(|e| ReelError::asset(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::asset(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::asset(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            ReelError::asset(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| ReelError::asset("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ReelError::asset("missing video height from ffprobe"))?;

    Ok(ClipInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        pix_fmt: video_stream.pix_fmt.clone().unwrap_or_default(),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
/// Probe clip metadata through `ffprobe`.
///
/// Returns an error when the `media-ffmpeg` feature is disabled.
pub fn probe_clip(_source_path: &Path) -> ReelResult<ClipInfo> {
    Err(ReelError::asset(
        "clip assets require the 'media-ffmpeg' feature",
    ))
}

/// Decode every frame of a clip, resampled to `fps`, as `channels`-channel samples.
#[cfg(feature = "media-ffmpeg")]
pub(crate) fn decode_clip_samples(
    info: &ClipInfo,
    fps: Fps,
    channels: u8,
) -> ReelResult<Vec<RawSample>> {
    let pix_fmt = ffmpeg_pix_fmt_for_channels(channels)?;
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(&info.source_path)
        .args(["-an", "-vf"])
        .arg(format!("fps={}/{}", fps.num, fps.den))
        .args(["-f", "rawvideo", "-pix_fmt", pix_fmt, "pipe:1"])
        .output()
        .map_err(|e| ReelError::asset(format!("failed to run ffmpeg for clip decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::asset(format!(
            "ffmpeg clip decode failed for '{}': {}",
            info.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    split_raw_frames(&out.stdout, info.width, info.height, channels)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub(crate) fn decode_clip_samples(
    _info: &ClipInfo,
    _fps: Fps,
    channels: u8,
) -> ReelResult<Vec<RawSample>> {
    ffmpeg_pix_fmt_for_channels(channels)?;
    Err(ReelError::asset(
        "clip assets require the 'media-ffmpeg' feature",
    ))
}

/// Cut a rawvideo byte stream into fixed-size samples. A trailing partial frame is dropped.
pub(crate) fn split_raw_frames(
    bytes: &[u8],
    width: u32,
    height: u32,
    channels: u8,
) -> ReelResult<Vec<RawSample>> {
    let frame_len = width as usize * height as usize * usize::from(channels);
    if frame_len == 0 {
        return Err(ReelError::asset(
            "decoded clip frame size is zero (invalid source dimensions)",
        ));
    }

    let chunks = bytes.chunks_exact(frame_len);
    if !chunks.remainder().is_empty() {
        tracing::warn!(
            trailing_bytes = chunks.remainder().len(),
            frame_len,
            "dropping incomplete trailing clip frame"
        );
    }

    Ok(chunks
        .map(|chunk| RawSample {
            width,
            height,
            channels,
            data: chunk.to_vec(),
        })
        .collect())
}
