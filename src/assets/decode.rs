use std::path::Path;

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::assets::frame::Frame;
use crate::foundation::error::{ReelError, ReelResult};

/// Interpolation used for every asset rescale (stills and clip frames alike).
pub(crate) const RESCALE_FILTER: FilterType = FilterType::Triangle;

/// A decoded sample before normalization: straight alpha, any channel count.
#[derive(Clone, Debug)]
pub(crate) struct RawSample {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) channels: u8,
    pub(crate) data: Vec<u8>,
}

/// Decode a still image, keeping the alpha channel only when the source carries one.
pub(crate) fn decode_still(path: &Path) -> ReelResult<RawSample> {
    let img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    let (width, height) = (img.width(), img.height());
    if img.color().has_alpha() {
        Ok(RawSample {
            width,
            height,
            channels: 4,
            data: img.to_rgba8().into_raw(),
        })
    } else {
        Ok(RawSample {
            width,
            height,
            channels: 3,
            data: img.to_rgb8().into_raw(),
        })
    }
}

/// `floor(scale * size)` per axis, or `None` when either side collapses to zero.
pub(crate) fn scaled_dims(width: u32, height: u32, scale: f64) -> Option<(u32, u32)> {
    let w = (f64::from(width) * scale).floor();
    let h = (f64::from(height) * scale).floor();
    if w < 1.0 || h < 1.0 || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
        return None;
    }
    Some((w as u32, h as u32))
}

/// Rescale and convert one sample into a [`Frame`].
///
/// Returns `Ok(None)` for samples that must be skipped: unsupported channel counts and scales that
/// collapse the frame to zero pixels.
pub(crate) fn normalize_sample(sample: RawSample, scale: f64) -> ReelResult<Option<Frame>> {
    let RawSample {
        width,
        height,
        channels,
        data,
    } = sample;

    if channels != 3 && channels != 4 {
        return Ok(None);
    }
    let Some((new_w, new_h)) = scaled_dims(width, height, scale) else {
        return Ok(None);
    };
    let unchanged = new_w == width && new_h == height;

    if channels == 3 {
        let buf = image::RgbImage::from_raw(width, height, data)
            .ok_or_else(|| ReelError::asset("rgb sample buffer is too small"))?;
        let buf = if unchanged {
            buf
        } else {
            image::imageops::resize(&buf, new_w, new_h, RESCALE_FILTER)
        };
        Frame::opaque(new_w, new_h, buf.into_raw()).map(Some)
    } else {
        let buf = image::RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| ReelError::asset("rgba sample buffer is too small"))?;
        let buf = if unchanged {
            buf
        } else {
            image::imageops::resize(&buf, new_w, new_h, RESCALE_FILTER)
        };
        Frame::from_straight_rgba(new_w, new_h, buf.into_raw()).map(Some)
    }
}

/// Stack an RGB color sample with a single-channel mask sample into straight RGBA.
///
/// Returns `None` when the pair cannot be combined (wrong channel counts or mismatched sizes).
pub(crate) fn compose_masked(color: RawSample, mask: &RawSample) -> Option<RawSample> {
    if color.channels != 3 || mask.channels != 1 {
        return None;
    }
    if color.width != mask.width || color.height != mask.height {
        return None;
    }

    let px_count = color.width as usize * color.height as usize;
    if color.data.len() != px_count * 3 || mask.data.len() != px_count {
        return None;
    }

    let mut rgba = Vec::with_capacity(px_count * 4);
    for (rgb, &a) in color.data.chunks_exact(3).zip(mask.data.iter()) {
        rgba.extend_from_slice(rgb);
        rgba.push(a);
    }

    Some(RawSample {
        width: color.width,
        height: color.height,
        channels: 4,
        data: rgba,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
