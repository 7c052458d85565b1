use crate::foundation::error::{ReelError, ReelResult};

/// Zero-based index of an output video frame (one per render tick).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output frame rate as a rational `num / den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> ReelResult<Self> {
        if den == 0 {
            return Err(ReelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ReelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Integer frame rate (`den == 1`).
    pub fn whole(num: u32) -> ReelResult<Self> {
        Self::new(num, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of whole frames covering `secs`, rounded to nearest.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Opaque RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        c.to_array()
    }
}
