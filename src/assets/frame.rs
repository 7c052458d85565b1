use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Pixel storage of a decoded asset frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pixels {
    /// Opaque, tightly packed RGB8. Overwrites the destination when drawn.
    Rgb8(Vec<u8>),
    /// Premultiplied RGBA8. Blended over the destination when drawn.
    Rgba8Premul(Vec<u8>),
}

impl Pixels {
    pub fn channels(&self) -> usize {
        match self {
            Self::Rgb8(_) => 3,
            Self::Rgba8Premul(_) => 4,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Rgb8(b) | Self::Rgba8Premul(b) => b,
        }
    }
}

/// One fixed-size asset frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Pixels,
}

impl Frame {
    pub fn opaque(width: u32, height: u32, rgb8: Vec<u8>) -> ReelResult<Self> {
        Self::checked(width, height, Pixels::Rgb8(rgb8))
    }

    /// Build a frame from straight-alpha RGBA8, premultiplying on the way in.
    pub fn from_straight_rgba(width: u32, height: u32, mut rgba8: Vec<u8>) -> ReelResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::checked(width, height, Pixels::Rgba8Premul(rgba8))
    }

    pub fn premultiplied(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ReelResult<Self> {
        Self::checked(width, height, Pixels::Rgba8Premul(rgba8_premul))
    }

    fn checked(width: u32, height: u32, pixels: Pixels) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::asset("frame width/height must be non-zero"));
        }
        let expected = width as usize * height as usize * pixels.channels();
        if pixels.as_bytes().len() != expected {
            return Err(ReelError::asset(format!(
                "frame byte length mismatch: got {}, expected {expected} for {width}x{height}x{}",
                pixels.as_bytes().len(),
                pixels.channels()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self.pixels, Pixels::Rgba8Premul(_))
    }
}
