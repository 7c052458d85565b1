use crate::assets::frame::{Frame, Pixels};
use crate::foundation::core::{CanvasSize, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::composite::{blend_row_premul, copy_row_rgb};

/// Visible part of a `w`x`h` source placed at `(x, y)` on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Clip {
    src_x: usize,
    src_y: usize,
    dst_x: usize,
    dst_y: usize,
    w: usize,
    h: usize,
}

/// Opaque RGB8 output buffer, row-major and tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Allocate a black RGB canvas. Zero-sized canvases are rejected.
    pub fn new(size: CanvasSize) -> ReelResult<Self> {
        if size.width == 0 || size.height == 0 {
            return Err(ReelError::validation("canvas width/height must be non-zero"));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.width as usize * size.height as usize * 3],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize {
            width: self.width,
            height: self.height,
        }
    }

    /// RGB24 bytes, as streamed to the encoder.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB at `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub fn clear(&mut self, color: Rgb8) {
        let px = color.to_array();
        for d in self.data.chunks_exact_mut(3) {
            d.copy_from_slice(&px);
        }
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgb8) {
        let Some(clip) = self.clip(x, y, w, h) else {
            return;
        };
        let px = color.to_array();
        let stride = self.width as usize * 3;
        for row in 0..clip.h {
            let start = (clip.dst_y + row) * stride + clip.dst_x * 3;
            for d in self.data[start..start + clip.w * 3].chunks_exact_mut(3) {
                d.copy_from_slice(&px);
            }
        }
    }

    /// Outline a rectangle with a border `thickness` pixels wide, drawn inside its bounds.
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: u32, h: u32, thickness: u32, color: Rgb8) {
        let t = thickness.min(w).min(h);
        if t == 0 {
            return;
        }
        let ti = t as i32;
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h as i32 - ti, w, t, color);
        self.fill_rect(x, y, t, h, color);
        self.fill_rect(x + w as i32 - ti, y, t, h, color);
    }

    /// Draw `frame` with its top-left corner at `(x, y)`.
    ///
    /// Opaque frames overwrite the destination; premultiplied frames are blended over it. Pixels
    /// outside the canvas are dropped.
    pub fn blit(&mut self, frame: &Frame, x: i32, y: i32) {
        let Some(clip) = self.clip(x, y, frame.width(), frame.height()) else {
            return;
        };
        let stride = self.width as usize * 3;
        let fw = frame.width() as usize;

        match frame.pixels() {
            Pixels::Rgb8(src) => {
                for row in 0..clip.h {
                    let s = ((clip.src_y + row) * fw + clip.src_x) * 3;
                    let d = (clip.dst_y + row) * stride + clip.dst_x * 3;
                    copy_row_rgb(
                        &mut self.data[d..d + clip.w * 3],
                        &src[s..s + clip.w * 3],
                    );
                }
            }
            Pixels::Rgba8Premul(src) => {
                for row in 0..clip.h {
                    let s = ((clip.src_y + row) * fw + clip.src_x) * 4;
                    let d = (clip.dst_y + row) * stride + clip.dst_x * 3;
                    blend_row_premul(
                        &mut self.data[d..d + clip.w * 3],
                        &src[s..s + clip.w * 4],
                    );
                }
            }
        }
    }

    /// Copy into an `image` buffer (PNG export).
    pub fn to_image(&self) -> ReelResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| ReelError::render("canvas buffer does not match its size"))
    }

    fn clip(&self, x: i32, y: i32, w: u32, h: u32) -> Option<Clip> {
        let (x, y) = (i64::from(x), i64::from(y));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(i64::from(self.width));
        let y1 = (y + i64::from(h)).min(i64::from(self.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Clip {
            src_x: (x0 - x) as usize,
            src_y: (y0 - y) as usize,
            dst_x: x0 as usize,
            dst_y: y0 as usize,
            w: (x1 - x0) as usize,
            h: (y1 - y0) as usize,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
