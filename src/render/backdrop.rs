use crate::foundation::core::Rgb8;
use crate::layout::keyboard::{KeyPosition, KeyboardLayout};
use crate::render::canvas::Canvas;

const WHITE_UP: Rgb8 = Rgb8::new(200, 200, 200);
const WHITE_DOWN: Rgb8 = Rgb8::new(100, 100, 100);
const BLACK_UP: Rgb8 = Rgb8::new(100, 100, 100);
const BLACK_DOWN: Rgb8 = Rgb8::new(50, 50, 50);
const BORDER: Rgb8 = Rgb8::new(0, 0, 0);
const BORDER_PX: u32 = 2;

/// Plain rectangle keyboard under the animation layers. Pressed keys are shaded darker.
#[derive(Clone, Copy, Debug)]
pub struct Backdrop {
    white_w: u32,
    white_h: u32,
    black_w: u32,
    black_h: u32,
}

impl Backdrop {
    /// Key proportions follow a 12:40 white key with black keys at 60% of its size.
    pub fn new(spacing: u32) -> Self {
        let white_h = spacing * 10 / 3;
        Self {
            white_w: spacing,
            white_h,
            black_w: (spacing * 3 / 5).max(1),
            black_h: (white_h * 3 / 5).max(1),
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, layout: &KeyboardLayout, pressed: impl Fn(u8) -> bool) {
        for key in layout.white_keys() {
            let fill = if pressed(key.note) { WHITE_DOWN } else { WHITE_UP };
            self.key_rect(canvas, key, self.white_w, self.white_h, fill);
        }
        for key in layout.black_keys() {
            let fill = if pressed(key.note) { BLACK_DOWN } else { BLACK_UP };
            self.key_rect(canvas, key, self.black_w, self.black_h, fill);
        }
    }

    fn key_rect(&self, canvas: &mut Canvas, key: &KeyPosition, w: u32, h: u32, fill: Rgb8) {
        let x = key.x - (w / 2) as i32;
        canvas.fill_rect(x, key.y, w, h, fill);
        canvas.stroke_rect(x, key.y, w, h, BORDER_PX, BORDER);
    }
}
