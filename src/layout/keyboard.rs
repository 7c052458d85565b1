use crate::foundation::core::CanvasSize;
use crate::foundation::error::{ReelError, ReelResult};

/// Lowest playable note (A0).
pub const LOWEST_NOTE: u8 = 21;
/// Highest playable note (C8).
pub const HIGHEST_NOTE: u8 = 108;
pub const KEY_COUNT: usize = 88;
pub const WHITE_KEY_COUNT: usize = 52;
pub const BLACK_KEY_COUNT: usize = 36;

/// Black keys by pitch class (C#, D#, F#, G#, A#).
pub fn is_black_key(note: u8) -> bool {
    matches!(note % 12, 1 | 3 | 6 | 8 | 10)
}

/// Keyboard geometry knobs.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between adjacent white keys, in pixels.
    pub spacing: u32,
    /// Row offset from the vertical canvas center.
    pub y_offset: i32,
    /// Extra vertical offset for black keys relative to the white row.
    pub black_y_offset: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spacing: 24,
            y_offset: 0,
            black_y_offset: -20,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if self.spacing < 2 {
            return Err(ReelError::validation(
                "layout spacing must be >= 2 so black keys fall strictly between white keys",
            ));
        }
        Ok(())
    }
}

/// Screen anchor of one key. `x` is the horizontal center, `y` the top of the draw row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct KeyPosition {
    pub note: u8,
    pub x: i32,
    pub y: i32,
    pub is_black: bool,
}

/// Fixed positions for notes 21..=108.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    keys: Vec<KeyPosition>,
    spacing: u32,
}

impl KeyboardLayout {
    /// Place all 88 keys on a row centered in `canvas`.
    pub fn new(cfg: &LayoutConfig, canvas: CanvasSize) -> ReelResult<Self> {
        cfg.validate()?;

        let spacing = i32::try_from(cfg.spacing)
            .map_err(|_| ReelError::validation("layout spacing is too large"))?;
        let canvas_w = i32::try_from(canvas.width)
            .map_err(|_| ReelError::validation("canvas width is too large"))?;
        let canvas_h = i32::try_from(canvas.height)
            .map_err(|_| ReelError::validation("canvas height is too large"))?;

        let slot_left = (canvas_w - WHITE_KEY_COUNT as i32 * spacing) / 2;
        let row_y = canvas_h / 2 + cfg.y_offset;

        let mut keys = Vec::with_capacity(KEY_COUNT);
        let mut white_index = 0i32;
        for note in LOWEST_NOTE..=HIGHEST_NOTE {
            if is_black_key(note) {
                // The next white slot's left edge is the seam between the two neighbours.
                keys.push(KeyPosition {
                    note,
                    x: slot_left + white_index * spacing,
                    y: row_y + cfg.black_y_offset,
                    is_black: true,
                });
            } else {
                keys.push(KeyPosition {
                    note,
                    x: slot_left + white_index * spacing + spacing / 2,
                    y: row_y,
                    is_black: false,
                });
                white_index += 1;
            }
        }

        Ok(Self {
            keys,
            spacing: cfg.spacing,
        })
    }

    /// Anchor for `note`, `None` outside A0..=C8.
    pub fn position(&self, note: u8) -> Option<&KeyPosition> {
        if !(LOWEST_NOTE..=HIGHEST_NOTE).contains(&note) {
            return None;
        }
        self.keys.get(usize::from(note - LOWEST_NOTE))
    }

    /// Distance between adjacent white key centers, in pixels.
    pub fn spacing(&self) -> u32 {
        self.spacing
    }

    /// All keys in ascending note order.
    pub fn keys(&self) -> &[KeyPosition] {
        &self.keys
    }

    pub fn white_keys(&self) -> impl Iterator<Item = &KeyPosition> + '_ {
        self.keys.iter().filter(|k| !k.is_black)
    }

    pub fn black_keys(&self) -> impl Iterator<Item = &KeyPosition> + '_ {
        self.keys.iter().filter(|k| k.is_black)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/keyboard.rs"]
mod tests;
