use crate::animation::key_state::Simulation;
use crate::assets::key_assets::KeyAssets;
use crate::foundation::core::Rgb8;
use crate::layout::keyboard::{KeyPosition, KeyboardLayout};
use crate::render::backdrop::Backdrop;
use crate::render::canvas::Canvas;
use crate::render::overlay::{Overlay, overlay_label};

/// Pixel offset applied to every frame of one key layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerOffset {
    pub x: i32,
    pub y: i32,
}

impl LayerOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Look of a finished frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositorOpts {
    pub background: Rgb8,
    pub white_offset: LayerOffset,
    pub black_offset: LayerOffset,
    pub overlay: bool,
    pub backdrop: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            background: Rgb8::new(20, 20, 30),
            white_offset: LayerOffset::default(),
            black_offset: LayerOffset::new(0, -20),
            overlay: true,
            backdrop: false,
        }
    }
}

/// Timing shown in the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub elapsed_secs: f64,
    pub total_secs: f64,
    pub bpm: f64,
}

/// Draws one output frame from the current simulation state.
///
/// Layer order: background, backdrop, white keys, black keys, overlay. Black keys therefore
/// cover any white-key pixels they overlap.
pub struct Compositor {
    layout: KeyboardLayout,
    assets: KeyAssets,
    opts: CompositorOpts,
    backdrop: Option<Backdrop>,
    overlay: Option<Overlay>,
}

impl Compositor {
    /// Build the backdrop and overlay that `opts` enables.
    pub fn new(layout: KeyboardLayout, assets: KeyAssets, opts: CompositorOpts) -> Self {
        let backdrop = opts.backdrop.then(|| Backdrop::new(layout.spacing()));
        let overlay = opts.overlay.then(Overlay::new);
        Self {
            layout,
            assets,
            opts,
            backdrop,
            overlay,
        }
    }

    /// Replace the overlay (e.g. with a specific font database).
    pub fn with_overlay(mut self, overlay: Option<Overlay>) -> Self {
        self.overlay = overlay;
        self
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn assets(&self) -> &KeyAssets {
        &self.assets
    }

    /// Paint one frame: background, optional backdrop, white layer, black layer, then the overlay.
    pub fn draw(&mut self, canvas: &mut Canvas, sim: &Simulation<'_>, progress: Progress) {
        canvas.clear(self.opts.background);

        if let Some(backdrop) = &self.backdrop {
            backdrop.draw(canvas, &self.layout, |note| sim.is_playing(note));
        }

        for key in self.layout.white_keys() {
            draw_key(canvas, &self.assets, sim, key, self.opts.white_offset);
        }
        for key in self.layout.black_keys() {
            draw_key(canvas, &self.assets, sim, key, self.opts.black_offset);
        }

        if let Some(overlay) = &mut self.overlay {
            let label = overlay_label(progress.elapsed_secs, progress.total_secs, progress.bpm);
            overlay.draw(canvas, &label);
        }
    }
}

fn draw_key(
    canvas: &mut Canvas,
    assets: &KeyAssets,
    sim: &Simulation<'_>,
    key: &KeyPosition,
    offset: LayerOffset,
) {
    let Some(frame_index) = sim.state(key.note).frame_index() else {
        return;
    };
    let Some(frame) = assets.bank_for(key.note).frame(frame_index) else {
        return;
    };
    let x = key.x - (frame.width() / 2) as i32 + offset.x;
    let y = key.y + offset.y;
    canvas.blit(frame, x, y);
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
