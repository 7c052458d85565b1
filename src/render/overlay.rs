use std::sync::Arc;

use crate::assets::frame::Frame;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::canvas::Canvas;

const FONT_SIZE: f32 = 20.0;
const ORIGIN: (i32, i32) = (10, 10);

/// Progress line drawn in the top-left corner.
pub fn overlay_label(elapsed_secs: f64, total_secs: f64, bpm: f64) -> String {
    format!("Time: {elapsed_secs:.1}/{total_secs:.1}s | BPM: {bpm}")
}

/// Text overlay rasterized through `usvg`/`resvg`.
///
/// The last rendered string is cached. The first failure is logged and turns the overlay off
/// for the rest of the run.
pub struct Overlay {
    fontdb: Arc<usvg::fontdb::Database>,
    cached: Option<(String, Frame)>,
    disabled: bool,
}

impl Overlay {
    /// Overlay backed by the system fonts.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.faces().count(), "overlay font database loaded");
        Self::with_fontdb(Arc::new(db))
    }

    /// Render with an already loaded font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            fontdb,
            cached: None,
            disabled: false,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Blend `text` into the top-left corner. The rasterized line is cached until the text changes.
    pub fn draw(&mut self, canvas: &mut Canvas, text: &str) {
        if self.disabled {
            return;
        }
        let stale = self.cached.as_ref().is_none_or(|(s, _)| s != text);
        if stale {
            match rasterize_text(&self.fontdb, text) {
                Ok(frame) => self.cached = Some((text.to_owned(), frame)),
                Err(err) => {
                    tracing::warn!(error = %err, "overlay text disabled");
                    self.disabled = true;
                    self.cached = None;
                    return;
                }
            }
        }
        if let Some((_, frame)) = &self.cached {
            canvas.blit(frame, ORIGIN.0, ORIGIN.1);
        }
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn rasterize_text(fontdb: &Arc<usvg::fontdb::Database>, text: &str) -> ReelResult<Frame> {
    if fontdb.faces().next().is_none() {
        return Err(ReelError::render("no fonts available for overlay text"));
    }

    // Generous box; glyphs past it are clipped by the pixmap.
    let width = ((text.chars().count() as f32) * FONT_SIZE * 0.65).ceil().max(1.0) as u32;
    let height = (FONT_SIZE * 1.5).ceil() as u32;
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="0" y="{baseline}" font-family="sans-serif" font-size="{FONT_SIZE}" fill="#ffffff">{body}</text></svg>"##,
        baseline = FONT_SIZE,
        body = escape_xml(text),
    );

    let opts = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| ReelError::render(format!("overlay svg parse failed: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ReelError::render("failed to allocate overlay pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Frame::premultiplied(width, height, pixmap.take())
}
