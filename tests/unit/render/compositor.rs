use super::*;
use crate::assets::bank::FrameBank;
use crate::assets::frame::Frame;
use crate::foundation::core::CanvasSize;
use crate::layout::keyboard::LayoutConfig;
use crate::score::timeline::{NoteEvent, NoteKind, Tempo, Timeline, TimelineMode};

const SIZE: CanvasSize = CanvasSize {
    width: 1280,
    height: 720,
};
const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const BG: [u8; 3] = [20, 20, 30];

fn solid(w: u32, h: u32, rgb: [u8; 3], frames: usize) -> FrameBank {
    let frame = Frame::opaque(w, h, rgb.repeat((w * h) as usize)).unwrap();
    FrameBank::still(frame, frames)
}

fn compositor(opts: CompositorOpts) -> Compositor {
    // Flat row so black frames overlap white ones.
    let cfg = LayoutConfig {
        black_y_offset: 0,
        ..LayoutConfig::default()
    };
    let layout = KeyboardLayout::new(&cfg, SIZE).unwrap();
    let assets = KeyAssets::new(solid(30, 10, RED, 5), solid(10, 10, BLUE, 5));
    Compositor::new(layout, assets, opts)
}

fn opts() -> CompositorOpts {
    CompositorOpts {
        black_offset: LayerOffset::new(0, 0),
        overlay: false,
        ..CompositorOpts::default()
    }
}

fn onsets(notes: &[u8]) -> Timeline {
    let events = notes
        .iter()
        .map(|&note| NoteEvent {
            time: 0.0,
            note,
            kind: NoteKind::On,
        })
        .collect();
    Timeline::from_events(events, Tempo::new(120.0).unwrap(), TimelineMode::OneShot).unwrap()
}

fn progress() -> Progress {
    Progress {
        elapsed_secs: 0.0,
        total_secs: 0.0,
        bpm: 120.0,
    }
}

fn px(canvas: &Canvas, x: i32, y: i32) -> [u8; 3] {
    canvas.pixel(x as u32, y as u32).unwrap()
}

#[test]
fn idle_keyboard_is_plain_background() {
    let mut comp = compositor(opts());
    let tl = onsets(&[]);
    let sim = Simulation::new(&tl);
    let mut canvas = Canvas::new(SIZE).unwrap();

    comp.draw(&mut canvas, &sim, progress());
    assert!(canvas.data().chunks_exact(3).all(|p| p == BG));
}

#[test]
fn playing_key_is_centered_on_its_anchor() {
    let mut comp = compositor(opts());
    let tl = onsets(&[60]);
    let mut sim = Simulation::new(&tl);
    sim.apply_due(0.0, |n| comp.assets().frame_count(n));
    let mut canvas = Canvas::new(SIZE).unwrap();

    comp.draw(&mut canvas, &sim, progress());
    let key = *comp.layout().position(60).unwrap();
    assert_eq!(px(&canvas, key.x, key.y), RED);
    assert_eq!(px(&canvas, key.x - 15, key.y), RED);
    assert_eq!(px(&canvas, key.x + 14, key.y), RED);
    assert_eq!(px(&canvas, key.x - 16, key.y), BG);
    assert_eq!(px(&canvas, key.x + 15, key.y), BG);
    assert_eq!(px(&canvas, key.x, key.y - 1), BG);
}

#[test]
fn black_layer_covers_overlapping_white_pixels() {
    let mut comp = compositor(opts());
    let tl = onsets(&[60, 61, 62]);
    let mut sim = Simulation::new(&tl);
    sim.apply_due(0.0, |n| comp.assets().frame_count(n));
    let mut canvas = Canvas::new(SIZE).unwrap();

    comp.draw(&mut canvas, &sim, progress());
    let black = *comp.layout().position(61).unwrap();
    assert_eq!(px(&canvas, black.x, black.y), BLUE);
    assert_eq!(px(&canvas, black.x - 5, black.y + 5), BLUE);
    // Just outside the black frame the wide white frames still show.
    assert_eq!(px(&canvas, black.x - 6, black.y), RED);
    assert_eq!(px(&canvas, black.x + 5, black.y), RED);
}

#[test]
fn layer_offsets_shift_frames() {
    let mut comp = compositor(CompositorOpts {
        black_offset: LayerOffset::new(3, -20),
        overlay: false,
        ..CompositorOpts::default()
    });
    let tl = onsets(&[61]);
    let mut sim = Simulation::new(&tl);
    sim.apply_due(0.0, |n| comp.assets().frame_count(n));
    let mut canvas = Canvas::new(SIZE).unwrap();

    comp.draw(&mut canvas, &sim, progress());
    let key = *comp.layout().position(61).unwrap();
    assert_eq!(px(&canvas, key.x - 2, key.y - 20), BLUE);
    assert_eq!(px(&canvas, key.x - 3, key.y - 20), BG);
    assert_eq!(px(&canvas, key.x, key.y), BG);
}

#[test]
fn backdrop_is_drawn_under_the_animation_layers() {
    let mut comp = compositor(CompositorOpts {
        backdrop: true,
        ..opts()
    });
    let tl = onsets(&[60]);
    let mut sim = Simulation::new(&tl);
    sim.apply_due(0.0, |n| comp.assets().frame_count(n));
    let mut canvas = Canvas::new(SIZE).unwrap();

    comp.draw(&mut canvas, &sim, progress());
    let key = *comp.layout().position(60).unwrap();
    assert_eq!(px(&canvas, key.x, key.y + 2), RED);
    assert_eq!(px(&canvas, key.x, key.y + 70), [100, 100, 100]);
}
