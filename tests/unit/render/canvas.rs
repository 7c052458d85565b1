use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(CanvasSize {
        width: w,
        height: h,
    })
    .unwrap()
}

const BG: Rgb8 = Rgb8::new(20, 20, 30);

#[test]
fn zero_sized_canvas_is_rejected() {
    assert!(
        Canvas::new(CanvasSize {
            width: 0,
            height: 4
        })
        .is_err()
    );
}

#[test]
fn clear_fills_every_pixel() {
    let mut c = canvas(3, 2);
    c.clear(BG);
    assert!(c.data().chunks_exact(3).all(|p| p == [20, 20, 30]));
}

#[test]
fn opaque_blit_overwrites() {
    let mut c = canvas(4, 4);
    c.clear(BG);
    let f = Frame::opaque(2, 2, vec![255; 12]).unwrap();
    c.blit(&f, 1, 1);

    assert_eq!(c.pixel(0, 0), Some([20, 20, 30]));
    assert_eq!(c.pixel(1, 1), Some([255, 255, 255]));
    assert_eq!(c.pixel(2, 2), Some([255, 255, 255]));
    assert_eq!(c.pixel(3, 3), Some([20, 20, 30]));
}

#[test]
fn premultiplied_blit_blends() {
    let mut c = canvas(2, 1);
    c.clear(Rgb8::new(0, 0, 0));
    let f = Frame::premultiplied(2, 1, vec![0, 0, 0, 0, 128, 0, 0, 128]).unwrap();
    c.blit(&f, 0, 0);

    assert_eq!(c.pixel(0, 0), Some([0, 0, 0]));
    assert_eq!(c.pixel(1, 0), Some([128, 0, 0]));
}

#[test]
fn blit_is_clipped_on_every_edge() {
    let mut c = canvas(3, 3);
    c.clear(BG);
    let data: Vec<u8> = (0..9u8).flat_map(|i| [i, i, i]).collect();
    let f = Frame::opaque(3, 3, data).unwrap();

    c.blit(&f, -2, -2);
    assert_eq!(c.pixel(0, 0), Some([8, 8, 8]));
    assert_eq!(c.pixel(1, 0), Some([20, 20, 30]));

    c.blit(&f, 2, 2);
    assert_eq!(c.pixel(2, 2), Some([0, 0, 0]));

    let before = c.clone();
    c.blit(&f, 3, 0);
    c.blit(&f, 0, -3);
    assert_eq!(c, before);
}

#[test]
fn stroke_draws_only_the_border() {
    let mut c = canvas(6, 6);
    c.clear(BG);
    c.stroke_rect(0, 0, 6, 6, 2, Rgb8::new(0, 0, 0));
    assert_eq!(c.pixel(0, 0), Some([0, 0, 0]));
    assert_eq!(c.pixel(1, 3), Some([0, 0, 0]));
    assert_eq!(c.pixel(5, 5), Some([0, 0, 0]));
    assert_eq!(c.pixel(2, 2), Some([20, 20, 30]));
    assert_eq!(c.pixel(3, 3), Some([20, 20, 30]));
}

#[test]
fn fill_rect_partly_offscreen() {
    let mut c = canvas(4, 4);
    c.clear(BG);
    c.fill_rect(-10, 3, 12, 5, Rgb8::new(1, 1, 1));
    assert_eq!(c.pixel(0, 3), Some([1, 1, 1]));
    assert_eq!(c.pixel(1, 3), Some([1, 1, 1]));
    assert_eq!(c.pixel(2, 3), Some([20, 20, 30]));
    assert_eq!(c.pixel(0, 2), Some([20, 20, 30]));
}

#[test]
fn image_export_matches_buffer() {
    let mut c = canvas(2, 2);
    c.clear(BG);
    let img = c.to_image().unwrap();
    assert_eq!(img.get_pixel(1, 1).0, [20, 20, 30]);
}
