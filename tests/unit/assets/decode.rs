use super::*;
use crate::assets::frame::Pixels;

fn sample(width: u32, height: u32, channels: u8, fill: u8) -> RawSample {
    RawSample {
        width,
        height,
        channels,
        data: vec![fill; width as usize * height as usize * usize::from(channels)],
    }
}

#[test]
fn decode_still_png_keeps_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.png");
    image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 128, 0, 255, 0, 255])
        .unwrap()
        .save(&path)
        .unwrap();

    let s = decode_still(&path).unwrap();
    assert_eq!((s.width, s.height, s.channels), (2, 1, 4));
    assert_eq!(s.data, vec![255, 0, 0, 128, 0, 255, 0, 255]);
}

#[test]
fn decode_still_jpeg_like_sources_are_opaque() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.bmp");
    image::RgbImage::from_raw(1, 1, vec![1, 2, 3])
        .unwrap()
        .save(&path)
        .unwrap();

    let s = decode_still(&path).unwrap();
    assert_eq!(s.channels, 3);
    assert_eq!(s.data, vec![1, 2, 3]);
}

#[test]
fn decode_still_missing_file_names_the_path() {
    let err = decode_still(Path::new("nope/missing.png")).unwrap_err();
    assert!(err.to_string().contains("nope/missing.png"));
}

#[test]
fn scaled_dims_floor_and_collapse() {
    assert_eq!(scaled_dims(10, 7, 1.0), Some((10, 7)));
    assert_eq!(scaled_dims(10, 7, 0.5), Some((5, 3)));
    assert_eq!(scaled_dims(10, 7, 2.0), Some((20, 14)));
    assert_eq!(scaled_dims(10, 1, 0.5), None);
}

#[test]
fn three_channel_samples_become_opaque_frames() {
    let f = normalize_sample(sample(4, 2, 3, 9), 1.0).unwrap().unwrap();
    assert!(!f.has_alpha());
    assert_eq!((f.width(), f.height()), (4, 2));
    assert!(matches!(f.pixels(), Pixels::Rgb8(b) if b.iter().all(|&v| v == 9)));
}

#[test]
fn four_channel_samples_become_premultiplied_frames() {
    let f = normalize_sample(sample(2, 2, 4, 255), 1.0).unwrap().unwrap();
    assert!(f.has_alpha());
    assert_eq!(f.pixels().as_bytes().len(), 16);
}

#[test]
fn other_channel_counts_are_skipped() {
    assert!(normalize_sample(sample(2, 2, 1, 0), 1.0).unwrap().is_none());
    assert!(normalize_sample(sample(2, 2, 2, 0), 1.0).unwrap().is_none());
}

#[test]
fn rescale_applies_to_both_layouts() {
    let rgb = normalize_sample(sample(8, 4, 3, 50), 0.5).unwrap().unwrap();
    assert_eq!((rgb.width(), rgb.height()), (4, 2));
    // A flat color stays flat under bilinear filtering.
    assert!(rgb.pixels().as_bytes().iter().all(|&v| v == 50));

    let rgba = normalize_sample(sample(8, 4, 4, 255), 0.25).unwrap().unwrap();
    assert_eq!((rgba.width(), rgba.height()), (2, 1));
}

#[test]
fn collapsed_scale_skips_the_sample() {
    assert!(normalize_sample(sample(2, 2, 3, 0), 0.1).unwrap().is_none());
}

#[test]
fn mask_becomes_alpha() {
    let color = RawSample {
        width: 2,
        height: 1,
        channels: 3,
        data: vec![10, 20, 30, 40, 50, 60],
    };
    let mask = RawSample {
        width: 2,
        height: 1,
        channels: 1,
        data: vec![255, 0],
    };
    let rgba = compose_masked(color, &mask).unwrap();
    assert_eq!(rgba.channels, 4);
    assert_eq!(rgba.data, vec![10, 20, 30, 255, 40, 50, 60, 0]);
}

#[test]
fn mismatched_mask_is_rejected() {
    let color = sample(2, 2, 3, 0);
    assert!(compose_masked(color.clone(), &sample(1, 2, 1, 0)).is_none());
    assert!(compose_masked(color, &sample(2, 2, 3, 0)).is_none());
}
