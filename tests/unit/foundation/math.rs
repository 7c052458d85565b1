use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn premultiply_half_alpha_scales_color() {
    let mut px = vec![100u8, 50, 200, 128, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(
        px,
        vec![
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128,
            1,
            2,
            3,
            255
        ]
    );
}
