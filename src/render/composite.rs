use crate::foundation::math::mul_div255_u8;

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Premultiplied source over an opaque RGB destination pixel.
///
/// `dst = src + dst * (255 - a) / 255`; the destination stays opaque.
pub(crate) fn over_rgb(dst: [u8; 3], src: [u8; 4]) -> [u8; 3] {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return [src[0], src[1], src[2]];
    }
    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 3];
    for c in 0..3 {
        out[c] = add_sat_u8(src[c], mul_div255_u8(u16::from(dst[c]), inv));
    }
    out
}

pub(crate) fn copy_row_rgb(dst: &mut [u8], src: &[u8]) {
    dst.copy_from_slice(src);
}

/// Blend one row of premultiplied RGBA8 over one row of RGB8 of the same pixel width.
pub(crate) fn blend_row_premul(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        let out = over_rgb([d[0], d[1], d[2]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
}
