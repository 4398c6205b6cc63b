use crate::foundation::core::{Affine, PixelRect, Rect};
use crate::foundation::error::{ShadefxError, ShadefxResult};

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// `true` when the transform is a pure translation (including identity).
pub fn is_translate_only(t: Affine) -> bool {
    let [a, b, c, d, _, _] = t.as_coeffs();
    a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0
}

/// `true` when the transform is a translation by whole pixels.
pub fn is_integer_translate(t: Affine) -> bool {
    let [_, _, _, _, e, f] = t.as_coeffs();
    is_translate_only(t) && e.fract() == 0.0 && f.fract() == 0.0
}

/// Invert `t`, failing for singular or non-finite matrices.
pub fn try_invert(t: Affine) -> ShadefxResult<Affine> {
    let det = t.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(ShadefxError::NonInvertibleTransform);
    }
    let inv = t.inverse();
    if inv.as_coeffs().iter().all(|v| v.is_finite()) {
        Ok(inv)
    } else {
        Err(ShadefxError::NonInvertibleTransform)
    }
}

/// Return `true` when a floating-point rectangle has no area.
pub fn is_empty_rect(r: Rect) -> bool {
    !(r.width() > 0.0 && r.height() > 0.0)
}

/// Bounding box of `r` after `t`; empty rectangles stay [`Rect::ZERO`].
pub fn transform_bounds(t: Affine, r: Rect) -> Rect {
    if is_empty_rect(r) {
        return Rect::ZERO;
    }
    if t == Affine::IDENTITY {
        return r;
    }
    t.transform_rect_bbox(r)
}

/// Union of all non-empty rectangles, [`Rect::ZERO`] if there are none.
pub fn union_bounds(rects: impl IntoIterator<Item = Rect>) -> Rect {
    rects
        .into_iter()
        .filter(|r| !is_empty_rect(*r))
        .reduce(|acc, r| acc.union(r))
        .unwrap_or(Rect::ZERO)
}

/// Map a device-space clip back into the space that `transform` renders from.
///
/// Pixel centers of the clip are what the caller needs, so the clip is inset by half a pixel,
/// inverse-mapped, then outset by half a pixel to keep the neighbours a bilinear resample reads,
/// and finally rounded out to whole pixels. Pure translations take an integer fast path that
/// produces the same rectangle. Non-invertible transforms yield [`PixelRect::EMPTY`].
pub fn untransform_clip(transform: Affine, clip: PixelRect) -> PixelRect {
    if transform == Affine::IDENTITY || clip.is_empty() {
        return clip;
    }
    if is_translate_only(transform) {
        let [_, _, _, _, e, f] = transform.as_coeffs();
        let (tx, ty) = (-e, -f);
        let (itx, ity) = (tx.floor(), ty.floor());
        let mut out = clip.translate(itx as i32, ity as i32);
        if itx != tx {
            out.width = out.width.saturating_add(1);
        }
        if ity != ty {
            out.height = out.height.saturating_add(1);
        }
        return out;
    }
    let Ok(inverse) = try_invert(transform) else {
        return PixelRect::EMPTY;
    };
    let centers = clip.to_rect().inflate(-0.5, -0.5);
    let mapped = inverse.transform_rect_bbox(centers).inflate(0.5, 0.5);
    PixelRect::round_out(mapped)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
