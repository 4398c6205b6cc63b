use rayon::prelude::*;

use crate::foundation::core::PixelRect;
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::image::context::FilterContext;
use crate::image::data::ImageData;

/// How the top input combines with the bottom input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Top over bottom.
    #[default]
    SrcOver,
    /// Top masked by the bottom's alpha.
    SrcIn,
    /// Top masked by the inverse of the bottom's alpha.
    SrcOut,
    /// Top over bottom, kept only where the bottom is.
    SrcAtop,
    /// Channel-wise saturating sum.
    Add,
    /// Product of the colors.
    Multiply,
    /// Inverse product of the inverted colors.
    Screen,
    /// Multiply or screen depending on the bottom.
    Overlay,
    /// Darker of the two.
    Darken,
    /// Lighter of the two.
    Lighten,
    /// Brighten the bottom by the top.
    ColorDodge,
    /// Darken the bottom by the top.
    ColorBurn,
    /// Multiply or screen depending on the top.
    HardLight,
    /// Soft version of hard light.
    SoftLight,
    /// Absolute difference.
    Difference,
    /// Difference with lower contrast.
    Exclusion,
}

/// Blend `top` onto `bottom` over their union, limited to `clip`.
pub(crate) fn blend(
    ctx: &FilterContext,
    bottom: &ImageData,
    top: &ImageData,
    mode: BlendMode,
    opacity: f64,
    clip: Option<PixelRect>,
) -> ImageData {
    let (Some(b), Some(t)) = (bottom.raster(), top.raster()) else {
        return ImageData::invalid(ctx, PixelRect::EMPTY);
    };
    let out = bottom.bounds().union(top.bounds()).clip_to(clip);
    if out.is_empty() {
        return ImageData::empty(ctx);
    }
    let (w, h) = (out.width as u32, out.height as u32);
    let mut dst = ctx.borrow_raster(w, h);
    dst.blit(out, b, bottom.bounds());
    let mut src = ctx.borrow_raster(w, h);
    src.blit(out, t, top.bounds());
    composite(dst.data_mut(), src.data(), w as usize * 4, mode, opacity as f32);
    ctx.release_raster(src);
    ImageData::from_raster(ctx, dst, out)
}

/// Source-over every image in order over their union, limited to `clip`.
pub(crate) fn merge(
    ctx: &FilterContext,
    images: &[ImageData],
    clip: Option<PixelRect>,
) -> ImageData {
    let out = images
        .iter()
        .fold(PixelRect::EMPTY, |acc, img| acc.union(img.bounds()))
        .clip_to(clip);
    if out.is_empty() {
        return ImageData::empty(ctx);
    }
    let (w, h) = (out.width as u32, out.height as u32);
    let mut dst = ctx.borrow_raster(w, h);
    let mut layer = ctx.borrow_raster(w, h);
    for img in images {
        let Some(r) = img.raster() else {
            continue;
        };
        layer.clear();
        layer.blit(out, r, img.bounds());
        let row_bytes = w as usize * 4;
        composite(dst.data_mut(), layer.data(), row_bytes, BlendMode::SrcOver, 1.0);
    }
    ctx.release_raster(layer);
    ImageData::from_raster(ctx, dst, out)
}

fn rows<F>(dst: &mut [u8], src: &[u8], row_bytes: usize, f: F)
where
    F: Fn(&mut [u8], &[u8]) + Sync,
{
    if row_bytes == 0 {
        return;
    }
    dst.par_chunks_mut(row_bytes)
        .zip(src.par_chunks(row_bytes))
        .for_each(|(d, s)| {
            for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                f(dp, sp);
            }
        });
}

fn scaled(s: &[u8], op: u16) -> [u8; 4] {
    [
        mul_div255_u8(u16::from(s[0]), op),
        mul_div255_u8(u16::from(s[1]), op),
        mul_div255_u8(u16::from(s[2]), op),
        mul_div255_u8(u16::from(s[3]), op),
    ]
}

/// Composite premultiplied `src` onto `dst` in place.
///
/// Mode dispatch happens once per call; each arm runs a specialized per-pixel kernel.
pub(crate) fn composite(
    dst: &mut [u8],
    src: &[u8],
    row_bytes: usize,
    mode: BlendMode,
    opacity: f32,
) {
    debug_assert_eq!(dst.len(), src.len());
    if opacity.is_nan() || opacity <= 0.0 {
        return;
    }
    let opacity = opacity.min(1.0);
    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;

    match mode {
        BlendMode::SrcOver => rows(dst, src, row_bytes, |d, s| {
            let s = scaled(s, op);
            if s[3] == 0 {
                return;
            }
            let inv = 255u16 - u16::from(s[3]);
            for c in 0..4 {
                d[c] = add_sat_u8(s[c], mul_div255_u8(u16::from(d[c]), inv));
            }
        }),
        BlendMode::SrcIn => rows(dst, src, row_bytes, |d, s| {
            let s = scaled(s, op);
            let da = u16::from(d[3]);
            for c in 0..4 {
                d[c] = mul_div255_u8(u16::from(s[c]), da);
            }
        }),
        BlendMode::SrcOut => rows(dst, src, row_bytes, |d, s| {
            let s = scaled(s, op);
            let inv_da = 255 - u16::from(d[3]);
            for c in 0..4 {
                d[c] = mul_div255_u8(u16::from(s[c]), inv_da);
            }
        }),
        BlendMode::SrcAtop => rows(dst, src, row_bytes, |d, s| {
            let s = scaled(s, op);
            let da = u16::from(d[3]);
            let inv_sa = 255 - u16::from(s[3]);
            for c in 0..3 {
                d[c] = add_sat_u8(
                    mul_div255_u8(u16::from(s[c]), da),
                    mul_div255_u8(u16::from(d[c]), inv_sa),
                );
            }
        }),
        BlendMode::Add => rows(dst, src, row_bytes, |d, s| {
            let s = scaled(s, op);
            for c in 0..4 {
                d[c] = add_sat_u8(d[c], s[c]);
            }
        }),
        BlendMode::Multiply => separable(dst, src, row_bytes, opacity, |s, d| s * d),
        BlendMode::Screen => separable(dst, src, row_bytes, opacity, |s, d| s + d - s * d),
        BlendMode::Overlay => separable(dst, src, row_bytes, opacity, |s, d| {
            if d <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }),
        BlendMode::Darken => separable(dst, src, row_bytes, opacity, |s, d| s.min(d)),
        BlendMode::Lighten => separable(dst, src, row_bytes, opacity, |s, d| s.max(d)),
        BlendMode::ColorDodge => separable(dst, src, row_bytes, opacity, |s, d| {
            if s >= 1.0 { 1.0 } else { (d / (1.0 - s)).min(1.0) }
        }),
        BlendMode::ColorBurn => separable(dst, src, row_bytes, opacity, |s, d| {
            if s <= 0.0 { 0.0 } else { 1.0 - ((1.0 - d) / s).min(1.0) }
        }),
        BlendMode::HardLight => separable(dst, src, row_bytes, opacity, |s, d| {
            if s <= 0.5 {
                2.0 * s * d
            } else {
                1.0 - 2.0 * (1.0 - s) * (1.0 - d)
            }
        }),
        BlendMode::SoftLight => separable(dst, src, row_bytes, opacity, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::Difference => separable(dst, src, row_bytes, opacity, |s, d| (d - s).abs()),
        BlendMode::Exclusion => {
            separable(dst, src, row_bytes, opacity, |s, d| d + s - 2.0 * d * s)
        }
    }
}

/// Source-over with `blend_fn` applied to unpremultiplied colors where both layers cover:
/// `out_a = sa + da(1 - sa)`, `out_p = sp(1 - da) + dp(1 - sa) + B(sc, dc) sa da`.
fn separable<F>(dst: &mut [u8], src: &[u8], row_bytes: usize, opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32 + Sync,
{
    rows(dst, src, row_bytes, |d, s| {
        let sa = f32::from(s[3]) / 255.0 * opacity;
        if sa <= 0.0 {
            return;
        }
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);
        for c in 0..3 {
            let sp = f32::from(s[c]) / 255.0 * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
            d[c] = (out * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    });
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blend.rs"]
mod tests;
