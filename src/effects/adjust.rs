use rayon::prelude::*;

use crate::foundation::core::PixelRect;
use crate::image::context::FilterContext;
use crate::image::data::ImageData;

/// Rec. 709 luma weights.
const LUMA: [f64; 3] = [0.2125, 0.7154, 0.0721];

/// Restrict `img` to `rect`; an image already inside `rect` is shared, not copied.
pub(crate) fn crop(ctx: &FilterContext, img: &ImageData, rect: PixelRect) -> ImageData {
    let Some(src) = img.raster() else {
        return ImageData::invalid(ctx, PixelRect::EMPTY);
    };
    let b = img.bounds();
    let area = b.intersect(rect);
    if area == b {
        return img.add_ref();
    }
    if area.is_empty() {
        return ImageData::empty(ctx);
    }
    let mut dst = ctx.borrow_raster(area.width as u32, area.height as u32);
    dst.blit(area, src, b);
    ImageData::from_raster(ctx, dst, area)
}

/// Keep pixels whose luminance is at least `threshold`; the rest become transparent.
pub(crate) fn brightpass(ctx: &FilterContext, img: &ImageData, threshold: f64) -> ImageData {
    let Some(src) = img.raster() else {
        return ImageData::invalid(ctx, PixelRect::EMPTY);
    };
    let b = img.bounds();
    if b.is_empty() {
        return ImageData::empty(ctx);
    }
    let mut dst = ctx.borrow_raster(src.width(), src.height());
    let row = src.width() as usize * 4;
    dst.data_mut()
        .par_chunks_mut(row)
        .zip(src.data().par_chunks(row))
        .for_each(|(d, s)| {
            for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                let lum = (LUMA[0] * f64::from(sp[0])
                    + LUMA[1] * f64::from(sp[1])
                    + LUMA[2] * f64::from(sp[2]))
                    / 255.0;
                if lum >= threshold {
                    dp.copy_from_slice(sp);
                }
            }
        });
    ImageData::from_raster(ctx, dst, b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/adjust.rs"]
mod tests;
