use std::sync::Arc;

use crate::foundation::core::{PixelRect, Rgba8Premul};
use crate::foundation::error::ShadefxResult;
use crate::image::context::FilterContext;
use crate::image::data::ImageData;
use crate::image::raster::Raster;

/// Fill `rect` (limited to `clip`) with `color` in user space.
pub(crate) fn flood(
    ctx: &FilterContext,
    color: Rgba8Premul,
    rect: PixelRect,
    clip: Option<PixelRect>,
) -> ImageData {
    let area = rect.clip_to(clip);
    if area.is_empty() {
        return ImageData::empty(ctx);
    }
    let mut r = ctx.borrow_raster(area.width as u32, area.height as u32);
    r.fill(color);
    ImageData::from_raster(ctx, r, area)
}

/// Wrap a supplied raster without copying; a missing raster gives an invalid image.
pub(crate) fn identity(
    ctx: &FilterContext,
    source: Option<&Arc<Raster>>,
    x: i32,
    y: i32,
) -> ShadefxResult<ImageData> {
    match source {
        Some(raster) => {
            let bounds = PixelRect::new(x, y, raster.width() as i32, raster.height() as i32);
            ImageData::new(ctx, Arc::clone(raster), bounds)
        }
        None => {
            tracing::trace!("identity source has no raster");
            Ok(ImageData::invalid(ctx, PixelRect::new(x, y, 0, 0)))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/source.rs"]
mod tests;
