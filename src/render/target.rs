use crate::effects::blend::{BlendMode, composite};
use crate::foundation::core::{Affine, PixelRect};
use crate::foundation::error::ShadefxResult;
use crate::image::context::FilterContext;
use crate::image::data::ImageData;
use crate::image::raster::Raster;
use crate::render::ImageDataRenderer;

/// Device raster that results are composited onto (source-over).
#[derive(Debug, Clone)]
pub struct RasterTarget {
    raster: Raster,
    bounds: PixelRect,
}

impl RasterTarget {
    /// Transparent target covering `(0, 0, width, height)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_bounds(PixelRect::new(0, 0, width as i32, height as i32))
    }

    /// Transparent target covering `bounds` in device space.
    pub fn with_bounds(bounds: PixelRect) -> Self {
        let bounds = if bounds.is_empty() {
            PixelRect::EMPTY
        } else {
            bounds
        };
        Self {
            raster: Raster::new(bounds.width.max(0) as u32, bounds.height.max(0) as u32),
            bounds,
        }
    }

    /// Device area covered.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Current pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Take the pixels.
    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

impl ImageDataRenderer for RasterTarget {
    fn render_image(
        &mut self,
        image: ImageData,
        transform: Affine,
        ctx: &FilterContext,
    ) -> ShadefxResult<()> {
        if self.bounds.is_empty() || !image.validate(ctx) {
            return Ok(());
        }
        let placed = image.transform(transform).resample(ctx, Some(self.bounds))?;
        let Some(src) = placed.raster() else {
            return Ok(());
        };
        let mut layer = ctx.borrow_raster(self.raster.width(), self.raster.height());
        layer.blit(self.bounds, src, placed.bounds());
        let row_bytes = self.raster.width() as usize * 4;
        composite(
            self.raster.data_mut(),
            layer.data(),
            row_bytes,
            BlendMode::SrcOver,
            1.0,
        );
        ctx.release_raster(layer);
        Ok(())
    }
}
