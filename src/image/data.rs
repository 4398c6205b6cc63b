use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::core::{Affine, PixelRect, Point};
use crate::foundation::error::{ShadefxError, ShadefxResult};
use crate::foundation::math::{is_integer_translate, transform_bounds, try_invert};
use crate::image::context::{ContextInner, FilterContext};
use crate::image::raster::Raster;

struct ImageInner {
    raster: Option<Arc<Raster>>,
    bounds: PixelRect,
    transform: Affine,
    generation: u64,
    ctx: Arc<ContextInner>,
}

impl Drop for ImageInner {
    fn drop(&mut self) {
        // Shared rasters (sources, lazily transformed siblings) stay with their other owners.
        if let Some(raster) = self.raster.take()
            && let Ok(raster) = Arc::try_unwrap(raster)
        {
            self.ctx.release(raster, self.generation);
        }
    }
}

/// Reference-counted handle to a filter result.
///
/// Cloning a handle adds a reference and dropping (or [`ImageData::unref`]) releases one. When the
/// last handle to an exclusively owned raster goes away, the raster returns to the pool of the
/// context that produced it.
///
/// `bounds` are in the image's own space; `transform` maps that space to the caller's.
#[derive(Clone)]
pub struct ImageData {
    inner: Arc<ImageInner>,
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("bounds", &self.inner.bounds)
            .field("transform", &self.inner.transform)
            .field("generation", &self.inner.generation)
            .field("has_raster", &self.inner.raster.is_some())
            .field("refs", &self.ref_count())
            .finish()
    }
}

impl ImageData {
    /// Wrap a shared raster placed at `bounds`; the raster size must match the bounds size.
    pub fn new(ctx: &FilterContext, raster: Arc<Raster>, bounds: PixelRect) -> ShadefxResult<Self> {
        if raster.width() as i64 != i64::from(bounds.width.max(0))
            || raster.height() as i64 != i64::from(bounds.height.max(0))
        {
            return Err(ShadefxError::invalid_image(format!(
                "{}x{} raster does not fit bounds {:?}",
                raster.width(),
                raster.height(),
                bounds
            )));
        }
        Ok(Self::with_raster(ctx, Some(raster), bounds, Affine::IDENTITY))
    }

    /// Image with no raster; it never validates.
    pub fn invalid(ctx: &FilterContext, bounds: PixelRect) -> Self {
        Self::with_raster(ctx, None, bounds, Affine::IDENTITY)
    }

    /// Valid image covering no pixels.
    pub fn empty(ctx: &FilterContext) -> Self {
        Self::from_raster(ctx, Raster::new(0, 0), PixelRect::EMPTY)
    }

    pub(crate) fn from_raster(ctx: &FilterContext, raster: Raster, bounds: PixelRect) -> Self {
        debug_assert_eq!(raster.width() as i32, bounds.width.max(0));
        debug_assert_eq!(raster.height() as i32, bounds.height.max(0));
        Self::with_raster(ctx, Some(Arc::new(raster)), bounds, Affine::IDENTITY)
    }

    fn with_raster(
        ctx: &FilterContext,
        raster: Option<Arc<Raster>>,
        bounds: PixelRect,
        transform: Affine,
    ) -> Self {
        Self {
            inner: Arc::new(ImageInner {
                raster,
                bounds,
                transform,
                generation: ctx.generation(),
                ctx: Arc::clone(ctx.inner()),
            }),
        }
    }

    /// `true` when the raster is present and was produced by `ctx` in its current generation.
    pub fn validate(&self, ctx: &FilterContext) -> bool {
        self.inner.raster.is_some()
            && ctx.is(&self.inner.ctx)
            && self.inner.generation == ctx.generation()
    }

    /// Pixel bounds in the image's own space.
    pub fn bounds(&self) -> PixelRect {
        self.inner.bounds
    }

    /// Transform from the image's space to the caller's space.
    pub fn current_transform(&self) -> Affine {
        self.inner.transform
    }

    /// Bounds after the current transform, rounded out to whole pixels.
    pub fn transformed_bounds(&self) -> PixelRect {
        if self.inner.transform == Affine::IDENTITY {
            return self.inner.bounds;
        }
        PixelRect::round_out(transform_bounds(
            self.inner.transform,
            self.inner.bounds.to_rect(),
        ))
    }

    /// The pixels, if any.
    pub fn raster(&self) -> Option<&Raster> {
        self.inner.raster.as_deref()
    }

    /// Generation this image was produced in.
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// Add a reference.
    pub fn add_ref(&self) -> Self {
        self.clone()
    }

    /// Release this reference.
    pub fn unref(self) {
        drop(self);
    }

    /// Number of live handles sharing this image.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// View the same pixels under `matrix` applied before the current transform.
    ///
    /// Nothing is resampled until [`ImageData::resample`] runs.
    pub fn transform(self, matrix: Affine) -> Self {
        if matrix == Affine::IDENTITY {
            return self;
        }
        Self {
            inner: Arc::new(ImageInner {
                raster: self.inner.raster.clone(),
                bounds: self.inner.bounds,
                transform: matrix * self.inner.transform,
                generation: self.inner.generation,
                ctx: Arc::clone(&self.inner.ctx),
            }),
        }
    }

    /// Materialize the current transform into device pixels inside `clip`.
    ///
    /// Integer translations only move the bounds. Other transforms are sampled bilinearly into a
    /// pooled raster; a singular transform yields an empty image.
    pub fn resample(self, ctx: &FilterContext, clip: Option<PixelRect>) -> ShadefxResult<Self> {
        let tx = self.inner.transform;
        let Some(src) = self.inner.raster.clone() else {
            return Ok(self);
        };
        if tx == Affine::IDENTITY {
            return Ok(self);
        }
        if is_integer_translate(tx) {
            let [_, _, _, _, e, f] = tx.as_coeffs();
            let bounds = self.inner.bounds.translate(e as i32, f as i32);
            return Ok(Self {
                inner: Arc::new(ImageInner {
                    raster: Some(src),
                    bounds,
                    transform: Affine::IDENTITY,
                    generation: self.inner.generation,
                    ctx: Arc::clone(&self.inner.ctx),
                }),
            });
        }
        let Ok(inverse) = try_invert(tx) else {
            return Ok(Self::empty(ctx));
        };

        let dst = self.transformed_bounds().clip_to(clip);
        if dst.is_empty() {
            return Ok(Self::empty(ctx));
        }
        let origin = self.inner.bounds;
        let mut out = ctx.borrow_raster(dst.width as u32, dst.height as u32);
        let row_bytes = dst.width as usize * 4;
        out.data_mut()
            .par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(row, line)| {
                let py = f64::from(dst.y) + row as f64 + 0.5;
                for (col, px) in line.chunks_exact_mut(4).enumerate() {
                    let p = inverse * Point::new(f64::from(dst.x) + col as f64 + 0.5, py);
                    let sx = p.x - f64::from(origin.x) - 0.5;
                    let sy = p.y - f64::from(origin.y) - 0.5;
                    px.copy_from_slice(&sample_bilinear(&src, sx, sy));
                }
            });
        Ok(Self::from_raster(ctx, out, dst))
    }
}

fn texel(src: &Raster, x: i64, y: i64) -> [u8; 4] {
    if x < 0 || y < 0 || x > i64::from(u32::MAX) || y > i64::from(u32::MAX) {
        return [0; 4];
    }
    src.pixel(x as u32, y as u32)
}

fn sample_bilinear(src: &Raster, fx: f64, fy: f64) -> [u8; 4] {
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);
    let taps = [
        (0, 0, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ];
    let mut acc = [0.0f64; 4];
    for (dx, dy, w) in taps {
        if w == 0.0 {
            continue;
        }
        let t = texel(src, x0 + dx, y0 + dy);
        for c in 0..4 {
            acc[c] += w * f64::from(t[c]);
        }
    }
    acc.map(|v| v.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/image/data.rs"]
mod tests;
