//! Frame entry points: render an effect graph into an image or onto a target.

use crate::effects::graph::EffectRef;
use crate::foundation::core::{Affine, PixelRect};
use crate::foundation::error::ShadefxResult;
use crate::image::context::FilterContext;
use crate::image::data::ImageData;

mod target;

pub use target::RasterTarget;

/// Receiver for results that a node produced in a space other than the one requested.
///
/// Instead of resampling into an intermediate image, the node hands over its result together
/// with the transform that maps it into the caller's space.
pub trait ImageDataRenderer {
    /// Draw `image` under `transform`. The renderer owns the handle and releases it when done.
    fn render_image(
        &mut self,
        image: ImageData,
        transform: Affine,
        ctx: &FilterContext,
    ) -> ShadefxResult<()>;
}

/// Render `head` under `transform`, limited to `clip`, into a device-space image.
///
/// Returns `Ok(None)` when any input failed validation (for example after
/// [`FilterContext::invalidate`]).
#[tracing::instrument(skip(head, ctx), fields(ctx = ctx.id()))]
pub fn render_effect(
    head: &EffectRef,
    ctx: &FilterContext,
    transform: Affine,
    clip: Option<PixelRect>,
) -> ShadefxResult<Option<ImageData>> {
    let Some(img) = head.filter(ctx, transform, clip, None, None)? else {
        return Ok(None);
    };
    if !img.validate(ctx) {
        tracing::debug!("effect produced an invalid image");
        return Ok(None);
    }
    Ok(Some(img.resample(ctx, clip)?))
}

/// Render `head` and draw the result with `renderer`.
///
/// Returns `false` when the graph produced an invalid image and nothing was drawn.
#[tracing::instrument(skip(head, ctx, renderer), fields(ctx = ctx.id()))]
pub fn render_effect_to(
    head: &EffectRef,
    ctx: &FilterContext,
    transform: Affine,
    clip: Option<PixelRect>,
    renderer: &mut dyn ImageDataRenderer,
) -> ShadefxResult<bool> {
    match head.filter(ctx, transform, clip, Some(&mut *renderer), None)? {
        None => Ok(true),
        Some(img) if img.validate(ctx) => {
            renderer.render_image(img, Affine::IDENTITY, ctx)?;
            Ok(true)
        }
        Some(_) => {
            tracing::debug!("effect produced an invalid image");
            Ok(false)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/mod.rs"]
mod tests;
