use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use smallvec::SmallVec;

use crate::effects::blend::{self, BlendMode};
use crate::effects::{adjust, blur, source};
use crate::foundation::core::{Affine, PixelRect, Rect, Rgba8Premul};
use crate::foundation::error::{ShadefxError, ShadefxResult};
use crate::foundation::math::{is_empty_rect, transform_bounds, union_bounds, untransform_clip};
use crate::image::context::FilterContext;
use crate::image::data::ImageData;
use crate::image::raster::Raster;
use crate::render::ImageDataRenderer;

/// Input slots of a node. `None` stands for the default input supplied at filter time.
pub type Inputs = SmallVec<[Option<EffectRef>; 2]>;

/// What a node computes.
#[derive(Debug, Clone)]
pub enum EffectKind {
    /// Solid color over a rectangle.
    Flood {
        /// Fill color.
        color: Rgba8Premul,
        /// Covered rectangle in user space.
        rect: PixelRect,
    },
    /// A supplied raster placed at an integer location; no raster yields an invalid image.
    Identity {
        /// Source pixels.
        source: Option<Arc<Raster>>,
        /// Left edge of the raster in user space.
        x: i32,
        /// Top edge of the raster in user space.
        y: i32,
    },
    /// Gaussian blur of every channel.
    GaussianBlur {
        /// Kernel radius in pixels.
        radius: f64,
    },
    /// Gaussian-blurred alpha tinted with a color.
    GaussianShadow {
        /// Kernel radius in pixels.
        radius: f64,
        /// Shadow color.
        color: Rgba8Premul,
        /// Fraction of the radius that is solid, in `[0, 1]`.
        spread: f64,
    },
    /// Box-blurred alpha (1–3 passes) tinted with a color.
    BoxShadow {
        /// Number of box passes.
        passes: u32,
        /// Equivalent blur radius.
        radius: f64,
        /// Shadow color.
        color: Rgba8Premul,
        /// Fraction of the radius that is solid, in `[0, 1]`.
        spread: f64,
    },
    /// Shift the input.
    Offset {
        /// Horizontal shift.
        dx: f64,
        /// Vertical shift.
        dy: f64,
    },
    /// Clip input 0 to the bounds of input 1.
    Crop,
    /// Keep pixels whose luminance reaches the threshold.
    Brightpass {
        /// Luminance threshold in `[0, 1]`.
        threshold: f64,
    },
    /// Composite input 1 (top) onto input 0 (bottom).
    Blend {
        /// Blend mode.
        mode: BlendMode,
        /// Opacity applied to the top input.
        opacity: f64,
    },
    /// Source-over all inputs in order.
    Merge,
    /// Forward every operation to an internal subgraph.
    Delegate {
        /// Subgraph head.
        head: EffectRef,
    },
}

impl EffectKind {
    /// Short label for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flood { .. } => "Flood",
            Self::Identity { .. } => "Identity",
            Self::GaussianBlur { .. } => "GaussianBlur",
            Self::GaussianShadow { .. } => "GaussianShadow",
            Self::BoxShadow { .. } => "BoxShadow",
            Self::Offset { .. } => "Offset",
            Self::Crop => "Crop",
            Self::Brightpass { .. } => "Brightpass",
            Self::Blend { .. } => "Blend",
            Self::Merge => "Merge",
            Self::Delegate { .. } => "Delegate",
        }
    }

    /// `true` for kinds that run in user space and hand their result back under the transform.
    pub fn is_user_space(&self) -> bool {
        matches!(
            self,
            Self::GaussianBlur { .. } | Self::GaussianShadow { .. } | Self::BoxShadow { .. }
        )
    }

    /// Pixels the kernel reaches beyond a destination pixel.
    pub fn pad(&self) -> i32 {
        match *self {
            Self::GaussianBlur { radius } | Self::GaussianShadow { radius, .. } => {
                blur::gaussian_pad(radius)
            }
            Self::BoxShadow { passes, radius, .. } => blur::box_pad(passes, radius),
            _ => 0,
        }
    }

    /// Clip needed from input `index` to produce `output_clip` under `transform`.
    pub fn input_clip(
        &self,
        _index: usize,
        transform: Affine,
        output_clip: Option<PixelRect>,
    ) -> Option<PixelRect> {
        if !self.is_user_space() {
            return output_clip;
        }
        let pad = self.pad();
        output_clip.map(|c| {
            let c = untransform_clip(transform, c);
            if c.is_empty() { c } else { c.grow(pad, pad) }
        })
    }

    fn input_transform(&self, transform: Affine) -> Affine {
        match *self {
            Self::Offset { dx, dy } => transform * Affine::translate((dx, dy)),
            _ => transform,
        }
    }

    /// Number of input slots the kind reads, or `None` when any count is accepted.
    pub fn required_inputs(&self) -> Option<usize> {
        match self {
            Self::Flood { .. } | Self::Identity { .. } => Some(0),
            Self::GaussianBlur { .. }
            | Self::GaussianShadow { .. }
            | Self::BoxShadow { .. }
            | Self::Offset { .. }
            | Self::Brightpass { .. } => Some(1),
            Self::Crop | Self::Blend { .. } => Some(2),
            Self::Merge | Self::Delegate { .. } => None,
        }
    }

    fn check_arity(&self, n: usize) -> ShadefxResult<()> {
        match self.required_inputs() {
            Some(k) if n < k => Err(ShadefxError::validation(format!(
                "{} has {n} inputs, expected {k}",
                self.name()
            ))),
            _ => Ok(()),
        }
    }

    fn filtered_inputs(&self, n: usize) -> usize {
        match self {
            Self::Crop => 1,
            _ => n,
        }
    }
}

/// A graph node: its kind plus ordered input slots.
#[derive(Debug, Clone)]
pub struct Effect {
    /// What the node computes.
    pub kind: EffectKind,
    /// Ordered inputs.
    pub inputs: Inputs,
}

/// Shared handle to a graph node; one node may feed several parents.
///
/// Graphs must be acyclic. Filtering snapshots each node before recursing, so no lock is held
/// across the recursion.
#[derive(Clone)]
pub struct EffectRef(Arc<RwLock<Effect>>);

impl fmt::Debug for EffectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.read();
        f.debug_struct("EffectRef")
            .field("kind", &e.kind.name())
            .field("inputs", &e.inputs.len())
            .finish()
    }
}

impl EffectRef {
    /// Wrap a kind with its input slots.
    pub fn new(kind: EffectKind, inputs: impl IntoIterator<Item = Option<EffectRef>>) -> Self {
        Self(Arc::new(RwLock::new(Effect {
            kind,
            inputs: inputs.into_iter().collect(),
        })))
    }

    /// Solid color over `rect`.
    pub fn flood(color: Rgba8Premul, rect: PixelRect) -> Self {
        Self::new(EffectKind::Flood { color, rect }, [])
    }

    /// Supplied raster with its top-left corner at `(x, y)`.
    pub fn identity(source: Option<Arc<Raster>>, x: i32, y: i32) -> Self {
        Self::new(EffectKind::Identity { source, x, y }, [])
    }

    /// Gaussian blur.
    pub fn gaussian_blur(radius: f64, input: Option<EffectRef>) -> Self {
        Self::new(EffectKind::GaussianBlur { radius }, [input])
    }

    /// Gaussian shadow with no spread.
    pub fn gaussian_shadow(radius: f64, color: Rgba8Premul, input: Option<EffectRef>) -> Self {
        Self::new(
            EffectKind::GaussianShadow {
                radius,
                color,
                spread: 0.0,
            },
            [input],
        )
    }

    /// Box shadow with no spread; `passes` is clamped to 1..=3.
    pub fn box_shadow(
        passes: u32,
        radius: f64,
        color: Rgba8Premul,
        input: Option<EffectRef>,
    ) -> Self {
        Self::new(
            EffectKind::BoxShadow {
                passes: passes.clamp(1, 3),
                radius,
                color,
                spread: 0.0,
            },
            [input],
        )
    }

    /// Shift by `(dx, dy)`.
    pub fn offset(dx: f64, dy: f64, input: Option<EffectRef>) -> Self {
        Self::new(EffectKind::Offset { dx, dy }, [input])
    }

    /// `source` clipped to the bounds of `bounds_input`.
    pub fn crop(source: Option<EffectRef>, bounds_input: Option<EffectRef>) -> Self {
        Self::new(EffectKind::Crop, [source, bounds_input])
    }

    /// Luminance threshold filter.
    pub fn brightpass(threshold: f64, input: Option<EffectRef>) -> Self {
        Self::new(EffectKind::Brightpass { threshold }, [input])
    }

    /// `top` blended onto `bottom` at full opacity.
    pub fn blend(mode: BlendMode, bottom: Option<EffectRef>, top: Option<EffectRef>) -> Self {
        Self::new(EffectKind::Blend { mode, opacity: 1.0 }, [bottom, top])
    }

    /// Source-over of `inputs` in order.
    pub fn merge(inputs: impl IntoIterator<Item = Option<EffectRef>>) -> Self {
        Self::new(EffectKind::Merge, inputs)
    }

    /// Node forwarding to `head`.
    pub fn delegate(head: EffectRef) -> Self {
        Self::new(EffectKind::Delegate { head }, [])
    }

    /// `true` when both handles point at the same node.
    pub fn ptr_eq(&self, other: &EffectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Shared access to the node.
    pub fn read(&self) -> RwLockReadGuard<'_, Effect> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Exclusive access to the node.
    pub fn write(&self) -> RwLockWriteGuard<'_, Effect> {
        self.0.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the node's kind.
    pub fn kind(&self) -> EffectKind {
        self.read().kind.clone()
    }

    /// Replace the node's kind, keeping its inputs.
    pub fn set_kind(&self, kind: EffectKind) {
        self.write().kind = kind;
    }

    /// Number of input slots.
    pub fn num_inputs(&self) -> usize {
        self.read().inputs.len()
    }

    /// Input slot `index` (`None` for the default input or an out-of-range index).
    pub fn input(&self, index: usize) -> Option<EffectRef> {
        self.read().inputs.get(index).cloned().flatten()
    }

    /// Rewire input slot `index`.
    pub fn set_input(&self, index: usize, input: Option<EffectRef>) -> ShadefxResult<()> {
        let mut e = self.write();
        let n = e.inputs.len();
        let name = e.kind.name();
        let slot = e.inputs.get_mut(index).ok_or_else(|| {
            ShadefxError::validation(format!("{name} has {n} inputs, cannot set input {index}"))
        })?;
        *slot = input;
        Ok(())
    }

    fn snapshot(&self) -> Effect {
        self.read().clone()
    }

    /// Bounds of the node's output under `transform`.
    pub fn bounds(
        &self,
        transform: Affine,
        default_input: Option<&EffectRef>,
    ) -> ShadefxResult<Rect> {
        let Effect { kind, inputs } = self.snapshot();
        kind.check_arity(inputs.len())?;
        let input = |i: usize| resolve_input(&kind, &inputs, i, default_input);
        let r = match &kind {
            EffectKind::Flood { rect, .. } => transform_bounds(transform, rect.to_rect()),
            EffectKind::Identity { source, x, y } => match source {
                Some(s) => transform_bounds(
                    transform,
                    PixelRect::new(*x, *y, s.width() as i32, s.height() as i32).to_rect(),
                ),
                None => Rect::ZERO,
            },
            EffectKind::Delegate { head } => head.bounds(transform, default_input)?,
            EffectKind::GaussianBlur { .. }
            | EffectKind::GaussianShadow { .. }
            | EffectKind::BoxShadow { .. } => {
                let pad = f64::from(kind.pad());
                let r = input(0)?.bounds(Affine::IDENTITY, default_input)?;
                if is_empty_rect(r) {
                    Rect::ZERO
                } else {
                    transform_bounds(transform, r.inflate(pad, pad))
                }
            }
            EffectKind::Offset { .. } => {
                input(0)?.bounds(kind.input_transform(transform), default_input)?
            }
            EffectKind::Crop => input(1)?.bounds(transform, default_input)?,
            EffectKind::Brightpass { .. } => input(0)?.bounds(transform, default_input)?,
            EffectKind::Blend { .. } | EffectKind::Merge => {
                let mut all = Vec::with_capacity(inputs.len());
                for i in 0..inputs.len() {
                    all.push(input(i)?.bounds(transform, default_input)?);
                }
                union_bounds(all)
            }
        };
        Ok(r)
    }

    /// Clip required from input `index` to produce `output_clip` under `transform`.
    pub fn input_clip(
        &self,
        index: usize,
        transform: Affine,
        output_clip: Option<PixelRect>,
    ) -> Option<PixelRect> {
        self.read().kind.input_clip(index, transform, output_clip)
    }

    /// Produce the node's output under `transform`, limited to `output_clip`.
    ///
    /// Inputs are filtered in order and validated. When one fails, every input obtained so far
    /// is released and an invalid image is returned without compositing. A node that works in a
    /// space other than the requested one hands its result to `helper` (returning `None`) or
    /// returns it lazily transformed.
    pub fn filter(
        &self,
        ctx: &FilterContext,
        transform: Affine,
        output_clip: Option<PixelRect>,
        helper: Option<&mut dyn ImageDataRenderer>,
        default_input: Option<&EffectRef>,
    ) -> ShadefxResult<Option<ImageData>> {
        let Effect { kind, inputs } = self.snapshot();
        match &kind {
            EffectKind::Delegate { head } => {
                return head.filter(ctx, transform, output_clip, helper, default_input);
            }
            EffectKind::Flood { color, rect } => {
                let clip = output_clip.map(|c| untransform_clip(transform, c));
                let img = source::flood(ctx, *color, *rect, clip);
                return finish(img, transform, ctx, helper);
            }
            EffectKind::Identity { source, x, y } => {
                let img = source::identity(ctx, source.as_ref(), *x, *y)?;
                return finish(img, transform, ctx, helper);
            }
            _ => {}
        }
        kind.check_arity(inputs.len())?;

        let user_space = kind.is_user_space();
        let (work_tx, work_clip) = if user_space {
            (
                Affine::IDENTITY,
                output_clip.map(|c| untransform_clip(transform, c)),
            )
        } else {
            (transform, output_clip)
        };

        let n = kind.filtered_inputs(inputs.len());
        let mut images: SmallVec<[ImageData; 2]> = SmallVec::with_capacity(n);
        for i in 0..n {
            let input = resolve_input(&kind, &inputs, i, default_input)?;
            let in_tx = kind.input_transform(work_tx);
            let in_clip = kind.input_clip(i, transform, output_clip);
            let img = match input.filter(ctx, in_tx, in_clip, None, default_input)? {
                Some(img) => img,
                None => ImageData::invalid(ctx, PixelRect::EMPTY),
            };
            if !img.validate(ctx) {
                tracing::debug!(
                    effect = kind.name(),
                    input = i,
                    released = images.len(),
                    "input failed validation"
                );
                img.unref();
                for held in images.drain(..) {
                    held.unref();
                }
                return Ok(Some(ImageData::invalid(ctx, PixelRect::EMPTY)));
            }
            images.push(img.resample(ctx, in_clip)?);
        }

        let out = match &kind {
            EffectKind::GaussianBlur { radius } => {
                blur::gaussian_blur(ctx, &images[0], *radius, work_clip)?
            }
            EffectKind::GaussianShadow {
                radius,
                color,
                spread,
            } => blur::gaussian_shadow(ctx, &images[0], *radius, *color, *spread, work_clip)?,
            EffectKind::BoxShadow {
                passes,
                radius,
                color,
                spread,
            } => blur::box_shadow(ctx, &images[0], *passes, *radius, *color, *spread, work_clip)?,
            EffectKind::Offset { .. } => images[0].add_ref(),
            EffectKind::Crop => {
                let bounds = resolve_input(&kind, &inputs, 1, default_input)?
                    .bounds(work_tx, default_input)?;
                adjust::crop(ctx, &images[0], PixelRect::round_out(bounds))
            }
            EffectKind::Brightpass { threshold } => {
                adjust::brightpass(ctx, &images[0], *threshold)
            }
            EffectKind::Blend { mode, opacity } => {
                blend::blend(ctx, &images[0], &images[1], *mode, *opacity, work_clip)
            }
            EffectKind::Merge => blend::merge(ctx, &images, work_clip),
            EffectKind::Flood { .. }
            | EffectKind::Identity { .. }
            | EffectKind::Delegate { .. } => {
                return Err(ShadefxError::evaluation(format!(
                    "{} has no combine step",
                    kind.name()
                )));
            }
        };
        for held in images {
            held.unref();
        }

        if user_space {
            finish(out, transform, ctx, helper)
        } else {
            Ok(Some(out))
        }
    }
}

fn resolve_input(
    kind: &EffectKind,
    inputs: &Inputs,
    index: usize,
    default_input: Option<&EffectRef>,
) -> ShadefxResult<EffectRef> {
    if index >= inputs.len() {
        return Err(ShadefxError::validation(format!(
            "{} has {} inputs, input {index} requested",
            kind.name(),
            inputs.len()
        )));
    }
    match &inputs[index] {
        Some(e) => Ok(e.clone()),
        None => default_input.cloned().ok_or_else(|| {
            ShadefxError::validation(format!(
                "{} input {index} is unset and no default input was supplied",
                kind.name()
            ))
        }),
    }
}

fn finish(
    img: ImageData,
    transform: Affine,
    ctx: &FilterContext,
    helper: Option<&mut dyn ImageDataRenderer>,
) -> ShadefxResult<Option<ImageData>> {
    if transform == Affine::IDENTITY || !img.validate(ctx) {
        return Ok(Some(img));
    }
    match helper {
        Some(h) => {
            h.render_image(img, transform, ctx)?;
            Ok(None)
        }
        None => Ok(Some(img.transform(transform))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/graph.rs"]
mod tests;
