use crate::effects::blend::BlendMode;
use crate::effects::graph::{EffectKind, EffectRef};
use crate::foundation::error::ShadefxResult;

/// Default luminance threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.3;
/// Radius of the glow blur.
pub const BLOOM_RADIUS: f64 = 10.0;

/// Glow around the bright parts of the input.
///
/// Internally `Blend(Add, input, Crop(GaussianBlur(Brightpass(input)), input))`, exposed through a
/// single delegate node.
#[derive(Debug, Clone)]
pub struct Bloom {
    node: EffectRef,
    brightpass: EffectRef,
    blur: EffectRef,
    crop: EffectRef,
    blend: EffectRef,
    input: Option<EffectRef>,
}

impl Bloom {
    /// Bloom over `input` (`None` uses the default input).
    pub fn new(input: Option<EffectRef>) -> Self {
        let brightpass = EffectRef::brightpass(DEFAULT_THRESHOLD, input.clone());
        let blur = EffectRef::gaussian_blur(BLOOM_RADIUS, Some(brightpass.clone()));
        let crop = EffectRef::crop(Some(blur.clone()), input.clone());
        let blend = EffectRef::blend(BlendMode::Add, input.clone(), Some(crop.clone()));
        Self {
            node: EffectRef::delegate(blend.clone()),
            brightpass,
            blur,
            crop,
            blend,
            input,
        }
    }

    /// Node to wire into other effects or render.
    pub fn node(&self) -> &EffectRef {
        &self.node
    }

    /// Current input.
    pub fn input(&self) -> Option<&EffectRef> {
        self.input.as_ref()
    }

    /// Rewire every internal slot that reads the input.
    pub fn set_input(&mut self, input: Option<EffectRef>) -> ShadefxResult<()> {
        self.brightpass.set_input(0, input.clone())?;
        self.crop.set_input(1, input.clone())?;
        self.blend.set_input(0, input.clone())?;
        self.input = input;
        Ok(())
    }

    /// Luminance threshold.
    pub fn threshold(&self) -> f64 {
        match self.brightpass.kind() {
            EffectKind::Brightpass { threshold } => threshold,
            _ => DEFAULT_THRESHOLD,
        }
    }

    /// Set the luminance threshold, clamped to `[0, 1]`.
    pub fn set_threshold(&self, threshold: f64) {
        self.brightpass.set_kind(EffectKind::Brightpass {
            threshold: threshold.clamp(0.0, 1.0),
        });
    }

    /// The internal blur node.
    pub fn blur_node(&self) -> &EffectRef {
        &self.blur
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/bloom.rs"]
mod tests;
