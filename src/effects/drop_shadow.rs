use crate::effects::graph::{EffectKind, EffectRef};
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::ShadefxResult;

/// Default shadow radius.
pub const DEFAULT_RADIUS: f64 = 10.0;

/// Kernel used to soften the shadow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowMode {
    /// Gaussian kernel.
    #[default]
    Gaussian,
    /// One box pass.
    OnePassBox,
    /// Two box passes.
    TwoPassBox,
    /// Three box passes (close to Gaussian).
    ThreePassBox,
}

impl ShadowMode {
    fn passes(self) -> u32 {
        match self {
            Self::Gaussian => 0,
            Self::OnePassBox => 1,
            Self::TwoPassBox => 2,
            Self::ThreePassBox => 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ShadowParams {
    mode: ShadowMode,
    radius: f64,
    color: Rgba8Premul,
    spread: f64,
}

impl ShadowParams {
    fn kind(self) -> EffectKind {
        match self.mode {
            ShadowMode::Gaussian => EffectKind::GaussianShadow {
                radius: self.radius,
                color: self.color,
                spread: self.spread,
            },
            mode => EffectKind::BoxShadow {
                passes: mode.passes(),
                radius: self.radius,
                color: self.color,
                spread: self.spread,
            },
        }
    }
}

/// Shadow of one input, offset and drawn under the content.
///
/// Internally `Merge(Offset(shadow(shadow_source)), content)` behind a delegate node; the shadow
/// node is swapped when the mode changes.
#[derive(Debug, Clone)]
pub struct DropShadow {
    node: EffectRef,
    shadow: EffectRef,
    offset: EffectRef,
    merge: EffectRef,
    params: ShadowParams,
}

impl DropShadow {
    /// Gaussian black shadow of `shadow_source` under `content`.
    pub fn new(shadow_source: Option<EffectRef>, content: Option<EffectRef>) -> Self {
        let params = ShadowParams {
            mode: ShadowMode::Gaussian,
            radius: DEFAULT_RADIUS,
            color: Rgba8Premul::BLACK,
            spread: 0.0,
        };
        let shadow = EffectRef::new(params.kind(), [shadow_source]);
        let offset = EffectRef::offset(0.0, 0.0, Some(shadow.clone()));
        let merge = EffectRef::merge([Some(offset.clone()), content]);
        Self {
            node: EffectRef::delegate(merge.clone()),
            shadow,
            offset,
            merge,
            params,
        }
    }

    /// Node to wire into other effects or render.
    pub fn node(&self) -> &EffectRef {
        &self.node
    }

    /// Current shadow node.
    pub fn shadow_node(&self) -> &EffectRef {
        &self.shadow
    }

    /// Current kernel.
    pub fn shadow_mode(&self) -> ShadowMode {
        self.params.mode
    }

    /// Replace the shadow node with one using `mode`, keeping its input and parameters.
    pub fn set_shadow_mode(&mut self, mode: ShadowMode) -> ShadefxResult<()> {
        if mode == self.params.mode {
            return Ok(());
        }
        self.params.mode = mode;
        let shadow = EffectRef::new(self.params.kind(), [self.shadow.input(0)]);
        self.offset.set_input(0, Some(shadow.clone()))?;
        self.shadow = shadow;
        tracing::debug!(?mode, "drop shadow mode changed");
        Ok(())
    }

    /// Shadow radius in pixels.
    pub fn radius(&self) -> f64 {
        self.params.radius
    }

    /// Set the radius, clamped to `[0, 127]`.
    pub fn set_radius(&mut self, radius: f64) {
        self.params.radius = radius.clamp(0.0, crate::effects::blur::MAX_RADIUS);
        self.shadow.set_kind(self.params.kind());
    }

    /// Shadow color.
    pub fn color(&self) -> Rgba8Premul {
        self.params.color
    }

    /// Set the shadow color.
    pub fn set_color(&mut self, color: Rgba8Premul) {
        self.params.color = color;
        self.shadow.set_kind(self.params.kind());
    }

    /// Spread in `[0, 1]`.
    pub fn spread(&self) -> f64 {
        self.params.spread
    }

    /// Set the spread, clamped to `[0, 1]`.
    pub fn set_spread(&mut self, spread: f64) {
        self.params.spread = spread.clamp(0.0, 1.0);
        self.shadow.set_kind(self.params.kind());
    }

    /// Shadow displacement.
    pub fn offset(&self) -> (f64, f64) {
        match self.offset.kind() {
            EffectKind::Offset { dx, dy } => (dx, dy),
            _ => (0.0, 0.0),
        }
    }

    /// Move the shadow by `(dx, dy)`.
    pub fn set_offset(&self, dx: f64, dy: f64) {
        self.offset.set_kind(EffectKind::Offset { dx, dy });
    }

    /// Rewire the input the shadow is cast from.
    pub fn set_shadow_source_input(&self, input: Option<EffectRef>) -> ShadefxResult<()> {
        self.shadow.set_input(0, input)
    }

    /// Rewire the content drawn over the shadow.
    pub fn set_content_input(&self, input: Option<EffectRef>) -> ShadefxResult<()> {
        self.merge.set_input(1, input)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/drop_shadow.rs"]
mod tests;
