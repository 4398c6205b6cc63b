//! shadefx pairs a shader-language symbol resolver with a CPU pixel-effect graph.
//!
//! Two independent halves share the error taxonomy in [`foundation`]:
//!
//! - [`shader`]: type catalogue, builtin symbols, a scoped [`SymbolTable`] and
//!   [`compile_unit`], which resolves every call in an already-parsed [`Unit`].
//! - [`effects`] and [`render`]: a DAG of [`EffectRef`] nodes filtered into reference-counted
//!   [`ImageData`] under an affine transform and clip, backed by a pooled [`FilterContext`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Effect graph nodes and composite effects.
pub mod effects;
/// Geometry, pixel math and errors.
pub mod foundation;
/// Pixel buffers and filter results.
pub mod image;
/// Frame entry points and render targets.
pub mod render;
/// Shader symbol resolution.
pub mod shader;

pub use crate::foundation::core::{Affine, PixelRect, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{ScopeKind, ShadefxError, ShadefxResult};

pub use crate::shader::ast::Unit;
pub use crate::shader::catalogue::CoreSymbols;
pub use crate::shader::compile::{CompiledUnit, ResolvedCall, compile_unit};
pub use crate::shader::symbols::{Function, Param, Qualifier, Variable};
pub use crate::shader::table::SymbolTable;
pub use crate::shader::types::{BaseType, Type};

pub use crate::effects::blend::BlendMode;
pub use crate::effects::bloom::Bloom;
pub use crate::effects::drop_shadow::{DropShadow, ShadowMode};
pub use crate::effects::graph::{EffectKind, EffectRef};
pub use crate::image::context::{FilterContext, FilterContextOpts};
pub use crate::image::data::ImageData;
pub use crate::image::pool::{RasterPoolOpts, RasterPoolStats};
pub use crate::image::raster::Raster;
pub use crate::render::{ImageDataRenderer, RasterTarget, render_effect, render_effect_to};
