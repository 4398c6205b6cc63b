//! Effect graph nodes, their pixel kernels and the composite effects built from them.

/// Crop and brightpass kernels.
pub(crate) mod adjust;
/// Blend modes and merge.
pub mod blend;
/// Bloom composite.
pub mod bloom;
/// Gaussian blur and shadow kernels.
pub mod blur;
/// Drop shadow composite.
pub mod drop_shadow;
/// Node handles and the bounds / clip / filter walk.
pub mod graph;
/// Flood and identity sources.
pub(crate) mod source;
