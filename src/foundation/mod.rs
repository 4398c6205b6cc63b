//! Shared geometry, pixel math, and the error taxonomy.

/// Geometry and color primitives.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
/// Pixel and transform math helpers.
pub mod math;
