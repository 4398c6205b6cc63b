//! Pixel buffers, their pool, the filter context and reference-counted filter results.

/// Filter context and its options.
pub mod context;
/// Reference-counted filter results.
pub mod data;
/// Size-bucketed raster pool.
pub mod pool;
/// Premultiplied RGBA8 buffers.
pub mod raster;
