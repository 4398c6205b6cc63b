use std::collections::HashMap;

use crate::image::raster::{Raster, byte_len};

/// Retention limits for a [`RasterPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPoolOpts {
    /// Maximum bytes retained across all buckets.
    pub max_pool_bytes: usize,
    /// Maximum number of retained rasters per `(width, height)` bucket.
    pub max_surfaces_per_bucket: usize,
}

impl Default for RasterPoolOpts {
    fn default() -> Self {
        Self {
            max_pool_bytes: 64 * 1024 * 1024,
            max_surfaces_per_bucket: 4,
        }
    }
}

impl RasterPoolOpts {
    /// Set the global byte cap (`0` disables retention).
    pub fn with_max_pool_bytes(mut self, bytes: usize) -> Self {
        self.max_pool_bytes = bytes;
        self
    }

    /// Set the per-bucket cap (`0` disables retention).
    pub fn with_max_surfaces_per_bucket(mut self, n: usize) -> Self {
        self.max_surfaces_per_bucket = n;
        self
    }
}

/// Counters describing pool behaviour since creation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RasterPoolStats {
    /// Rasters currently held for reuse.
    pub retained_surfaces: usize,
    /// Bytes currently held for reuse.
    pub retained_bytes: usize,
    /// Fresh allocations made by `borrow`.
    pub alloc_surfaces: u64,
    /// Bytes allocated by `borrow`.
    pub alloc_bytes: u64,
    /// Borrows served from a bucket.
    pub reused_surfaces: u64,
    /// Releases that dropped the raster instead of retaining it.
    pub dropped_on_release: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RasterKey {
    w: u32,
    h: u32,
}

impl RasterKey {
    fn byte_len(self) -> usize {
        byte_len(self.w, self.h)
    }
}

#[derive(Debug)]
struct Bucket {
    rasters: Vec<Raster>,
}

/// Bounded cache of rasters keyed by size.
///
/// Borrowing hands out a cleared raster; releasing keeps it only while both caps allow.
#[derive(Debug)]
pub struct RasterPool {
    opts: RasterPoolOpts,
    stats: RasterPoolStats,
    buckets: HashMap<RasterKey, Bucket>,
}

impl RasterPool {
    /// Empty pool with the given limits.
    pub fn new(opts: RasterPoolOpts) -> Self {
        Self {
            opts,
            stats: RasterPoolStats::default(),
            buckets: HashMap::new(),
        }
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> RasterPoolStats {
        self.stats.clone()
    }

    /// Take a transparent raster of the given size, reusing a retained one when possible.
    pub fn borrow(&mut self, width: u32, height: u32) -> Raster {
        let key = RasterKey {
            w: width,
            h: height,
        };
        if let Some(bucket) = self.buckets.get_mut(&key)
            && let Some(mut r) = bucket.rasters.pop()
        {
            self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_sub(1);
            self.stats.retained_bytes = self.stats.retained_bytes.saturating_sub(key.byte_len());
            self.stats.reused_surfaces = self.stats.reused_surfaces.saturating_add(1);
            r.clear();
            return r;
        }

        self.stats.alloc_surfaces = self.stats.alloc_surfaces.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(key.byte_len() as u64);
        tracing::trace!(width, height, "raster pool miss");
        Raster::new(width, height)
    }

    /// Hand a raster back; it is retained or dropped according to the caps.
    pub fn release(&mut self, raster: Raster) {
        if self.opts.max_pool_bytes == 0 || self.opts.max_surfaces_per_bucket == 0 {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let key = RasterKey {
            w: raster.width(),
            h: raster.height(),
        };
        let bytes = key.byte_len();
        if self.stats.retained_bytes.saturating_add(bytes) > self.opts.max_pool_bytes {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        let bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            rasters: Vec::new(),
        });
        if bucket.rasters.len() >= self.opts.max_surfaces_per_bucket {
            self.stats.dropped_on_release = self.stats.dropped_on_release.saturating_add(1);
            return;
        }

        bucket.rasters.push(raster);
        self.stats.retained_surfaces = self.stats.retained_surfaces.saturating_add(1);
        self.stats.retained_bytes = self.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drop every retained raster.
    pub fn purge(&mut self) {
        self.buckets.clear();
        self.stats.retained_surfaces = 0;
        self.stats.retained_bytes = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/pool.rs"]
mod tests;
