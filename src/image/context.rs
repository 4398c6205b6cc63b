use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::image::pool::{RasterPool, RasterPoolOpts, RasterPoolStats};
use crate::image::raster::Raster;

/// Options for [`FilterContext::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterContextOpts {
    /// Limits for the context's raster pool.
    pub pool: RasterPoolOpts,
}

impl FilterContextOpts {
    /// Replace the pool limits.
    pub fn with_pool(mut self, pool: RasterPoolOpts) -> Self {
        self.pool = pool;
        self
    }
}

#[derive(Debug)]
pub(crate) struct ContextInner {
    id: u64,
    generation: AtomicU64,
    pool: Mutex<RasterPool>,
}

impl ContextInner {
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn pool(&self) -> MutexGuard<'_, RasterPool> {
        self.pool.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn release(&self, raster: Raster, generation: u64) {
        if generation != self.generation() || raster.byte_len() == 0 {
            return;
        }
        self.pool().release(raster);
    }
}

/// Rendering context: owns the raster pool and the validity generation of produced images.
///
/// Clones share the same pool and generation.
#[derive(Debug, Clone)]
pub struct FilterContext {
    inner: Arc<ContextInner>,
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::new(FilterContextOpts::default())
    }
}

impl FilterContext {
    /// Create a context with its own pool.
    pub fn new(opts: FilterContextOpts) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            inner: Arc::new(ContextInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                generation: AtomicU64::new(0),
                pool: Mutex::new(RasterPool::new(opts.pool)),
            }),
        }
    }

    /// Process-unique id, for diagnostics.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Current validity generation.
    pub fn generation(&self) -> u64 {
        self.inner.generation()
    }

    /// Mark every previously produced image as lost and drop retained rasters.
    pub fn invalidate(&self) {
        let g = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.pool().purge();
        tracing::debug!(ctx = self.inner.id, generation = g, "filter context invalidated");
    }

    /// Pool counters.
    pub fn pool_stats(&self) -> RasterPoolStats {
        self.inner.pool().stats()
    }

    pub(crate) fn borrow_raster(&self, width: u32, height: u32) -> Raster {
        self.inner.pool().borrow(width, height)
    }

    pub(crate) fn release_raster(&self, raster: Raster) {
        self.inner.release(raster, self.generation());
    }

    pub(crate) fn inner(&self) -> &Arc<ContextInner> {
        &self.inner
    }

    pub(crate) fn is(&self, inner: &Arc<ContextInner>) -> bool {
        Arc::ptr_eq(&self.inner, inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/image/context.rs"]
mod tests;
