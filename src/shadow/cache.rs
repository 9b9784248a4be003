use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use tracing::debug;

use super::raster::{rasterize_corner, rasterize_shadow};
use super::{PixelBuffer, ShadowResource, ShapeKey};

/// Memoizes rasterized shadows by [`ShapeKey`].
///
/// Lookups of shapes already in the cache only take a shared lock. On a miss,
/// the shadow is rasterized without holding any lock at all, and the exclusive
/// lock is only taken for the insert itself. If two callers race on the same
/// missing key, both rasterize, but the first insert wins and both get the
/// same resource back.
#[derive(Debug, Default)]
pub struct ShadowCache {
    entries: RwLock<HashMap<ShapeKey, Arc<ShadowResource>>>,
    rasterizations: AtomicUsize,
}

impl ShadowCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ShapeKey, Arc<ShadowResource>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ShapeKey, Arc<ShadowResource>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the shadow for `key`, rasterizing it if it is not cached yet.
    pub fn get(&self, key: &ShapeKey) -> Arc<ShadowResource> {
        if let Some(hit) = self.read().get(key) {
            trace!("shadow cache hit for {:?}", key);
            return Arc::clone(hit)
        }

        debug!("shadow cache miss for {:?}, rasterizing", key);
        let fresh = Arc::new(rasterize_shadow(key));
        self.rasterizations.fetch_add(1, Ordering::Relaxed);

        Arc::clone(self.write().entry(*key).or_insert(fresh))
    }

    /// Whether `key` has already been rasterized.
    pub fn contains(&self, key: &ShapeKey) -> bool {
        self.read().contains_key(key)
    }

    /// The number of cached shadows.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of shadows rasterized over the lifetime of the cache.
    pub fn rasterizations(&self) -> usize {
        self.rasterizations.load(Ordering::Relaxed)
    }

    /// Drops every cached shadow.
    ///
    /// Decorations holding on to a shadow keep it alive until they
    /// request a new one.
    pub fn invalidate_all(&self) {
        let mut entries = self.write();
        debug!("invalidating {} cached shadows", entries.len());
        entries.clear();
    }
}

/// Memoizes rounded-corner masks by radius.
#[derive(Debug, Default)]
pub struct CornerTextureCache {
    entries: RwLock<HashMap<i32, Arc<PixelBuffer>>>,
    rasterizations: AtomicUsize,
}

impl CornerTextureCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the corner mask for `radius`, rasterizing it if it is not cached yet.
    ///
    /// Radii below 1 are treated as 1.
    pub fn get(&self, radius: i32) -> Arc<PixelBuffer> {
        let radius = radius.max(1);
        let cached = self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&radius)
            .cloned();
        if let Some(hit) = cached {
            trace!("corner texture cache hit for radius {}", radius);
            return hit
        }

        debug!("rasterizing corner texture for radius {}", radius);
        let fresh = Arc::new(rasterize_corner(radius));
        self.rasterizations.fetch_add(1, Ordering::Relaxed);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(radius).or_insert(fresh))
    }

    /// The number of cached masks.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of masks rasterized over the lifetime of the cache.
    pub fn rasterizations(&self) -> usize {
        self.rasterizations.load(Ordering::Relaxed)
    }

    /// Drops every cached mask.
    pub fn release(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
