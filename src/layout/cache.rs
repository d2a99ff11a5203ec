//! Arrangement cache.
//!
//! An arrangement is a pure function of the container, the space it is
//! given, its children (and their style versions), its own style version and
//! the viewport. [`ArrangementKey`] captures all of those, so a hit is always
//! safe to reuse. Content changes are not part of the key; the engine
//! bypasses and [`invalidate`](ArrangementCache::invalidate)s the entries
//! of containers whose layout was marked dirty.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::dom::NodeId;
use crate::geometry::Size;

use super::arrange::Arrangement;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrangementKey {
    pub container: NodeId,
    /// Content-box size offered to the container.
    pub size: Size,
    /// The displayed children and their style versions, in order.
    pub children: Box<[(NodeId, u64)]>,
    pub style_version: u64,
    pub viewport: Size,
}

impl ArrangementKey {
    pub fn new(
        container: NodeId,
        size: Size,
        style_version: u64,
        viewport: Size,
        children: impl IntoIterator<Item = (NodeId, u64)>,
    ) -> Self {
        Self { container, size, children: children.into_iter().collect(), style_version, viewport }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU map from [`ArrangementKey`] to a shared [`Arrangement`].
pub struct ArrangementCache {
    entries: LruCache<ArrangementKey, Arc<Arrangement>>,
    stats: CacheStats,
}

impl ArrangementCache {
    /// A cache holding at most `capacity` arrangements (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: LruCache::new(capacity), stats: CacheStats::default() }
    }

    pub fn get(&mut self, key: &ArrangementKey) -> Option<Arc<Arrangement>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, key: ArrangementKey, arrangement: Arc<Arrangement>) {
        self.entries.put(key, arrangement);
    }

    /// Drop every entry for `container`, whatever size it was computed at.
    pub fn invalidate(&mut self, container: NodeId) {
        let stale: Vec<ArrangementKey> =
            self.entries.iter().map(|(key, _)| key).filter(|key| key.container == container).cloned().collect();
        for key in stale {
            self.entries.pop(&key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl Default for ArrangementCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::arrange::tests::ids;

    fn key(container: NodeId, width: i32, children: &[(NodeId, u64)]) -> ArrangementKey {
        ArrangementKey::new(container, Size::new(width, 10), 0, Size::new(80, 24), children.iter().copied())
    }

    #[test]
    fn fingerprint_tracks_children_and_versions() {
        let nodes = ids(3);
        let base = key(nodes[0], 10, &[(nodes[1], 0), (nodes[2], 0)]);
        assert_eq!(base, key(nodes[0], 10, &[(nodes[1], 0), (nodes[2], 0)]));
        assert_ne!(base, key(nodes[0], 10, &[(nodes[2], 0), (nodes[1], 0)]));
        assert_ne!(base, key(nodes[0], 10, &[(nodes[1], 1), (nodes[2], 0)]));
        assert_ne!(base, key(nodes[0], 10, &[(nodes[1], 0)]));
        assert_ne!(base, key(nodes[0], 11, &[(nodes[1], 0), (nodes[2], 0)]));
    }

    #[test]
    fn keys_keep_every_child_rather_than_a_digest() {
        let nodes = ids(3);
        let base = key(nodes[0], 10, &[(nodes[1], 7), (nodes[2], 3)]);
        assert_eq!(&*base.children, &[(nodes[1], 7), (nodes[2], 3)]);

        let mut cache = ArrangementCache::new(4);
        cache.insert(base.clone(), Arc::new(Arrangement::default()));
        assert!(cache.get(&key(nodes[0], 10, &[(nodes[1], 3), (nodes[2], 7)])).is_none());
        assert!(cache.get(&key(nodes[0], 10, &[(nodes[2], 3), (nodes[1], 7)])).is_none());
        assert!(cache.get(&base).is_some());
    }

    #[test]
    fn hit_and_miss_are_counted() {
        let nodes = ids(2);
        let mut cache = ArrangementCache::new(4);
        let k = key(nodes[0], 10, &[(nodes[1], 0)]);
        assert!(cache.get(&k).is_none());
        cache.insert(k.clone(), Arc::new(Arrangement::default()));
        assert!(cache.get(&k).is_some());
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let nodes = ids(1);
        let mut cache = ArrangementCache::new(2);
        let (a, b, c) = (key(nodes[0], 1, &[]), key(nodes[0], 2, &[]), key(nodes[0], 3, &[]));
        cache.insert(a.clone(), Arc::new(Arrangement::default()));
        cache.insert(b.clone(), Arc::new(Arrangement::default()));
        cache.get(&a);
        cache.insert(c, Arc::new(Arrangement::default()));
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_drops_every_size_of_one_container() {
        let nodes = ids(2);
        let mut cache = ArrangementCache::default();
        cache.insert(key(nodes[0], 1, &[]), Arc::new(Arrangement::default()));
        cache.insert(key(nodes[0], 2, &[]), Arc::new(Arrangement::default()));
        cache.insert(key(nodes[1], 1, &[]), Arc::new(Arrangement::default()));
        cache.invalidate(nodes[0]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key(nodes[1], 1, &[])).is_some());
    }

    #[test]
    fn zero_capacity_means_one() {
        assert_eq!(ArrangementCache::new(0).capacity(), 1);
        assert_eq!(ArrangementCache::default().capacity(), DEFAULT_CAPACITY);
    }
}
