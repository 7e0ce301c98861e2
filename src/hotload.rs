//! Hot-Reload Dependency Tracking
//!
//! Maps source file paths to the programs built from them. Entries are arena
//! keys rather than owning references: the tracker never keeps a program
//! alive, and keys whose slot has since been freed (or reused under a newer
//! generation) are skipped when a change is dispatched.
//!
//! Effect descriptors are not tracked; only program sources and their
//! includes are.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use slotmap::{Key, SlotMap};
use smallvec::SmallVec;

/// Path → dependent program keys.
#[derive(Debug, Clone)]
pub struct HotReloadTracker<K: Key> {
    dependents: FxHashMap<PathBuf, SmallVec<[K; 4]>>,
}

impl<K: Key> Default for HotReloadTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> HotReloadTracker<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            dependents: FxHashMap::default(),
        }
    }

    /// Records that `key` was built from `path`. Registering twice is a no-op.
    pub fn register(&mut self, key: K, path: impl Into<PathBuf>) {
        let keys = self.dependents.entry(path.into()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Removes `key` from every path it was registered against.
    pub fn unregister(&mut self, key: K) {
        self.dependents.retain(|_, keys| {
            keys.retain(|k| *k != key);
            !keys.is_empty()
        });
    }

    /// Every key registered against `path`, live or not.
    #[must_use]
    pub fn dependents(&self, path: &Path) -> &[K] {
        self.dependents
            .get(path)
            .map_or(&[] as &[K], |keys| keys.as_slice())
    }

    /// Keys registered against `path` that still resolve in `arena`.
    pub fn live_dependents<'a, V>(
        &'a self,
        path: &Path,
        arena: &'a SlotMap<K, V>,
    ) -> impl Iterator<Item = K> + use<'a, K, V> {
        self.dependents(path)
            .iter()
            .copied()
            .filter(move |key| arena.contains_key(*key))
    }

    /// Number of paths with at least one registered dependent.
    #[must_use]
    pub fn tracked_paths(&self) -> usize {
        self.dependents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::new_key_type;

    new_key_type! {
        struct TestKey;
    }

    #[test]
    fn test_register_is_a_set() {
        let mut arena: SlotMap<TestKey, &str> = SlotMap::with_key();
        let a = arena.insert("a");
        let mut tracker = HotReloadTracker::new();

        tracker.register(a, "shaders/a.vs");
        tracker.register(a, "shaders/a.vs");

        assert_eq!(tracker.dependents(Path::new("shaders/a.vs")), &[a]);
        assert!(tracker.dependents(Path::new("shaders/b.vs")).is_empty());
    }

    #[test]
    fn test_dead_keys_are_skipped() {
        let mut arena: SlotMap<TestKey, &str> = SlotMap::with_key();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let mut tracker = HotReloadTracker::new();
        tracker.register(a, "common.h");
        tracker.register(b, "common.h");

        arena.remove(a);
        // Reuses a's slot with a newer generation
        let c = arena.insert("c");

        let live: Vec<_> = tracker.live_dependents(Path::new("common.h"), &arena).collect();
        assert_eq!(live, vec![b]);
        assert!(!live.contains(&c));
    }

    #[test]
    fn test_unregister_drops_empty_paths() {
        let mut arena: SlotMap<TestKey, &str> = SlotMap::with_key();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let mut tracker = HotReloadTracker::new();
        tracker.register(a, "a.vs");
        tracker.register(a, "common.h");
        tracker.register(b, "common.h");

        tracker.unregister(a);

        assert_eq!(tracker.tracked_paths(), 1);
        assert_eq!(tracker.dependents(Path::new("common.h")), &[b]);
    }
}
