//! Hash maps keyed by prefixes, hashed with randomly keyed SipHash.
//!
//! The level-search structure and the bucket index only need point
//! lookups, insertion, and removal over small integers; iteration order
//! is irrelevant. This wraps the standard hash map with an explicitly
//! keyed `SipHasher13` so the hash function is pinned rather than left
//! to whatever the standard library currently defaults to. Each map
//! draws its own key pair at construction.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::hash::Hash;

use rand::thread_rng;
use rand::RngCore;
use siphasher::sip::SipHasher13;

/// Build-hasher holding one map's random SipHash key.
#[derive(Clone)]
pub(crate) struct SipState {
    key0: u64,
    key1: u64,
}

impl Default for SipState {
    fn default() -> Self {
        let mut rng = thread_rng();
        SipState {
            key0: rng.next_u64(),
            key1: rng.next_u64(),
        }
    }
}

impl BuildHasher for SipState {
    type Hasher = SipHasher13;

    fn build_hasher(&self) -> SipHasher13 {
        SipHasher13::new_with_keys(self.key0, self.key1)
    }
}

/// Map from key prefixes to per-prefix payloads.
pub(crate) struct PrefixMap<K, V> {
    inner: HashMap<K, V, SipState>,
}

impl<K: Eq + Hash, V> PrefixMap<K, V> {
    pub(crate) fn new() -> Self {
        PrefixMap {
            inner: HashMap::with_hasher(SipState::default()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.remove(key)
    }

    pub(crate) fn values(&self) -> hash_map::Values<'_, K, V> {
        self.inner.values()
    }

    pub(crate) fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.inner.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<K: Eq + Hash, V> Default for PrefixMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_operations() {
        let mut map: PrefixMap<u8, &str> = PrefixMap::new();
        assert!(!map.contains(&3));
        assert_eq!(map.insert(3, "a"), None);
        assert_eq!(map.insert(3, "b"), Some("a"));
        assert!(map.contains(&3));
        assert_eq!(map.get(&3), Some(&"b"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.remove(&3), Some("b"));
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn iteration_visits_every_entry() {
        let mut map: PrefixMap<u16, u16> = PrefixMap::new();
        for key in 0..64u16 {
            map.insert(key, key * 2);
        }
        let mut seen: Vec<u16> = map.iter().map(|(&k, &v)| {
            assert_eq!(v, k * 2);
            k
        }).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..64).collect::<Vec<u16>>());
        assert_eq!(map.values().count(), 64);
        map.clear();
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn maps_with_distinct_keys_agree_on_content() {
        let mut left: PrefixMap<u32, ()> = PrefixMap::new();
        let mut right: PrefixMap<u32, ()> = PrefixMap::new();
        for key in [7u32, 11, 16, 42] {
            left.insert(key, ());
            right.insert(key, ());
        }
        for key in [7u32, 11, 16, 42, 43] {
            assert_eq!(left.contains(&key), right.contains(&key));
        }
    }
}
