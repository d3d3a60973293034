//! Y-fast trie: the x-fast trie's query speed at `O(n)` space.
//!
//! Keys are partitioned into buckets of `Θ(BITS)` keys, each a
//! red-black tree. A bucket is addressed by its *representative* — its
//! maximum key — and the representatives are indexed by an x-fast trie.
//! A query routes through the index to the bucket that would hold the
//! key (the smallest representative at or above it) in `O(log log U)`,
//! then finishes inside the bucket in `O(log BITS)`, which is the same
//! bound.
//!
//! Buckets hold between `BITS / 2` and `2 * BITS` keys (the sole bucket
//! may be smaller). An insertion overflowing a bucket splits it in two;
//! a removal underflowing one merges it with a neighbor, splitting
//! again if the merge overshoots. The bounds keep bucket work constant
//! per operation while amortizing index updates, which cost `O(BITS)`
//! hash-map writes, over `Ω(BITS)` bucket mutations.

use std::fmt;

use crate::key::Key;
use crate::prefixmap::PrefixMap;
use crate::rbtree::RbTree;
use crate::xfast::XFastTrie;

/// Dynamic ordered set over a bounded integer universe.
pub struct YFastTrie<K: Key> {
    /// X-fast trie over the bucket representatives.
    index: XFastTrie<K>,
    /// Buckets keyed by their representative, i.e. their maximum key.
    buckets: PrefixMap<K, RbTree<K>>,
    size: usize,
}

impl<K: Key> YFastTrie<K> {
    pub fn new() -> Self {
        YFastTrie {
            index: XFastTrie::new(),
            buckets: PrefixMap::new(),
            size: 0,
        }
    }

    /// Largest representable key.
    pub fn upper_bound() -> K {
        K::MAX
    }

    /// Smallest representable key.
    pub fn lower_bound() -> K {
        K::MIN
    }

    /// Width of the keys in bits.
    pub fn bit_length() -> usize {
        K::BITS
    }

    fn max_bucket_len() -> usize {
        K::BITS * 2
    }

    fn min_bucket_len() -> usize {
        K::BITS / 2
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, key: K) -> bool {
        match self.index.inclusive_successor_leaf(key) {
            Some(rep) => self.bucket(rep.key).contains(key),
            None => false,
        }
    }

    /// The largest stored key strictly less than `key`.
    pub fn predecessor(&self, key: K) -> Option<K> {
        let Some(rep) = self.index.inclusive_successor_leaf(key) else {
            // Every stored key is below `key`.
            return self.max();
        };
        let bucket = self.bucket(rep.key);
        let min = bucket.min().expect("empty bucket in the index");
        if min >= key {
            // The whole bucket is at or above `key`; the predecessor
            // lives in the bucket to the left, as its maximum.
            let left = rep.left?;
            self.bucket(left).predecessor(key)
        } else {
            bucket.predecessor(key)
        }
    }

    /// The smallest stored key strictly greater than `key`.
    pub fn successor(&self, key: K) -> Option<K> {
        let rep = self.index.inclusive_successor_leaf(key)?;
        let bucket = self.bucket(rep.key);
        let max = bucket.max().expect("empty bucket in the index");
        if max <= key {
            // `key` is this bucket's representative; the successor is
            // the right neighbor's minimum.
            let right = rep.right?;
            self.bucket(right).successor(key)
        } else {
            bucket.successor(key)
        }
    }

    pub fn min(&self) -> Option<K> {
        let rep = self.index.min()?;
        self.bucket(rep).min()
    }

    pub fn max(&self) -> Option<K> {
        let rep = self.index.max()?;
        self.bucket(rep).max()
    }

    /// Inserts `key`; present keys are a no-op.
    pub fn insert(&mut self, key: K) {
        match self.index.inclusive_successor_leaf(key) {
            Some(rep) => {
                let bucket = self
                    .buckets
                    .get_mut(&rep.key)
                    .expect("representative without a bucket");
                if bucket.contains(key) {
                    return;
                }
                bucket.insert(key);
                self.size += 1;
                if bucket.len() > Self::max_bucket_len() {
                    let bucket = self.detach(rep.key);
                    self.install(bucket);
                }
            }
            None => {
                // `key` exceeds every representative: it joins the
                // right-most bucket and becomes its new maximum. On an
                // empty trie that bucket is created here.
                self.size += 1;
                let mut bucket = match self.index.max() {
                    Some(last) => self.detach(last),
                    None => RbTree::new(),
                };
                bucket.insert(key);
                self.install(bucket);
            }
        }
    }

    /// Removes `key`; absent keys are a no-op.
    pub fn remove(&mut self, key: K) {
        let Some(rep) = self.index.inclusive_successor_leaf(key) else {
            return;
        };
        let bucket = self
            .buckets
            .get_mut(&rep.key)
            .expect("representative without a bucket");
        if !bucket.contains(key) {
            return;
        }
        bucket.remove(key);
        self.size -= 1;
        let emptied = bucket.is_empty();
        let undersized = bucket.len() < Self::min_bucket_len();

        if emptied {
            self.detach(rep.key);
        } else if undersized && self.buckets.len() > 1 {
            // Merge with the right neighbor when there is one, else the
            // left. A merge that overshoots the cap is split right
            // back; `install` handles both outcomes and re-keys under
            // the fresh maxima, which also retires a now-stale
            // representative.
            let (left_rep, right_rep) = match rep.right {
                Some(right) => (rep.key, right),
                None => (
                    rep.left.expect("undersized bucket with no neighbor"),
                    rep.key,
                ),
            };
            let left = self.detach(left_rep);
            let right = self.detach(right_rep);
            let merged = RbTree::merge(left, right);
            self.install(merged);
        } else if key == rep.key {
            // The bucket lost its maximum; re-key it under the new one.
            let bucket = self.detach(rep.key);
            self.install(bucket);
        }
    }

    /// Drops every bucket and resets the trie to empty.
    pub fn clear(&mut self) {
        self.index.clear();
        self.buckets.clear();
        self.size = 0;
    }

    fn bucket(&self, rep: K) -> &RbTree<K> {
        self.buckets
            .get(&rep)
            .expect("representative without a bucket")
    }

    /// Unregisters and returns the bucket of `rep`.
    fn detach(&mut self, rep: K) -> RbTree<K> {
        self.index.remove(rep);
        self.buckets
            .remove(&rep)
            .expect("representative without a bucket")
    }

    /// Registers `bucket` under its maximum key, splitting first if it
    /// exceeds the size cap.
    fn install(&mut self, bucket: RbTree<K>) {
        if bucket.len() > Self::max_bucket_len() {
            let (left, right) = bucket.split();
            self.install_one(left);
            self.install_one(right);
        } else {
            self.install_one(bucket);
        }
    }

    fn install_one(&mut self, bucket: RbTree<K>) {
        let rep = bucket.max().expect("cannot install an empty bucket");
        self.index.insert(rep);
        self.buckets.insert(rep, bucket);
    }
}

impl<K: Key> Default for YFastTrie<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> fmt::Debug for YFastTrie<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YFastTrie").field("len", &self.size).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    impl<K: Key> YFastTrie<K> {
        /// Asserts the bucket-partition invariants: representatives are
        /// bucket maxima, sizes stay within bounds, and the index
        /// matches the bucket map exactly.
        fn check_buckets(&self) {
            assert_eq!(self.buckets.len(), self.index.len());
            let mut total = 0;
            for (&rep, bucket) in self.buckets.iter() {
                assert!(self.index.contains(rep), "bucket without a representative");
                assert_eq!(bucket.max(), Some(rep), "representative is not the maximum");
                assert!(bucket.len() <= Self::max_bucket_len(), "oversized bucket");
                if self.buckets.len() > 1 {
                    assert!(bucket.len() >= Self::min_bucket_len(), "undersized bucket");
                } else {
                    assert!(!bucket.is_empty(), "empty bucket left behind");
                }
                total += bucket.len();
            }
            assert_eq!(total, self.size, "bucket sizes do not add up");
        }
    }

    #[test]
    fn empty_trie() {
        let trie: YFastTrie<u16> = YFastTrie::new();
        assert_eq!(trie.len(), 0);
        assert!(trie.is_empty());
        assert!(!trie.contains(42));
        assert_eq!(trie.predecessor(42), None);
        assert_eq!(trie.successor(42), None);
        assert_eq!(trie.min(), None);
        assert_eq!(trie.max(), None);
    }

    #[test]
    fn singleton() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        trie.insert(5);
        trie.insert(5);
        assert_eq!(trie.len(), 1);
        assert!(trie.contains(5));
        assert!(!trie.contains(6));
        assert_eq!(trie.predecessor(5), None);
        assert_eq!(trie.successor(5), None);
        assert_eq!(trie.min(), Some(5));
        assert_eq!(trie.max(), Some(5));
        trie.check_buckets();
    }

    #[test]
    fn neighbors_around_stored_and_absent_keys() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        for key in [7, 11, 16] {
            trie.insert(key);
        }
        assert_eq!(trie.successor(11), Some(16));
        assert_eq!(trie.predecessor(11), Some(7));
        assert_eq!(trie.successor(10), Some(11));
        assert_eq!(trie.predecessor(10), Some(7));
        assert_eq!(trie.successor(16), None);
        assert_eq!(trie.predecessor(7), None);
        assert_eq!(trie.predecessor(200), Some(16));
        trie.check_buckets();
    }

    #[test]
    fn remove_to_empty() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        trie.insert(5);
        trie.remove(5);
        trie.remove(5);
        assert_eq!(trie.len(), 0);
        assert!(!trie.contains(5));
        assert_eq!(trie.min(), None);
        assert_eq!(trie.max(), None);
        trie.check_buckets();
    }

    #[test]
    fn ascending_inserts_keep_buckets_legal() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        for key in 0..=255 {
            trie.insert(key);
            trie.check_buckets();
        }
        assert_eq!(trie.len(), 256);
    }

    #[test]
    fn dense_u8_universe() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        for step in 0..=255u8 {
            trie.insert(step.wrapping_mul(37).wrapping_add(101));
        }
        assert_eq!(trie.len(), 256);
        trie.check_buckets();
        for key in 1..=254u8 {
            assert_eq!(trie.predecessor(key), Some(key - 1));
            assert_eq!(trie.successor(key), Some(key + 1));
        }
        assert_eq!(trie.predecessor(0), None);
        assert_eq!(trie.successor(255), None);
        assert_eq!(trie.min(), Some(0));
        assert_eq!(trie.max(), Some(255));
        for key in 0..=255u8 {
            trie.remove(key);
        }
        assert_eq!(trie.len(), 0);
        assert!(!trie.contains(0));
        assert_eq!(trie.min(), None);
        assert_eq!(trie.max(), None);
        trie.check_buckets();
    }

    #[test]
    fn removal_of_representatives_rekeys_buckets() {
        let mut trie: YFastTrie<u8> = YFastTrie::new();
        for key in 0..=255 {
            trie.insert(key);
        }
        // Removing from the top repeatedly hits the right-most
        // representative.
        for key in (0..=255u8).rev() {
            trie.remove(key);
            trie.check_buckets();
            if key > 0 {
                assert_eq!(trie.max(), Some(key - 1));
            }
        }
        assert!(trie.is_empty());
    }

    proptest! {
        #[test]
        fn matches_btreeset(ops in prop::collection::vec((any::<bool>(), any::<u8>()), 1..400)) {
            let mut trie: YFastTrie<u8> = YFastTrie::new();
            let mut model = BTreeSet::new();
            for (is_insert, key) in ops {
                if is_insert {
                    trie.insert(key);
                    model.insert(key);
                } else {
                    trie.remove(key);
                    model.remove(&key);
                }
            }
            trie.check_buckets();
            prop_assert_eq!(trie.len(), model.len());
            prop_assert_eq!(trie.min(), model.iter().next().copied());
            prop_assert_eq!(trie.max(), model.iter().next_back().copied());
            for probe in 0..=255u8 {
                prop_assert_eq!(trie.contains(probe), model.contains(&probe));
                prop_assert_eq!(trie.predecessor(probe), model.range(..probe).next_back().copied());
                let mut above = model.range(probe..).copied();
                let succ = match above.next() {
                    Some(k) if k == probe => above.next(),
                    other => other,
                };
                prop_assert_eq!(trie.successor(probe), succ);
            }
        }

        #[test]
        fn wide_keys_sparse(keys in prop::collection::btree_set(any::<u32>(), 1..500)) {
            let mut trie: YFastTrie<u32> = YFastTrie::new();
            for &key in &keys {
                trie.insert(key);
            }
            trie.check_buckets();
            prop_assert_eq!(trie.len(), keys.len());
            let sorted: Vec<u32> = keys.iter().copied().collect();
            for pair in sorted.windows(2) {
                prop_assert_eq!(trie.successor(pair[0]), Some(pair[1]));
                prop_assert_eq!(trie.predecessor(pair[1]), Some(pair[0]));
            }
            prop_assert_eq!(trie.min(), sorted.first().copied());
            prop_assert_eq!(trie.max(), sorted.last().copied());
        }
    }
}
