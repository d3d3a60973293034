//! X-fast trie: a bounded-universe ordered set with `O(log log U)`
//! neighbor queries.
//!
//! Keys are paths through a binary trie of `BITS + 1` levels. Every
//! populated prefix is registered in a per-level hash map (the level
//! search structure), so the deepest populated ancestor of any key can
//! be found by binary search over levels. Leaves form a doubly-linked
//! list in key order. An interior node missing a subtree on one side
//! carries a *skip link* there instead: the left slot then points at
//! the smallest leaf below the node, the right slot at the largest.
//! Together these give the leaf adjacent to any query key in
//! `O(log BITS)` hash lookups, after which the leaf list answers
//! predecessor and successor in constant time.
//!
//! Mutations rebuild the affected root-to-leaf path: insertion
//! materializes missing interior nodes and tightens the skip links
//! along the path; removal prunes interior nodes whose subtree died and
//! re-aims skip links that referenced the removed leaf.

mod node;

use std::fmt;
use std::ptr;

use crate::key::Key;
use crate::key::LEFT;
use crate::key::RIGHT;
use crate::prefixmap::PrefixMap;
use node::XNode;

/// Representative leaf and its list neighbors, as keys. Used by the
/// y-fast trie to route to buckets without touching trie internals.
pub(crate) struct LeafView<K> {
    pub key: K,
    pub left: Option<K>,
    pub right: Option<K>,
}

/// Dynamic ordered set over a bounded integer universe.
pub struct XFastTrie<K: Key> {
    /// `BITS + 1` maps; level `l` holds every populated `l`-bit prefix.
    lss: Vec<PrefixMap<K, *mut XNode<K>>>,
    size: usize,
}

impl<K: Key> XFastTrie<K> {
    pub fn new() -> Self {
        let mut lss = Vec::with_capacity(K::BITS + 1);
        for _ in 0..=K::BITS {
            lss.push(PrefixMap::new());
        }
        XFastTrie { lss, size: 0 }
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

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, key: K) -> bool {
        self.lss[K::BITS].contains(&key)
    }

    /// The largest stored key strictly less than `key`.
    pub fn predecessor(&self, key: K) -> Option<K> {
        let node = self.predecessor_node(key);
        if node.is_null() {
            None
        } else {
            unsafe { Some((*node).key) }
        }
    }

    /// The smallest stored key strictly greater than `key`.
    pub fn successor(&self, key: K) -> Option<K> {
        let node = self.successor_node(key);
        if node.is_null() {
            None
        } else {
            unsafe { Some((*node).key) }
        }
    }

    pub fn min(&self) -> Option<K> {
        if self.is_empty() {
            return None;
        }
        if self.contains(K::MIN) {
            return Some(K::MIN);
        }
        self.successor(K::MIN)
    }

    pub fn max(&self) -> Option<K> {
        if self.is_empty() {
            return None;
        }
        if self.contains(K::MAX) {
            return Some(K::MAX);
        }
        self.predecessor(K::MAX)
    }

    /// Inserts `key`; present keys are a no-op.
    pub fn insert(&mut self, key: K) {
        if self.contains(key) {
            return;
        }

        // Splice a new leaf into the list between its neighbors.
        let (prev, next) = self.neighbors(key);
        let leaf = XNode::alloc_leaf(key, prev, next);
        self.lss[K::BITS].insert(key, leaf);
        self.size += 1;

        unsafe {
            if !prev.is_null() {
                (*prev).children[RIGHT].set_target(leaf);
            }
            if !next.is_null() {
                (*next).children[LEFT].set_target(leaf);
            }

            let root_prefix = key.prefix(0);
            let mut parent = match self.lss[0].get(&root_prefix) {
                Some(&root) => root,
                None => {
                    let root = XNode::alloc(root_prefix);
                    self.lss[0].insert(root_prefix, root);
                    root
                }
            };

            // Materialize the interior path and retarget skip links.
            for level in 1..K::BITS {
                let prefix = key.prefix(level);
                let dir = prefix.is_right() as usize;

                let child = (*parent).children[dir];
                if child.is_null() || child.is_skip() {
                    let interior = XNode::alloc(prefix);
                    self.lss[level].insert(prefix, interior);
                    (*parent).children[dir].set_target(interior);
                }

                // The off-path slot keeps pointing at the extreme leaf
                // of the parent's subtree: smallest on the left slot,
                // largest on the right.
                let off = &mut (*parent).children[dir ^ 1];
                if off.is_null() {
                    off.set_skip(leaf);
                } else if off.is_skip() {
                    let extreme = (*off.target()).key;
                    let replaces = if dir ^ 1 == LEFT {
                        key < extreme
                    } else {
                        key > extreme
                    };
                    if replaces {
                        off.set_skip(leaf);
                    }
                }

                parent = (*parent).children[dir].target();
            }

            // Hook the leaf below its level-`BITS - 1` parent.
            let dir = key.is_right() as usize;
            (*parent).children[dir].set_target(leaf);
            if (*parent).children[dir ^ 1].is_null() {
                (*parent).children[dir ^ 1].set_skip(leaf);
            }
        }
    }

    /// Removes `key`; absent keys are a no-op.
    pub fn remove(&mut self, key: K) {
        let Some(&leaf) = self.lss[K::BITS].get(&key) else {
            return;
        };
        unsafe {
            let prev = (*leaf).children[LEFT].target();
            let next = (*leaf).children[RIGHT].target();
            self.lss[K::BITS].remove(&key);
            self.size -= 1;

            if !prev.is_null() {
                (*prev).children[RIGHT].set_target(next);
            }
            if !next.is_null() {
                (*next).children[LEFT].set_target(prev);
            }

            // Walk the path bottom-up, pruning interior nodes whose
            // subtree died and repairing skip links on the rest.
            for level in (0..K::BITS).rev() {
                let prefix = key.prefix(level);
                let left_alive = self.lss[level + 1].contains(&prefix.left_child());
                let right_alive = self.lss[level + 1].contains(&prefix.right_child());
                if left_alive && right_alive {
                    continue;
                }

                let interior = self.lss[level]
                    .get(&prefix)
                    .copied()
                    .expect("level search structure lost a prefix on the removal path");

                if !left_alive && !right_alive {
                    self.lss[level].remove(&prefix);
                    XNode::free(interior);
                } else if !left_alive {
                    // The left subtree is gone; the slot becomes a skip
                    // link to the node's new smallest leaf, unless it
                    // already skips past the removed leaf.
                    let link = &mut (*interior).children[LEFT];
                    if link.target() == leaf || !link.is_skip() {
                        link.set_skip(next);
                    }
                } else {
                    let link = &mut (*interior).children[RIGHT];
                    if link.target() == leaf || !link.is_skip() {
                        link.set_skip(prev);
                    }
                }
            }
            XNode::free(leaf);
        }
    }

    /// Drops every node and resets the trie to empty.
    pub fn clear(&mut self) {
        for level in &mut self.lss {
            for &node in level.values() {
                unsafe { XNode::free(node) };
            }
            level.clear();
        }
        self.size = 0;
    }

    /// Level of the deepest populated ancestor of `key`.
    ///
    /// Binary search over levels; membership is monotone because every
    /// populated prefix has all its ancestors populated.
    fn longest_prefix_level(&self, key: K) -> usize {
        debug_assert!(!self.is_empty());
        let mut low = 0;
        let mut high = K::BITS;
        while low < high {
            let mid = (low + high + 1) / 2;
            if self.lss[mid].contains(&key.prefix(mid)) {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    /// The leaf adjacent to `key`'s position in the leaf list: `key`'s
    /// own leaf if stored, otherwise its predecessor or successor.
    ///
    /// Requires a non-empty trie.
    fn close_leaf(&self, key: K) -> *mut XNode<K> {
        let level = self.longest_prefix_level(key);
        let prefix = key.prefix(level);
        let node = self.lss[level]
            .get(&prefix)
            .copied()
            .expect("level search structure lost a matched prefix");
        if level == K::BITS {
            return node;
        }
        // The slot on the key's side cannot hold a real child: that
        // child's prefix would extend the match by one level. It is a
        // skip link to the nearest leaf on that side.
        let dir = key.prefix(level + 1).is_right() as usize;
        let link = unsafe { (*node).children[dir] };
        debug_assert!(link.is_skip(), "interior node missing a skip link");
        link.target()
    }

    fn predecessor_node(&self, key: K) -> *mut XNode<K> {
        if self.is_empty() {
            return ptr::null_mut();
        }
        let leaf = self.close_leaf(key);
        unsafe {
            if (*leaf).key >= key {
                (*leaf).children[LEFT].target()
            } else {
                leaf
            }
        }
    }

    fn successor_node(&self, key: K) -> *mut XNode<K> {
        if self.is_empty() {
            return ptr::null_mut();
        }
        let leaf = self.close_leaf(key);
        unsafe {
            if (*leaf).key <= key {
                (*leaf).children[RIGHT].target()
            } else {
                leaf
            }
        }
    }

    /// The stored neighbors `(predecessor, successor)` of `key`, either
    /// of which may be null.
    fn neighbors(&self, key: K) -> (*mut XNode<K>, *mut XNode<K>) {
        if self.is_empty() {
            return (ptr::null_mut(), ptr::null_mut());
        }
        let leaf = self.close_leaf(key);
        unsafe {
            if key < (*leaf).key {
                ((*leaf).children[LEFT].target(), leaf)
            } else if key > (*leaf).key {
                (leaf, (*leaf).children[RIGHT].target())
            } else {
                (
                    (*leaf).children[LEFT].target(),
                    (*leaf).children[RIGHT].target(),
                )
            }
        }
    }

    /// The leaf of the smallest stored key `>= key`, with its list
    /// neighbors. This is the inclusive form of `successor`, kept
    /// internal: the y-fast trie routes with it, while the public API
    /// stays strict.
    pub(crate) fn inclusive_successor_leaf(&self, key: K) -> Option<LeafView<K>> {
        let node = match self.lss[K::BITS].get(&key) {
            Some(&leaf) => leaf,
            None => self.successor_node(key),
        };
        if node.is_null() {
            return None;
        }
        unsafe {
            let left = (*node).children[LEFT].target();
            let right = (*node).children[RIGHT].target();
            Some(LeafView {
                key: (*node).key,
                left: if left.is_null() {
                    None
                } else {
                    Some((*left).key)
                },
                right: if right.is_null() {
                    None
                } else {
                    Some((*right).key)
                },
            })
        }
    }
}

impl<K: Key> Default for XFastTrie<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> Drop for XFastTrie<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Key> fmt::Debug for XFastTrie<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XFastTrie").field("len", &self.size).finish()
    }
}
