//! Red-black tree over copyable ordered keys.
//!
//! This is the bucket type of the y-fast trie, so besides the ordered
//! set operations it supports `median`, `split`, and `merge`. Split and
//! merge do not rebalance incrementally: they collect the nodes into a
//! sorted vector and rebuild balanced trees from it in linear time,
//! recycling every node. The rebuilt tree is colored all black except
//! the deepest level, which is red; that coloring satisfies the
//! red-black invariants for any node count.
//!
//! Rebalancing after point insertion and removal follows the classic
//! Cormen et al. case analysis, with null links standing in for the nil
//! sentinel.

mod node;

use std::fmt;
use std::ptr;

use node::Color;
use node::Link;
use node::RbNode;

use crate::key::LEFT;
use crate::key::RIGHT;

/// Self-balancing ordered set with linear-time split and merge.
pub struct RbTree<K> {
    root: Link<K>,
    size: usize,
    // Lazy extremum caches: maintained by insert and rebuild,
    // invalidated by remove, recomputed on demand.
    min: Link<K>,
    max: Link<K>,
}

impl<K> RbTree<K> {
    pub fn new() -> Self {
        RbTree {
            root: ptr::null_mut(),
            size: 0,
            min: ptr::null_mut(),
            max: ptr::null_mut(),
        }
    }

    /// Number of keys in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drops every node and resets the tree to empty.
    pub fn clear(&mut self) {
        let mut stack = Vec::new();
        if !self.root.is_null() {
            stack.push(self.root);
        }
        unsafe {
            while let Some(node) = stack.pop() {
                for child in (*node).children {
                    if !child.is_null() {
                        stack.push(child);
                    }
                }
                RbNode::free(node);
            }
        }
        self.release();
    }

    /// Forgets all nodes without freeing them. The caller has taken
    /// ownership of every node, or has already freed them.
    fn release(&mut self) {
        self.root = ptr::null_mut();
        self.size = 0;
        self.min = ptr::null_mut();
        self.max = ptr::null_mut();
    }
}

impl<K: Copy + Ord> RbTree<K> {
    pub fn contains(&self, key: K) -> bool {
        !self.find(key).is_null()
    }

    /// The largest stored key strictly less than `key`.
    pub fn predecessor(&self, key: K) -> Option<K> {
        let mut best = None;
        let mut cur = self.root;
        unsafe {
            while !cur.is_null() {
                if (*cur).key < key {
                    best = Some((*cur).key);
                    cur = (*cur).children[RIGHT];
                } else {
                    cur = (*cur).children[LEFT];
                }
            }
        }
        best
    }

    /// The smallest stored key strictly greater than `key`.
    pub fn successor(&self, key: K) -> Option<K> {
        let mut best = None;
        let mut cur = self.root;
        unsafe {
            while !cur.is_null() {
                if (*cur).key > key {
                    best = Some((*cur).key);
                    cur = (*cur).children[LEFT];
                } else {
                    cur = (*cur).children[RIGHT];
                }
            }
        }
        best
    }

    pub fn min(&self) -> Option<K> {
        unsafe {
            if !self.min.is_null() {
                return Some((*self.min).key);
            }
            if self.root.is_null() {
                return None;
            }
            let mut cur = self.root;
            while !(*cur).children[LEFT].is_null() {
                cur = (*cur).children[LEFT];
            }
            Some((*cur).key)
        }
    }

    pub fn max(&self) -> Option<K> {
        unsafe {
            if !self.max.is_null() {
                return Some((*self.max).key);
            }
            if self.root.is_null() {
                return None;
            }
            let mut cur = self.root;
            while !(*cur).children[RIGHT].is_null() {
                cur = (*cur).children[RIGHT];
            }
            Some((*cur).key)
        }
    }

    /// The `len / 2`-th key in sorted order.
    ///
    /// Panics on an empty tree.
    pub fn median(&self) -> K {
        assert!(!self.is_empty(), "median of an empty tree");
        let keys = self.keys();
        keys[keys.len() / 2]
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<K> {
        let mut nodes = Vec::with_capacity(self.size);
        self.collect(&mut nodes);
        unsafe { nodes.iter().map(|&node| (*node).key).collect() }
    }

    /// Inserts `key`; present keys are left untouched.
    pub fn insert(&mut self, key: K) {
        if self.root.is_null() {
            let node = RbNode::alloc(key, Color::Black, ptr::null_mut());
            self.root = node;
            self.size = 1;
            self.min = node;
            self.max = node;
            return;
        }
        unsafe {
            let mut cur = self.root;
            loop {
                if (*cur).key == key {
                    return;
                }
                let dir = ((*cur).key < key) as usize;
                let next = (*cur).children[dir];
                if next.is_null() {
                    let node = RbNode::alloc(key, Color::Red, cur);
                    (*cur).children[dir] = node;
                    self.size += 1;
                    if !self.min.is_null() && key < (*self.min).key {
                        self.min = node;
                    }
                    if !self.max.is_null() && key > (*self.max).key {
                        self.max = node;
                    }
                    self.insert_fixup(node);
                    return;
                }
                cur = next;
            }
        }
    }

    /// Removes `key`; absent keys are a no-op.
    pub fn remove(&mut self, key: K) {
        let target = self.find(key);
        if target.is_null() {
            return;
        }
        unsafe {
            self.size -= 1;
            self.min = ptr::null_mut();
            self.max = ptr::null_mut();

            let mut removed_color = (*target).color;
            let fix_child: Link<K>;
            let fix_parent: Link<K>;

            if (*target).children[LEFT].is_null() {
                fix_child = (*target).children[RIGHT];
                fix_parent = (*target).parent;
                self.transplant(target, fix_child);
            } else if (*target).children[RIGHT].is_null() {
                fix_child = (*target).children[LEFT];
                fix_parent = (*target).parent;
                self.transplant(target, fix_child);
            } else {
                // Interior node: splice out the in-order successor,
                // which has no left child, and move it into place.
                let mut succ = (*target).children[RIGHT];
                while !(*succ).children[LEFT].is_null() {
                    succ = (*succ).children[LEFT];
                }
                removed_color = (*succ).color;
                fix_child = (*succ).children[RIGHT];
                if (*succ).parent == target {
                    fix_parent = succ;
                } else {
                    fix_parent = (*succ).parent;
                    self.transplant(succ, fix_child);
                    (*succ).children[RIGHT] = (*target).children[RIGHT];
                    (*(*succ).children[RIGHT]).parent = succ;
                }
                self.transplant(target, succ);
                (*succ).children[LEFT] = (*target).children[LEFT];
                (*(*succ).children[LEFT]).parent = succ;
                (*succ).color = (*target).color;
            }

            RbNode::free(target);
            if removed_color == Color::Black {
                self.remove_fixup(fix_child, fix_parent);
            }
        }
    }

    /// Splits the tree at the middle of its sorted key sequence.
    ///
    /// Returns `(left, right)` with every key of `left` strictly below
    /// every key of `right`, both non-empty. Consumes the tree; panics
    /// if it holds fewer than two keys.
    pub fn split(mut self) -> (RbTree<K>, RbTree<K>) {
        assert!(self.size >= 2, "cannot split a tree with fewer than two keys");
        let mut nodes = Vec::with_capacity(self.size);
        self.collect(&mut nodes);
        self.release();
        let mid = nodes.len() / 2;
        (
            Self::from_sorted_nodes(&nodes[..mid]),
            Self::from_sorted_nodes(&nodes[mid..]),
        )
    }

    /// Merges two trees over disjoint, ordered key ranges.
    ///
    /// Panics if either tree is empty or `left.max() >= right.min()`.
    pub fn merge(mut left: RbTree<K>, mut right: RbTree<K>) -> RbTree<K> {
        assert!(
            !left.is_empty() && !right.is_empty(),
            "cannot merge empty trees"
        );
        let boundary = left.size;
        let mut nodes = Vec::with_capacity(left.size + right.size);
        left.collect(&mut nodes);
        right.collect(&mut nodes);
        unsafe {
            assert!(
                (*nodes[boundary - 1]).key < (*nodes[boundary]).key,
                "merge requires disjoint, ordered key ranges"
            );
        }
        left.release();
        right.release();
        Self::from_sorted_nodes(&nodes)
    }

    fn find(&self, key: K) -> Link<K> {
        let mut cur = self.root;
        unsafe {
            while !cur.is_null() && (*cur).key != key {
                cur = (*cur).children[((*cur).key < key) as usize];
            }
        }
        cur
    }

    /// Appends the tree's nodes to `out` in ascending key order.
    fn collect(&self, out: &mut Vec<Link<K>>) {
        let mut stack = Vec::new();
        let mut cur = self.root;
        unsafe {
            loop {
                while !cur.is_null() {
                    stack.push(cur);
                    cur = (*cur).children[LEFT];
                }
                let Some(node) = stack.pop() else {
                    break;
                };
                out.push(node);
                cur = (*node).children[RIGHT];
            }
        }
    }

    /// Builds a tree owning `nodes`, which must be sorted by key.
    ///
    /// The middle node roots each subtree; everything is colored black
    /// except the deepest level, which is red. A single node stays
    /// black so the root invariant holds.
    fn from_sorted_nodes(nodes: &[Link<K>]) -> RbTree<K> {
        debug_assert!(!nodes.is_empty());
        let mut deepest = Vec::new();
        let mut max_depth = 0;
        let root = Self::build_balanced(nodes, ptr::null_mut(), 0, &mut max_depth, &mut deepest);
        if max_depth > 0 {
            unsafe {
                for &node in &deepest {
                    (*node).color = Color::Red;
                }
            }
        }
        RbTree {
            root,
            size: nodes.len(),
            min: nodes[0],
            max: nodes[nodes.len() - 1],
        }
    }

    fn build_balanced(
        nodes: &[Link<K>],
        parent: Link<K>,
        depth: usize,
        max_depth: &mut usize,
        deepest: &mut Vec<Link<K>>,
    ) -> Link<K> {
        if nodes.is_empty() {
            return ptr::null_mut();
        }
        let mid = nodes.len() / 2;
        let root = nodes[mid];
        if depth > *max_depth {
            *max_depth = depth;
            deepest.clear();
            deepest.push(root);
        } else if depth == *max_depth {
            deepest.push(root);
        }
        unsafe {
            (*root).color = Color::Black;
            (*root).parent = parent;
            (*root).children[LEFT] =
                Self::build_balanced(&nodes[..mid], root, depth + 1, max_depth, deepest);
            (*root).children[RIGHT] =
                Self::build_balanced(&nodes[mid + 1..], root, depth + 1, max_depth, deepest);
        }
        root
    }

    /// Rotates `node` down in direction `dir`, promoting its other
    /// child.
    unsafe fn rotate(&mut self, node: Link<K>, dir: usize) {
        let up = (*node).children[dir ^ 1];
        debug_assert!(!up.is_null(), "rotation requires a child to promote");
        let inner = (*up).children[dir];
        (*node).children[dir ^ 1] = inner;
        if !inner.is_null() {
            (*inner).parent = node;
        }
        let parent = (*node).parent;
        (*up).parent = parent;
        if parent.is_null() {
            self.root = up;
        } else {
            let side = ((*parent).children[RIGHT] == node) as usize;
            (*parent).children[side] = up;
        }
        (*up).children[dir] = node;
        (*node).parent = up;
    }

    /// Replaces the subtree rooted at `old` with the one rooted at
    /// `new` in `old`'s parent.
    unsafe fn transplant(&mut self, old: Link<K>, new: Link<K>) {
        let parent = (*old).parent;
        if parent.is_null() {
            self.root = new;
        } else {
            let side = ((*parent).children[RIGHT] == old) as usize;
            (*parent).children[side] = new;
        }
        if !new.is_null() {
            (*new).parent = parent;
        }
    }

    unsafe fn insert_fixup(&mut self, mut node: Link<K>) {
        loop {
            let parent = (*node).parent;
            if parent.is_null() || (*parent).color == Color::Black {
                break;
            }
            // The parent is red, so it is not the root and the
            // grandparent exists and is black.
            let grand = (*parent).parent;
            let pdir = ((*grand).children[RIGHT] == parent) as usize;
            let uncle = (*grand).children[pdir ^ 1];
            if !uncle.is_null() && (*uncle).color == Color::Red {
                (*parent).color = Color::Black;
                (*uncle).color = Color::Black;
                (*grand).color = Color::Red;
                node = grand;
            } else {
                if node == (*parent).children[pdir ^ 1] {
                    node = parent;
                    self.rotate(node, pdir);
                }
                let parent = (*node).parent;
                let grand = (*parent).parent;
                (*parent).color = Color::Black;
                (*grand).color = Color::Red;
                self.rotate(grand, pdir ^ 1);
                break;
            }
        }
        (*self.root).color = Color::Black;
    }

    /// Restores the black-height invariant after a black node was
    /// removed above `node` (which may be null) under `parent`.
    unsafe fn remove_fixup(&mut self, mut node: Link<K>, mut parent: Link<K>) {
        while node != self.root && (node.is_null() || (*node).color == Color::Black) {
            let dir = ((*parent).children[RIGHT] == node) as usize;
            let mut sibling = (*parent).children[dir ^ 1];
            debug_assert!(!sibling.is_null(), "double-black node without a sibling");

            if (*sibling).color == Color::Red {
                (*sibling).color = Color::Black;
                (*parent).color = Color::Red;
                self.rotate(parent, dir);
                sibling = (*parent).children[dir ^ 1];
            }

            let near = (*sibling).children[dir];
            let far = (*sibling).children[dir ^ 1];
            let near_black = near.is_null() || (*near).color == Color::Black;
            let far_black = far.is_null() || (*far).color == Color::Black;

            if near_black && far_black {
                (*sibling).color = Color::Red;
                node = parent;
                parent = (*node).parent;
            } else {
                if far_black {
                    (*near).color = Color::Black;
                    (*sibling).color = Color::Red;
                    self.rotate(sibling, dir ^ 1);
                    sibling = (*parent).children[dir ^ 1];
                }
                (*sibling).color = (*parent).color;
                (*parent).color = Color::Black;
                let far = (*sibling).children[dir ^ 1];
                if !far.is_null() {
                    (*far).color = Color::Black;
                }
                self.rotate(parent, dir);
                node = self.root;
            }
        }
        if !node.is_null() {
            (*node).color = Color::Black;
        }
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for RbTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Copy + Ord + fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
