use std::ptr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Black,
    Red,
}

pub(crate) type Link<K> = *mut RbNode<K>;

/// Tree node with a child array indexed by direction and a non-owning
/// parent back-pointer. The tree owns its nodes; split and merge move
/// them between trees through a sorted node vector without
/// reallocating.
pub(crate) struct RbNode<K> {
    pub key: K,
    pub color: Color,
    pub children: [Link<K>; 2],
    pub parent: Link<K>,
}

impl<K> RbNode<K> {
    pub(crate) fn alloc(key: K, color: Color, parent: Link<K>) -> Link<K> {
        Box::into_raw(Box::new(RbNode {
            key,
            color,
            children: [ptr::null_mut(); 2],
            parent,
        }))
    }

    /// # Safety
    ///
    /// `node` must be a live allocation produced by [`RbNode::alloc`]
    /// and must not be reachable from any tree afterwards.
    pub(crate) unsafe fn free(node: Link<K>) {
        drop(Box::from_raw(node));
    }
}
