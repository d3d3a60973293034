//! Bounded-universe ordered sets with `O(log log U)` neighbor queries.
//!
//! For keys drawn from a fixed-width unsigned integer universe
//! `U = 2^w`, the tries in this crate answer `predecessor`,
//! `successor`, `contains`, and the extrema — and perform `insert` and
//! `remove` — in `O(log w) = O(log log U)` expected hash-map
//! operations, beating the `O(log n)` of comparison-based trees once
//! the set is large relative to the key width.
//!
//! Three structures build on each other:
//!
//! * [`RbTree`]: a red-black tree with linear-time `split`/`merge`,
//!   used standalone or as the bucket type below.
//! * [`XFastTrie`]: a binary trie over key prefixes, indexed level by
//!   level with hash maps and threaded with a sorted leaf list plus
//!   skip links. Fast queries, but `O(w)` words and update work per
//!   key.
//! * [`YFastTrie`]: the composite. Keys live in `Θ(w)`-sized red-black
//!   buckets whose maxima are indexed by an [`XFastTrie`], restoring
//!   `O(n)` space while keeping the query bound.
//!
//! All structures are single-threaded; queries are pure, and `insert`
//! and `remove` are idempotent. Allocation failure aborts, as is usual
//! for `Box`-based containers.
//!
//! ```
//! use yfast::YFastTrie;
//!
//! let mut set: YFastTrie<u32> = YFastTrie::new();
//! set.insert(7);
//! set.insert(11);
//! set.insert(16);
//! assert_eq!(set.predecessor(11), Some(7));
//! assert_eq!(set.successor(11), Some(16));
//! assert_eq!(set.predecessor(7), None);
//! ```

mod key;
mod prefixmap;
mod rbtree;
mod tagged;
mod xfast;
mod yfast;

pub use key::Key;
pub use rbtree::RbTree;
pub use xfast::XFastTrie;
pub use yfast::YFastTrie;
