//! # csrt-rs
//!
//! A read-only string map stored as a **contiguous splayed radix tree**: the
//! entire trie topology (node prefixes, child counts, binary-search sibling
//! offsets, value indices) is serialised into a single flat array of 16-bit
//! code units, with values held in a parallel array.
//!
//! ## Features
//!
//! - **One allocation for the topology**: no per-node boxes, no pointers,
//!   navigation is `index + small_offset` over one `Vec<u16>`
//! - **O(key_length) lookups**: independent of the number of stored keys
//! - **Splayed children**: each node's children are addressed through a
//!   balanced binary search tree over their first prefix units, so a branchy
//!   node costs log(fan-out) probes instead of a linear scan
//! - **Immutable**: built once from sorted pairs, then read-only; lookups
//!   never allocate and never fail beyond "not found"
//!
//! ## Example
//!
//! ```rust
//! use csrt_rs::{encode_key, CsrtTree};
//!
//! let tree = CsrtTree::from_sorted_pairs(vec![
//!     (encode_key("car"), 1),
//!     (encode_key("card"), 2),
//!     (encode_key("care"), 3),
//! ])
//! .unwrap();
//!
//! assert_eq!(tree.get_str("card"), Some(&2));
//! assert!(tree.contains_str("car"));
//! assert!(!tree.contains_str("ca"));
//! ```
//!
//! Keys are sequences of UTF-16 code units (`&[u16]`); [`encode_key`] and the
//! `*_str` lookup methods cover callers that start from `&str`.
//!
//! Once constructed the tree is immutable, so shared references can be used
//! from any number of threads. Safe publication of the constructed value
//! (e.g. via `Arc` or a `OnceLock`) is the caller's responsibility.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod csrt;
pub mod key;

#[cfg(test)]
mod proptests;

pub use csrt::{CsrtError, CsrtStats, CsrtTree};
pub use key::encode_key;
