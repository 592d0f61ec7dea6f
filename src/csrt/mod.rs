//! Contiguous splayed radix tree.
//!
//! The whole trie lives in one flat array of 16-bit code units; values sit in
//! a parallel `Vec<V>` addressed by indices embedded in the flat array. A
//! lookup walks the array with nothing but an index and two sibling counters,
//! so every step touches a handful of adjacent units.
//!
//! ## Layout
//!
//! ```text
//! tree[0]          number of radix roots
//! tree[1..]        root sibling group
//!
//! node at offset p:
//!   len            prefix length in code units (0 = degenerate terminal)
//!   prefix[len]    the prefix itself
//!   children       radix child count (0 = terminal)      <- this slot is `q`
//!   [leftOff]      present iff the node has a left sibling in its group
//!   [rightOff]     present iff the node has a right sibling in its group
//!   value          terminal: index into the value array
//!   children...    internal: the child sibling group, laid out inline
//! ```
//!
//! A *sibling group* is the balanced binary search tree over one node's radix
//! children, keyed by the first unit of each child's prefix: the middle child
//! (`count / 2`, left-favouring) is serialised first, then the whole left
//! half, then the whole right half. `leftOff`/`rightOff` are distances from
//! `q` to the start of those halves, so the structure can sit anywhere in
//! memory. The walker never stores per-group counts; it re-derives how many
//! siblings remain on each side from the same `count / 2` split the builder
//! used.
//!
//! A *degenerate terminal* (`len == 0`) marks a stored key that is a proper
//! prefix of another stored key. It is always the first ordered child of its
//! parent, which puts it at the leftmost leaf of the sibling group, so it
//! never carries sibling offsets: its encoding is always `0, 0, value`.

use thiserror::Error;

use crate::key::{self, KeyBuf};

mod build;

/// Errors surfaced while constructing a tree. Lookups never fail; a missing
/// key is reported as `None` / `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrtError {
    /// Two input pairs share the same key.
    #[error("duplicate key in sorted input")]
    DuplicateKey,
    /// More than 65 535 pairs, or a prefix length or sibling offset that does
    /// not fit in one 16-bit code unit.
    #[error("tree exceeds 16-bit layout limits")]
    CapacityExceeded,
    /// Keys must contain at least one code unit.
    #[error("empty key")]
    EmptyKey,
}

/// An immutable map from UTF-16 string keys to values, stored as a contiguous
/// splayed radix tree.
///
/// Built once from sorted, duplicate-free pairs; read-only afterwards. Shared
/// references can be used concurrently from any number of threads (safe
/// publication of the constructed value is the caller's responsibility).
#[derive(Clone, Debug)]
pub struct CsrtTree<V> {
    /// Flat topology: prefixes, child counts, sibling offsets, value indices.
    tree: Vec<u16>,
    /// Values in input order; terminals store indices into this array.
    values: Vec<V>,
}

impl<V> CsrtTree<V> {
    /// Build a tree from pairs sorted ascending by key.
    ///
    /// Keys must be non-empty, sorted by their code-unit sequences and free
    /// of duplicates; at most 65 535 pairs. Sortedness is the caller's
    /// responsibility (checked only under `debug_assertions`); duplicates are
    /// always detected.
    pub fn from_sorted_pairs(pairs: Vec<(Vec<u16>, V)>) -> Result<Self, CsrtError> {
        if pairs.len() > build::MAX_PAIRS {
            return Err(CsrtError::CapacityExceeded);
        }
        let (keys, values): (Vec<Vec<u16>>, Vec<V>) = pairs.into_iter().unzip();
        if keys.iter().any(|k| k.is_empty()) {
            return Err(CsrtError::EmptyKey);
        }
        debug_assert!(
            keys.windows(2).all(|w| w[0] <= w[1]),
            "input pairs must be sorted by key"
        );
        let tree = build::build_tree(&keys)?;
        Ok(Self { tree, values })
    }

    /// Build a tree from an iterator of pairs sorted ascending by key.
    pub fn from_sorted_iter<I>(iter: I) -> Result<Self, CsrtError>
    where
        I: IntoIterator<Item = (Vec<u16>, V)>,
    {
        Self::from_sorted_pairs(iter.into_iter().collect())
    }

    /// Look up a key given as UTF-16 code units.
    pub fn get(&self, key: &[u16]) -> Option<&V> {
        self.lookup(key).map(|idx| &self.values[idx])
    }

    /// Whether the key was present at construction. Total: never fails.
    pub fn contains(&self, key: &[u16]) -> bool {
        self.lookup(key).is_some()
    }

    /// [`get`](Self::get) for `&str` callers; encodes through a stack buffer.
    pub fn get_str(&self, key: &str) -> Option<&V> {
        let units: KeyBuf = key::encode_key_buf(key);
        self.get(&units)
    }

    /// [`contains`](Self::contains) for `&str` callers.
    pub fn contains_str(&self, key: &str) -> bool {
        let units: KeyBuf = key::encode_key_buf(key);
        self.contains(&units)
    }

    /// Number of stored pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tree stores no pairs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Size of the flat topology array, in code units.
    #[inline]
    pub fn tree_units(&self) -> usize {
        self.tree.len()
    }

    /// Memory usage statistics.
    pub fn memory_stats(&self) -> CsrtStats {
        let tree_bytes = self.tree.capacity() * std::mem::size_of::<u16>();
        let values_bytes = self.values.capacity() * std::mem::size_of::<V>();
        CsrtStats {
            tree_units: self.tree.len(),
            tree_bytes,
            values_bytes,
            num_keys: self.values.len(),
            bytes_per_key: if self.values.is_empty() {
                0.0
            } else {
                (tree_bytes + values_bytes) as f64 / self.values.len() as f64
            },
        }
    }

    /// The core walk: returns the value index bound to `key`, or `None`.
    ///
    /// State is `(p, at, left, right)`: current node offset, units of `key`
    /// consumed, and how many siblings remain on each side of the current
    /// position in its sibling group. Descending into a group of `n` nodes
    /// always splits as `left = n >> 1`, `right = n - left - 1`, mirroring
    /// the builder's midpoint rule.
    fn lookup(&self, key: &[u16]) -> Option<usize> {
        let tree = &self.tree;
        let roots = tree[0] as usize;
        if roots == 0 {
            return None;
        }
        let mut p = 1usize;
        let mut at = 0usize;
        let mut left = roots >> 1;
        let mut right = roots - left - 1;
        loop {
            let len = tree[p] as usize;
            if len > 0 {
                let first = tree[p + 1];
                if at == key.len() || key[at] < first {
                    // Binary-descend left; the left offset sits right after q.
                    if left == 0 {
                        return None;
                    }
                    let q = p + 1 + len;
                    p = q + tree[q + 1] as usize;
                    let n = left;
                    left = n >> 1;
                    right = n - (n >> 1) - 1;
                    continue;
                }
                if key[at] > first {
                    // Binary-descend right; skip the left slot if present.
                    if right == 0 {
                        return None;
                    }
                    let q = p + 1 + len;
                    let slot = q + 1 + usize::from(left > 0);
                    p = q + tree[slot] as usize;
                    let n = right;
                    left = n >> 1;
                    right = n - (n >> 1) - 1;
                    continue;
                }
                // First unit matched: the node is the only candidate, so the
                // rest of its prefix must match exactly.
                if key.len() - at < len {
                    return None;
                }
                for i in 1..len {
                    if key[at + i] != tree[p + 1 + i] {
                        return None;
                    }
                }
                at += len;
            }
            let q = p + 1 + len;
            let children = tree[q] as usize;
            let slots = usize::from(left > 0) + usize::from(right > 0);
            if children == 0 {
                if at == key.len() {
                    return Some(tree[q + 1 + slots] as usize);
                }
                return None;
            }
            p = q + 1 + slots;
            left = children >> 1;
            right = children - left - 1;
        }
    }
}

/// Memory usage statistics for a [`CsrtTree`].
#[derive(Debug, Clone)]
pub struct CsrtStats {
    /// Length of the flat topology array, in 16-bit code units.
    pub tree_units: usize,
    /// Bytes used by the topology array.
    pub tree_bytes: usize,
    /// Bytes used by the value array.
    pub values_bytes: usize,
    /// Number of stored pairs.
    pub num_keys: usize,
    /// Average bytes per stored pair.
    pub bytes_per_key: f64,
}
