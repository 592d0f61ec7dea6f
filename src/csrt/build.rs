//! Construction of the flat tree array.
//!
//! The builder makes one recursive pass over the sorted key slice. At each
//! level it probes the contiguous run of keys agreeing on the current code
//! unit, extends the run's shared prefix as far as it goes, and serialises
//! the resulting sibling group as a balanced binary tree: middle node first,
//! then the left half, then the right half. Sibling offsets are reserved as
//! zeroed slots in the parent and patched once the preceding block's size is
//! known.
//!
//! Values never move: terminals store the pair's position in the input, and
//! the caller keeps the values in that order.

use super::CsrtError;

/// Value indices occupy one code unit, so at most this many pairs.
pub(super) const MAX_PAIRS: usize = u16::MAX as usize;

/// Serialise sorted, non-empty keys into the flat topology array.
pub(super) fn build_tree(keys: &[Vec<u16>]) -> Result<Vec<u16>, CsrtError> {
    debug_assert!(keys.len() <= MAX_PAIRS);
    let mut writer = TreeWriter {
        keys,
        out: Vec::new(),
    };
    let roots = writer.collect_children(0, keys.len(), 0)?;
    writer.out.push(roots.len() as u16);
    if !roots.is_empty() {
        writer.write_group(&roots, 0)?;
    }
    Ok(writer.out)
}

/// One ordered radix child of a parent, identified before serialisation.
enum Child {
    /// A key ending exactly at the parent's prefix depth.
    Degenerate { pair: usize },
    /// The run of pairs `[lo, hi)` agreeing on the unit at the parent depth.
    Run { lo: usize, hi: usize },
}

struct TreeWriter<'a> {
    keys: &'a [Vec<u16>],
    out: Vec<u16>,
}

impl TreeWriter<'_> {
    /// Collect the ordered radix children of the range `[lo, hi)`, whose keys
    /// all share `keys[lo][..depth]`.
    fn collect_children(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
    ) -> Result<Vec<Child>, CsrtError> {
        let mut children = Vec::new();
        let mut i = lo;
        if i < hi && self.keys[i].len() == depth {
            // The shared prefix is itself a stored key: it becomes a
            // degenerate terminal, always first among the children.
            children.push(Child::Degenerate { pair: i });
            i += 1;
        }
        while i < hi {
            // Probing past the end of a key here means the previous key was
            // its equal: the input contained a duplicate.
            if self.keys[i].len() <= depth {
                return Err(CsrtError::DuplicateKey);
            }
            let run = self.probe(i, hi, depth);
            children.push(Child::Run { lo: i, hi: run });
            i = run;
        }
        Ok(children)
    }

    /// Exclusive upper bound of the run of keys agreeing with `keys[lo]` on
    /// the unit at `depth`.
    fn probe(&self, lo: usize, hi: usize, depth: usize) -> usize {
        let unit = self.keys[lo][depth];
        let mut i = lo + 1;
        while i < hi && self.keys[i].len() > depth && self.keys[i][depth] == unit {
            i += 1;
        }
        i
    }

    /// Serialise one sibling group as a balanced binary tree: middle node,
    /// then the left half, then the right half, patching the middle node's
    /// offset slots as each half lands.
    fn write_group(&mut self, group: &[Child], depth: usize) -> Result<(), CsrtError> {
        let mid = group.len() / 2;
        let (left, right) = (&group[..mid], &group[mid + 1..]);
        let (q, left_slot, right_slot) =
            self.write_node(&group[mid], depth, !left.is_empty(), !right.is_empty())?;
        if let Some(slot) = left_slot {
            self.out[slot] = self.offset_from(q)?;
            self.write_group(left, depth)?;
        }
        if let Some(slot) = right_slot {
            self.out[slot] = self.offset_from(q)?;
            self.write_group(right, depth)?;
        }
        Ok(())
    }

    /// Serialise a single node (and, for internal nodes, its whole child
    /// subtree). Returns the node's child-count offset `q` and the positions
    /// of any reserved sibling-offset slots.
    fn write_node(
        &mut self,
        child: &Child,
        depth: usize,
        has_left: bool,
        has_right: bool,
    ) -> Result<(usize, Option<usize>, Option<usize>), CsrtError> {
        match *child {
            Child::Degenerate { pair } => {
                debug_assert!(!has_left && !has_right);
                self.out.push(0);
                let q = self.out.len();
                self.out.push(0);
                self.out.push(pair as u16);
                Ok((q, None, None))
            }
            Child::Run { lo, hi } if hi - lo == 1 => {
                // Leaf: the whole remainder of the key is the prefix.
                self.push_prefix(lo, depth, self.keys[lo].len())?;
                let q = self.out.len();
                self.out.push(0);
                let (ls, rs) = self.push_sibling_slots(has_left, has_right);
                self.out.push(lo as u16);
                Ok((q, ls, rs))
            }
            Child::Run { lo, hi } => {
                let end = self.shared_prefix_end(lo, hi, depth);
                self.push_prefix(lo, depth, end)?;
                let q = self.out.len();
                let children = self.collect_children(lo, hi, end)?;
                self.out.push(children.len() as u16);
                let (ls, rs) = self.push_sibling_slots(has_left, has_right);
                self.write_group(&children, end)?;
                Ok((q, ls, rs))
            }
        }
    }

    /// Extend the shared span of `[lo, hi)` past `depth`, where the run is
    /// already known to agree on `keys[lo][..=depth]`. With sorted input the
    /// first and last keys bound the whole run.
    fn shared_prefix_end(&self, lo: usize, hi: usize, depth: usize) -> usize {
        let first = &self.keys[lo];
        let last = &self.keys[hi - 1];
        let mut end = depth + 1;
        while end < first.len() && end < last.len() && first[end] == last[end] {
            end += 1;
        }
        end
    }

    /// Push `keys[pair][depth..end]` as a length-prefixed node prefix.
    fn push_prefix(&mut self, pair: usize, depth: usize, end: usize) -> Result<(), CsrtError> {
        let prefix = &self.keys[pair][depth..end];
        let len = u16::try_from(prefix.len()).map_err(|_| CsrtError::CapacityExceeded)?;
        self.out.push(len);
        self.out.extend_from_slice(prefix);
        Ok(())
    }

    /// Reserve zeroed sibling-offset slots; patched by `write_group`.
    fn push_sibling_slots(
        &mut self,
        has_left: bool,
        has_right: bool,
    ) -> (Option<usize>, Option<usize>) {
        let mut reserve = || {
            self.out.push(0);
            self.out.len() - 1
        };
        let ls = if has_left { Some(reserve()) } else { None };
        let rs = if has_right { Some(reserve()) } else { None };
        (ls, rs)
    }

    /// Relative distance from `q` to the end of the output so far.
    fn offset_from(&self, q: usize) -> Result<u16, CsrtError> {
        u16::try_from(self.out.len() - q).map_err(|_| CsrtError::CapacityExceeded)
    }
}
