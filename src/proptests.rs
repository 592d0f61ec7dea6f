use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::csrt::{CsrtError, CsrtTree};
use crate::key::encode_key;

/// Lookup probes derived from the generated key set. Each targets a stored
/// key or a near-miss of one (prefix, extension, point mutation), the shapes
/// most likely to expose walk bugs.
#[derive(Arbitrary, Debug, Clone)]
enum Probe {
    /// Exact lookup of a stored key.
    Present(prop::sample::Index),
    /// A stored key with its last unit removed.
    Trimmed(prop::sample::Index),
    /// A stored key with one unit appended.
    Extended(prop::sample::Index, u16),
    /// A stored key with one unit rewritten.
    Mutated(prop::sample::Index, prop::sample::Index, u16),
}

impl Probe {
    fn key(&self, keys: &[Vec<u16>]) -> Vec<u16> {
        match self {
            Probe::Present(i) => keys[i.index(keys.len())].clone(),
            Probe::Trimmed(i) => {
                let k = &keys[i.index(keys.len())];
                k[..k.len() - 1].to_vec()
            }
            Probe::Extended(i, unit) => {
                let mut k = keys[i.index(keys.len())].clone();
                k.push((*unit).max(1));
                k
            }
            Probe::Mutated(i, pos, unit) => {
                let mut k = keys[i.index(keys.len())].clone();
                let at = pos.index(k.len());
                k[at] = (*unit).max(1);
                k
            }
        }
    }
}

/// Key shapes weighted towards shared prefixes and key-is-a-prefix chains,
/// the cases the layout treats specially.
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-b]{1,4}",
        "[a-z]{1,12}",
        "[a-z]{2,6}/[a-z]{1,6}",
        "[a-z]{2,6}_[A-Z][a-z]{0,5}",
    ]
}

fn sorted_unique_keys(raw: Vec<String>) -> Vec<Vec<u16>> {
    let mut keys: Vec<Vec<u16>> = raw.iter().map(|s| encode_key(s)).collect();
    keys.sort();
    keys.dedup();
    keys
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn proptest_vs_btreemap(
        raw in prop::collection::vec(key_strategy(), 1..64),
        probes in prop::collection::vec(any::<Probe>(), 0..64),
    ) {
        let keys = sorted_unique_keys(raw);
        let model: BTreeMap<Vec<u16>, u64> =
            keys.iter().cloned().zip(0u64..).collect();
        let pairs: Vec<(Vec<u16>, u64)> =
            keys.iter().cloned().zip(0u64..).collect();
        let tree = CsrtTree::from_sorted_pairs(pairs).unwrap();

        prop_assert_eq!(tree.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(tree.get(k), Some(v), "stored key {:?}", k);
        }
        for probe in &probes {
            let k = probe.key(&keys);
            prop_assert_eq!(
                tree.contains(&k),
                model.contains_key(&k),
                "probe {:?} -> {:?}",
                probe,
                &k
            );
            prop_assert_eq!(tree.get(&k), model.get(&k));
        }
    }

    #[test]
    fn proptest_duplicate_rejected(
        raw in prop::collection::vec(key_strategy(), 1..16),
        dup in any::<prop::sample::Index>(),
    ) {
        let keys = sorted_unique_keys(raw);
        let target = dup.index(keys.len());
        let mut pairs: Vec<(Vec<u16>, u64)> =
            keys.iter().cloned().zip(0u64..).collect();
        pairs.insert(target, pairs[target].clone());
        prop_assert_eq!(
            CsrtTree::from_sorted_pairs(pairs).unwrap_err(),
            CsrtError::DuplicateKey
        );
    }
}
