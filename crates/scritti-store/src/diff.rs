//! Dependency-set diffing for reloads.
//!
//! Compares the dependency set recorded at the previous load with the set
//! reported for the freshly parsed value. Only `added` and `removed` edges
//! require dependant bookkeeping; `unchanged` edges are left untouched.

use std::collections::BTreeSet;

use scritti_core::AssetKey;

/// How an asset's dependency edges changed across one reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDiff {
    /// Keys referenced now but not before.
    pub added: BTreeSet<AssetKey>,
    /// Keys referenced before but not now.
    pub removed: BTreeSet<AssetKey>,
    /// Keys referenced both before and now.
    pub unchanged: BTreeSet<AssetKey>,
}

impl DependencyDiff {
    pub fn compute(previous: &BTreeSet<AssetKey>, current: &BTreeSet<AssetKey>) -> Self {
        DependencyDiff {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(current).cloned().collect(),
            unchanged: previous.intersection(current).cloned().collect(),
        }
    }

    /// Returns true if no edge was added or removed.
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Number of edges needing bookkeeping.
    pub fn changed(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> BTreeSet<AssetKey> {
        names.iter().map(|n| AssetKey::style(*n)).collect()
    }

    #[test]
    fn first_load_adds_everything() {
        let diff = DependencyDiff::compute(&BTreeSet::new(), &keys(&["a", "b"]));
        assert_eq!(diff.added, keys(&["a", "b"]));
        assert!(diff.removed.is_empty());
        assert!(diff.unchanged.is_empty());
    }

    #[test]
    fn identical_sets_are_clean() {
        let diff = DependencyDiff::compute(&keys(&["a", "b"]), &keys(&["a", "b"]));
        assert!(diff.is_clean());
        assert_eq!(diff.changed(), 0);
        assert_eq!(diff.unchanged, keys(&["a", "b"]));
    }

    #[test]
    fn partial_overlap() {
        let diff = DependencyDiff::compute(&keys(&["x", "y"]), &keys(&["y", "z"]));
        assert_eq!(diff.removed, keys(&["x"]));
        assert_eq!(diff.added, keys(&["z"]));
        assert_eq!(diff.unchanged, keys(&["y"]));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn key_set() -> impl Strategy<Value = BTreeSet<AssetKey>> {
            proptest::collection::btree_set("[a-f]", 0..6)
                .prop_map(|names| names.into_iter().map(AssetKey::style).collect())
        }

        proptest! {
            #[test]
            fn partitions_the_union(previous in key_set(), current in key_set()) {
                let diff = DependencyDiff::compute(&previous, &current);

                prop_assert!(diff.added.is_disjoint(&diff.removed));
                prop_assert!(diff.added.is_disjoint(&diff.unchanged));
                prop_assert!(diff.removed.is_disjoint(&diff.unchanged));

                let mut union: BTreeSet<AssetKey> = diff.added.clone();
                union.extend(diff.removed.iter().cloned());
                union.extend(diff.unchanged.iter().cloned());
                let expected: BTreeSet<AssetKey> = previous.union(&current).cloned().collect();
                prop_assert_eq!(union, expected);
            }

            #[test]
            fn applying_the_diff_yields_current(previous in key_set(), current in key_set()) {
                let diff = DependencyDiff::compute(&previous, &current);
                let mut applied = previous.clone();
                for key in &diff.removed {
                    applied.remove(key);
                }
                applied.extend(diff.added.iter().cloned());
                prop_assert_eq!(applied, current);
            }
        }
    }
}
