use fnv::FnvHashMap;
use rayon::prelude::*;

use index::{Index, SupportCount};
use itemizer::Itemizer;
use itemset::ItemSet;

// F[0] holds the frequent 1-itemsets, F[1] the 2-itemsets, and so on.
pub type FrequentItemsets = Vec<FnvHashMap<ItemSet, SupportCount>>;

fn is_frequent(count: u32, transaction_count: usize, min_support: f64) -> bool {
    (count as f64) / (transaction_count as f64) >= min_support
}

fn get_f1(index: &Index, min_support: f64) -> FnvHashMap<ItemSet, SupportCount> {
    let n = index.transaction_count();
    let mut f1 = FnvHashMap::default();
    for item in index.items() {
        let itemset = ItemSet::new(vec![item]);
        let counts = index.counts(&itemset);
        if is_frequent(counts.total, n, min_support) {
            f1.insert(itemset, counts);
        }
    }
    f1
}

// Apriori prefix join: sort the (k-1)-itemsets by the canonical string
// ordering of their member predicates, and join only pairs agreeing on
// their first k-2 members. Every size-k candidate with two frequent
// string-adjacent parents is produced exactly once; the naive all-pairs
// join is never run.
fn generate_candidates(
    f_prev: &FnvHashMap<ItemSet, SupportCount>,
    k: usize,
    itemizer: &Itemizer,
) -> Vec<ItemSet> {
    let mut keyed: Vec<(Vec<&str>, &ItemSet)> = f_prev
        .keys()
        .map(|itemset| {
            let mut strings: Vec<&str> = itemset
                .items()
                .iter()
                .map(|&i| itemizer.predicate_of(i))
                .collect();
            strings.sort();
            (strings, itemset)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut candidates = vec![];
    for i in 0..keyed.len() {
        for j in i + 1..keyed.len() {
            if keyed[i].0[..k - 2] != keyed[j].0[..k - 2] {
                // Sorted order: no later itemset shares the prefix either.
                break;
            }
            let candidate = keyed[i].1.union(keyed[j].1, itemizer);
            // A join whose differing items predicate the same feature
            // collapses below size k; such candidates have zero support
            // anyway and are dropped here.
            if candidate.len() == k {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

// Downward closure: a size-k candidate can only be frequent if every
// size-(k-1) subset is.
fn prune_candidates(
    candidates: Vec<ItemSet>,
    f_prev: &FnvHashMap<ItemSet, SupportCount>,
) -> Vec<ItemSet> {
    candidates
        .into_iter()
        .filter(|candidate| {
            candidate
                .items()
                .iter()
                .all(|&item| f_prev.contains_key(&candidate.without(item)))
        })
        .collect()
}

// Counts surviving candidates by vertical-index intersection. The
// candidates are independent, so counting parallelizes; the results are
// collected in candidate order before being merged, keeping the level map
// contents deterministic.
fn count_candidates(
    candidates: Vec<ItemSet>,
    index: &Index,
    min_support: f64,
) -> FnvHashMap<ItemSet, SupportCount> {
    let n = index.transaction_count();
    candidates
        .into_par_iter()
        .filter_map(|candidate| {
            let counts = index.counts(&candidate);
            if is_frequent(counts.total, n, min_support) {
                Some((candidate, counts))
            } else {
                None
            }
        })
        .collect::<Vec<(ItemSet, SupportCount)>>()
        .into_iter()
        .collect()
}

// Level-wise Apriori over the vertical index. Stops when a level comes up
// empty or max_k is reached.
pub fn mine(index: &Index, itemizer: &Itemizer, min_support: f64, max_k: usize) -> FrequentItemsets {
    if index.transaction_count() == 0 || max_k == 0 {
        return vec![];
    }

    let f1 = get_f1(index, min_support);
    if f1.is_empty() {
        return vec![];
    }
    let mut frequent: FrequentItemsets = vec![f1];

    let mut k = 2;
    while k <= max_k {
        let candidates = generate_candidates(&frequent[k - 2], k, itemizer);
        let candidates = prune_candidates(candidates, &frequent[k - 2]);
        let fk = count_candidates(candidates, index, min_support);
        if fk.is_empty() {
            break;
        }
        frequent.push(fk);
        k += 1;
    }

    frequent
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::Index;
    use itemizer::Itemizer;
    use itemset::ItemSet;
    use transactions::Transaction;

    fn build(raw: &[(&[&str], bool)]) -> (Vec<Transaction>, Index, Itemizer) {
        let mut itemizer = Itemizer::new();
        let mut index = Index::new();
        let mut transactions = vec![];
        for &(items, label) in raw {
            let mut set = ItemSet::empty();
            for name in items {
                set.insert(itemizer.id_of(name, name), &itemizer);
            }
            index.insert(&set, label);
            transactions.push(Transaction {
                items: set,
                label: label,
            });
        }
        (transactions, index, itemizer)
    }

    // The ten-transaction example from the design discussion: item A marks
    // exactly the true-labelled transactions.
    fn example() -> (Vec<Transaction>, Index, Itemizer) {
        build(&[
            (&["A", "B"], true),
            (&["A", "B"], true),
            (&["A"], true),
            (&["B"], false),
            (&["B"], false),
            (&["B"], false),
            (&["B"], false),
            (&[], false),
            (&["A", "B"], true),
            (&["A"], true),
        ])
    }

    #[test]
    fn test_f1_counts() {
        let (_, index, mut itemizer) = example();
        let frequent = mine(&index, &itemizer, 0.2, 5);
        let a = ItemSet::new(vec![itemizer.id_of("A", "A")]);
        let counts = frequent[0][&a];
        assert_eq!(counts.total, 5);
        assert_eq!(counts.pos, 5);
        assert_eq!(counts.neg, 0);
        // B appears in every transaction except the two bare-A ones and the
        // empty one.
        let b = ItemSet::new(vec![itemizer.id_of("B", "B")]);
        assert_eq!(frequent[0][&b].total, 7);
        assert_eq!(frequent[0][&b].pos, 3);
        assert_eq!(frequent[0][&b].neg, 4);
    }

    #[test]
    fn test_pair_level() {
        let (_, index, mut itemizer) = example();
        let frequent = mine(&index, &itemizer, 0.2, 5);
        assert_eq!(frequent.len(), 2);
        let ab = ItemSet::new(vec![itemizer.id_of("A", "A"), itemizer.id_of("B", "B")]);
        let counts = frequent[1][&ab];
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pos, 3);
    }

    #[test]
    fn test_min_support_filters() {
        let (_, index, mut itemizer) = example();
        // {A, B} has support 0.3; a 0.4 floor drops it but keeps the
        // singletons.
        let frequent = mine(&index, &itemizer, 0.4, 5);
        assert_eq!(frequent.len(), 1);
        assert!(frequent[0].contains_key(&ItemSet::new(vec![itemizer.id_of("A", "A")])));
    }

    #[test]
    fn test_downward_closure() {
        let (_, index, itemizer) = build(&[
            (&["a", "b", "c"], true),
            (&["a", "b", "c"], false),
            (&["a", "b", "d"], true),
            (&["a", "c", "d"], false),
            (&["b", "c", "d"], true),
            (&["a", "b", "c"], true),
            (&["a", "d"], false),
            (&["b", "c"], true),
        ]);
        let frequent = mine(&index, &itemizer, 0.25, 4);
        for k in 1..frequent.len() {
            for (itemset, counts) in &frequent[k] {
                assert_eq!(counts.pos + counts.neg, counts.total);
                for &item in itemset.items() {
                    let subset = itemset.without(item);
                    let sub_counts = frequent[k - 1][&subset];
                    // A subset is at least as frequent as its superset.
                    assert!(sub_counts.total >= counts.total);
                }
            }
        }
    }

    #[test]
    fn test_counts_match_brute_force() {
        let (transactions, index, itemizer) = build(&[
            (&["a", "b", "c"], true),
            (&["d", "b", "c"], false),
            (&["a", "b", "e"], true),
            (&["f", "g", "c"], false),
            (&["d", "g", "e"], false),
            (&["f", "b", "c"], true),
            (&["f", "b", "c"], false),
            (&["a", "b", "e"], true),
            (&["a", "b", "c"], true),
            (&["a", "b", "e"], false),
        ]);
        let frequent = mine(&index, &itemizer, 0.1, 4);
        for level in &frequent {
            for (itemset, counts) in level {
                let total = transactions
                    .iter()
                    .filter(|t| itemset.is_subset_of(&t.items))
                    .count() as u32;
                let pos = transactions
                    .iter()
                    .filter(|t| t.label && itemset.is_subset_of(&t.items))
                    .count() as u32;
                assert_eq!(counts.total, total);
                assert_eq!(counts.pos, pos);
                assert_eq!(counts.neg, total - pos);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let (_, index, itemizer) = build(&[]);
        assert!(mine(&index, &itemizer, 0.1, 5).is_empty());
    }

    #[test]
    fn test_max_k_limits_levels() {
        let (_, index, itemizer) = build(&[
            (&["a", "b", "c"], true),
            (&["a", "b", "c"], false),
            (&["a", "b", "c"], true),
        ]);
        let frequent = mine(&index, &itemizer, 0.5, 2);
        assert_eq!(frequent.len(), 2);
    }
}
