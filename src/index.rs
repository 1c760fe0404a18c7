use item::Item;
use itemset::ItemSet;
use vec_sets;

// Counts of the transactions containing an itemset, broken down by label.
// pos and neg are counted independently so the pos + neg == total
// invariant is a real check on the intersection code, not a tautology.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SupportCount {
    pub total: u32,
    pub pos: u32,
    pub neg: u32,
}

// Vertical transaction index: for each item, the sorted list of ids of the
// transactions containing it. Built once per mining run, read-only after.
pub struct Index {
    index: Vec<Vec<usize>>,
    transaction_count: usize,
    pos_tids: Vec<usize>,
    neg_tids: Vec<usize>,
}

impl Index {
    pub fn new() -> Index {
        Index {
            index: Vec::new(),
            transaction_count: 0,
            pos_tids: Vec::new(),
            neg_tids: Vec::new(),
        }
    }

    pub fn insert(&mut self, itemset: &ItemSet, label: bool) {
        let tid = self.transaction_count;
        self.transaction_count += 1;
        for item in itemset.items() {
            let item_index = item.as_index();
            while self.index.len() <= item_index {
                self.index.push(vec![]);
            }
            self.index[item_index].push(tid);
        }
        if label {
            self.pos_tids.push(tid);
        } else {
            self.neg_tids.push(tid);
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    // Every item that occurs in at least one transaction.
    pub fn items(&self) -> Vec<Item> {
        (1..self.index.len())
            .filter(|&i| !self.index[i].is_empty())
            .map(|i| Item::with_id(i as u32))
            .collect()
    }

    fn tids_of_item(&self, item_index: usize) -> &[usize] {
        if item_index >= self.index.len() {
            return &[];
        }
        &self.index[item_index]
    }

    // Sorted ids of the transactions containing every item of the set.
    // The empty itemset matches every transaction; this is what makes the
    // default rule cover everything.
    pub fn tids_matching(&self, itemset: &ItemSet) -> Vec<usize> {
        let items = itemset.items();
        if items.is_empty() {
            return (0..self.transaction_count).collect();
        }
        let mut tids: Vec<usize> = self.tids_of_item(items[0].as_index()).to_vec();
        for item in &items[1..] {
            if tids.is_empty() {
                break;
            }
            tids = vec_sets::intersection(&tids, self.tids_of_item(item.as_index()));
        }
        tids
    }

    pub fn counts(&self, itemset: &ItemSet) -> SupportCount {
        let tids = self.tids_matching(itemset);
        self.counts_of_tids(&tids)
    }

    pub fn counts_of_tids(&self, tids: &[usize]) -> SupportCount {
        let pos = vec_sets::intersection(tids, &self.pos_tids).len() as u32;
        let neg = vec_sets::intersection(tids, &self.neg_tids).len() as u32;
        SupportCount {
            total: tids.len() as u32,
            pos: pos,
            neg: neg,
        }
    }

    pub fn support(&self, itemset: &ItemSet) -> f64 {
        if self.transaction_count == 0 {
            return 0.0;
        }
        (self.tids_matching(itemset).len() as f64) / (self.transaction_count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::Index;
    use itemset::ItemSet;
    use itemizer::Itemizer;
    use transactions::Transaction;

    fn build(raw: &[(&[&str], bool)]) -> (Vec<Transaction>, Index, Itemizer) {
        let mut itemizer = Itemizer::new();
        let mut index = Index::new();
        let mut transactions = vec![];
        for &(items, label) in raw {
            let mut set = ItemSet::empty();
            for name in items {
                // Each single-letter item is its own feature here.
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

    fn brute_force_count(transactions: &[Transaction], itemset: &ItemSet) -> u32 {
        transactions
            .iter()
            .filter(|t| itemset.is_subset_of(&t.items))
            .count() as u32
    }

    #[test]
    fn test_intersection_counts_match_brute_force() {
        let (transactions, index, mut itemizer) = build(&[
            (&["a", "b", "c"], true),
            (&["d", "b", "c"], false),
            (&["a", "b", "e"], true),
            (&["f", "g", "c"], false),
            (&["d", "g", "e"], false),
            (&["f", "b", "c"], true),
            (&["a", "b", "c"], true),
        ]);

        let queries: Vec<Vec<&str>> = vec![
            vec!["a"],
            vec!["b"],
            vec!["a", "b"],
            vec!["b", "c"],
            vec!["a", "b", "c"],
            vec!["d", "g"],
            vec!["a", "g"],
        ];
        for q in queries {
            let set = ItemSet::new(q.iter().map(|s| itemizer.id_of(s, s)).collect());
            let counts = index.counts(&set);
            assert_eq!(counts.total, brute_force_count(&transactions, &set));
            assert_eq!(counts.pos + counts.neg, counts.total);
        }
    }

    #[test]
    fn test_label_counts() {
        let (_, index, mut itemizer) = build(&[
            (&["a", "b"], true),
            (&["a"], false),
            (&["a", "b"], true),
            (&["b"], false),
        ]);
        let a = ItemSet::new(vec![itemizer.id_of("a", "a")]);
        let counts = index.counts(&a);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pos, 2);
        assert_eq!(counts.neg, 1);
    }

    #[test]
    fn test_empty_itemset_matches_everything() {
        let (_, index, _) = build(&[(&["a"], true), (&["b"], false), (&["c"], true)]);
        assert_eq!(index.tids_matching(&ItemSet::empty()), vec![0, 1, 2]);
        assert_eq!(index.support(&ItemSet::empty()), 1.0);
    }
}
