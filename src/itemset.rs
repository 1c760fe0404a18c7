use item::Item;
use itemizer::Itemizer;
use itertools::Itertools;
use vec_sets;

// An unordered, deduplicated set of items, stored as an id-sorted vec so
// that derived Eq/Hash are canonical and the vec_sets primitives apply.
// Holds at most one item per feature: inserting a second item for an
// already-present feature is a no-op.
#[derive(Clone, Hash, PartialEq, Eq, Debug)]
pub struct ItemSet {
    items: Vec<Item>,
}

impl ItemSet {
    pub fn empty() -> ItemSet {
        ItemSet { items: vec![] }
    }

    // Caller is responsible for the items belonging to distinct features;
    // duplicates of the same item are removed.
    pub fn new(items: Vec<Item>) -> ItemSet {
        let mut items: Vec<Item> = items.into_iter().sorted().collect();
        items.dedup();
        ItemSet { items: items }
    }

    pub fn insert(&mut self, item: Item, itemizer: &Itemizer) {
        let feature = itemizer.feature_of(item);
        if self.items
            .iter()
            .any(|&i| itemizer.feature_of(i) == feature)
        {
            return;
        }
        match self.items.binary_search(&item) {
            Ok(_) => {}
            Err(pos) => self.items.insert(pos, item),
        }
    }

    pub fn union(&self, other: &ItemSet, itemizer: &Itemizer) -> ItemSet {
        let mut out = self.clone();
        for &item in &other.items {
            out.insert(item, itemizer);
        }
        out
    }

    pub fn without(&self, item: Item) -> ItemSet {
        ItemSet {
            items: self.items.iter().cloned().filter(|&i| i != item).collect(),
        }
    }

    pub fn is_subset_of(&self, other: &ItemSet) -> bool {
        vec_sets::is_subset(&self.items, &other.items)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // Canonical, run-stable rendering; used for deterministic orderings.
    pub fn to_string(&self, itemizer: &Itemizer) -> String {
        Item::item_vec_to_string(&self.items, itemizer)
    }
}

#[cfg(test)]
mod tests {
    use super::ItemSet;
    use item::Item;
    use itemizer::Itemizer;

    #[test]
    fn test_new_sorts_and_dedupes() {
        let set = ItemSet::new(vec![
            Item::with_id(3),
            Item::with_id(1),
            Item::with_id(3),
            Item::with_id(2),
        ]);
        assert_eq!(
            set.items(),
            &[Item::with_id(1), Item::with_id(2), Item::with_id(3)]
        );
    }

    #[test]
    fn test_insert_one_item_per_feature() {
        let mut itemizer = Itemizer::new();
        let low = itemizer.id_of("age", "age <= 30");
        let high = itemizer.id_of("age", "age > 30");
        let us = itemizer.id_of("country", "country = US");

        let mut set = ItemSet::empty();
        set.insert(low, &itemizer);
        set.insert(us, &itemizer);
        // Second item for "age" must be ignored.
        set.insert(high, &itemizer);
        assert_eq!(set.len(), 2);
        assert!(set.items().contains(&low));
        assert!(!set.items().contains(&high));

        // Re-inserting an existing item is a no-op too.
        set.insert(low, &itemizer);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_union_respects_feature_rule() {
        let mut itemizer = Itemizer::new();
        let low = itemizer.id_of("age", "age <= 30");
        let high = itemizer.id_of("age", "age > 30");
        let us = itemizer.id_of("country", "country = US");

        let a = ItemSet::new(vec![low]);
        let b = ItemSet::new(vec![high, us]);
        let joined = a.union(&b, &itemizer);
        // "age > 30" conflicts with "age <= 30", so the union has 2 items,
        // not 3. Apriori relies on this to discard such joins by size.
        assert_eq!(joined.len(), 2);
        assert!(joined.items().contains(&low));
        assert!(joined.items().contains(&us));
    }

    #[test]
    fn test_subset_and_without() {
        let a = ItemSet::new(vec![Item::with_id(1), Item::with_id(3)]);
        let b = ItemSet::new(vec![Item::with_id(1), Item::with_id(2), Item::with_id(3)]);
        assert!(a.is_subset_of(&b));
        assert!(!b.is_subset_of(&a));
        assert!(ItemSet::empty().is_subset_of(&a));
        assert_eq!(b.without(Item::with_id(2)), a);
    }
}
