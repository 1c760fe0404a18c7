use fnv::FnvHashMap;
use item::Item;

// Interns (feature name, predicate string) pairs as Items. The feature id
// stored per item is what lets ItemSet enforce its one-item-per-feature
// rule without string comparisons.
pub struct Itemizer {
    next_item_id: u32,
    item_str_to_id: FnvHashMap<String, Item>,
    item_id_to_str: Vec<String>,
    item_id_to_feature: Vec<u32>,
    next_feature_id: u32,
    feature_str_to_id: FnvHashMap<String, u32>,
}

impl Itemizer {
    pub fn new() -> Itemizer {
        Itemizer {
            next_item_id: 1,
            item_str_to_id: FnvHashMap::default(),
            item_id_to_str: vec![],
            item_id_to_feature: vec![],
            next_feature_id: 0,
            feature_str_to_id: FnvHashMap::default(),
        }
    }

    pub fn id_of(&mut self, feature: &str, predicate: &str) -> Item {
        if let Some(id) = self.item_str_to_id.get(predicate) {
            return *id;
        }
        let feature_id = self.feature_id_of(feature);
        let id = self.next_item_id;
        self.next_item_id += 1;
        self.item_str_to_id
            .insert(String::from(predicate), Item::with_id(id));
        self.item_id_to_str.push(String::from(predicate));
        self.item_id_to_feature.push(feature_id);
        assert_eq!(self.item_id_to_str.len(), id as usize);
        assert_eq!(self.predicate_of(Item::with_id(id)), predicate);
        Item::with_id(id)
    }

    fn feature_id_of(&mut self, feature: &str) -> u32 {
        if let Some(&id) = self.feature_str_to_id.get(feature) {
            return id;
        }
        let id = self.next_feature_id;
        self.next_feature_id += 1;
        self.feature_str_to_id.insert(String::from(feature), id);
        id
    }

    pub fn predicate_of(&self, id: Item) -> &str {
        &self.item_id_to_str[id.as_index() - 1]
    }

    pub fn feature_of(&self, id: Item) -> u32 {
        self.item_id_to_feature[id.as_index() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::Itemizer;

    #[test]
    fn test_interning() {
        let mut itemizer = Itemizer::new();
        let a = itemizer.id_of("age", "age <= 30");
        let b = itemizer.id_of("age", "age > 30");
        let c = itemizer.id_of("country", "country = US");
        assert_eq!(a, itemizer.id_of("age", "age <= 30"));
        assert!(a != b);
        assert_eq!(itemizer.predicate_of(a), "age <= 30");
        assert_eq!(itemizer.predicate_of(c), "country = US");
        assert_eq!(itemizer.feature_of(a), itemizer.feature_of(b));
        assert!(itemizer.feature_of(a) != itemizer.feature_of(c));
    }
}
