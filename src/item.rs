use itemizer::Itemizer;

// An interned (feature, predicate) pair; the Itemizer owns the mapping
// between ids and the strings they stand for.
#[derive(Copy, Clone, Hash, PartialOrd, PartialEq, Eq, Ord, Debug)]
pub struct Item {
    id: u32,
}

impl Item {
    pub fn with_id(id: u32) -> Item {
        Item { id: id }
    }
    pub fn as_index(&self) -> usize {
        self.id as usize
    }
    pub fn item_vec_to_string(items: &[Item], itemizer: &Itemizer) -> String {
        let mut a: Vec<&str> = items.iter().map(|&id| itemizer.predicate_of(id)).collect();
        a.sort();
        a.join(", ")
    }
}
