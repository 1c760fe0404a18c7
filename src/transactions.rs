use dataset::{Dataset, FeatureKind};
use discretizer::ThresholdMap;
use itemizer::Itemizer;
use itemset::ItemSet;

// One encoded instance. Immutable once built; the label rides along for
// counting and coverage but is not an item.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub items: ItemSet,
    pub label: bool,
}

// The predicate string for a numeric value given its feature's sorted
// thresholds: half-open intervals "f <= t0", "t0 < f <= t1", ..., "f > tN".
fn interval_predicate(feature: &str, value: f64, thresholds: &[f64]) -> String {
    for (j, &threshold) in thresholds.iter().enumerate() {
        if value <= threshold {
            return if j == 0 {
                format!("{} <= {}", feature, threshold)
            } else {
                format!("{} < {} <= {}", thresholds[j - 1], feature, threshold)
            };
        }
    }
    format!("{} > {}", feature, thresholds[thresholds.len() - 1])
}

// Encodes every instance as an itemset: one item per feature, numeric
// features binned through the threshold map, everything else as an equality
// predicate. Numeric features absent from the map are unsplit and
// contribute no item.
pub fn encode(
    dataset: &Dataset,
    threshold_map: &ThresholdMap,
    itemizer: &mut Itemizer,
) -> Vec<Transaction> {
    let feature_count = dataset.features.len() - 1;
    let mut transactions = Vec::with_capacity(dataset.size());
    for instance in &dataset.instances {
        let mut items = ItemSet::empty();
        for idx in 0..feature_count {
            let feature = &dataset.features[idx];
            let predicate = match feature.kind {
                FeatureKind::Numeric => {
                    // An empty threshold list (possible in a hand-edited
                    // artifact) means unsplit too, not a panic.
                    let thresholds = match threshold_map.get(&feature.name) {
                        Some(t) if !t.is_empty() => t,
                        _ => continue,
                    };
                    interval_predicate(&feature.name, instance.values[idx].as_f64(), thresholds)
                }
                FeatureKind::Categorical | FeatureKind::Boolean => {
                    format!("{} = {}", feature.name, instance.values[idx])
                }
            };
            let item = itemizer.id_of(&feature.name, &predicate);
            items.insert(item, itemizer);
        }
        transactions.push(Transaction {
            items: items,
            label: instance.label,
        });
    }
    transactions
}

pub fn count_positive(transactions: &[Transaction]) -> usize {
    transactions.iter().filter(|t| t.label).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::{Feature, Instance, Value};

    fn dataset() -> Dataset {
        let features = vec![
            Feature {
                name: "age".to_string(),
                kind: FeatureKind::Numeric,
            },
            Feature {
                name: "country".to_string(),
                kind: FeatureKind::Categorical,
            },
            Feature {
                name: "premium".to_string(),
                kind: FeatureKind::Boolean,
            },
            Feature {
                name: "churned".to_string(),
                kind: FeatureKind::Boolean,
            },
        ];
        let rows: Vec<(f64, &str, bool, bool)> = vec![
            (25.0, "US", true, false),
            (30.0, "DE", false, true),
            (42.0, "US", false, true),
            (67.0, "FR", true, false),
        ];
        let instances = rows.into_iter()
            .map(|(age, country, premium, label)| Instance {
                values: vec![
                    Value::Num(age),
                    Value::Cat(country.to_string()),
                    Value::Flag(premium),
                ],
                label: label,
            })
            .collect();
        Dataset {
            features: features,
            instances: instances,
        }
    }

    fn threshold_map() -> ThresholdMap {
        let mut map = ThresholdMap::new();
        map.insert("age".to_string(), vec![30.0, 50.0]);
        map
    }

    #[test]
    fn test_interval_predicates() {
        let thresholds = [30.0, 50.0];
        assert_eq!(interval_predicate("age", 25.0, &thresholds), "age <= 30");
        assert_eq!(interval_predicate("age", 30.0, &thresholds), "age <= 30");
        assert_eq!(
            interval_predicate("age", 42.0, &thresholds),
            "30 < age <= 50"
        );
        assert_eq!(interval_predicate("age", 67.0, &thresholds), "age > 50");
    }

    #[test]
    fn test_one_item_per_feature() {
        let dataset = dataset();
        let mut itemizer = Itemizer::new();
        let transactions = encode(&dataset, &threshold_map(), &mut itemizer);
        assert_eq!(transactions.len(), 4);
        let feature_count = dataset.features.len() - 1;
        for t in &transactions {
            assert_eq!(t.items.len(), feature_count);
            // At most one item per feature name.
            let mut features: Vec<u32> =
                t.items.items().iter().map(|&i| itemizer.feature_of(i)).collect();
            features.sort();
            features.dedup();
            assert_eq!(features.len(), t.items.len());
        }
    }

    #[test]
    fn test_encoded_predicates() {
        let dataset = dataset();
        let mut itemizer = Itemizer::new();
        let transactions = encode(&dataset, &threshold_map(), &mut itemizer);
        let strings: Vec<String> = transactions
            .iter()
            .map(|t| t.items.to_string(&itemizer))
            .collect();
        assert_eq!(strings[0], "age <= 30, country = US, premium = true");
        assert_eq!(strings[1], "age <= 30, country = DE, premium = false");
        assert_eq!(strings[2], "30 < age <= 50, country = US, premium = false");
        assert_eq!(strings[3], "age > 50, country = FR, premium = true");
        assert_eq!(transactions[1].label, true);
    }

    #[test]
    fn test_unsplit_feature_contributes_no_item() {
        let dataset = dataset();
        let mut itemizer = Itemizer::new();
        // Empty threshold map: "age" was left unsplit by the discretizer.
        let transactions = encode(&dataset, &ThresholdMap::new(), &mut itemizer);
        for t in &transactions {
            assert_eq!(t.items.len(), 2);
            assert!(!t.items.to_string(&itemizer).contains("age"));
        }
    }

    #[test]
    fn test_empty_threshold_list_treated_as_unsplit() {
        let dataset = dataset();
        let mut itemizer = Itemizer::new();
        // A map entry with zero thresholds describes no intervals at all.
        let mut map = ThresholdMap::new();
        map.insert("age".to_string(), vec![]);
        let transactions = encode(&dataset, &map, &mut itemizer);
        for t in &transactions {
            assert_eq!(t.items.len(), 2);
            assert!(!t.items.to_string(&itemizer).contains("age"));
        }
    }
}
