use std::error::Error;
use std::fs::File;
use std::io::prelude::*;

use fnv::FnvHashSet;
use ordered_float::OrderedFloat;
use serde_json;

use dataset::Feature;
use discretizer::ThresholdMap;
use generate_rules::{LabelRatios, Rule};
use index::Index;
use itemizer::Itemizer;
use itemset::ItemSet;
use transactions::Transaction;

// Indexed [true, false]: the cost of a misprediction made by a rule with
// that label. The defaults make a false negative 2.5x worse than a false
// positive.
pub type ErrorWeights = [f64; 2];

pub const DEFAULT_ERROR_WEIGHTS: ErrorWeights = [1.0, 2.5];

fn weight_of(weights: &ErrorWeights, label: bool) -> f64 {
    if label {
        weights[0]
    } else {
        weights[1]
    }
}

// Fixed rule precedence: accurate > general > strongly associated >
// positive-label > simple, with a string tie-break for full determinism.
// This ordering is load-bearing for reproducible classifiers; do not
// reorder it.
pub fn sort_rules(rules: &mut Vec<Rule>, itemizer: &Itemizer) {
    rules.sort_by_cached_key(|r| {
        (
            OrderedFloat(-r.confidence),
            OrderedFloat(-r.support),
            OrderedFloat(-r.lift),
            !r.label,
            r.items.len(),
            r.items.to_string(itemizer),
        )
    });
}

// Errors a default rule would make on the not-yet-covered transactions:
// the majority label becomes the default, the minority count (weighted) is
// the cost. Ties resolve to a true default.
fn default_rule_errors(
    remaining: &FnvHashSet<usize>,
    transactions: &[Transaction],
    error_weights: &ErrorWeights,
) -> f64 {
    let count_true = remaining.iter().filter(|&&t| transactions[t].label).count();
    let count_false = remaining.len() - count_true;
    if count_true >= count_false {
        count_false as f64 * weight_of(error_weights, true)
    } else {
        count_true as f64 * weight_of(error_weights, false)
    }
}

fn majority_in(remaining: &FnvHashSet<usize>, transactions: &[Transaction]) -> bool {
    let count_true = remaining.iter().filter(|&&t| transactions[t].label).count();
    count_true >= remaining.len() - count_true
}

fn global_majority(transactions: &[Transaction]) -> bool {
    let count_true = transactions.iter().filter(|t| t.label).count();
    count_true >= transactions.len() - count_true
}

// M1-style database coverage. Walks the sorted rules, greedily covering
// remaining transactions, then keeps the prefix of accepted rules with the
// minimum recorded total error. Returns the pruned rule list and the label
// of the default rule that handles whatever the list leaves uncovered.
pub fn build(
    mut rules: Vec<Rule>,
    transactions: &[Transaction],
    index: &Index,
    itemizer: &Itemizer,
    error_weights: &ErrorWeights,
) -> (Vec<Rule>, bool) {
    sort_rules(&mut rules, itemizer);

    let mut remaining: FnvHashSet<usize> = (0..transactions.len()).collect();
    let mut rule_list: Vec<Rule> = vec![];
    let mut total_errors: Vec<f64> = vec![];
    let mut cumulative_errors = 0.0;

    for rule in rules {
        let covered: Vec<usize> = index
            .tids_matching(&rule.items)
            .into_iter()
            .filter(|t| remaining.contains(t))
            .collect();
        if covered.is_empty() {
            // Nothing left for this rule to say anything about.
            continue;
        }

        let correct = covered
            .iter()
            .filter(|&&t| transactions[t].label == rule.label)
            .count();
        let wrong = covered.len() - correct;
        if correct == 0 || wrong >= correct {
            // Accepting it would hurt more than it helps.
            continue;
        }

        cumulative_errors += wrong as f64 * weight_of(error_weights, rule.label);
        for t in &covered {
            remaining.remove(t);
        }
        rule_list.push(rule);
        total_errors
            .push(cumulative_errors + default_rule_errors(&remaining, transactions, error_weights));

        if remaining.is_empty() {
            break;
        }
    }

    if rule_list.is_empty() {
        return (vec![], global_majority(transactions));
    }

    // The error series already includes the cost of stopping at each step;
    // its first minimum is the pruning point.
    let mut stopping_point = 0;
    for (i, &errors) in total_errors.iter().enumerate() {
        if errors < total_errors[stopping_point] {
            stopping_point = i;
        }
    }
    rule_list.truncate(stopping_point + 1);

    // Re-run coverage for the pruned list alone to find what the default
    // rule actually has to handle.
    let mut remaining: FnvHashSet<usize> = (0..transactions.len()).collect();
    for rule in &rule_list {
        for t in index.tids_matching(&rule.items) {
            remaining.remove(&t);
        }
    }
    let default_label = if remaining.is_empty() {
        global_majority(transactions)
    } else {
        majority_in(&remaining, transactions)
    };

    (rule_list, default_label)
}

fn is_false(b: &bool) -> bool {
    !*b
}

// Serialized rule: predicate strings instead of interned ids, so the
// artifact is self-contained and diffable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub itemset: Vec<String>,
    pub label: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lift: Option<f64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
}

// The trained artifact: the pruned rule list with its default rule last,
// plus everything prediction-time encoding needs. The schema rides along
// so test-time loading parses columns with the training-time kinds instead
// of re-inferring them from whatever the test sample looks like.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Classifier {
    pub rules: Vec<ClassifierRule>,
    pub schema: Vec<Feature>,
    pub threshold_map: ThresholdMap,
    pub label_base_rates: LabelRatios,
}

impl Classifier {
    pub fn assemble(
        selected: &[Rule],
        default_label: bool,
        schema: Vec<Feature>,
        threshold_map: ThresholdMap,
        ratios: LabelRatios,
        itemizer: &Itemizer,
    ) -> Classifier {
        let mut rules: Vec<ClassifierRule> = selected
            .iter()
            .map(|rule| {
                let mut itemset: Vec<String> = rule.items
                    .items()
                    .iter()
                    .map(|&i| itemizer.predicate_of(i).to_string())
                    .collect();
                itemset.sort();
                ClassifierRule {
                    itemset: itemset,
                    label: rule.label,
                    confidence: Some(rule.confidence),
                    support: Some(rule.support),
                    lift: Some(rule.lift),
                    default: false,
                }
            })
            .collect();
        rules.push(ClassifierRule {
            itemset: vec![],
            label: default_label,
            confidence: None,
            support: None,
            lift: None,
            default: true,
        });
        Classifier {
            rules: rules,
            schema: schema,
            threshold_map: threshold_map,
            label_base_rates: ratios,
        }
    }

    // Serializes fully in memory before touching the file, so an
    // interrupted run never leaves a half-written artifact behind.
    pub fn save(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    // Rejects artifacts that could not make a prediction for every
    // transaction: the rule list must end with an empty-itemset default
    // rule, and a hand-edited artifact may not have one.
    pub fn load(path: &str) -> Result<Classifier, Box<dyn Error>> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        let classifier: Classifier = serde_json::from_str(&contents)?;
        let has_default = classifier
            .rules
            .last()
            .map_or(false, |rule| rule.default && rule.itemset.is_empty());
        if !has_default {
            return Err(From::from("classifier has no trailing default rule"));
        }
        Ok(classifier)
    }

    // Re-interns the rule itemsets against the itemizer used for the
    // prediction-time encoding, so matching is a plain subset test.
    pub fn compile(&self, itemizer: &mut Itemizer) -> Vec<CompiledRule> {
        self.rules
            .iter()
            .map(|rule| CompiledRule {
                items: ItemSet::new(
                    rule.itemset.iter().map(|s| itemizer.id_of(s, s)).collect(),
                ),
                label: rule.label,
                confidence: rule.confidence.unwrap_or(0.0),
                default: rule.default,
            })
            .collect()
    }
}

pub struct CompiledRule {
    pub items: ItemSet,
    pub label: bool,
    pub confidence: f64,
    pub default: bool,
}

// First matching rule wins; the default rule matches everything.
pub fn predict(rules: &[CompiledRule], transaction: &ItemSet) -> bool {
    for rule in rules {
        if rule.default || rule.items.is_subset_of(transaction) {
            return rule.label;
        }
    }
    panic!("classifier has no default rule");
}

// Probability of a true label: the first matching non-default rule's
// confidence (flipped if it predicts false), or the training base rate
// when no rule matches.
pub fn predict_prob(rules: &[CompiledRule], transaction: &ItemSet, ratios: &LabelRatios) -> f64 {
    for rule in rules {
        if rule.default {
            continue;
        }
        if rule.items.is_subset_of(transaction) {
            return if rule.label {
                rule.confidence
            } else {
                1.0 - rule.confidence
            };
        }
    }
    ratios.pos
}
