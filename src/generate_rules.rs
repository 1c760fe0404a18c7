use apriori::FrequentItemsets;
use itemset::ItemSet;
use transactions::Transaction;

// A class association rule: itemset implies label. Derived once from a
// frequent itemset's counts, never mutated afterwards.
#[derive(Clone, Debug)]
pub struct Rule {
    pub items: ItemSet,
    pub label: bool,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub m_estimate: f64,
}

// Unconditional label frequencies in the training set.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelRatios {
    pub pos: f64,
    pub neg: f64,
}

impl LabelRatios {
    pub fn rate_of(&self, label: bool) -> f64 {
        if label {
            self.pos
        } else {
            self.neg
        }
    }
}

pub fn base_rates(transactions: &[Transaction]) -> LabelRatios {
    let n = transactions.len() as f64;
    let pos = transactions.iter().filter(|t| t.label).count() as f64;
    LabelRatios {
        pos: pos / n,
        neg: (n - pos) / n,
    }
}

#[derive(Clone, Debug)]
pub struct RuleConfig {
    pub min_confidence: f64,
    pub min_lift: f64,
    // Indexed [true, false]: a rule's m-estimate must exceed
    // weight * base_rate for its label.
    pub m_estimate_weights: [f64; 2],
}

impl Default for RuleConfig {
    fn default() -> RuleConfig {
        RuleConfig {
            min_confidence: 0.2,
            min_lift: 1.05,
            m_estimate_weights: [2.0, 0.0],
        }
    }
}

fn weight_of(weights: &[f64; 2], label: bool) -> f64 {
    if label {
        weights[0]
    } else {
        weights[1]
    }
}

// Scores every frequent itemset against both labels and keeps the rules
// that clear every threshold. Output order is unspecified; the classifier
// builder owns precedence.
pub fn generate_rules(
    frequent: &FrequentItemsets,
    transaction_count: usize,
    ratios: LabelRatios,
    config: &RuleConfig,
) -> Vec<Rule> {
    // All-one-class input: the m-estimate prior degenerates and no rule
    // can beat a random guess, so there is nothing to generate.
    if ratios.pos <= 0.0 || ratios.neg <= 0.0 {
        return vec![];
    }

    let n = transaction_count as f64;
    let mut rules = vec![];
    for level in frequent {
        for (itemset, counts) in level {
            let total = counts.total as f64;
            let conf_pos = counts.pos as f64 / total;
            let conf_neg = counts.neg as f64 / total;
            // If neither direction is confident, the itemset is useless.
            if conf_pos.max(conf_neg) < config.min_confidence {
                continue;
            }

            for &(label, count_xy, confidence) in
                &[(true, counts.pos, conf_pos), (false, counts.neg, conf_neg)]
            {
                let p = ratios.rate_of(label);
                let lift = confidence / p;
                if lift <= config.min_lift {
                    continue;
                }
                // Laplace-style smoothing anchored to the label's prior.
                let m = (1.0 - p) / p;
                let m_estimate = (count_xy as f64 + m * p) / (total + m);
                // The rule must beat a weighted random guess for its class.
                if m_estimate <= p * weight_of(&config.m_estimate_weights, label) {
                    continue;
                }

                rules.push(Rule {
                    items: itemset.clone(),
                    label: label,
                    support: count_xy as f64 / n,
                    confidence: confidence,
                    lift: lift,
                    m_estimate: m_estimate,
                });
            }
        }
    }
    rules
}
