use std::collections::BTreeMap;
use std::f64;

use ordered_float::OrderedFloat;

use dataset::{Dataset, FeatureKind};

// Feature name -> sorted bin boundaries. Built once on the training set and
// reused verbatim when encoding at prediction time; the two must agree for
// predictions to be well-defined.
pub type ThresholdMap = BTreeMap<String, Vec<f64>>;

#[derive(Clone, Debug)]
pub struct DiscretizerConfig {
    pub max_split_count: usize,
    pub min_bin_frac: f64,
    pub delta_cost: f64,
    pub entropy_weights: [f64; 2],
    pub use_gini: bool,
}

impl Default for DiscretizerConfig {
    fn default() -> DiscretizerConfig {
        DiscretizerConfig {
            max_split_count: 3,
            min_bin_frac: 0.1,
            delta_cost: 1e-3,
            entropy_weights: [3.0, 1.0],
            use_gini: false,
        }
    }
}

// One numeric feature's (value, label) pairs sorted by value, with prefix
// positive counts so any segment's label distribution is O(1).
struct SortedColumn {
    values: Vec<f64>,
    labels: Vec<bool>,
    pos_prefix: Vec<u32>,
}

impl SortedColumn {
    fn new(mut column: Vec<(f64, bool)>) -> SortedColumn {
        column.sort_by_key(|&(v, _)| OrderedFloat(v));
        let values: Vec<f64> = column.iter().map(|&(v, _)| v).collect();
        let labels: Vec<bool> = column.iter().map(|&(_, l)| l).collect();
        let mut pos_prefix: Vec<u32> = Vec::with_capacity(values.len() + 1);
        pos_prefix.push(0);
        for (i, &label) in labels.iter().enumerate() {
            pos_prefix.push(pos_prefix[i] + if label { 1 } else { 0 });
        }
        SortedColumn {
            values: values,
            labels: labels,
            pos_prefix: pos_prefix,
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn positives_in(&self, start: usize, end: usize) -> u32 {
        self.pos_prefix[end + 1] - self.pos_prefix[start]
    }

    // Impurity of the inclusive segment [start, end], weighted by the
    // fraction of the column it covers so bin costs sum comparably.
    fn segment_cost(&self, start: usize, end: usize, config: &DiscretizerConfig) -> f64 {
        let len = (end - start + 1) as f64;
        let p = self.positives_in(start, end) as f64 / len;
        let impurity = if p <= 0.0 || p >= 1.0 {
            0.0
        } else if config.use_gini {
            2.0 * p * (1.0 - p)
        } else {
            let [w_pos, w_neg] = config.entropy_weights;
            -(w_pos * p * p.log2() + w_neg * (1.0 - p) * (1.0 - p).log2())
        };
        (len / self.len() as f64) * impurity
    }

    // Indices i where a split between i and i+1 can change the optimum:
    // the label flips and the value strictly increases. Splitting anywhere
    // else either separates equal values or equal labels.
    fn boundaries(&self) -> Vec<usize> {
        (0..self.len().saturating_sub(1))
            .filter(|&i| self.labels[i] != self.labels[i + 1] && self.values[i] < self.values[i + 1])
            .collect()
    }
}

struct DpTables {
    // cost[b][i] = min cost of covering the sorted prefix 0..=i with b bins.
    cost: Vec<Vec<f64>>,
    // segment[b][i] = t where the optimal last bin is t+1..=i.
    segment: Vec<Vec<Option<usize>>>,
}

fn discretize(
    column: &SortedColumn,
    split_count: usize,
    config: &DiscretizerConfig,
) -> Option<DpTables> {
    let n = column.len();
    let desired_bin_count = split_count + 1;
    let min_bin_size = ((config.min_bin_frac * n as f64) as usize).max(1);

    let boundaries = column.boundaries();
    if boundaries.is_empty() {
        // Zero variance or all one class; no split is meaningful.
        return None;
    }

    let mut cost = vec![vec![f64::INFINITY; n]; desired_bin_count + 1];
    let mut segment = vec![vec![None; n]; desired_bin_count + 1];

    for i in min_bin_size - 1..n {
        cost[1][i] = column.segment_cost(0, i, config);
    }

    for b in 2..desired_bin_count + 1 {
        if b * min_bin_size > n {
            break;
        }
        for seg_end in b * min_bin_size - 1..n {
            for &seg_start in &boundaries {
                // Boundaries are ascending; once the last bin would be too
                // small the rest are too.
                if seg_start + min_bin_size > seg_end {
                    break;
                }
                // Not enough room before seg_start for the other b-1 bins.
                if seg_start + 1 < (b - 1) * min_bin_size {
                    continue;
                }
                let prev_cost = cost[b - 1][seg_start];
                if !prev_cost.is_finite() {
                    continue;
                }
                let c = prev_cost + column.segment_cost(seg_start + 1, seg_end, config);
                if c < cost[b][seg_end] {
                    cost[b][seg_end] = c;
                    segment[b][seg_end] = Some(seg_start);
                }
            }
        }
    }

    if !cost[desired_bin_count][n - 1].is_finite() {
        return None;
    }
    Some(DpTables {
        cost: cost,
        segment: segment,
    })
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}

// Thresholds are the midpoints between adjacent sorted values at the chosen
// segment boundaries, walking the segment table back from the full prefix.
fn extract_thresholds(column: &SortedColumn, tables: &DpTables, split_count: usize) -> Vec<f64> {
    let mut thresholds = vec![];
    let mut cur_seg_end = column.len() - 1;
    let mut bin_count = split_count + 1;
    while bin_count > 1 {
        let seg_start = tables.segment[bin_count][cur_seg_end]
            .expect("finite DP cost must have a recorded split");
        let threshold = (column.values[seg_start] + column.values[seg_start + 1]) / 2.0;
        thresholds.push(round6(threshold));
        cur_seg_end = seg_start;
        bin_count -= 1;
    }
    thresholds.sort_by_key(|&t| OrderedFloat(t));
    thresholds
}

// Cost-optimal thresholds for one numeric column, or None if no feasible
// partition exists (the caller then leaves the feature unsplit).
pub fn best_thresholds(column: Vec<(f64, bool)>, config: &DiscretizerConfig) -> Option<Vec<f64>> {
    if column.is_empty() {
        return None;
    }
    let column = SortedColumn::new(column);

    // The DP at split_count s also fills every smaller bin count, so run it
    // once at the largest feasible split count.
    let mut split_count = config.max_split_count;
    let mut tables = None;
    while tables.is_none() && split_count > 0 {
        tables = discretize(&column, split_count, config);
        if tables.is_none() {
            split_count -= 1;
        }
    }
    let tables = match tables {
        Some(t) => t,
        None => return None,
    };
    let max_split_count = split_count;

    let n = column.len();
    let mut best_cost = f64::INFINITY;
    let mut best_thresholds = None;
    for split_count in 1..max_split_count + 1 {
        let cost = tables.cost[split_count + 1][n - 1];
        // More bins are only worth taking while they buy more than
        // delta_cost of improvement.
        if best_cost - cost > config.delta_cost {
            best_cost = cost;
            best_thresholds = Some(extract_thresholds(&column, &tables, split_count));
        }
    }
    best_thresholds
}

// Threshold map over every numeric feature of the dataset. Features whose
// discretization is infeasible get no entry and are left unsplit.
pub fn best_thresholds_for_features(dataset: &Dataset, config: &DiscretizerConfig) -> ThresholdMap {
    let mut threshold_map = ThresholdMap::new();
    for (idx, feature) in dataset.features.iter().enumerate() {
        // The label column is not a feature.
        if idx + 1 == dataset.features.len() {
            break;
        }
        if feature.kind != FeatureKind::Numeric {
            continue;
        }
        if let Some(thresholds) = best_thresholds(dataset.numeric_column(idx), config) {
            threshold_map.insert(feature.name.clone(), thresholds);
        }
    }
    threshold_map
}
