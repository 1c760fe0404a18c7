use ordered_float::OrderedFloat;

#[derive(Copy, Clone, Debug)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

pub fn basic_metrics(actual: &[bool], predicted: &[bool]) -> Metrics {
    assert_eq!(actual.len(), predicted.len());
    let mut tp = 0;
    let mut tn = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        match (a, p) {
            (true, true) => tp += 1,
            (false, false) => tn += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
        }
    }
    let ratio = |num: u32, denom: u32| {
        if denom == 0 {
            0.0
        } else {
            num as f64 / denom as f64
        }
    };
    Metrics {
        accuracy: ratio(tp + tn, tp + tn + fp + fn_),
        precision: ratio(tp, tp + fp),
        recall: ratio(tp, tp + fn_),
    }
}

// Rank-based ROC-AUC (Mann-Whitney U), with average ranks for tied scores.
// Degenerate single-class input scores 0.5: no ranking is better than any
// other.
pub fn roc_auc(actual: &[bool], scores: &[f64]) -> f64 {
    assert_eq!(actual.len(), scores.len());
    let n_pos = actual.iter().filter(|&&a| a).count();
    let n_neg = actual.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(scores[i]));

    // rank[i] is the 1-based average rank of instance i by score.
    let mut rank = vec![0.0; scores.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let average = (i + j + 2) as f64 / 2.0;
        for k in i..j + 1 {
            rank[order[k]] = average;
        }
        i = j + 1;
    }

    let pos_rank_sum: f64 = actual
        .iter()
        .zip(rank.iter())
        .filter(|&(&a, _)| a)
        .map(|(_, &r)| r)
        .sum();
    let u = pos_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0;
    u / (n_pos * n_neg) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_basic_metrics() {
        let actual = [true, true, true, false, false, false];
        let predicted = [true, true, false, false, false, true];
        let metrics = basic_metrics(&actual, &predicted);
        // tp=2 tn=2 fp=1 fn=1
        assert!((metrics.accuracy - 4.0 / 6.0).abs() < EPS);
        assert!((metrics.precision - 2.0 / 3.0).abs() < EPS);
        assert!((metrics.recall - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_metrics_zero_denominators() {
        let actual = [false, false];
        let predicted = [false, false];
        let metrics = basic_metrics(&actual, &predicted);
        assert!((metrics.accuracy - 1.0).abs() < EPS);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
    }

    #[test]
    fn test_roc_auc_perfect() {
        let actual = [false, false, true, true];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc(&actual, &scores) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_roc_auc_inverted() {
        let actual = [true, true, false, false];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert!(roc_auc(&actual, &scores).abs() < EPS);
    }

    #[test]
    fn test_roc_auc_uninformative() {
        let actual = [true, false, true, false];
        let scores = [0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&actual, &scores) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_roc_auc_single_class() {
        let actual = [true, true];
        let scores = [0.3, 0.9];
        assert!((roc_auc(&actual, &scores) - 0.5).abs() < EPS);
    }
}
