extern crate argparse;
extern crate fnv;
extern crate itertools;
extern crate ordered_float;
extern crate rayon;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

mod apriori;
mod classifier;
mod command_line_args;
mod dataset;
mod discretizer;
mod evaluate;
mod generate_rules;
mod index;
mod item;
mod itemizer;
mod itemset;
mod transactions;
mod vec_sets;

use std::error::Error;
use std::process;
use std::time::Instant;

use classifier::Classifier;
use command_line_args::{parse_args_or_exit, Arguments};
use discretizer::DiscretizerConfig;
use generate_rules::RuleConfig;
use index::Index;
use itemizer::Itemizer;

fn train(args: &Arguments, train_path: &str) -> Result<(), Box<dyn Error>> {
    println!("Training on data set: {}", train_path);
    let start = Instant::now();

    let dataset = dataset::load_csv(train_path, args.skip_leading_id)?;
    println!(
        "Loaded {} instances ({} features).",
        dataset.size(),
        dataset.features.len() - 1
    );

    let discretizer_config = DiscretizerConfig {
        max_split_count: args.max_split_count,
        min_bin_frac: args.min_bin_frac,
        delta_cost: args.delta_cost,
        entropy_weights: args.entropy_weights,
        use_gini: args.use_gini,
    };

    println!(
        "Discretizing numeric features... (max_splits: {}, min_bin_frac: {}, delta_cost: {})",
        args.max_split_count, args.min_bin_frac, args.delta_cost
    );
    let timer = Instant::now();
    let threshold_map = discretizer::best_thresholds_for_features(&dataset, &discretizer_config);
    for (feature, thresholds) in &threshold_map {
        println!("  {}: {:?}", feature, thresholds);
    }
    println!(
        "Discretized {} features in {} seconds.",
        threshold_map.len(),
        timer.elapsed().as_secs()
    );

    println!("Encoding transactions...");
    let mut itemizer = Itemizer::new();
    let transactions = transactions::encode(&dataset, &threshold_map, &mut itemizer);
    let mut index = Index::new();
    for transaction in &transactions {
        index.insert(&transaction.items, transaction.label);
    }
    println!(
        "Encoded {} transactions over {} distinct items ({} true labelled).",
        transactions.len(),
        index.items().len(),
        transactions::count_positive(&transactions)
    );

    println!(
        "Running apriori... (max_k: {}, min_support: {})",
        args.max_k, args.min_support
    );
    let timer = Instant::now();
    let frequent = apriori::mine(&index, &itemizer, args.min_support, args.max_k);
    let itemset_count: usize = frequent.iter().map(|level| level.len()).sum();
    println!(
        "Collected {} frequent itemsets up to size {} in {} seconds.",
        itemset_count,
        frequent.len(),
        timer.elapsed().as_secs()
    );

    println!(
        "Generating rules... (min_confidence: {}, min_lift: {})",
        args.min_confidence, args.min_lift
    );
    let ratios = generate_rules::base_rates(&transactions);
    let rule_config = RuleConfig {
        min_confidence: args.min_confidence,
        min_lift: args.min_lift,
        m_estimate_weights: args.m_estimate_weights,
    };
    let rules =
        generate_rules::generate_rules(&frequent, transactions.len(), ratios, &rule_config);
    let rule_count = rules.len();

    println!("Building classifier...");
    let timer = Instant::now();
    let (selected, default_label) = classifier::build(
        rules,
        &transactions,
        &index,
        &itemizer,
        &args.error_weights,
    );
    println!(
        "Generated {} rules; down to {} plus a default after coverage pruning \
         ({} seconds).",
        rule_count,
        selected.len(),
        timer.elapsed().as_secs()
    );

    let classifier = Classifier::assemble(
        &selected,
        default_label,
        dataset.features.clone(),
        threshold_map,
        ratios,
        &itemizer,
    );
    classifier.save(&args.classifier_path)?;
    println!("Wrote classifier to {}", args.classifier_path);

    println!("Total training time: {} seconds", start.elapsed().as_secs());
    Ok(())
}

fn test(args: &Arguments, test_path: &str) -> Result<(), Box<dyn Error>> {
    println!("Evaluating against data set: {}", test_path);

    let classifier = Classifier::load(&args.classifier_path)?;
    let dataset =
        dataset::load_csv_with_schema(test_path, args.skip_leading_id, &classifier.schema)?;

    // Encoding must use the training-time schema and threshold map for the
    // rule predicates to line up.
    let mut itemizer = Itemizer::new();
    let transactions = transactions::encode(&dataset, &classifier.threshold_map, &mut itemizer);
    let compiled = classifier.compile(&mut itemizer);

    let actual: Vec<bool> = transactions.iter().map(|t| t.label).collect();
    let predicted: Vec<bool> = transactions
        .iter()
        .map(|t| classifier::predict(&compiled, &t.items))
        .collect();
    let scores: Vec<f64> = transactions
        .iter()
        .map(|t| classifier::predict_prob(&compiled, &t.items, &classifier.label_base_rates))
        .collect();

    let metrics = evaluate::basic_metrics(&actual, &predicted);
    println!("Accuracy:  {:.4}", metrics.accuracy);
    println!("Precision: {:.4}", metrics.precision);
    println!("Recall:    {:.4}", metrics.recall);
    println!("ROC-AUC:   {:.4}", evaluate::roc_auc(&actual, &scores));
    Ok(())
}

fn main() {
    let arguments = parse_args_or_exit();

    if let Some(ref train_path) = arguments.train_file_path {
        if let Err(err) = train(&arguments, train_path) {
            println!("Error: {}", err);
            process::exit(1);
        }
    }

    if let Some(ref test_path) = arguments.test_file_path {
        if let Err(err) = test(&arguments, test_path) {
            println!("Error: {}", err);
            process::exit(1);
        }
    }
}
