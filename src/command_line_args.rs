// Copyright 2018 Chris Pearce
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env;
use std::io;
use std::process;

use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};

use classifier::DEFAULT_ERROR_WEIGHTS;

pub struct Arguments {
    pub train_file_path: Option<String>,
    pub test_file_path: Option<String>,
    pub classifier_path: String,
    pub skip_leading_id: bool,

    // Discretizer.
    pub max_split_count: usize,
    pub min_bin_frac: f64,
    pub delta_cost: f64,
    pub entropy_weights: [f64; 2],
    pub use_gini: bool,

    // Mining and rule generation.
    pub max_k: usize,
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub m_estimate_weights: [f64; 2],

    // Classifier pruning.
    pub error_weights: [f64; 2],
}

pub fn parse_args_or_exit() -> Arguments {
    let mut args: Arguments = Arguments {
        train_file_path: None,
        test_file_path: None,
        classifier_path: String::new(),
        skip_leading_id: false,
        max_split_count: 3,
        min_bin_frac: 0.1,
        delta_cost: 1e-3,
        entropy_weights: [3.0, 1.0],
        use_gini: false,
        max_k: 5,
        min_support: 2e-4,
        min_confidence: 0.2,
        min_lift: 1.05,
        m_estimate_weights: [2.0, 0.0],
        error_weights: DEFAULT_ERROR_WEIGHTS,
    };

    // The parser wants one &mut per option; paired weights go through
    // scalars and are reassembled below.
    let mut entropy_weight_true = args.entropy_weights[0];
    let mut entropy_weight_false = args.entropy_weights[1];
    let mut m_estimate_weight_true = args.m_estimate_weights[0];
    let mut m_estimate_weight_false = args.m_estimate_weights[1];
    let mut error_weight_true = args.error_weights[0];
    let mut error_weight_false = args.error_weights[1];

    {
        let mut parser = ArgumentParser::new();
        parser.set_description(
            "Class association rule classifier (CBA) for binary-labelled CSV datasets.",
        );

        parser
            .refer(&mut args.train_file_path)
            .add_option(
                &["--train"],
                StoreOption,
                "Training dataset in CSV format; mines rules and writes the classifier.",
            )
            .metavar("file_path");

        parser
            .refer(&mut args.test_file_path)
            .add_option(
                &["--test"],
                StoreOption,
                "Test dataset in CSV format; evaluates the classifier against it.",
            )
            .metavar("file_path");

        parser
            .refer(&mut args.classifier_path)
            .add_option(
                &["--classifier"],
                Store,
                "File path of the classifier JSON (written by --train, read by --test).",
            )
            .metavar("file_path")
            .required();

        parser.refer(&mut args.skip_leading_id).add_option(
            &["--skip-id"],
            StoreTrue,
            "Treat the first CSV column as a record id and ignore it.",
        );

        parser
            .refer(&mut args.max_split_count)
            .add_option(
                &["--max-splits"],
                Store,
                "Maximum split count per numeric feature.",
            )
            .metavar("count");

        parser
            .refer(&mut args.min_bin_frac)
            .add_option(
                &["--min-bin-frac"],
                Store,
                "Minimum fraction of instances per discretization bin, in range [0,1].",
            )
            .metavar("fraction");

        parser
            .refer(&mut args.delta_cost)
            .add_option(
                &["--delta-cost"],
                Store,
                "Minimum cost improvement required to accept a further split.",
            )
            .metavar("threshold");

        parser.refer(&mut entropy_weight_true).add_option(
            &["--entropy-weight-true"],
            Store,
            "Entropy weight of the true-label term.",
        );

        parser.refer(&mut entropy_weight_false).add_option(
            &["--entropy-weight-false"],
            Store,
            "Entropy weight of the false-label term.",
        );

        parser.refer(&mut args.use_gini).add_option(
            &["--gini"],
            StoreTrue,
            "Use Gini impurity instead of weighted entropy for bin costs.",
        );

        parser
            .refer(&mut args.max_k)
            .add_option(&["--max-k"], Store, "Maximum frequent itemset size.")
            .metavar("count");

        parser
            .refer(&mut args.min_support)
            .add_option(
                &["--min-support"],
                Store,
                "Minimum itemset support threshold, in range [0,1].",
            )
            .metavar("threshold");

        parser
            .refer(&mut args.min_confidence)
            .add_option(
                &["--min-confidence"],
                Store,
                "Minimum rule confidence threshold, in range [0,1].",
            )
            .metavar("threshold");

        parser
            .refer(&mut args.min_lift)
            .add_option(
                &["--min-lift"],
                Store,
                "Minimum rule lift threshold; rules at or below it are dropped.",
            )
            .metavar("threshold");

        parser.refer(&mut m_estimate_weight_true).add_option(
            &["--m-estimate-weight-true"],
            Store,
            "A true rule's m-estimate must exceed this multiple of the true base rate.",
        );

        parser.refer(&mut m_estimate_weight_false).add_option(
            &["--m-estimate-weight-false"],
            Store,
            "A false rule's m-estimate must exceed this multiple of the false base rate.",
        );

        parser.refer(&mut error_weight_true).add_option(
            &["--error-weight-true"],
            Store,
            "Cost of a misprediction made by a true-label rule (false positive).",
        );

        parser.refer(&mut error_weight_false).add_option(
            &["--error-weight-false"],
            Store,
            "Cost of a misprediction made by a false-label rule (false negative).",
        );

        if env::args().count() == 1 {
            parser.print_help("Usage:", &mut io::stderr()).unwrap();
            process::exit(1);
        }

        match parser.parse_args() {
            Ok(()) => {}
            Err(err) => {
                process::exit(err);
            }
        }
    }

    args.entropy_weights = [entropy_weight_true, entropy_weight_false];
    args.m_estimate_weights = [m_estimate_weight_true, m_estimate_weight_false];
    args.error_weights = [error_weight_true, error_weight_false];

    if args.train_file_path.is_none() && args.test_file_path.is_none() {
        eprintln!("Nothing to do: pass --train and/or --test");
        process::exit(1);
    }

    if args.min_support < 0.0 || args.min_support > 1.0 {
        eprintln!("Minimum itemset support must be in range [0,1]");
        process::exit(1);
    }

    if args.min_confidence < 0.0 || args.min_confidence > 1.0 {
        eprintln!("Minimum rule confidence threshold must be in range [0,1]");
        process::exit(1);
    }

    if args.min_bin_frac < 0.0 || args.min_bin_frac > 1.0 {
        eprintln!("Minimum bin fraction must be in range [0,1]");
        process::exit(1);
    }

    if args.min_lift < 0.0 {
        eprintln!("Minimum lift must be non-negative");
        process::exit(1);
    }

    args
}
