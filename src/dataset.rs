use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FeatureKind {
    Numeric,
    Categorical,
    Boolean,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
}

// Cell of a fixed-schema record. Accessors resolve by column index, fixed
// once at load time; there is no per-field lookup by name.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Num(f64),
    Cat(String),
    Flag(bool),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Num(v) => v,
            Value::Flag(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Cat(_) => panic!("categorical value used as numeric"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Num(v) => write!(f, "{}", v),
            Value::Cat(ref s) => write!(f, "{}", s),
            Value::Flag(b) => write!(f, "{}", b),
        }
    }
}

// One record: the non-label feature values in schema order, plus the label.
#[derive(Clone, Debug)]
pub struct Instance {
    pub values: Vec<Value>,
    pub label: bool,
}

pub struct Dataset {
    pub features: Vec<Feature>,
    pub instances: Vec<Instance>,
}

impl Dataset {
    pub fn size(&self) -> usize {
        self.instances.len()
    }

    pub fn count_label_true(&self) -> usize {
        self.instances.iter().filter(|i| i.label).count()
    }

    pub fn count_label_false(&self) -> usize {
        self.size() - self.count_label_true()
    }

    // Ties resolve to true, as everywhere else in the pipeline.
    pub fn majority_label(&self) -> bool {
        self.count_label_true() >= self.count_label_false()
    }

    // The (value, label) column for one numeric feature, unsorted.
    pub fn numeric_column(&self, feature_idx: usize) -> Vec<(f64, bool)> {
        assert!(self.features[feature_idx].kind == FeatureKind::Numeric);
        self.instances
            .iter()
            .map(|inst| (inst.values[feature_idx].as_f64(), inst.label))
            .collect()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "True" => Some(true),
        "0" | "false" | "False" => Some(false),
        _ => None,
    }
}

fn infer_kind(column: &[String]) -> FeatureKind {
    if column.iter().all(|v| parse_bool(v).is_some()) {
        return FeatureKind::Boolean;
    }
    if column.iter().all(|v| v.parse::<f64>().is_ok()) {
        return FeatureKind::Numeric;
    }
    FeatureKind::Categorical
}

// Loads a headed CSV. The last column is the label and must be boolean;
// other column kinds are inferred from their values. skip_leading_id drops
// the first column (record ids carry no signal).
pub fn load_csv(path: &str, skip_leading_id: bool) -> Result<Dataset, Box<dyn Error>> {
    load(path, skip_leading_id, None)
}

// Prediction-time loading: the caller supplies the training-time schema and
// column kinds come from it, never from re-inference. A numeric feature
// whose test-sample values all happen to look boolean must still parse as
// the numeric feature the classifier was trained on.
pub fn load_csv_with_schema(
    path: &str,
    skip_leading_id: bool,
    schema: &[Feature],
) -> Result<Dataset, Box<dyn Error>> {
    load(path, skip_leading_id, Some(schema))
}

fn load(
    path: &str,
    skip_leading_id: bool,
    schema: Option<&[Feature]>,
) -> Result<Dataset, Box<dyn Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut header: Vec<String> = vec![];
    let mut rows: Vec<Vec<String>> = vec![];
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields: Vec<String> = line.split(',').map(|s| s.trim().to_string()).collect();
        if skip_leading_id && !fields.is_empty() {
            fields.remove(0);
        }
        if header.is_empty() {
            header = fields;
        } else {
            if fields.len() != header.len() {
                return Err(From::from(format!(
                    "row {} has {} fields, expected {}",
                    rows.len() + 2,
                    fields.len(),
                    header.len()
                )));
            }
            rows.push(fields);
        }
    }

    if header.len() < 2 {
        return Err(From::from("dataset needs at least one feature and a label"));
    }
    if rows.is_empty() {
        return Err(From::from("dataset contains no instances"));
    }

    let column_count = header.len();
    let kinds: Vec<FeatureKind> = match schema {
        Some(schema) => {
            if schema.len() != column_count {
                return Err(From::from(format!(
                    "file has {} columns, schema has {}",
                    column_count,
                    schema.len()
                )));
            }
            for (feature, name) in schema.iter().zip(header.iter()) {
                if feature.name != *name {
                    return Err(From::from(format!(
                        "column '{}' does not match schema feature '{}'",
                        name, feature.name
                    )));
                }
            }
            schema.iter().map(|f| f.kind).collect()
        }
        None => {
            let mut kinds = vec![];
            for col in 0..column_count {
                let column: Vec<String> = rows.iter().map(|r| r[col].clone()).collect();
                kinds.push(infer_kind(&column));
            }
            kinds
        }
    };
    if kinds[column_count - 1] != FeatureKind::Boolean {
        return Err(From::from(format!(
            "label column '{}' is not boolean",
            header[column_count - 1]
        )));
    }

    let features: Vec<Feature> = header
        .iter()
        .zip(kinds.iter())
        .map(|(name, &kind)| Feature {
            name: name.clone(),
            kind: kind,
        })
        .collect();

    let mut instances: Vec<Instance> = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values: Vec<Value> = Vec::with_capacity(column_count - 1);
        for col in 0..column_count - 1 {
            let cell = &row[col];
            let value = match kinds[col] {
                FeatureKind::Numeric => Value::Num(cell.parse::<f64>()?),
                FeatureKind::Boolean => match parse_bool(cell) {
                    Some(flag) => Value::Flag(flag),
                    None => {
                        return Err(From::from(format!(
                            "'{}' is not a boolean value for column '{}'",
                            cell, header[col]
                        )))
                    }
                },
                FeatureKind::Categorical => Value::Cat(cell.clone()),
            };
            values.push(value);
        }
        let label = match parse_bool(&row[column_count - 1]) {
            Some(label) => label,
            None => {
                return Err(From::from(format!(
                    "'{}' is not a boolean label",
                    row[column_count - 1]
                )))
            }
        };
        instances.push(Instance {
            values: values,
            label: label,
        });
    }

    Ok(Dataset {
        // The label column stays in the schema so callers can name it, but
        // Instance::values only holds the non-label columns.
        features: features,
        instances: instances,
    })
}
