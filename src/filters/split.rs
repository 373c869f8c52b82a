//! Train/validation/test splitting.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Interaction;

/// How the holdout records are chosen.
///
/// Ratio-only splitting without a fixed seed is not reproducible, so both
/// strategies here are deterministic: `Random` carries an explicit seed and
/// `Temporal` holds out the most recent records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitStrategy {
    /// Uniform random holdout, seeded.
    Random { seed: u64 },
    /// Order-based holdout: records are sorted by timestamp (input order as
    /// tiebreak, and as fallback when timestamps are absent) and the latest
    /// fraction is held out.
    Temporal,
}

/// The three disjoint subsets produced by a split.
///
/// Their concatenation is exactly the input multiset: no record is
/// duplicated or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<Interaction>,
    pub val: Vec<Interaction>,
    pub test: Vec<Interaction>,
}

/// Partition the interaction set by holdout ratios.
///
/// `test_ratio` and `val_ratio` must each lie in `[0, 1)` and sum to less
/// than 1. Subset sizes are rounded to the nearest record; every subset
/// preserves the input's relative record order.
pub fn split(
    dataset: Vec<Interaction>,
    test_ratio: f64,
    val_ratio: f64,
    strategy: SplitStrategy,
) -> Result<Split, ConfigError> {
    validate_ratios(test_ratio, val_ratio)?;

    let n = dataset.len();
    let n_test = ((n as f64) * test_ratio).round() as usize;
    let n_val = ((n as f64) * val_ratio).round() as usize;

    // Rank every record; the highest ranks are held out.
    let order: Vec<usize> = match strategy {
        SplitStrategy::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(&mut rng);
            indices
        }
        SplitStrategy::Temporal => {
            if dataset.iter().any(|r| r.timestamp.is_none()) {
                tracing::warn!(
                    "temporal split requested but some records lack timestamps; \
                     falling back to input order for those records"
                );
            }
            let mut indices: Vec<usize> = (0..n).collect();
            indices.sort_by_key(|&i| (dataset[i].timestamp.unwrap_or(0), i));
            indices
        }
    };

    // rank[i]: position of record i in the holdout ordering.
    let mut rank = vec![0usize; n];
    for (pos, &i) in order.iter().enumerate() {
        rank[i] = pos;
    }
    let test_from = n - n_test;
    let val_from = test_from - n_val;

    let mut result = Split {
        train: Vec::with_capacity(val_from),
        val: Vec::with_capacity(n_val),
        test: Vec::with_capacity(n_test),
    };
    for (i, record) in dataset.into_iter().enumerate() {
        if rank[i] >= test_from {
            result.test.push(record);
        } else if rank[i] >= val_from {
            result.val.push(record);
        } else {
            result.train.push(record);
        }
    }

    tracing::info!(
        train = result.train.len(),
        val = result.val.len(),
        test = result.test.len(),
        ?strategy,
        "split dataset"
    );
    Ok(result)
}

fn validate_ratios(test: f64, val: f64) -> Result<(), ConfigError> {
    let in_range = |r: f64| (0.0..1.0).contains(&r);
    if !in_range(test) || !in_range(val) || test + val >= 1.0 {
        return Err(ConfigError::InvalidRatio { test, val });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample(n: u64) -> Vec<Interaction> {
        (0..n).map(|i| Interaction::at(i / 10, i % 10, i)).collect()
    }

    fn as_set(records: &[Interaction]) -> HashSet<Interaction> {
        records.iter().cloned().collect()
    }

    #[test]
    fn split_is_an_exact_partition() {
        let dataset = sample(100);
        let s = split(dataset.clone(), 0.2, 0.1, SplitStrategy::Random { seed: 42 }).unwrap();

        assert_eq!(s.train.len() + s.val.len() + s.test.len(), dataset.len());

        let train = as_set(&s.train);
        let val = as_set(&s.val);
        let test = as_set(&s.test);
        assert!(train.is_disjoint(&val));
        assert!(train.is_disjoint(&test));
        assert!(val.is_disjoint(&test));

        let mut union = train;
        union.extend(val);
        union.extend(test);
        assert_eq!(union, as_set(&dataset));
    }

    #[test]
    fn subset_sizes_follow_ratios() {
        let s = split(sample(100), 0.2, 0.1, SplitStrategy::Random { seed: 42 }).unwrap();
        assert_eq!(s.test.len(), 20);
        assert_eq!(s.val.len(), 10);
        assert_eq!(s.train.len(), 70);
    }

    #[test]
    fn same_seed_reproduces_the_split() {
        let a = split(sample(50), 0.2, 0.1, SplitStrategy::Random { seed: 7 }).unwrap();
        let b = split(sample(50), 0.2, 0.1, SplitStrategy::Random { seed: 7 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = split(sample(200), 0.2, 0.1, SplitStrategy::Random { seed: 1 }).unwrap();
        let b = split(sample(200), 0.2, 0.1, SplitStrategy::Random { seed: 2 }).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn temporal_split_holds_out_latest_records() {
        let s = split(sample(100), 0.2, 0.1, SplitStrategy::Temporal).unwrap();
        let max_train = s.train.iter().filter_map(|r| r.timestamp).max().unwrap();
        let min_val = s.val.iter().filter_map(|r| r.timestamp).min().unwrap();
        let min_test = s.test.iter().filter_map(|r| r.timestamp).min().unwrap();
        assert!(max_train < min_val);
        assert!(s.val.iter().filter_map(|r| r.timestamp).max().unwrap() < min_test);
    }

    #[test]
    fn zero_ratios_put_everything_in_train() {
        let dataset = sample(10);
        let s = split(dataset.clone(), 0.0, 0.0, SplitStrategy::Random { seed: 42 }).unwrap();
        assert_eq!(s.train, dataset);
        assert!(s.val.is_empty());
        assert!(s.test.is_empty());
    }

    #[test]
    fn invalid_ratios_are_rejected() {
        assert!(split(sample(10), 0.7, 0.3, SplitStrategy::Temporal).is_err());
        assert!(split(sample(10), -0.1, 0.1, SplitStrategy::Temporal).is_err());
        assert!(split(sample(10), 1.0, 0.0, SplitStrategy::Temporal).is_err());
    }

    #[test]
    fn empty_dataset_splits_into_empty_subsets() {
        let s = split(Vec::new(), 0.2, 0.1, SplitStrategy::Random { seed: 42 }).unwrap();
        assert!(s.train.is_empty() && s.val.is_empty() && s.test.is_empty());
    }
}
