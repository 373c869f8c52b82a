//! Run configuration: TOML file layer with CLI overrides on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filters::SplitStrategy;

/// Configuration for one preprocessing run over a data folder.
///
/// The folder must contain `dataset.tsv`, `knowledge/kg.tsv` and
/// `knowledge/linking.tsv`; all outputs land under the same folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Data folder holding the raw inputs and receiving the outputs.
    pub data_folder: PathBuf,
    /// Minimum user and item degree for the iterative k-core filter.
    #[serde(default = "default_core")]
    pub core: usize,
    /// Fraction of records held out for the test set.
    #[serde(default = "default_test_ratio")]
    pub test_ratio: f64,
    /// Fraction of records held out for the validation set.
    #[serde(default = "default_val_ratio")]
    pub val_ratio: f64,
    /// Seed for the random split strategy.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Use the temporal (order-based) split instead of the seeded random one.
    #[serde(default)]
    pub temporal: bool,
}

fn default_core() -> usize {
    10
}
fn default_test_ratio() -> f64 {
    0.2
}
fn default_val_ratio() -> f64 {
    0.1
}
fn default_seed() -> u64 {
    42
}

impl PrepConfig {
    /// Config with the stock thresholds for a data folder.
    pub fn new(data_folder: impl Into<PathBuf>) -> Self {
        Self {
            data_folder: data_folder.into(),
            core: default_core(),
            test_ratio: default_test_ratio(),
            val_ratio: default_val_ratio(),
            seed: default_seed(),
            temporal: false,
        }
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check thresholds and ratios.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.core < 1 {
            return Err(ConfigError::InvalidCore { core: self.core });
        }
        let in_range = |r: f64| (0.0..1.0).contains(&r);
        if !in_range(self.test_ratio)
            || !in_range(self.val_ratio)
            || self.test_ratio + self.val_ratio >= 1.0
        {
            return Err(ConfigError::InvalidRatio {
                test: self.test_ratio,
                val: self.val_ratio,
            });
        }
        Ok(())
    }

    /// The split strategy this config selects.
    pub fn strategy(&self) -> SplitStrategy {
        if self.temporal {
            SplitStrategy::Temporal
        } else {
            SplitStrategy::Random { seed: self.seed }
        }
    }

    /// Path to the raw interaction log.
    pub fn dataset_path(&self) -> PathBuf {
        self.data_folder.join("dataset.tsv")
    }

    /// Path to the knowledge-graph dump.
    pub fn kg_path(&self) -> PathBuf {
        self.data_folder.join("knowledge").join("kg.tsv")
    }

    /// Path to the item-entity linking table.
    pub fn linking_path(&self) -> PathBuf {
        self.data_folder.join("knowledge").join("linking.tsv")
    }
}
