//! Stage orchestration for a full preprocessing run.
//!
//! The stages run in a strict sequence, each taking exclusive ownership of
//! the state bundle and returning the filtered result:
//!
//! load → linking cleaning → iterative k-core → KG alignment → feature
//! extraction → store features → store dataset → split → store train/test/val

use serde::Serialize;

use crate::config::PrepConfig;
use crate::error::PrepResult;
use crate::filters;
use crate::io;
use crate::model::Bundle;

/// Per-stage record counts for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Interactions after loading (deduplicated).
    pub loaded: usize,
    /// Raw linking rows before cleaning.
    pub linking_raw: usize,
    /// Linked items after cleaning.
    pub linking_clean: usize,
    /// Interactions after the k-core filter.
    pub after_kcore: usize,
    /// Interactions after alignment (the final dataset).
    pub after_alignment: usize,
    /// Triples after alignment.
    pub triples: usize,
    /// Distinct `(predicate, object)` features.
    pub features: usize,
    pub train: usize,
    pub val: usize,
    pub test: usize,
    /// Split strategy actually used, for the run record.
    pub strategy: filters::SplitStrategy,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "preprocessing run")?;
        writeln!(f, "  interactions:  {}", self.loaded)?;
        writeln!(f, "  linked items:  {} (of {} raw links)", self.linking_clean, self.linking_raw)?;
        writeln!(f, "  after k-core:  {}", self.after_kcore)?;
        writeln!(f, "  after align:   {}", self.after_alignment)?;
        writeln!(f, "  kg triples:    {}", self.triples)?;
        writeln!(f, "  features:      {}", self.features)?;
        writeln!(f, "  train/val/test: {}/{}/{}", self.train, self.val, self.test)?;
        match self.strategy {
            filters::SplitStrategy::Random { seed } => writeln!(f, "  split:         random (seed {seed})"),
            filters::SplitStrategy::Temporal => writeln!(f, "  split:         temporal"),
        }
    }
}

/// Run the full preprocessing pipeline over the configured data folder.
pub fn run(config: &PrepConfig) -> PrepResult<RunReport> {
    config.validate()?;
    tracing::info!(folder = %config.data_folder.display(), "starting preprocessing run");

    let dataset = io::load_dataset(&config.dataset_path())?;
    let kg = io::load_kg(&config.kg_path())?;
    let linking_rows = io::load_linking(&config.linking_path())?;
    let loaded = dataset.len();
    let linking_raw = linking_rows.len();

    // Item-entity linking cleaning.
    let linking = filters::clean_linking(&linking_rows, &kg);
    let linking_clean = linking.len();

    // Iterative user-item k-core.
    let dataset = filters::iterative_kcore(dataset, config.core);
    let after_kcore = dataset.len();

    // Bidirectional KG-dataset alignment.
    let bundle = filters::align(Bundle {
        dataset,
        kg,
        linking,
    });
    let after_alignment = bundle.dataset.len();
    let triples = bundle.kg.len();

    // Item features for the downstream experiment framework.
    let features = filters::extract_item_features(&bundle.kg, &bundle.linking);
    io::store(
        &features.to_rows(),
        &config.data_folder.join("kgflex"),
        "item_features",
        "item features",
    )?;

    io::store(&bundle.dataset, &config.data_folder, "dataset", "dataset")?;

    let split = filters::split(
        bundle.dataset,
        config.test_ratio,
        config.val_ratio,
        config.strategy(),
    )?;
    io::store(&split.train, &config.data_folder, "train", "training set")?;
    io::store(&split.test, &config.data_folder, "test", "test set")?;
    io::store(&split.val, &config.data_folder, "val", "validation set")?;

    let report = RunReport {
        loaded,
        linking_raw,
        linking_clean,
        after_kcore,
        after_alignment,
        triples,
        features: features.feature_count(),
        train: split.train.len(),
        val: split.val.len(),
        test: split.test.len(),
        strategy: config.strategy(),
    };
    tracing::info!(final_transactions = report.after_alignment, "preprocessing run finished");
    Ok(report)
}
