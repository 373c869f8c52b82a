//! Experiment-configuration rendering for the downstream evaluation
//! framework.
//!
//! The framework consumes a YAML file pointing at the split artifacts this
//! tool produces; the template here mirrors the one the experiments are run
//! with, so a fresh preprocessing run can be evaluated without hand-editing
//! paths.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Render the evaluation config for a dataset.
///
/// `dataset` is the data-folder name under `../data/`, `cutoff` the ranking
/// cutoff for the metrics, and `recs` the folder holding pre-computed
/// recommendation lists.
pub fn render(dataset: &str, cutoff: usize, recs: &str) -> String {
    format!(
        "experiment:
  backend: pytorch
  data_config:
    strategy: fixed
    train_path: ../data/{dataset}/train.tsv
    validation_path: ../data/{dataset}/val.tsv
    test_path: ../data/{dataset}/test.tsv
  dataset: {dataset}
  top_k: {cutoff}
  evaluation:
    cutoffs: [{cutoff}]
    simple_metrics: [nDCGRendle2020, HR, Precision, Recall]
  gpu: 0
  models:
    RecommendationFolder:
        folder: {recs}
"
    )
}

/// Write the rendered config as `<out_dir>/<dataset>_metrics.yml`.
pub fn write(
    out_dir: &Path,
    dataset: &str,
    cutoff: usize,
    recs: &str,
) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(out_dir).map_err(|source| StoreError::CreateDir {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let path = out_dir.join(format!("{dataset}_metrics.yml"));
    std::fs::write(&path, render(dataset, cutoff, recs)).map_err(|source| StoreError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote experiment config");
    Ok(path)
}
