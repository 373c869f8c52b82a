//! Diagnostic error types for the preprocessing pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so a failed run says exactly
//! which input file or setting to fix. Parse problems abort the run: silently
//! skipped rows would corrupt the alignment invariants downstream.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for a preprocessing run.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum PrepError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    #[diagnostic(
        code(kgprep::load::io),
        help(
            "Check that the data folder contains dataset.tsv, knowledge/kg.tsv \
             and knowledge/linking.tsv, and that they are readable."
        )
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: expected {expected} tab-separated columns, got {actual}")]
    #[diagnostic(
        code(kgprep::load::malformed),
        help(
            "Every row must have the documented column count with no header line. \
             A malformed row aborts the run; fix or remove it before re-running."
        )
    )]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        expected: &'static str,
        actual: usize,
    },

    #[error("{path}:{line}: cannot parse \"{value}\" as an integer id")]
    #[diagnostic(
        code(kgprep::load::bad_field),
        help(
            "User and item identifiers must be non-negative integers. \
             Re-export the source data with numeric ids."
        )
    )]
    BadField {
        path: PathBuf,
        line: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to create output folder {path}: {source}")]
    #[diagnostic(
        code(kgprep::store::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    #[diagnostic(
        code(kgprep::store::write),
        help("Check write permissions on the destination and available disk space.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid split ratios: test={test}, val={val}")]
    #[diagnostic(
        code(kgprep::config::invalid_ratio),
        help(
            "Both ratios must lie in [0, 1) and their sum must be strictly \
             less than 1, so the training set is never empty by construction."
        )
    )]
    InvalidRatio { test: f64, val: f64 },

    #[error("k-core threshold must be at least 1, got {core}")]
    #[diagnostic(
        code(kgprep::config::invalid_core),
        help("Use core = 1 to disable degree filtering, or a larger value to densify.")
    )]
    InvalidCore { core: usize },

    #[error("cannot read config file {path}: {source}")]
    #[diagnostic(
        code(kgprep::config::read),
        help("Check the --config path.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    #[diagnostic(
        code(kgprep::config::parse),
        help("The config file must be valid TOML; see PrepConfig for the accepted keys.")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Convenience alias for functions returning preprocessing results.
pub type PrepResult<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_converts_to_prep_error() {
        let err = LoadError::MalformedRecord {
            path: PathBuf::from("dataset.tsv"),
            line: 7,
            expected: "2 or 3",
            actual: 5,
        };
        let prep: PrepError = err.into();
        assert!(matches!(prep, PrepError::Load(LoadError::MalformedRecord { .. })));
    }

    #[test]
    fn config_error_converts_to_prep_error() {
        let err = ConfigError::InvalidRatio { test: 0.8, val: 0.3 };
        let prep: PrepError = err.into();
        assert!(matches!(prep, PrepError::Config(ConfigError::InvalidRatio { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = LoadError::BadField {
            path: PathBuf::from("dataset.tsv"),
            line: 12,
            value: "abc".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("dataset.tsv"));
        assert!(msg.contains("12"));
        assert!(msg.contains("abc"));
    }
}
