//! # kgprep
//!
//! Batch preprocessing for knowledge-graph-enhanced recommenders. Takes a raw
//! interaction log, a knowledge-graph dump, and an item-entity linking table,
//! and produces the mutually consistent train/val/test artifacts an external
//! recommendation-experiment framework consumes.
//!
//! ## Pipeline
//!
//! - **Linking cleaning** (`filters::linking`): drop unresolvable and ambiguous
//!   item-entity links
//! - **Iterative k-core** (`filters::kcore`): fixed-point degree filtering over
//!   users and items
//! - **KG alignment** (`filters::alignment`): restrict interactions, triples,
//!   and links to their mutually consistent subset
//! - **Feature extraction** (`filters::features`): dense `(predicate, object)`
//!   feature indices per item
//! - **Splitting** (`filters::split`): seeded random or temporal holdout
//!
//! ## Library usage
//!
//! ```no_run
//! use kgprep::config::PrepConfig;
//! use kgprep::pipeline;
//!
//! let config = PrepConfig::new("./data/last_fm");
//! let report = pipeline::run(&config).unwrap();
//! println!("{report}");
//! ```

pub mod config;
pub mod error;
pub mod expconfig;
pub mod filters;
pub mod io;
pub mod model;
#[cfg(feature = "email")]
pub mod notify;
pub mod pipeline;
