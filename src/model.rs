//! Core data model for a preprocessing run.
//!
//! All structures are created fresh per run and owned exclusively by the
//! stage currently executing; the [`Bundle`] moves by value from stage to
//! stage.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// A single user-item interaction, optionally timestamped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    /// User identifier.
    pub user: u64,
    /// Item identifier.
    pub item: u64,
    /// Interaction time (seconds since UNIX epoch), when the source logs it.
    pub timestamp: Option<u64>,
}

impl Interaction {
    /// Create an untimestamped interaction.
    pub fn new(user: u64, item: u64) -> Self {
        Self {
            user,
            item,
            timestamp: None,
        }
    }

    /// Create a timestamped interaction.
    pub fn at(user: u64, item: u64, timestamp: u64) -> Self {
        Self {
            user,
            item,
            timestamp: Some(timestamp),
        }
    }
}

/// A (subject, predicate, object) fact from the knowledge-graph dump.
///
/// Subjects are entity URIs; predicates and objects stay as the raw strings
/// the dump provides, so literals and URIs are treated uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// The state threaded through the pipeline stages.
///
/// Each stage takes the bundle by value, filters its fields, and hands the
/// updated bundle back to the caller. There is no shared mutable state
/// beyond this struct.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    /// Deduplicated interaction records, in source order.
    pub dataset: Vec<Interaction>,
    /// Deduplicated knowledge-graph triples, in source order.
    pub kg: Vec<Triple>,
    /// One knowledge-graph entity per item, after linking cleaning.
    pub linking: BTreeMap<u64, String>,
}

impl Bundle {
    /// Distinct items appearing in the interaction set.
    pub fn items(&self) -> HashSet<u64> {
        self.dataset.iter().map(|r| r.item).collect()
    }

    /// Entities linked to items that survive in the interaction set.
    pub fn linked_entities(&self) -> HashSet<&str> {
        let items = self.items();
        self.linking
            .iter()
            .filter(|(item, _)| items.contains(item))
            .map(|(_, entity)| entity.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_linked_entities_ignore_unseen_items() {
        let bundle = Bundle {
            dataset: vec![Interaction::new(1, 10), Interaction::new(2, 10)],
            kg: vec![],
            linking: BTreeMap::from([
                (10, "http://e/10".to_string()),
                (99, "http://e/99".to_string()),
            ]),
        };
        let entities = bundle.linked_entities();
        assert!(entities.contains("http://e/10"));
        assert!(!entities.contains("http://e/99"));
    }

    #[test]
    fn interaction_constructors() {
        assert_eq!(Interaction::new(1, 2).timestamp, None);
        assert_eq!(Interaction::at(1, 2, 3).timestamp, Some(3));
    }
}
