//! Categorical item features from aligned knowledge-graph triples.

use std::collections::{BTreeMap, HashMap};

use crate::model::Triple;

/// The feature index and per-item feature lists produced by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFeatures {
    /// `(predicate, object)` pair to dense feature index, assigned in sorted
    /// pair order so indices are reproducible across runs.
    pub index: BTreeMap<(String, String), usize>,
    /// Item to sorted, deduplicated feature indices.
    pub per_item: BTreeMap<u64, Vec<usize>>,
}

impl ItemFeatures {
    /// Flatten to `(item, feature_index)` rows for the dataset store.
    pub fn to_rows(&self) -> Vec<(u64, usize)> {
        self.per_item
            .iter()
            .flat_map(|(item, features)| features.iter().map(|&f| (*item, f)))
            .collect()
    }

    /// Number of distinct features.
    pub fn feature_count(&self) -> usize {
        self.index.len()
    }
}

/// Build the feature index and per-item feature lists.
///
/// Each distinct `(predicate, object)` pair becomes one categorical feature;
/// an item carries the features of every triple whose subject is its linked
/// entity. Pairs are indexed in sorted order, not first-seen order, so the
/// numeric indices do not depend on the triple ordering of the dump.
pub fn extract_item_features(kg: &[Triple], linking: &BTreeMap<u64, String>) -> ItemFeatures {
    let index: BTreeMap<(String, String), usize> = {
        let mut pairs: Vec<(String, String)> = kg
            .iter()
            .map(|t| (t.predicate.clone(), t.object.clone()))
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs.into_iter().enumerate().map(|(i, p)| (p, i)).collect()
    };

    // Entities may be shared by several items; invert the linking once.
    let mut items_of_entity: HashMap<&str, Vec<u64>> = HashMap::new();
    for (item, entity) in linking {
        items_of_entity.entry(entity.as_str()).or_default().push(*item);
    }

    let mut per_item: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
    for triple in kg {
        let Some(items) = items_of_entity.get(triple.subject.as_str()) else {
            continue;
        };
        let feature = index[&(triple.predicate.clone(), triple.object.clone())];
        for item in items {
            per_item.entry(*item).or_default().push(feature);
        }
    }
    for features in per_item.values_mut() {
        features.sort_unstable();
        features.dedup();
    }

    tracing::info!(
        features = index.len(),
        items = per_item.len(),
        "extracted item features"
    );
    ItemFeatures { index, per_item }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linking() -> BTreeMap<u64, String> {
        BTreeMap::from([(10, "e10".to_string()), (20, "e20".to_string())])
    }

    fn kg() -> Vec<Triple> {
        vec![
            Triple::new("e10", "genre", "rock"),
            Triple::new("e10", "country", "uk"),
            Triple::new("e20", "genre", "rock"),
            Triple::new("e20", "genre", "jazz"),
        ]
    }

    #[test]
    fn index_follows_sorted_pair_order() {
        let features = extract_item_features(&kg(), &linking());
        let expected = [
            (("country".to_string(), "uk".to_string()), 0),
            (("genre".to_string(), "jazz".to_string()), 1),
            (("genre".to_string(), "rock".to_string()), 2),
        ];
        assert_eq!(features.index, BTreeMap::from(expected));
    }

    #[test]
    fn items_collect_features_of_their_entity() {
        let features = extract_item_features(&kg(), &linking());
        assert_eq!(features.per_item[&10], vec![0, 2]);
        assert_eq!(features.per_item[&20], vec![1, 2]);
    }

    #[test]
    fn index_is_stable_under_triple_reordering() {
        let mut reordered = kg();
        reordered.reverse();
        let a = extract_item_features(&kg(), &linking());
        let b = extract_item_features(&reordered, &linking());
        assert_eq!(a, b);
    }

    #[test]
    fn repeated_extraction_is_deterministic() {
        let a = extract_item_features(&kg(), &linking());
        let b = extract_item_features(&kg(), &linking());
        assert_eq!(a, b);
    }

    #[test]
    fn rows_flatten_in_item_order() {
        let features = extract_item_features(&kg(), &linking());
        assert_eq!(features.to_rows(), vec![(10, 0), (10, 2), (20, 1), (20, 2)]);
    }

    #[test]
    fn unlinked_subjects_contribute_nothing() {
        let mut triples = kg();
        triples.push(Triple::new("e99", "genre", "pop"));
        let features = extract_item_features(&triples, &linking());
        // The pair still gets an index, but no item carries it.
        assert_eq!(features.feature_count(), 4);
        assert!(features.per_item.values().flatten().all(|&f| f != features.index[&("genre".to_string(), "pop".to_string())]));
    }
}
