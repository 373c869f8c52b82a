//! Item-entity linking cleaning.

use std::collections::{BTreeMap, HashSet};

use crate::model::Triple;

/// Clean the raw linking table against the knowledge graph.
///
/// Two kinds of rows are dropped:
///
/// - rows whose entity never appears as a subject in the knowledge graph
///   (the link resolves to nothing we can extract features from);
/// - every row of an item linked to more than one distinct entity.
///
/// Ambiguously linked items are removed entirely rather than resolved to the
/// first-seen entity: keep-first would make the output depend on the row
/// order of the raw dump, while keep-none is stable under any permutation of
/// the input and preserves the one-entity-per-item invariant.
pub fn clean_linking(rows: &[(u64, String)], kg: &[Triple]) -> BTreeMap<u64, String> {
    let subjects: HashSet<&str> = kg.iter().map(|t| t.subject.as_str()).collect();

    // Distinct resolvable entities per item. Exact duplicate rows collapse.
    let mut by_item: BTreeMap<u64, HashSet<&str>> = BTreeMap::new();
    let mut unresolved = 0usize;
    for (item, entity) in rows {
        if subjects.contains(entity.as_str()) {
            by_item.entry(*item).or_default().insert(entity.as_str());
        } else {
            unresolved += 1;
        }
    }

    let ambiguous = by_item.values().filter(|e| e.len() > 1).count();
    let linking: BTreeMap<u64, String> = by_item
        .into_iter()
        .filter(|(_, entities)| entities.len() == 1)
        .map(|(item, entities)| {
            let entity = entities.into_iter().next().unwrap_or_default();
            (item, entity.to_string())
        })
        .collect();

    tracing::info!(
        kept = linking.len(),
        unresolved,
        ambiguous,
        "cleaned item-entity linking"
    );
    linking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kg() -> Vec<Triple> {
        vec![
            Triple::new("e1", "genre", "rock"),
            Triple::new("e2", "genre", "jazz"),
        ]
    }

    #[test]
    fn keeps_resolvable_unambiguous_links() {
        let rows = vec![(10, "e1".to_string()), (20, "e2".to_string())];
        let linking = clean_linking(&rows, &kg());
        assert_eq!(linking.len(), 2);
        assert_eq!(linking[&10], "e1");
        assert_eq!(linking[&20], "e2");
    }

    #[test]
    fn drops_links_without_kg_subject() {
        let rows = vec![(10, "e1".to_string()), (20, "missing".to_string())];
        let linking = clean_linking(&rows, &kg());
        assert_eq!(linking.len(), 1);
        assert!(!linking.contains_key(&20));
    }

    #[test]
    fn drops_all_rows_of_ambiguous_items() {
        let rows = vec![
            (10, "e1".to_string()),
            (10, "e2".to_string()),
            (20, "e2".to_string()),
        ];
        let linking = clean_linking(&rows, &kg());
        assert!(!linking.contains_key(&10));
        assert_eq!(linking[&20], "e2");
    }

    #[test]
    fn ambiguity_check_ignores_unresolvable_entities() {
        // The second link for item 10 does not resolve, so the item is
        // effectively linked to a single entity and survives.
        let rows = vec![(10, "e1".to_string()), (10, "missing".to_string())];
        let linking = clean_linking(&rows, &kg());
        assert_eq!(linking[&10], "e1");
    }

    #[test]
    fn exact_duplicate_rows_are_not_ambiguous() {
        let rows = vec![(10, "e1".to_string()), (10, "e1".to_string())];
        let linking = clean_linking(&rows, &kg());
        assert_eq!(linking[&10], "e1");
    }

    #[test]
    fn result_is_order_independent() {
        let mut rows = vec![
            (10, "e1".to_string()),
            (10, "e2".to_string()),
            (20, "e2".to_string()),
        ];
        let forward = clean_linking(&rows, &kg());
        rows.reverse();
        let backward = clean_linking(&rows, &kg());
        assert_eq!(forward, backward);
    }
}
