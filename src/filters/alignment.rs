//! Bidirectional knowledge-graph / dataset alignment.

use std::collections::HashSet;

use crate::model::Bundle;

/// Restrict the dataset, knowledge graph, and linking table to their
/// mutually consistent subset.
///
/// Each round applies three reductions:
///
/// 1. drop interactions whose item has no linking entry;
/// 2. drop triples whose subject is not the linked entity of a surviving item;
/// 3. drop linking rows whose entity no longer appears as a KG subject.
///
/// Any one removal can invalidate links that were previously fine, so the
/// rounds repeat until a full round removes nothing. On return every item in
/// the dataset has a linked entity present as a KG subject, and every KG
/// subject is the linked entity of at least one dataset item.
pub fn align(mut bundle: Bundle) -> Bundle {
    let mut round = 0usize;

    loop {
        round += 1;
        let before =
            bundle.dataset.len() + bundle.kg.len() + bundle.linking.len();

        // Dataset -> linking: interactions need a linked item.
        let linked_items: HashSet<u64> = bundle.linking.keys().copied().collect();
        bundle.dataset.retain(|r| linked_items.contains(&r.item));

        // KG -> dataset: triples need a subject linked from a surviving item.
        let entities: HashSet<String> = bundle
            .linked_entities()
            .into_iter()
            .map(str::to_string)
            .collect();
        bundle.kg.retain(|t| entities.contains(&t.subject));

        // Linking -> KG: links need their entity to still be a subject.
        let subjects: HashSet<&str> = bundle.kg.iter().map(|t| t.subject.as_str()).collect();
        bundle
            .linking
            .retain(|_, entity| subjects.contains(entity.as_str()));

        let after =
            bundle.dataset.len() + bundle.kg.len() + bundle.linking.len();
        tracing::debug!(round, removed = before - after, "alignment round");
        if after == before {
            break;
        }
    }

    tracing::info!(
        rounds = round,
        interactions = bundle.dataset.len(),
        triples = bundle.kg.len(),
        links = bundle.linking.len(),
        "kg-dataset alignment converged"
    );
    bundle
}
