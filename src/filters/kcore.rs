//! Iterative user-item k-core filtering.

use std::collections::HashMap;

use crate::model::Interaction;

/// Filter the interaction set down to its user-item k-core.
///
/// Each round rebuilds per-user and per-item interaction counts from scratch
/// and keeps only records whose user *and* item both have degree at least
/// `core`. Removing a record can push a previously valid user or item below
/// the threshold, so rounds repeat until one removes nothing.
///
/// An empty output is legal: a dataset that cannot sustain the requested
/// core simply filters down to nothing.
pub fn iterative_kcore(mut dataset: Vec<Interaction>, core: usize) -> Vec<Interaction> {
    let initial = dataset.len();
    let mut round = 0usize;

    loop {
        round += 1;
        let mut user_degree: HashMap<u64, usize> = HashMap::new();
        let mut item_degree: HashMap<u64, usize> = HashMap::new();
        for record in &dataset {
            *user_degree.entry(record.user).or_insert(0) += 1;
            *item_degree.entry(record.item).or_insert(0) += 1;
        }

        let before = dataset.len();
        dataset.retain(|r| user_degree[&r.user] >= core && item_degree[&r.item] >= core);

        let removed = before - dataset.len();
        tracing::debug!(round, removed, remaining = dataset.len(), "k-core round");
        if removed == 0 {
            break;
        }
    }

    tracing::info!(
        core,
        rounds = round,
        initial,
        remaining = dataset.len(),
        "iterative k-core converged"
    );
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degrees(dataset: &[Interaction]) -> (HashMap<u64, usize>, HashMap<u64, usize>) {
        let mut users = HashMap::new();
        let mut items = HashMap::new();
        for r in dataset {
            *users.entry(r.user).or_insert(0) += 1;
            *items.entry(r.item).or_insert(0) += 1;
        }
        (users, items)
    }

    /// Dense block of 4 users x 4 items plus a pendant user and a pendant item.
    fn sample() -> Vec<Interaction> {
        let mut records = Vec::new();
        for user in 1..=4 {
            for item in 10..=13 {
                records.push(Interaction::new(user, item));
            }
        }
        records.push(Interaction::new(5, 10)); // user 5 has degree 1
        records.push(Interaction::new(1, 99)); // item 99 has degree 1
        records
    }

    #[test]
    fn retained_degrees_meet_threshold() {
        let filtered = iterative_kcore(sample(), 3);
        assert!(!filtered.is_empty());
        let (users, items) = degrees(&filtered);
        assert!(users.values().all(|&d| d >= 3));
        assert!(items.values().all(|&d| d >= 3));
    }

    #[test]
    fn cascading_removal_reaches_fixed_point() {
        // Chain: removing the weakest item drops its user below threshold too.
        let records = vec![
            Interaction::new(1, 10),
            Interaction::new(1, 11),
            Interaction::new(2, 10),
            Interaction::new(2, 11),
            Interaction::new(3, 10),
            Interaction::new(3, 12),
        ];
        let filtered = iterative_kcore(records, 2);
        let (users, items) = degrees(&filtered);
        assert!(users.values().all(|&d| d >= 2));
        assert!(items.values().all(|&d| d >= 2));
        assert!(!users.contains_key(&3));
        assert!(!items.contains_key(&12));
    }

    #[test]
    fn rerunning_on_output_is_identity() {
        let once = iterative_kcore(sample(), 3);
        let twice = iterative_kcore(once.clone(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn impossible_core_empties_the_dataset() {
        let filtered = iterative_kcore(sample(), 100);
        assert!(filtered.is_empty());
    }

    #[test]
    fn core_of_one_keeps_everything() {
        let records = sample();
        let filtered = iterative_kcore(records.clone(), 1);
        assert_eq!(filtered, records);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(iterative_kcore(Vec::new(), 10).is_empty());
    }
}
