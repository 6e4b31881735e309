//! Delta computation between the desired and current address sets.

use crate::acl::AclEntry;
use crate::source::AddressSet;
use std::collections::HashSet;

/// One required change to the remote ACL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// The address is desired but has no ACL entry yet.
    Create {
        ip: String,
    },
    /// The entry is no longer desired. The remote identifier drives the
    /// deletion; the address is carried only for logging.
    Delete {
        id: String,
        ip: String,
    },
}

impl Delta {
    /// True for create deltas.
    pub fn is_create(&self) -> bool {
        matches!(self, Delta::Create { .. })
    }

    /// True for delete deltas.
    pub fn is_delete(&self) -> bool {
        matches!(self, Delta::Delete { .. })
    }
}

/// Compute the deltas that make `current` match `desired`.
///
/// Symmetric difference by address: a delete for every current entry whose
/// address is not desired (in current order), then a create for every
/// desired address with no current entry (in desired order). Deletes are
/// emitted before creates. Membership tests are hash-backed, so the whole
/// computation is O(|current| + |desired|).
///
/// An empty result means the two sets already match and nothing should be
/// sent to the remote service.
pub fn reconcile(desired: &AddressSet, current: &[AclEntry]) -> Vec<Delta> {
    let current_addrs: HashSet<&str> = current.iter().map(|e| e.ip.as_str()).collect();

    let mut deltas = Vec::new();

    for entry in current {
        if !desired.contains(&entry.ip) {
            deltas.push(Delta::Delete {
                id: entry.id.clone(),
                ip: entry.ip.clone(),
            });
        }
    }

    for addr in desired.iter() {
        if !current_addrs.contains(addr) {
            deltas.push(Delta::Create {
                ip: addr.to_string(),
            });
        }
    }

    deltas
}

/// Partition `items` into consecutive chunks of at most `size` elements.
///
/// Order is preserved, chunks never overlap, and the final chunk holds the
/// remainder. A non-empty input never produces an empty chunk.
pub fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "chunk size must be greater than 0");

    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(addrs: &[&str]) -> AddressSet {
        addrs.iter().map(|a| a.to_string()).collect()
    }

    fn entry(ip: &str, id: &str) -> AclEntry {
        AclEntry {
            ip: ip.to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn test_reconcile_scenario() {
        let desired = desired(&["1.1.1.1", "2.2.2.2"]);
        let current = vec![entry("2.2.2.2", "id1"), entry("3.3.3.3", "id2")];

        let deltas = reconcile(&desired, &current);

        // 2.2.2.2 is present on both sides and untouched.
        assert_eq!(
            deltas,
            vec![
                Delta::Delete {
                    id: "id2".to_string(),
                    ip: "3.3.3.3".to_string(),
                },
                Delta::Create {
                    ip: "1.1.1.1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_reconcile_noop_on_equal_sets() {
        let desired = desired(&["1.1.1.1", "2.2.2.2"]);
        let current = vec![entry("2.2.2.2", "a"), entry("1.1.1.1", "b")];

        assert!(reconcile(&desired, &current).is_empty());
    }

    #[test]
    fn test_reconcile_empty_current_creates_everything() {
        let desired = desired(&["1.1.1.1", "2.2.2.2"]);
        let deltas = reconcile(&desired, &[]);

        assert_eq!(deltas.len(), 2);
        assert!(deltas.iter().all(Delta::is_create));
    }

    #[test]
    fn test_reconcile_empty_desired_deletes_everything() {
        let desired = AddressSet::new();
        let current = vec![entry("1.1.1.1", "a"), entry("2.2.2.2", "b")];

        let deltas = reconcile(&desired, &current);
        assert_eq!(deltas.len(), 2);
        assert!(deltas.iter().all(Delta::is_delete));
    }

    #[test]
    fn test_reconcile_deletes_before_creates() {
        let desired = desired(&["1.1.1.1"]);
        let current = vec![entry("9.9.9.9", "x")];

        let deltas = reconcile(&desired, &current);
        assert!(deltas[0].is_delete());
        assert!(deltas[1].is_create());
    }

    #[test]
    fn test_reconcile_completeness_and_uniqueness() {
        let desired = desired(&["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
        let current = vec![
            entry("3.3.3.3", "keep"),
            entry("4.4.4.4", "drop1"),
            entry("5.5.5.5", "drop2"),
        ];

        let deltas = reconcile(&desired, &current);

        let creates: Vec<&str> = deltas
            .iter()
            .filter_map(|d| match d {
                Delta::Create { ip } => Some(ip.as_str()),
                Delta::Delete { .. } => None,
            })
            .collect();
        let deletes: Vec<&str> = deltas
            .iter()
            .filter_map(|d| match d {
                Delta::Delete { id, .. } => Some(id.as_str()),
                Delta::Create { .. } => None,
            })
            .collect();

        assert_eq!(deletes, vec!["drop1", "drop2"]);
        assert_eq!(creates, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_reconcile_idempotent_after_apply() {
        let desired = desired(&["1.1.1.1", "2.2.2.2"]);
        let current = vec![entry("2.2.2.2", "id1"), entry("3.3.3.3", "id2")];

        // Simulate a successful apply of the computed deltas.
        let deltas = reconcile(&desired, &current);
        let mut post_apply = current.clone();
        for delta in &deltas {
            match delta {
                Delta::Delete { id, .. } => post_apply.retain(|e| &e.id != id),
                Delta::Create { ip } => post_apply.push(entry(ip, "new-id")),
            }
        }

        assert!(reconcile(&desired, &post_apply).is_empty());
    }

    #[test]
    fn test_chunk_partition_law() {
        for (n, m) in [(0usize, 3usize), (1, 3), (3, 3), (7, 3), (9, 3), (10, 500)] {
            let items: Vec<usize> = (0..n).collect();
            let chunks = chunk(items.clone(), m);

            assert_eq!(chunks.len(), n.div_ceil(m));
            assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= m));

            let rejoined: Vec<usize> = chunks.into_iter().flatten().collect();
            assert_eq!(rejoined, items);
        }
    }

    #[test]
    fn test_chunk_final_chunk_holds_remainder() {
        let chunks = chunk(vec![1, 2, 3, 4, 5], 2);
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    #[should_panic(expected = "chunk size must be greater than 0")]
    fn test_chunk_zero_size_panics() {
        chunk(vec![1], 0);
    }
}
