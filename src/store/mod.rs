use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{CollectionTransition, EntityCollection, EntityRecord};

/// Shared handle to the one collection instance for a resource type.
///
/// The mutation and subscription services both hold a clone of the same
/// handle; every mutation goes through a [`CollectionTransition`] under
/// the write lock, and no transition spans an await point.
#[derive(Clone, Default)]
pub struct CollectionStore {
    inner: Arc<RwLock<EntityCollection>>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<EntityRecord>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EntityCollection::from_records(records))),
        }
    }

    pub async fn apply(&self, transition: CollectionTransition) {
        let mut collection = self.inner.write().await;
        *collection = collection.apply(transition);
    }

    pub async fn get(&self, id: &str) -> Option<EntityRecord> {
        self.inner.read().await.get(id).cloned()
    }

    pub async fn snapshot(&self) -> EntityCollection {
        self.inner.read().await.clone()
    }

    /// Votes-descending display view.
    pub async fn sorted(&self) -> Vec<EntityRecord> {
        self.inner.read().await.sorted_by_votes()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Atomically derive a record's successor from its *current* value and
    /// replace it. Rapid repeated updates therefore base each delta on the
    /// previous optimistic result, never a stale snapshot.
    pub async fn update_record<F>(&self, id: &str, f: F) -> Option<(EntityRecord, EntityRecord)>
    where
        F: FnOnce(&EntityRecord) -> EntityRecord,
    {
        let mut collection = self.inner.write().await;
        let previous = collection.get(id)?.clone();
        let next = f(&previous);
        *collection = collection.apply(CollectionTransition::Replace {
            id: id.to_string(),
            record: next.clone(),
        });
        Some((previous, next))
    }

    /// Atomically read and remove a record, returning it as rollback
    /// material. `None` when the id was already absent.
    pub async fn take_record(&self, id: &str) -> Option<EntityRecord> {
        let mut collection = self.inner.write().await;
        let taken = collection.get(id)?.clone();
        *collection = collection.apply(CollectionTransition::Remove { id: id.to_string() });
        Some(taken)
    }

    /// Insert the record, or replace the entry with the same id when one
    /// is already present (e.g. a subscription self-delivery landed first).
    pub async fn upsert(&self, record: EntityRecord) {
        let mut collection = self.inner.write().await;
        let transition = if collection.contains(&record.id) {
            CollectionTransition::Replace {
                id: record.id.clone(),
                record,
            }
        } else {
            CollectionTransition::Insert(record)
        };
        *collection = collection.apply(transition);
    }

    /// Merge one pushed record under a single write lock. Returns whether
    /// the record was appended (`false` means it was dropped as a
    /// duplicate).
    pub async fn merge_incoming(&self, incoming: &EntityRecord) -> bool {
        let mut collection = self.inner.write().await;
        match collection.merge_incoming(incoming) {
            Some(next) => {
                *collection = next;
                true
            }
            None => {
                debug!(id = %incoming.id, "Dropping duplicate incoming record");
                false
            }
        }
    }

    /// Reconcile an optimistic create: swap the still-unconfirmed entry
    /// matching `matches` for the canonical record. When no placeholder is
    /// left (a merge may have installed the canonical record already) the
    /// canonical record is upserted instead.
    pub(crate) async fn reconcile_created<F>(&self, matches: F, canonical: EntityRecord)
    where
        F: Fn(&EntityRecord) -> bool,
    {
        let mut collection = self.inner.write().await;
        let placeholder_id = collection
            .records()
            .iter()
            .find(|record| record.is_unconfirmed() && matches(record))
            .map(|record| record.id.clone());

        let next = match placeholder_id {
            Some(id) if collection.contains(&canonical.id) => {
                // The push channel beat the confirmation; the canonical
                // record is already present, so the placeholder just goes.
                collection.apply(CollectionTransition::Remove { id })
            }
            Some(id) => collection.apply(CollectionTransition::Replace {
                id,
                record: canonical,
            }),
            None if collection.contains(&canonical.id) => collection.apply(
                CollectionTransition::Replace {
                    id: canonical.id.clone(),
                    record: canonical,
                },
            ),
            None => collection.apply(CollectionTransition::Insert(canonical)),
        };
        *collection = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityDraft;

    fn record(id: &str, content: &str, votes: u32) -> EntityRecord {
        EntityRecord::new(id, content).with_votes(votes)
    }

    #[tokio::test]
    async fn update_record_bases_successor_on_current_value() {
        let store = CollectionStore::with_records(vec![record("1", "a", 0)]);

        let first = store
            .update_record("1", |r| r.clone().with_votes(r.votes + 1))
            .await
            .unwrap();
        let second = store
            .update_record("1", |r| r.clone().with_votes(r.votes + 1))
            .await
            .unwrap();

        assert_eq!(first.1.votes, 1);
        assert_eq!(second.0.votes, 1);
        assert_eq!(second.1.votes, 2);
        assert_eq!(store.get("1").await.unwrap().votes, 2);
    }

    #[tokio::test]
    async fn take_record_returns_rollback_material() {
        let store = CollectionStore::with_records(vec![record("1", "a", 3)]);
        let taken = store.take_record("1").await.unwrap();
        assert_eq!(taken.votes, 3);
        assert!(store.is_empty().await);
        assert!(store.take_record("1").await.is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_when_id_already_present() {
        let store = CollectionStore::with_records(vec![record("1", "a", 0)]);
        store.upsert(record("1", "a", 5)).await;
        store.upsert(record("2", "b", 0)).await;
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("1").await.unwrap().votes, 5);
    }

    #[tokio::test]
    async fn reconcile_created_swaps_placeholder_for_canonical() {
        let draft = EntityDraft::new("fresh");
        let placeholder = EntityRecord::local_draft(&draft);
        let store = CollectionStore::with_records(vec![placeholder]);

        let canonical = record("srv-1", "fresh", 0);
        store
            .reconcile_created(|r| r.matches_draft(&draft), canonical)
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        let kept = snapshot.get("srv-1").unwrap();
        assert!(kept.local_id.is_none());
    }

    #[tokio::test]
    async fn reconcile_created_drops_placeholder_when_merge_won() {
        let draft = EntityDraft::new("fresh");
        let placeholder = EntityRecord::local_draft(&draft);
        let canonical = record("srv-1", "fresh", 0);
        let store = CollectionStore::with_records(vec![placeholder, canonical.clone()]);

        store
            .reconcile_created(|r| r.matches_draft(&draft), canonical)
            .await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains("srv-1"));
    }
}
