use serde::{Deserialize, Serialize};

use super::entities::EntityRecord;

/// One step of the collection's state machine. Every mutation anywhere in
/// the crate is expressed as one of these variants and applied through
/// [`EntityCollection::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CollectionTransition {
    SetAll(Vec<EntityRecord>),
    Insert(EntityRecord),
    Replace { id: String, record: EntityRecord },
    Remove { id: String },
}

/// Ordered sequence of records, unique by id after reconciliation.
///
/// Insertion order carries no meaning; display order is the derived sort
/// in [`EntityCollection::sorted_by_votes`]. All transitions are pure:
/// they take `&self` and return the successor collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityCollection {
    records: Vec<EntityRecord>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<EntityRecord>) -> Self {
        Self::new().set_all(records)
    }

    pub fn apply(&self, transition: CollectionTransition) -> Self {
        match transition {
            CollectionTransition::SetAll(records) => self.set_all(records),
            CollectionTransition::Insert(record) => self.insert(record),
            CollectionTransition::Replace { id, record } => self.replace(&id, record),
            CollectionTransition::Remove { id } => self.remove(&id),
        }
    }

    /// Replace the whole collection, keeping the first occurrence of each
    /// id. Used on initial load.
    pub fn set_all(&self, records: Vec<EntityRecord>) -> Self {
        let mut deduped: Vec<EntityRecord> = Vec::with_capacity(records.len());
        for record in records {
            if !deduped.iter().any(|existing| existing.id == record.id) {
                deduped.push(record);
            }
        }
        Self { records: deduped }
    }

    /// Append a record. No-op when the id is already present; callers that
    /// may race with a merge replace instead.
    pub fn insert(&self, record: EntityRecord) -> Self {
        if self.contains(&record.id) {
            return self.clone();
        }
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Replace the record at `id`. An absent id leaves the collection
    /// unchanged; deletion races are expected and benign.
    pub fn replace(&self, id: &str, record: EntityRecord) -> Self {
        let records = self
            .records
            .iter()
            .map(|existing| {
                if existing.id == id {
                    record.clone()
                } else {
                    existing.clone()
                }
            })
            .collect();
        Self { records }
    }

    /// Remove the record at `id`. No-op when already absent.
    pub fn remove(&self, id: &str) -> Self {
        let records = self
            .records
            .iter()
            .filter(|existing| existing.id != id)
            .cloned()
            .collect();
        Self { records }
    }

    /// Merge one pushed record. Returns `None` when the record duplicates
    /// an entry already present; otherwise the successor collection with
    /// the record appended.
    ///
    /// De-duplication key: canonical id first; for records whose id is
    /// still a placeholder, a hash over the identity fields. A placeholder
    /// whose identity fields coincide with a genuinely different incoming
    /// entity is indistinguishable from a self-delivery and is dropped.
    pub fn merge_incoming(&self, incoming: &EntityRecord) -> Option<Self> {
        if self.contains(&incoming.id) {
            return None;
        }
        let incoming_key = incoming.content_key();
        let placeholder_match = self
            .records
            .iter()
            .any(|existing| existing.is_unconfirmed() && existing.content_key() == incoming_key);
        if placeholder_match {
            return None;
        }
        Some(self.insert(incoming.clone()))
    }

    pub fn get(&self, id: &str) -> Option<&EntityRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    /// Display order: votes descending, ties in insertion order.
    pub fn sorted_by_votes(&self) -> Vec<EntityRecord> {
        let mut sorted = self.records.clone();
        // Vec::sort_by is stable, so ties keep insertion order.
        sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityDraft;

    fn record(id: &str, content: &str, votes: u32) -> EntityRecord {
        EntityRecord::new(id, content).with_votes(votes)
    }

    #[test]
    fn insert_then_remove_round_trips() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0), record("2", "b", 3)]);
        let inserted = base.insert(record("3", "c", 1));
        assert_eq!(inserted.len(), 3);
        assert_eq!(inserted.remove("3"), base);
    }

    #[test]
    fn insert_existing_id_is_a_no_op() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0)]);
        let next = base.insert(record("1", "other", 9));
        assert_eq!(next, base);
    }

    #[test]
    fn replace_preserves_length_and_position() {
        let base = EntityCollection::from_records(vec![
            record("1", "a", 0),
            record("2", "b", 0),
            record("3", "c", 0),
        ]);
        let next = base.replace("2", record("2", "b", 7));
        assert_eq!(next.len(), base.len());
        assert_eq!(next.records()[1].votes, 7);
        assert_eq!(next.records()[0], base.records()[0]);
        assert_eq!(next.records()[2], base.records()[2]);
    }

    #[test]
    fn replace_missing_id_leaves_collection_unchanged() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0)]);
        let next = base.replace("404", record("404", "x", 0));
        assert_eq!(next, base);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0)]);
        assert_eq!(base.remove("404"), base);
    }

    #[test]
    fn set_all_keeps_first_occurrence_per_id() {
        let collection = EntityCollection::new().set_all(vec![
            record("1", "first", 0),
            record("2", "b", 0),
            record("1", "second", 9),
        ]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get("1").unwrap().content, "first");
    }

    #[test]
    fn apply_matches_every_transition_kind() {
        let base = EntityCollection::new();
        let set = base.apply(CollectionTransition::SetAll(vec![record("1", "a", 0)]));
        let inserted = set.apply(CollectionTransition::Insert(record("2", "b", 0)));
        let replaced = inserted.apply(CollectionTransition::Replace {
            id: "2".into(),
            record: record("2", "b", 4),
        });
        let removed = replaced.apply(CollectionTransition::Remove { id: "1".into() });
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.get("2").unwrap().votes, 4);
    }

    #[test]
    fn merge_appends_unknown_record() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0)]);
        let merged = base.merge_incoming(&record("2", "b", 0)).unwrap();
        assert_eq!(merged.len(), 2);
        // existing order preserved, new record appended
        assert_eq!(merged.records()[0].id, "1");
        assert_eq!(merged.records()[1].id, "2");
    }

    #[test]
    fn merge_is_idempotent() {
        let base = EntityCollection::from_records(vec![record("1", "a", 0)]);
        let incoming = record("2", "b", 0);
        let once = base.merge_incoming(&incoming).unwrap();
        assert!(once.merge_incoming(&incoming).is_none());
    }

    #[test]
    fn merge_drops_self_delivery_of_unconfirmed_create() {
        let draft = EntityDraft::new("fresh").with_author("alice");
        let placeholder = EntityRecord::local_draft(&draft);
        let base = EntityCollection::from_records(vec![placeholder]);

        let broadcast = EntityRecord::new("srv-9", "fresh").with_author("alice");
        assert!(base.merge_incoming(&broadcast).is_none());
    }

    #[test]
    fn merge_does_not_collide_confirmed_records_on_content() {
        // Two distinct confirmed entities may share their content; identity
        // wins once both ids are canonical.
        let base = EntityCollection::from_records(vec![record("1", "same words", 0)]);
        let merged = base.merge_incoming(&record("2", "same words", 0)).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn sorted_by_votes_is_stable() {
        let collection = EntityCollection::from_records(vec![
            record("1", "a", 1),
            record("2", "b", 5),
            record("3", "c", 1),
            record("4", "d", 2),
        ]);
        let ids: Vec<String> = collection
            .sorted_by_votes()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["2", "4", "1", "3"]);
    }
}
