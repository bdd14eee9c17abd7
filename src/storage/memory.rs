//! In-memory review storage.
//!
//! Thread-safe implementation of the ReviewStore trait, used by tests and by
//! callers that persist elsewhere.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::core::ReviewRecord;
use crate::error::Result;
use crate::storage::ReviewStore;

/// In-memory review store.
///
/// Records are keyed by `(user_id, card_id)` so listing a user is a range scan.
#[derive(Debug, Default)]
pub struct MemoryReviewStore {
    records: RwLock<BTreeMap<(i64, i64), ReviewRecord>>,
}

impl MemoryReviewStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all records.
    pub fn clear(&self) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ReviewStore for MemoryReviewStore {
    fn get(&self, card_id: i64, user_id: i64) -> Result<Option<ReviewRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&(user_id, card_id)).cloned())
    }

    fn upsert(&self, record: &ReviewRecord) -> Result<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert((record.user_id, record.card_id), record.clone());
        Ok(())
    }

    fn list_for_user(&self, user_id: i64) -> Result<Vec<ReviewRecord>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .range((user_id, i64::MIN)..=(user_id, i64::MAX))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn delete_card(&self, card_id: i64) -> Result<usize> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|&(_, card), _| card != card_id);
        Ok(before - records.len())
    }
}
