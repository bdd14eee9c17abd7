//! Review storage traits.
//!
//! This module defines the `ReviewStore` trait for scheduling-state
//! persistence, keyed by (card, user).

use std::sync::Arc;

use crate::core::ReviewRecord;
use crate::error::Result;

/// Trait for review storage backends.
///
/// `upsert` must behave as insert-or-update on `(card_id, user_id)`; that is
/// the only concurrency guarantee the review flow relies on.
pub trait ReviewStore: Send + Sync {
    /// Retrieve the record for a card and user.
    ///
    /// Returns `Ok(None)` if the card has never been reviewed by the user.
    fn get(&self, card_id: i64, user_id: i64) -> Result<Option<ReviewRecord>>;

    /// Insert or replace the record for its (card, user) pair.
    fn upsert(&self, record: &ReviewRecord) -> Result<()>;

    /// All records for a user, ordered by card id.
    fn list_for_user(&self, user_id: i64) -> Result<Vec<ReviewRecord>>;

    /// Delete every user's record for a card. Returns how many were removed.
    fn delete_card(&self, card_id: i64) -> Result<usize>;

    /// Check if a record exists.
    fn exists(&self, card_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.get(card_id, user_id)?.is_some())
    }
}

/// Blanket implementation of ReviewStore for Arc-wrapped stores.
impl<T: ReviewStore + ?Sized> ReviewStore for Arc<T> {
    fn get(&self, card_id: i64, user_id: i64) -> Result<Option<ReviewRecord>> {
        (**self).get(card_id, user_id)
    }

    fn upsert(&self, record: &ReviewRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn list_for_user(&self, user_id: i64) -> Result<Vec<ReviewRecord>> {
        (**self).list_for_user(user_id)
    }

    fn delete_card(&self, card_id: i64) -> Result<usize> {
        (**self).delete_card(card_id)
    }
}
