//! Review submission and due-card selection.
//!
//! [`Reviewer`] ties the pure scheduler to a [`ReviewStore`]: it loads the
//! prior state for a (card, user) pair, schedules the review, and upserts the
//! result. Concurrency control around the upsert belongs to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::core::scheduler::{Quality, Scheduler, SchedulingState};
use crate::error::Result;
use crate::storage::ReviewStore;

/// Persisted scheduling state for one (card, user) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub card_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub state: SchedulingState,
    pub next_review_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
}

impl ReviewRecord {
    /// Whether the card is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }
}

/// A card selected for study, with its stored schedule if it has one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueCard {
    pub card_id: i64,
    /// `None` for cards that have never been reviewed.
    pub next_review_date: Option<DateTime<Utc>>,
    pub interval: u32,
    pub repetitions: u32,
}

/// Applies reviews against a store.
pub struct Reviewer<S: ReviewStore> {
    store: S,
    scheduler: Scheduler,
}

impl<S: ReviewStore> Reviewer<S> {
    /// Create a reviewer with the default scheduler.
    pub fn new(store: S) -> Self {
        Self {
            store,
            scheduler: Scheduler::default(),
        }
    }

    /// Create a reviewer using the configured lapse policy.
    pub fn with_config(store: S, config: &SchedulerConfig) -> Self {
        Self {
            store,
            scheduler: Scheduler::new(config.lapse_policy),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a review of `card_id` by `user_id` made at `now`.
    ///
    /// A card without a stored record starts from the initial state.
    pub fn review(
        &self,
        card_id: i64,
        user_id: i64,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<ReviewRecord> {
        let prior = self
            .store
            .get(card_id, user_id)?
            .map(|record| record.state)
            .unwrap_or_default();

        let scheduled = self.scheduler.review(quality, prior, now);
        let record = ReviewRecord {
            card_id,
            user_id,
            state: scheduled.state,
            next_review_date: scheduled.due_at,
            last_review_date: Some(now),
        };

        self.store.upsert(&record)?;

        tracing::debug!(
            card_id,
            user_id,
            quality = quality.value(),
            interval = record.state.interval_days,
            repetitions = record.state.repetitions,
            "review recorded"
        );

        Ok(record)
    }

    /// Stored records for `user_id` that are due at `now`, oldest first.
    pub fn due(
        &self,
        user_id: i64,
        now: DateTime<Utc>,
        limit: Option<usize>,
    ) -> Result<Vec<ReviewRecord>> {
        let mut due: Vec<ReviewRecord> = self
            .store
            .list_for_user(user_id)?
            .into_iter()
            .filter(|r| r.is_due(now))
            .collect();
        due.sort_by(|a, b| {
            a.next_review_date
                .cmp(&b.next_review_date)
                .then(a.card_id.cmp(&b.card_id))
        });
        if let Some(limit) = limit {
            due.truncate(limit);
        }
        Ok(due)
    }

    /// Select the due cards among `card_ids` for `user_id`.
    ///
    /// Never-reviewed cards come first in the given order, followed by
    /// reviewed cards that are due, oldest first.
    pub fn due_cards(
        &self,
        user_id: i64,
        card_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<Vec<DueCard>> {
        let mut due = Vec::new();
        for &card_id in card_ids {
            match self.store.get(card_id, user_id)? {
                None => due.push(DueCard {
                    card_id,
                    next_review_date: None,
                    interval: 0,
                    repetitions: 0,
                }),
                Some(record) if record.is_due(now) => due.push(DueCard {
                    card_id,
                    next_review_date: Some(record.next_review_date),
                    interval: record.state.interval_days,
                    repetitions: record.state.repetitions,
                }),
                Some(_) => {}
            }
        }
        // Option orders None first; the sort is stable
        due.sort_by_key(|c| c.next_review_date);
        Ok(due)
    }

    /// Remove all review state for a deleted card.
    pub fn forget_card(&self, card_id: i64) -> Result<usize> {
        self.store.delete_card(card_id)
    }
}
