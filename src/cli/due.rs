//! Due command for Flashdeck.
//!
//! Lists the cards a user should study now. With explicit card ids, cards
//! that were never reviewed are included and listed first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{DueCard, Reviewer};
use crate::error::Result;
use crate::storage::ReviewStore;

/// Options for the due command.
#[derive(Debug, Clone, Default)]
pub struct DueOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub user_id: i64,
    /// Candidate cards. When empty, only stored records are considered.
    pub card_ids: Vec<i64>,
    /// Maximum number of cards to return.
    pub limit: Option<usize>,
    /// Reference time. Defaults to now.
    pub now: Option<DateTime<Utc>>,
}

/// Output format for the due command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Due cards, never-reviewed first, then oldest due first.
    pub cards: Vec<DueCard>,
    /// Number of cards returned.
    pub count: usize,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DueOutput {
    /// Create a successful output.
    pub fn success(cards: Vec<DueCard>) -> Self {
        let count = cards.len();
        Self {
            success: true,
            cards,
            count,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            cards: vec![],
            count: 0,
            error: Some(error.into()),
        }
    }
}

/// The due command implementation.
pub struct DueCommand<S: ReviewStore> {
    reviewer: Reviewer<S>,
}

impl<S: ReviewStore> DueCommand<S> {
    /// Create a new due command.
    pub fn new(reviewer: Reviewer<S>) -> Self {
        Self { reviewer }
    }

    /// Run the due command.
    pub fn run(&self, options: &DueOptions) -> DueOutput {
        match self.find_due(options) {
            Ok(cards) => DueOutput::success(cards),
            Err(e) => DueOutput::failure(format!("Failed to list due cards: {}", e)),
        }
    }

    fn find_due(&self, options: &DueOptions) -> Result<Vec<DueCard>> {
        let now = options.now.unwrap_or_else(Utc::now);

        let mut cards = if options.card_ids.is_empty() {
            self.reviewer
                .due(options.user_id, now, None)?
                .into_iter()
                .map(|record| DueCard {
                    card_id: record.card_id,
                    next_review_date: Some(record.next_review_date),
                    interval: record.state.interval_days,
                    repetitions: record.state.repetitions,
                })
                .collect()
        } else {
            self.reviewer
                .due_cards(options.user_id, &options.card_ids, now)?
        };

        if let Some(limit) = options.limit {
            cards.truncate(limit);
        }
        Ok(cards)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DueOutput, options: &DueOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &DueOutput) -> String {
        if !output.success {
            return format!(
                "Due failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.cards.is_empty() {
            return "No cards due.".to_string();
        }

        let mut lines = vec![format!("Due cards ({}):", output.count)];
        lines.push(String::new());
        lines.push(format!(
            "{:<10}  {:<20}  {:>8}  {:>4}",
            "CARD", "DUE", "INTERVAL", "REPS"
        ));
        lines.push("-".repeat(48));

        for card in &output.cards {
            let due = card
                .next_review_date
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "new".to_string());
            lines.push(format!(
                "{:<10}  {:<20}  {:>8}  {:>4}",
                card.card_id, due, card.interval, card.repetitions
            ));
        }

        lines.join("\n")
    }
}
