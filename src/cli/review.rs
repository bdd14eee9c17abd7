//! Review command for Flashdeck.
//!
//! Records a graded review for a (card, user) pair and persists the new
//! schedule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Quality, ReviewRecord, Reviewer};
use crate::error::Result;
use crate::storage::ReviewStore;

/// Options for the review command.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub card_id: i64,
    pub user_id: i64,
    /// Review grade (0-5).
    pub quality: i64,
    /// Review time. Defaults to now.
    pub now: Option<DateTime<Utc>>,
}

/// Output format for the review command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The stored record after the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ReviewRecord>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub caller_error: bool,
}

impl ReviewOutput {
    /// Create a successful output.
    pub fn success(record: ReviewRecord) -> Self {
        Self {
            success: true,
            record: Some(record),
            error: None,
            caller_error: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>, caller_error: bool) -> Self {
        Self {
            success: false,
            record: None,
            error: Some(error.into()),
            caller_error,
        }
    }
}

/// The review command implementation.
pub struct ReviewCommand<S: ReviewStore> {
    reviewer: Reviewer<S>,
}

impl<S: ReviewStore> ReviewCommand<S> {
    /// Create a new review command.
    pub fn new(reviewer: Reviewer<S>) -> Self {
        Self { reviewer }
    }

    /// Run the review command.
    pub fn run(&self, options: &ReviewOptions) -> ReviewOutput {
        match self.record_review(options) {
            Ok(record) => ReviewOutput::success(record),
            Err(e) => ReviewOutput::failure(
                format!("Failed to record review: {}", e),
                e.is_caller_error(),
            ),
        }
    }

    fn record_review(&self, options: &ReviewOptions) -> Result<ReviewRecord> {
        let quality = Quality::new(options.quality)?;
        let now = options.now.unwrap_or_else(Utc::now);
        self.reviewer
            .review(options.card_id, options.user_id, quality, now)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ReviewOutput, options: &ReviewOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ReviewOutput) -> String {
        match &output.record {
            Some(record) if output.success => format!(
                "Card {} reviewed.\nNext review: {} (in {} day(s))\nEase factor: {:.2}, repetitions: {}\n",
                record.card_id,
                record.next_review_date.to_rfc3339(),
                record.state.interval_days,
                record.state.ease_factor,
                record.state.repetitions,
            ),
            _ => format!(
                "Review failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
