//! Schedule command for Flashdeck.
//!
//! Computes the next scheduling state for a review without touching storage.
//! Useful for checking what a grade would do to a card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::scheduler::PASSING_QUALITY;
use crate::core::{Quality, ScheduledReview, Scheduler, SchedulingState};
use crate::error::Result;

/// Options for the schedule command.
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Review grade (0-5).
    pub quality: i64,
    /// Prior state. Defaults to a never-reviewed card.
    pub prior: Option<SchedulingState>,
    /// Review time. Defaults to now.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Output format for the schedule command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The grade that was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    /// The prior state the grade was applied to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior: Option<SchedulingState>,
    /// The resulting state and due time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<ScheduledReview>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure was caused by the caller's input.
    #[serde(skip)]
    pub caller_error: bool,
}

impl ScheduleOutput {
    /// Create a successful output.
    pub fn success(quality: Quality, prior: SchedulingState, next: ScheduledReview) -> Self {
        Self {
            success: true,
            quality: Some(quality.value()),
            prior: Some(prior),
            next: Some(next),
            error: None,
            caller_error: false,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>, caller_error: bool) -> Self {
        Self {
            success: false,
            quality: None,
            prior: None,
            next: None,
            error: Some(error.into()),
            caller_error,
        }
    }
}

/// The schedule command implementation.
pub struct ScheduleCommand {
    scheduler: Scheduler,
}

impl ScheduleCommand {
    /// Create a new schedule command.
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Run the schedule command.
    pub fn run(&self, options: &ScheduleOptions) -> ScheduleOutput {
        match self.compute(options) {
            Ok((quality, prior, next)) => ScheduleOutput::success(quality, prior, next),
            Err(e) => ScheduleOutput::failure(e.to_string(), e.is_caller_error()),
        }
    }

    fn compute(
        &self,
        options: &ScheduleOptions,
    ) -> Result<(Quality, SchedulingState, ScheduledReview)> {
        let quality = Quality::new(options.quality)?;
        let prior = options.prior.unwrap_or_default();
        let reviewed_at = options.reviewed_at.unwrap_or_else(Utc::now);
        Ok((quality, prior, self.scheduler.review(quality, prior, reviewed_at)))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ScheduleOutput, options: &ScheduleOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ScheduleOutput) -> String {
        match (&output.next, output.quality) {
            (Some(next), Some(quality)) if output.success => format!(
                "Quality {} ({})\nInterval: {} day(s)\nRepetitions: {}\nEase factor: {:.2}\nDue: {}\n",
                quality,
                if quality >= PASSING_QUALITY {
                    "pass"
                } else {
                    "lapse"
                },
                next.state.interval_days,
                next.state.repetitions,
                next.state.ease_factor,
                next.due_at.to_rfc3339(),
            ),
            _ => format!(
                "Schedule failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
