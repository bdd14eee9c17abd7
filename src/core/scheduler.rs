//! SM-2 interval scheduling.
//!
//! A review is a pure transformation of the prior scheduling state:
//!
//! 1. `quality < 3` is a lapse: repetitions reset to 0, interval to 1 day
//! 2. `quality >= 3` increments repetitions; the interval is 1 day after the
//!    first success, 6 days after the second, then the prior interval times
//!    the prior ease factor, rounded
//! 3. The ease factor moves by `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)` and
//!    never drops below 1.3
//!
//! Whether the ease factor also moves on a lapse is controlled by
//! [`LapsePolicy`]. The default keeps it unchanged.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FlashdeckError, Result};

/// Ease factor assigned to a card that has never been reviewed.
pub const INITIAL_EASE: f64 = 2.5;

/// Hard floor for the ease factor.
pub const MIN_EASE: f64 = 1.3;

/// Lowest quality that counts as a successful recall.
pub const PASSING_QUALITY: u8 = 3;

// =============================================================================
// Quality
// =============================================================================

/// A review quality rating in `0..=5`.
///
/// 0 is a complete blackout, 5 a perfect response. Construction is the only
/// place range checking happens; the scheduler assumes a valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Highest quality rating.
    pub const MAX: u8 = 5;

    /// Create a quality rating, rejecting values outside `0..=5`.
    pub fn new(value: i64) -> Result<Self> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(FlashdeckError::invalid_quality(value))
        }
    }

    /// Create a quality rating, clamping out-of-range values into `0..=5`.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, i64::from(Self::MAX)) as u8)
    }

    /// The numeric rating.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this rating counts as a successful recall.
    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i64> for Quality {
    type Error = FlashdeckError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Scheduling state
// =============================================================================

/// How a lapse (`quality < 3`) treats the ease factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LapsePolicy {
    /// Leave the ease factor untouched on a lapse.
    #[default]
    KeepEase,
    /// Apply the ease formula on a lapse as well, lowering the ease.
    Penalize,
}

/// Valid string values for [`LapsePolicy`].
pub const VALID_LAPSE_POLICIES: &[&str] = &["keep-ease", "penalize"];

impl LapsePolicy {
    /// Parse a policy from its configuration name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "keep-ease" => Some(Self::KeepEase),
            "penalize" => Some(Self::Penalize),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeepEase => "keep-ease",
            Self::Penalize => "penalize",
        }
    }
}

/// Per (card, learner) scheduling state.
///
/// Serialized with the persisted column names (`ease_factor`, `interval`,
/// `repetitions`); `interval_days` is accepted as an alias on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    /// Interval growth multiplier, never below [`MIN_EASE`].
    pub ease_factor: f64,
    /// Days until the next review. 0 means never scheduled.
    #[serde(rename = "interval", alias = "interval_days")]
    pub interval_days: u32,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
}

impl SchedulingState {
    /// State of a card that has never been reviewed.
    pub fn new() -> Self {
        Self {
            ease_factor: INITIAL_EASE,
            interval_days: 0,
            repetitions: 0,
        }
    }

    /// Whether the card has never been scheduled.
    pub fn is_new(&self) -> bool {
        self.interval_days == 0 && self.repetitions == 0
    }

    /// Due timestamp for a review made at `reviewed_at`.
    ///
    /// Whole-day granularity; saturates at the maximum representable time.
    pub fn due_from(&self, reviewed_at: DateTime<Utc>) -> DateTime<Utc> {
        reviewed_at
            .checked_add_signed(Duration::days(i64::from(self.interval_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self::new()
    }
}

/// A scheduled review: the new state and when the card is next due.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReview {
    /// State after the review.
    #[serde(flatten)]
    pub state: SchedulingState,
    /// When the card is next due.
    pub due_at: DateTime<Utc>,
}

// =============================================================================
// Scheduler
// =============================================================================

/// SM-2 scheduler parameterised by its lapse policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scheduler {
    lapse_policy: LapsePolicy,
}

impl Scheduler {
    /// Create a scheduler with the given lapse policy.
    pub fn new(lapse_policy: LapsePolicy) -> Self {
        Self { lapse_policy }
    }

    /// The lapse policy in effect.
    pub fn lapse_policy(&self) -> LapsePolicy {
        self.lapse_policy
    }

    /// Compute the state that follows a review of `quality`.
    ///
    /// A prior ease factor below [`MIN_EASE`] (or non-finite) is treated as
    /// [`MIN_EASE`].
    pub fn schedule(&self, quality: Quality, prior: SchedulingState) -> SchedulingState {
        let ease = floor_ease(prior.ease_factor);

        if !quality.is_pass() {
            let ease_factor = match self.lapse_policy {
                LapsePolicy::KeepEase => ease,
                LapsePolicy::Penalize => next_ease(ease, quality),
            };
            return SchedulingState {
                ease_factor,
                interval_days: 1,
                repetitions: 0,
            };
        }

        let repetitions = prior.repetitions.saturating_add(1);
        let interval_days = match repetitions {
            1 => 1,
            2 => 6,
            _ => grow_interval(prior.interval_days, ease),
        };

        SchedulingState {
            ease_factor: next_ease(ease, quality),
            interval_days,
            repetitions,
        }
    }

    /// Schedule a review made at `reviewed_at` and compute its due date.
    pub fn review(
        &self,
        quality: Quality,
        prior: SchedulingState,
        reviewed_at: DateTime<Utc>,
    ) -> ScheduledReview {
        let state = self.schedule(quality, prior);
        ScheduledReview {
            state,
            due_at: state.due_from(reviewed_at),
        }
    }
}

/// Schedule a review with the default lapse policy.
pub fn schedule(quality: Quality, prior: SchedulingState) -> SchedulingState {
    Scheduler::default().schedule(quality, prior)
}

/// Apply the SM-2 ease formula, clamped at [`MIN_EASE`].
pub fn next_ease(ease: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    (ease + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE)
}

fn floor_ease(ease: f64) -> f64 {
    if ease.is_finite() {
        ease.max(MIN_EASE)
    } else {
        MIN_EASE
    }
}

/// Grow an interval by the ease factor. A success never schedules same-day.
fn grow_interval(interval_days: u32, ease: f64) -> u32 {
    let grown = (f64::from(interval_days) * ease).round();
    if grown >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (grown as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    fn state(interval_days: u32, ease_factor: f64, repetitions: u32) -> SchedulingState {
        SchedulingState {
            ease_factor,
            interval_days,
            repetitions,
        }
    }

    fn assert_ease(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "ease {} != expected {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_first_success() {
        let next = schedule(q(5), SchedulingState::new());
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetitions, 1);
        assert_ease(next.ease_factor, 2.6);
    }

    #[test]
    fn test_second_success() {
        let first = schedule(q(5), SchedulingState::new());
        let second = schedule(q(5), first);
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.repetitions, 2);
        assert_ease(second.ease_factor, 2.7);
    }

    #[test]
    fn test_third_success_grows_by_prior_ease() {
        let first = schedule(q(5), SchedulingState::new());
        let second = schedule(q(5), first);
        let third = schedule(q(5), second);
        // round(6 * 2.7) = 16
        assert_eq!(third.interval_days, 16);
        assert_eq!(third.repetitions, 3);
        assert_ease(third.ease_factor, 2.8);
    }

    #[test]
    fn test_lapse_resets_and_keeps_ease() {
        let next = schedule(q(1), state(10, 2.5, 4));
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetitions, 0);
        assert_ease(next.ease_factor, 2.5);
    }

    #[test]
    fn test_lapse_penalize_policy_lowers_ease() {
        let scheduler = Scheduler::new(LapsePolicy::Penalize);
        let next = scheduler.schedule(q(1), state(10, 2.5, 4));
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.repetitions, 0);
        // 2.5 + (0.1 - 4 * (0.08 + 4 * 0.02)) = 1.96
        assert_ease(next.ease_factor, 1.96);
    }

    #[test]
    fn test_penalize_policy_clamps_at_floor() {
        let scheduler = Scheduler::new(LapsePolicy::Penalize);
        let next = scheduler.schedule(q(0), state(3, 1.4, 2));
        assert_ease(next.ease_factor, MIN_EASE);
    }

    #[test]
    fn test_quality_three_lowers_ease() {
        let next = schedule(q(3), SchedulingState::new());
        assert_eq!(next.interval_days, 1);
        assert_ease(next.ease_factor, 2.36);
    }

    #[test]
    fn test_quality_four_keeps_ease() {
        let next = schedule(q(4), state(6, 2.5, 2));
        assert_eq!(next.interval_days, 15);
        assert_ease(next.ease_factor, 2.5);
    }

    #[test]
    fn test_interval_rounds_half_up() {
        // 5 * 1.3 = 6.5 -> 7
        let next = schedule(q(4), state(5, 1.3, 3));
        assert_eq!(next.interval_days, 7);
    }

    #[test]
    fn test_ease_below_floor_is_sanitized() {
        let next = schedule(q(1), state(4, 0.5, 3));
        assert_ease(next.ease_factor, MIN_EASE);

        let next = schedule(q(4), state(4, f64::NAN, 3));
        assert_ease(next.ease_factor, MIN_EASE);
    }

    #[test]
    fn test_zero_interval_success_never_same_day() {
        let next = schedule(q(5), state(0, 2.5, 5));
        assert_eq!(next.interval_days, 1);
    }

    #[test]
    fn test_huge_interval_saturates() {
        let next = schedule(q(5), state(u32::MAX, 2.5, 10));
        assert_eq!(next.interval_days, u32::MAX);
    }

    #[test]
    fn test_quality_new_rejects_out_of_range() {
        assert!(Quality::new(-1).is_err());
        assert!(Quality::new(6).is_err());
        assert_eq!(Quality::new(0).unwrap().value(), 0);
        assert_eq!(Quality::new(5).unwrap().value(), 5);
    }

    #[test]
    fn test_quality_clamped() {
        assert_eq!(Quality::clamped(-3).value(), 0);
        assert_eq!(Quality::clamped(9).value(), 5);
        assert_eq!(Quality::clamped(4).value(), 4);
    }

    #[test]
    fn test_quality_is_pass() {
        assert!(!q(2).is_pass());
        assert!(q(3).is_pass());
    }

    #[test]
    fn test_quality_deserialize_validates() {
        let ok: Quality = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Quality>("8").is_err());
    }

    #[test]
    fn test_lapse_policy_parse() {
        assert_eq!(LapsePolicy::parse("keep-ease"), Some(LapsePolicy::KeepEase));
        assert_eq!(LapsePolicy::parse("penalize"), Some(LapsePolicy::Penalize));
        assert_eq!(LapsePolicy::parse("strict"), None);
        assert_eq!(LapsePolicy::default(), LapsePolicy::KeepEase);
    }

    #[test]
    fn test_state_uses_persisted_column_names() {
        let json = serde_json::to_value(state(6, 2.7, 2)).unwrap();
        assert_eq!(json["interval"], 6);
        assert_eq!(json["repetitions"], 2);
        assert!(json.get("ease_factor").is_some());

        let parsed: SchedulingState =
            serde_json::from_str(r#"{"ease_factor":2.5,"interval_days":3,"repetitions":1}"#)
                .unwrap();
        assert_eq!(parsed.interval_days, 3);
    }

    #[test]
    fn test_due_from_adds_whole_days() {
        let reviewed_at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let review = Scheduler::default().review(q(5), state(6, 2.7, 2), reviewed_at);
        assert_eq!(review.state.interval_days, 16);
        assert_eq!(
            review.due_at,
            Utc.with_ymd_and_hms(2026, 3, 17, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_new_state_defaults() {
        let s = SchedulingState::default();
        assert!(s.is_new());
        assert_ease(s.ease_factor, INITIAL_EASE);
    }

    // =========================================================================
    // Property-based tests
    // =========================================================================

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_state() -> impl Strategy<Value = SchedulingState> {
            (0u32..3650, 1.3f64..4.0, 0u32..50).prop_map(
                |(interval_days, ease_factor, repetitions)| SchedulingState {
                    ease_factor,
                    interval_days,
                    repetitions,
                },
            )
        }

        fn arb_policy() -> impl Strategy<Value = LapsePolicy> {
            prop_oneof![Just(LapsePolicy::KeepEase), Just(LapsePolicy::Penalize)]
        }

        proptest! {
            // Property: the ease factor never drops below the floor
            #[test]
            fn prop_ease_never_below_floor(
                quality in 0i64..=5,
                prior in arb_state(),
                policy in arb_policy(),
            ) {
                let next = Scheduler::new(policy).schedule(Quality::new(quality).unwrap(), prior);
                prop_assert!(next.ease_factor >= MIN_EASE);
            }

            // Property: every lapse resets to a one-day interval
            #[test]
            fn prop_lapse_always_resets(quality in 0i64..3, prior in arb_state()) {
                let next = schedule(Quality::new(quality).unwrap(), prior);
                prop_assert_eq!(next.repetitions, 0);
                prop_assert_eq!(next.interval_days, 1);
            }

            // Property: every success increments repetitions
            #[test]
            fn prop_success_increments_repetitions(quality in 3i64..=5, prior in arb_state()) {
                let next = schedule(Quality::new(quality).unwrap(), prior);
                prop_assert_eq!(next.repetitions, prior.repetitions + 1);
                prop_assert!(next.interval_days >= 1);
            }

            // Property: scheduling is deterministic
            #[test]
            fn prop_schedule_is_pure(quality in 0i64..=5, prior in arb_state()) {
                let quality = Quality::new(quality).unwrap();
                prop_assert_eq!(schedule(quality, prior), schedule(quality, prior));
            }
        }
    }
}
