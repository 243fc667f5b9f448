//! FSRS Scheduler
//!
//! Per-card orchestration: turns a [`ScheduleRequest`] and a grade into the
//! next memory state and due date.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::algorithm::{
    initial_difficulty, initial_stability, next_difficulty, next_forget_stability, next_interval,
    next_recall_stability, retrievability, DEFAULT_RETENTION, MS_PER_DAY,
};
use crate::card::{CardPhase, Grade, ScheduleRequest, ScheduledCard};
use crate::error::{Result, SchedulingError, SettingsError};

/// Default cap on scheduled intervals (100 years)
pub const DEFAULT_MAXIMUM_INTERVAL: u32 = 36_500;

/// Largest accepted `maximum_interval` (1000 years)
pub const MAX_MAXIMUM_INTERVAL: u32 = DEFAULT_MAXIMUM_INTERVAL * 10;

// ============================================================================
// SETTINGS
// ============================================================================

/// How the due date is derived from the computed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueRounding {
    /// Due date is the review time plus the whole-day interval
    #[default]
    WholeDays,
    /// Due date is the review time plus the fractional interval
    Exact,
}

/// Scheduler tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Target recall probability used to size intervals
    pub retention: f64,
    /// Milliseconds after UTC midnight at which a new calendar day begins
    pub day_rollover_delay_ms: i64,
    /// Upper bound on the scheduled interval, in days
    pub maximum_interval: u32,
    /// Due date precision
    pub due_rounding: DueRounding,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            day_rollover_delay_ms: 0,
            maximum_interval: DEFAULT_MAXIMUM_INTERVAL,
            due_rounding: DueRounding::WholeDays,
        }
    }
}

impl SchedulerSettings {
    /// Defaults overridden by `SYNAPDECK_*` environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the
    /// `SYNAPDECK_RETENTION`, `SYNAPDECK_DAY_ROLLOVER_MS` and
    /// `SYNAPDECK_MAXIMUM_INTERVAL` keys. Unparsable values are ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(retention) = parse_override::<f64>(&lookup, "SYNAPDECK_RETENTION") {
            settings.retention = retention;
        }
        if let Some(delay) = parse_override::<i64>(&lookup, "SYNAPDECK_DAY_ROLLOVER_MS") {
            settings.day_rollover_delay_ms = delay;
        }
        if let Some(max) = parse_override::<u32>(&lookup, "SYNAPDECK_MAXIMUM_INTERVAL") {
            settings.maximum_interval = max;
        }

        settings
    }

    /// Check that every tunable is usable
    pub fn validate(&self) -> std::result::Result<(), SettingsError> {
        if !(self.retention > 0.0 && self.retention < 1.0) {
            return Err(SettingsError::InvalidRetention(self.retention));
        }
        if !(1..=MAX_MAXIMUM_INTERVAL).contains(&self.maximum_interval) {
            return Err(SettingsError::InvalidMaximumInterval(self.maximum_interval));
        }
        if !(0..MS_PER_DAY as i64).contains(&self.day_rollover_delay_ms) {
            return Err(SettingsError::InvalidRolloverDelay(self.day_rollover_delay_ms));
        }
        Ok(())
    }

    /// Start of the calendar day after the one containing `at`.
    ///
    /// `None` when that instant falls outside chrono's representable range.
    pub fn next_day_start(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let rollover = Duration::try_milliseconds(self.day_rollover_delay_ms)?;
        let day = at.checked_sub_signed(rollover)?.date_naive().succ_opt()?;
        day.and_time(NaiveTime::MIN)
            .and_utc()
            .checked_add_signed(rollover)
    }
}

fn parse_override<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable scheduler override");
            None
        }
    }
}

// ============================================================================
// PREVIEW
// ============================================================================

/// Outcome of each possible grade for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResults {
    pub fail: ScheduledCard,
    pub hard: ScheduledCard,
    pub pass: ScheduledCard,
    pub easy: ScheduledCard,
}

impl PreviewResults {
    /// Result for a specific grade
    pub fn get(&self, grade: Grade) -> &ScheduledCard {
        match grade {
            Grade::Fail => &self.fail,
            Grade::Hard => &self.hard,
            Grade::Pass => &self.pass,
            Grade::Easy => &self.easy,
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Stateless FSRS scheduler
///
/// Holds only its settings; every call is a pure function of its inputs,
/// so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct FSRSScheduler {
    settings: SchedulerSettings,
}

impl FSRSScheduler {
    /// Create a scheduler with validated settings
    pub fn new(settings: SchedulerSettings) -> std::result::Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Get current settings
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Fractional days until retrievability reaches the target retention
    pub fn next_interval_days(&self, stability: f64) -> f64 {
        next_interval(stability, self.settings.retention)
    }

    /// Schedule a batch, one result per card in input order.
    ///
    /// A failing card does not stop the rest of the batch.
    pub fn reschedule_cards(
        &self,
        cards: &[ScheduleRequest],
        review_timestamp: DateTime<Utc>,
    ) -> Vec<Result<ScheduledCard>> {
        info!(
            "Scheduling {} cards at {}",
            cards.len(),
            review_timestamp.to_rfc3339()
        );

        let results: Vec<_> = cards
            .iter()
            .map(|card| {
                self.schedule(card, review_timestamp).inspect_err(|e| {
                    warn!(card_id = card.card_id, "Failed to schedule card: {}", e);
                })
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "Scheduled {} cards, {} failed",
            results.len() - failed,
            failed
        );

        results
    }

    /// Schedule a batch, all or nothing.
    ///
    /// Stops at the first failing card and returns its error, matching a
    /// caller that commits the whole batch in one transaction.
    pub fn reschedule_cards_atomic(
        &self,
        cards: &[ScheduleRequest],
        review_timestamp: DateTime<Utc>,
    ) -> Result<Vec<ScheduledCard>> {
        info!(
            "Scheduling {} cards atomically at {}",
            cards.len(),
            review_timestamp.to_rfc3339()
        );

        let scheduled = cards
            .iter()
            .map(|card| self.schedule(card, review_timestamp))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| warn!(card_id = e.card_id(), "Aborting batch: {}", e))?;

        info!("Scheduled {} cards", scheduled.len());
        Ok(scheduled)
    }

    /// Schedule a single card.
    ///
    /// `review_timestamp` is used when the request carries no `reviewed_at`.
    pub fn schedule(
        &self,
        card: &ScheduleRequest,
        review_timestamp: DateTime<Utc>,
    ) -> Result<ScheduledCard> {
        let grade = card.parse_grade()?;
        let phase = card.phase()?;
        let reviewed_at = card.reviewed_at.unwrap_or(review_timestamp);

        self.next_state(card, phase, grade, reviewed_at)
    }

    /// Outcome of every grade for a card, without committing to one
    pub fn preview(&self, card: &ScheduleRequest, at: DateTime<Utc>) -> Result<PreviewResults> {
        let phase = card.phase()?;
        let reviewed_at = card.reviewed_at.unwrap_or(at);
        let outcome = |grade| self.next_state(card, phase, grade, reviewed_at);

        Ok(PreviewResults {
            fail: outcome(Grade::Fail)?,
            hard: outcome(Grade::Hard)?,
            pass: outcome(Grade::Pass)?,
            easy: outcome(Grade::Easy)?,
        })
    }

    fn next_state(
        &self,
        card: &ScheduleRequest,
        phase: CardPhase,
        grade: Grade,
        reviewed_at: DateTime<Utc>,
    ) -> Result<ScheduledCard> {
        let (stability, difficulty) = match phase {
            CardPhase::New => {
                let stability = initial_stability(grade);
                let difficulty = initial_difficulty(grade);
                debug!(
                    card_id = card.card_id,
                    %grade,
                    "First review: S={:.3}, D={:.3}",
                    stability,
                    difficulty
                );
                (stability, difficulty)
            }
            CardPhase::Reviewed {
                stability: old_stability,
                difficulty: old_difficulty,
            } => {
                let elapsed = card.elapsed_days_at(reviewed_at)?;
                let r = retrievability(elapsed, old_stability);

                let stability = if grade.is_success() {
                    next_recall_stability(old_stability, old_difficulty, r, grade)
                } else {
                    next_forget_stability(old_stability, old_difficulty, r)
                };
                let difficulty = next_difficulty(old_difficulty, grade);

                debug!(
                    card_id = card.card_id,
                    %grade,
                    "Subsequent review: S={:.3}->{:.3}, D={:.3}->{:.3}, R={:.3}",
                    old_stability,
                    stability,
                    old_difficulty,
                    difficulty,
                    r
                );
                (stability, difficulty)
            }
        };

        let raw_interval = self.next_interval_days(stability);
        if !stability.is_finite() || stability <= 0.0 || !raw_interval.is_finite() {
            return Err(SchedulingError::DegenerateInterval {
                card_id: card.card_id,
                stability,
            });
        }

        let maximum = i64::from(self.settings.maximum_interval);
        let new_interval = (raw_interval.ceil() as i64).clamp(1, maximum);

        let out_of_range = || SchedulingError::TimestampOutOfRange {
            card_id: card.card_id,
        };

        let offset = match self.settings.due_rounding {
            DueRounding::WholeDays => Duration::try_days(new_interval),
            DueRounding::Exact => {
                let days = raw_interval.min(maximum as f64);
                Duration::try_milliseconds((days * MS_PER_DAY).round() as i64)
            }
        };
        let mut new_time_due = offset
            .and_then(|offset| reviewed_at.checked_add_signed(offset))
            .ok_or_else(out_of_range)?;

        // A shaky new card must not come back in the same session
        if phase.is_new() && grade == Grade::Hard {
            let next_day = self
                .settings
                .next_day_start(reviewed_at)
                .ok_or_else(out_of_range)?;
            if new_time_due < next_day {
                debug!(
                    card_id = card.card_id,
                    "New card graded hard, pushed to {}",
                    next_day.to_rfc3339()
                );
                new_time_due = next_day;
            }
        }

        debug!(
            card_id = card.card_id,
            "Interval {}d -> {}d, due {}",
            card.current_interval,
            new_interval,
            new_time_due.to_rfc3339()
        );

        Ok(ScheduledCard {
            card_id: card.card_id,
            new_time_due,
            new_interval,
            new_retrievability: 1.0,
            new_stability: stability,
            new_difficulty: difficulty,
            grade,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
