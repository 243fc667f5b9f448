//! Scheduling request and result records
//!
//! A [`ScheduleRequest`] is the caller's view of a card at the moment it is
//! graded. The scheduler consumes it once and returns a [`ScheduledCard`]
//! for the caller to persist.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Grade;
use crate::error::{Result, SchedulingError};
use crate::fsrs::{elapsed_days, retrievability, FALLBACK_DIFFICULTY, MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Opaque card identifier
pub type CardId = i64;

// ============================================================================
// CARD PHASE
// ============================================================================

/// Lifecycle phase of a card
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum CardPhase {
    /// Never graded; no memory state yet
    New,
    /// Graded at least once
    Reviewed {
        /// Days until retrievability decays to 90%
        stability: f64,
        /// Intrinsic difficulty in [1, 10]
        difficulty: f64,
    },
}

impl CardPhase {
    /// Whether the card has never been graded
    pub fn is_new(&self) -> bool {
        matches!(self, CardPhase::New)
    }
}

// ============================================================================
// REQUEST
// ============================================================================

fn default_retrievability() -> f64 {
    1.0
}

/// One card to schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Card identifier, echoed in the result
    pub card_id: CardId,
    /// Due date in effect before this review
    pub current_time_due: DateTime<Utc>,
    /// Interval (days) that produced `current_time_due`
    pub current_interval: i64,
    /// Last stored retrievability; recomputed for reviewed cards
    #[serde(default = "default_retrievability")]
    pub current_retrievability: f64,
    /// Stored stability; absent for a brand-new card
    #[serde(default)]
    pub current_stability: Option<f64>,
    /// Stored difficulty; absent for a brand-new card
    #[serde(default)]
    pub current_difficulty: Option<f64>,
    /// Raw grade as submitted by the review session
    pub grade: String,
    /// When the grading happened; falls back to the batch timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ScheduleRequest {
    /// Request for a card that has never been graded
    pub fn new_card(card_id: CardId, grade: impl Into<String>, time_due: DateTime<Utc>) -> Self {
        Self {
            card_id,
            current_time_due: time_due,
            current_interval: 1,
            current_retrievability: 1.0,
            current_stability: None,
            current_difficulty: None,
            grade: grade.into(),
            reviewed_at: None,
        }
    }

    /// Request for a card with stored memory state
    pub fn reviewed_card(
        card_id: CardId,
        grade: impl Into<String>,
        time_due: DateTime<Utc>,
        interval: i64,
        stability: f64,
        difficulty: f64,
    ) -> Self {
        Self {
            card_id,
            current_time_due: time_due,
            current_interval: interval,
            current_retrievability: 1.0,
            current_stability: Some(stability),
            current_difficulty: Some(difficulty),
            grade: grade.into(),
            reviewed_at: None,
        }
    }

    /// Set the grading timestamp
    pub fn at(mut self, reviewed_at: DateTime<Utc>) -> Self {
        self.reviewed_at = Some(reviewed_at);
        self
    }

    /// Parse the submitted grade. Unknown strings are rejected, never defaulted.
    pub fn parse_grade(&self) -> Result<Grade> {
        self.grade
            .parse()
            .map_err(|_| SchedulingError::InvalidGrade {
                card_id: self.card_id,
                value: self.grade.clone(),
            })
    }

    /// Determine the lifecycle phase.
    ///
    /// Stored stability marks a card as reviewed whatever its interval, so a
    /// lapsed card on a one-day interval keeps its memory state. Without
    /// stability, an interval above one day is a data-integrity error.
    pub fn phase(&self) -> Result<CardPhase> {
        let Some(stability) = self.current_stability else {
            if self.current_interval <= 1 {
                return Ok(CardPhase::New);
            }
            return Err(SchedulingError::MissingStability {
                card_id: self.card_id,
                interval: self.current_interval,
            });
        };

        if !stability.is_finite() || stability <= 0.0 {
            return Err(SchedulingError::InvalidStability {
                card_id: self.card_id,
                value: stability,
            });
        }

        let difficulty = match self.current_difficulty {
            Some(d) if d.is_finite() && (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) => d,
            Some(d) => {
                return Err(SchedulingError::InvalidDifficulty {
                    card_id: self.card_id,
                    value: d,
                });
            }
            None => {
                warn!(
                    card_id = self.card_id,
                    "Reviewed card has no stored difficulty, assuming {}", FALLBACK_DIFFICULTY
                );
                FALLBACK_DIFFICULTY
            }
        };

        Ok(CardPhase::Reviewed {
            stability,
            difficulty,
        })
    }

    /// Back-computed timestamp of the previous review
    pub fn last_review(&self) -> Result<DateTime<Utc>> {
        Duration::try_days(self.current_interval)
            .and_then(|interval| self.current_time_due.checked_sub_signed(interval))
            .ok_or(SchedulingError::TimestampOutOfRange {
                card_id: self.card_id,
            })
    }

    /// Days since the previous review, rejecting negative spans
    pub fn elapsed_days_at(&self, now: DateTime<Utc>) -> Result<f64> {
        let elapsed = elapsed_days(self.last_review()?, now);
        if elapsed < 0.0 {
            return Err(SchedulingError::NegativeElapsed {
                card_id: self.card_id,
                elapsed_days: elapsed,
            });
        }
        Ok(elapsed)
    }

    /// Retrievability at `now`. A new card is treated as fully retrievable.
    pub fn retrievability_at(&self, now: DateTime<Utc>) -> Result<f64> {
        match self.phase()? {
            CardPhase::New => Ok(1.0),
            CardPhase::Reviewed { stability, .. } => {
                Ok(retrievability(self.elapsed_days_at(now)?, stability))
            }
        }
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Updated memory state for one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCard {
    /// Card identifier
    pub card_id: CardId,
    /// Next presentation
    pub new_time_due: DateTime<Utc>,
    /// Whole days until the next review, at least 1
    pub new_interval: i64,
    /// Always 1.0: the card was just recalled or relearned
    pub new_retrievability: f64,
    /// Stability after this review
    pub new_stability: f64,
    /// Difficulty after this review, in [1, 10]
    pub new_difficulty: f64,
    /// Grade that produced this result
    pub grade: Grade,
}

impl ScheduledCard {
    /// Memory state to store for the card's next scheduling call
    pub fn phase(&self) -> CardPhase {
        CardPhase::Reviewed {
            stability: self.new_stability,
            difficulty: self.new_difficulty,
        }
    }
}
