//! Error types
//!
//! Every scheduling error names the card it belongs to, so a batch caller can
//! report or retry individual cards.

use crate::card::CardId;

/// Per-card scheduling error
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    /// Grade string outside {fail, hard, pass, easy}
    #[error("card {card_id}: unrecognized grade {value:?}")]
    InvalidGrade { card_id: CardId, value: String },

    /// Interval claims a prior review but no stability was stored
    #[error("card {card_id}: interval of {interval} days implies a prior review, but no stability was supplied")]
    MissingStability { card_id: CardId, interval: i64 },

    /// Stored stability is zero, negative, or not finite
    #[error("card {card_id}: stability must be a positive finite number, got {value}")]
    InvalidStability { card_id: CardId, value: f64 },

    /// Stored difficulty is outside [1, 10]
    #[error("card {card_id}: difficulty must lie in [1, 10], got {value}")]
    InvalidDifficulty { card_id: CardId, value: f64 },

    /// Review timestamp precedes the back-computed last review
    #[error("card {card_id}: reviewed {elapsed_days:.3} days before its last review")]
    NegativeElapsed { card_id: CardId, elapsed_days: f64 },

    /// Date arithmetic on the card's timestamps left chrono's supported range
    #[error("card {card_id}: timestamp arithmetic out of range")]
    TimestampOutOfRange { card_id: CardId },

    /// Interval computation produced NaN or infinity
    #[error("card {card_id}: interval for stability {stability} is not finite")]
    DegenerateInterval { card_id: CardId, stability: f64 },
}

impl SchedulingError {
    /// The card this error belongs to
    pub fn card_id(&self) -> CardId {
        match self {
            Self::InvalidGrade { card_id, .. }
            | Self::MissingStability { card_id, .. }
            | Self::InvalidStability { card_id, .. }
            | Self::InvalidDifficulty { card_id, .. }
            | Self::NegativeElapsed { card_id, .. }
            | Self::TimestampOutOfRange { card_id }
            | Self::DegenerateInterval { card_id, .. } => *card_id,
        }
    }
}

/// Invalid scheduler settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// Retention must lie strictly between 0 and 1
    #[error("retention must lie strictly between 0 and 1, got {0}")]
    InvalidRetention(f64),
    /// Maximum interval must lie in [1, 365000] days
    #[error("maximum interval must lie in [1, 365000] days, got {0}")]
    InvalidMaximumInterval(u32),
    /// Day rollover must fall within a single day
    #[error("day rollover delay must lie in [0, 86400000) ms, got {0}")]
    InvalidRolloverDelay(i64),
}

/// Scheduler result type
pub type Result<T> = std::result::Result<T, SchedulingError>;
