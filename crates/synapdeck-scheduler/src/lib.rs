//! # Synapdeck Scheduler
//!
//! Spaced repetition scheduling core for the Synapdeck flashcard application.
//!
//! - **FSRS-4.5**: 19-weight memory model (stability, difficulty, retrievability)
//! - **Explicit card phase**: new vs reviewed is a real sum type, not an interval heuristic
//! - **Typed grades**: unknown grade strings are rejected per card
//! - **Batch scheduling**: per-card results, or all-or-nothing for transactional callers
//!
//! The crate performs no I/O. Callers load card state, call the scheduler,
//! and persist the returned [`ScheduledCard`]s themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use synapdeck_scheduler::{FSRSScheduler, ScheduleRequest, FSRS_WEIGHTS};
//!
//! let scheduler = FSRSScheduler::default();
//! let now = Utc::now();
//!
//! let card = ScheduleRequest::new_card(1, "pass", now);
//! let scheduled = scheduler.schedule(&card, now)?;
//!
//! assert_eq!(scheduled.new_stability, FSRS_WEIGHTS[2]);
//! assert_eq!(scheduled.new_retrievability, 1.0);
//! assert!(scheduled.new_interval >= 1);
//! # Ok::<(), synapdeck_scheduler::SchedulingError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod card;
pub mod error;
pub mod fsrs;
pub mod stats;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Card data contract
pub use card::{CardId, CardPhase, Grade, ParseGradeError, ScheduleRequest, ScheduledCard};

// Errors
pub use error::{Result, SchedulingError, SettingsError};

// FSRS algorithm
pub use fsrs::{
    initial_difficulty,
    initial_stability,
    next_difficulty,
    next_forget_stability,
    next_interval,
    next_recall_stability,
    // Core functions for advanced usage
    recalculate_retrievability,
    retrievability,
    DueRounding,
    FSRSScheduler,
    PreviewResults,
    SchedulerSettings,
    FSRS_WEIGHTS,
    MAX_MAXIMUM_INTERVAL,
};

// Reporting
pub use stats::{scheduling_stats, GradeStats, RetrievabilitySummary};
