//! FSRS (Free Spaced Repetition Scheduler) Module
//!
//! FSRS-4.5 memory model with 19 fixed weights.
//!
//! Reference: https://github.com/open-spaced-repetition/fsrs4anki
//!
//! ## Core Formulas:
//! - Retrievability: R = (1 + F * t / S)^C where F = 19/81, C = -0.5
//! - Interval: t = S / F * (R^(1/C) - 1)
//! - Initial difficulty: D0(G) = w4 - e^(w5 * (G - 1)) + 1
//! - Lapse stability: S' = min(S, w11 * D^-w12 * ((S + 1)^w13 - 1) * e^(w14 * (1 - R)))

mod algorithm;
mod scheduler;

pub use algorithm::{
    elapsed_days,
    initial_difficulty,
    initial_stability,
    next_difficulty,
    next_forget_stability,
    next_interval,
    next_recall_stability,
    recalculate_retrievability,
    // Core functions
    retrievability,
    // Constants
    DECAY,
    DEFAULT_RETENTION,
    FACTOR,
    FALLBACK_DIFFICULTY,
    FSRS_WEIGHTS,
    MAX_DIFFICULTY,
    MIN_DIFFICULTY,
    MS_PER_DAY,
};

pub use scheduler::{
    DueRounding, FSRSScheduler, PreviewResults, SchedulerSettings, DEFAULT_MAXIMUM_INTERVAL,
    MAX_MAXIMUM_INTERVAL,
};
