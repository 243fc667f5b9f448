//! FSRS-4.5 Core Algorithm
//!
//! Pure functions implementing the memory model. None of these hold state;
//! every output is a function of the inputs and [`FSRS_WEIGHTS`].

use chrono::{DateTime, Utc};

use crate::card::Grade;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Calibrated FSRS-4.5 weights (w0-w18)
///
/// - w0..w3: initial stability per grade (Fail, Hard, Pass, Easy)
/// - w4, w5: initial difficulty
/// - w6, w7: difficulty update and mean reversion
/// - w8..w10: stability growth on success
/// - w11..w14: post-lapse stability
/// - w15: Hard penalty, w16: Easy bonus
/// - w17, w18: short-term parameters (carried for completeness, unused here)
pub const FSRS_WEIGHTS: [f64; 19] = [
    0.40255, 1.18385, 3.173, 15.69105, 7.1949, 0.5345, 1.4604, 0.0046, 1.54575, 0.1192, 1.01925,
    1.9395, 0.11, 0.29605, 2.2698, 0.2315, 2.9898, 0.51655, 0.6621,
];

/// Forgetting curve factor: 19/81, chosen so that R = 0.9 when t = S
pub const FACTOR: f64 = 19.0 / 81.0;

/// Forgetting curve exponent
pub const DECAY: f64 = -0.5;

/// Default target retention
pub const DEFAULT_RETENTION: f64 = 0.9;

/// Difficulty lower bound
pub const MIN_DIFFICULTY: f64 = 1.0;

/// Difficulty upper bound
pub const MAX_DIFFICULTY: f64 = 10.0;

/// Difficulty assumed when a reviewed card arrives without one
pub const FALLBACK_DIFFICULTY: f64 = 5.0;

/// Milliseconds in one day
pub const MS_PER_DAY: f64 = 86_400_000.0;

// ============================================================================
// DIFFICULTY
// ============================================================================

#[inline]
fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

/// Initial stability for a card's first grading: `w[grade - 1]`
#[inline]
pub fn initial_stability(grade: Grade) -> f64 {
    FSRS_WEIGHTS[grade.index()]
}

/// Initial difficulty: `D0(G) = w4 - e^(w5 * (G - 1)) + 1`, clamped to [1, 10]
pub fn initial_difficulty(grade: Grade) -> f64 {
    let g = grade.as_f64();
    clamp_difficulty(FSRS_WEIGHTS[4] - (FSRS_WEIGHTS[5] * (g - 1.0)).exp() + 1.0)
}

/// Difficulty after a review.
///
/// The raw update `D' = D + dD * (10 - D) / 9` with `dD = -w6 * (G - 3)`
/// is blended with `D0(Easy)` by `w7` to stop long-run drift.
pub fn next_difficulty(difficulty: f64, grade: Grade) -> f64 {
    let delta = -FSRS_WEIGHTS[6] * (grade.as_f64() - 3.0);
    let damped = difficulty + delta * ((MAX_DIFFICULTY - difficulty) / 9.0);

    clamp_difficulty(
        FSRS_WEIGHTS[7] * initial_difficulty(Grade::Easy) + (1.0 - FSRS_WEIGHTS[7]) * damped,
    )
}

// ============================================================================
// STABILITY
// ============================================================================

/// Stability after a successful review (Hard, Pass or Easy).
///
/// ```text
/// S' = S * (1 + (11 - D) * S^(-w9) * (e^(w10 * (1 - R)) - 1) * H * B * e^w8)
/// ```
///
/// `H = w15` for Hard, `B = w16` for Easy, otherwise 1.
pub fn next_recall_stability(stability: f64, difficulty: f64, retrievability: f64, grade: Grade) -> f64 {
    let hard_penalty = if grade == Grade::Hard { FSRS_WEIGHTS[15] } else { 1.0 };
    let easy_bonus = if grade == Grade::Easy { FSRS_WEIGHTS[16] } else { 1.0 };

    let growth = (11.0 - difficulty)
        * stability.powf(-FSRS_WEIGHTS[9])
        * ((FSRS_WEIGHTS[10] * (1.0 - retrievability)).exp() - 1.0)
        * hard_penalty
        * easy_bonus
        * FSRS_WEIGHTS[8].exp();

    stability * (1.0 + growth)
}

/// Stability after a lapse.
///
/// ```text
/// S' = min(S, w11 * D^(-w12) * ((S + 1)^w13 - 1) * e^(w14 * (1 - R)))
/// ```
///
/// A lapse never raises stability above its pre-review value.
pub fn next_forget_stability(stability: f64, difficulty: f64, retrievability: f64) -> f64 {
    let post_lapse = FSRS_WEIGHTS[11]
        * difficulty.powf(-FSRS_WEIGHTS[12])
        * ((stability + 1.0).powf(FSRS_WEIGHTS[13]) - 1.0)
        * (FSRS_WEIGHTS[14] * (1.0 - retrievability)).exp();

    stability.min(post_lapse)
}

// ============================================================================
// RETRIEVABILITY & INTERVAL
// ============================================================================

/// Forgetting curve: `R = (1 + FACTOR * t / S)^DECAY`
///
/// `elapsed_days` of zero gives exactly 1.0. The result is clamped to
/// [0, 1]; callers reject negative elapsed time before reaching here.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    if elapsed_days <= 0.0 {
        return 1.0;
    }
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY).clamp(0.0, 1.0)
}

/// Days elapsed between two instants, at millisecond precision
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// Retrievability of a card last reviewed at `last_review`, evaluated at `now`
pub fn recalculate_retrievability(last_review: DateTime<Utc>, now: DateTime<Utc>, stability: f64) -> f64 {
    retrievability(elapsed_days(last_review, now), stability)
}

/// Fractional days until retrievability falls to `retention`.
///
/// Inverse of the forgetting curve: `t = S * (retention^(1/DECAY) - 1) / FACTOR`.
/// Not rounded or floored; the scheduler applies the one-day minimum.
pub fn next_interval(stability: f64, retention: f64) -> f64 {
    stability * (retention.powf(1.0 / DECAY) - 1.0) / FACTOR
}

// ============================================================================
// TESTS
// ============================================================================
