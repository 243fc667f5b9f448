//! Test Data Factory
//!
//! Provides utilities for generating realistic scheduling requests:
//! - Single new and established cards
//! - Batch generation for stress testing
//! - Fixed timestamps so assertions are reproducible

use chrono::{DateTime, Duration, TimeZone, Utc};
use synapdeck_scheduler::{CardId, ScheduleRequest};

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let now = TestDataFactory::fixed_time();
/// let card = TestDataFactory::new_card(1, "pass", now);
/// let batch = TestDataFactory::create_batch(BatchConfig { count: 100, ..Default::default() });
/// ```
pub struct TestDataFactory;

/// Configuration for batch request generation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of requests to create
    pub count: usize,
    /// Grades to cycle through
    pub grades: Vec<String>,
    /// Every n-th card is new (0 = none)
    pub new_every: usize,
    /// Review time for the whole batch
    pub reviewed_at: DateTime<Utc>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: 10,
            grades: ["fail", "hard", "pass"].map(String::from).to_vec(),
            new_every: 3,
            reviewed_at: TestDataFactory::fixed_time(),
        }
    }
}

impl TestDataFactory {
    /// 2024-01-01T20:00:00Z
    pub fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap()
    }

    /// A never-reviewed card graded at `reviewed_at`
    pub fn new_card(card_id: CardId, grade: &str, reviewed_at: DateTime<Utc>) -> ScheduleRequest {
        ScheduleRequest::new_card(card_id, grade, reviewed_at).at(reviewed_at)
    }

    /// An established card reviewed exactly on its due date
    pub fn established_card(
        card_id: CardId,
        grade: &str,
        reviewed_at: DateTime<Utc>,
        interval: i64,
        stability: f64,
        difficulty: f64,
    ) -> ScheduleRequest {
        ScheduleRequest::reviewed_card(card_id, grade, reviewed_at, interval, stability, difficulty)
            .at(reviewed_at)
    }

    /// An established card reviewed `days_overdue` days after its due date
    pub fn overdue_card(
        card_id: CardId,
        grade: &str,
        reviewed_at: DateTime<Utc>,
        days_overdue: i64,
    ) -> ScheduleRequest {
        ScheduleRequest::reviewed_card(
            card_id,
            grade,
            reviewed_at - Duration::days(days_overdue),
            10,
            9.0,
            5.0,
        )
        .at(reviewed_at)
    }

    /// Create a batch of requests
    pub fn create_batch(config: BatchConfig) -> Vec<ScheduleRequest> {
        (0..config.count)
            .map(|i| {
                let card_id = i as CardId + 1;
                let grade = &config.grades[i % config.grades.len()];

                if config.new_every > 0 && i % config.new_every == 0 {
                    Self::new_card(card_id, grade, config.reviewed_at)
                } else {
                    let interval = 2 + (i % 40) as i64;
                    Self::established_card(
                        card_id,
                        grade,
                        config.reviewed_at,
                        interval,
                        interval as f64 * 0.8,
                        1.0 + (i % 10) as f64 * 0.9,
                    )
                }
            })
            .collect()
    }
}
