//! Scheduling Statistics
//!
//! Pure aggregation over scheduler output, for logging and dashboards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::{Grade, ScheduledCard};

/// Interval statistics for one grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeStats {
    pub grade: Grade,
    pub count: usize,
    pub avg_interval: f64,
    pub min_interval: i64,
    pub max_interval: i64,
}

/// Group results by grade, weakest grade first. Grades with no results are omitted.
pub fn scheduling_stats(results: &[ScheduledCard]) -> Vec<GradeStats> {
    let mut by_grade: BTreeMap<Grade, Vec<i64>> = BTreeMap::new();
    for card in results {
        by_grade.entry(card.grade).or_default().push(card.new_interval);
    }

    by_grade
        .into_iter()
        .map(|(grade, intervals)| {
            let count = intervals.len();
            let total: i64 = intervals.iter().sum();
            GradeStats {
                grade,
                count,
                avg_interval: total as f64 / count as f64,
                min_interval: intervals.iter().copied().min().unwrap_or_default(),
                max_interval: intervals.iter().copied().max().unwrap_or_default(),
            }
        })
        .collect()
}

/// Distribution of retrievability across a set of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievabilitySummary {
    pub total_cards: usize,
    pub avg_retrievability: f64,
    pub min_retrievability: f64,
    pub max_retrievability: f64,
    /// Population standard deviation
    pub stddev_retrievability: f64,
    pub cards_below_50_percent: usize,
    pub cards_below_80_percent: usize,
    pub cards_above_90_percent: usize,
}

impl RetrievabilitySummary {
    /// Summarize a set of retrievability values. `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            total_cards: values.len(),
            avg_retrievability: mean,
            min_retrievability: values.iter().copied().fold(f64::INFINITY, f64::min),
            max_retrievability: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            stddev_retrievability: variance.sqrt(),
            cards_below_50_percent: values.iter().filter(|&&r| r < 0.5).count(),
            cards_below_80_percent: values.iter().filter(|&&r| r < 0.8).count(),
            cards_above_90_percent: values.iter().filter(|&&r| r >= 0.9).count(),
        })
    }
}
