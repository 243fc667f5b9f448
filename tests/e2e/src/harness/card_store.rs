//! Test Card Store
//!
//! Stands in for the review session's persistence layer:
//! - Looks up each card's last-known state before scheduling
//! - Writes scheduler output back, either per card or as one transaction
//! - Snapshots and restores for rollback assertions

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use synapdeck_scheduler::{
    CardId, CardPhase, FSRSScheduler, Result, ScheduleRequest, ScheduledCard, SchedulingError,
};

/// Persisted state of one card
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCard {
    pub card_id: CardId,
    pub time_due: DateTime<Utc>,
    pub interval: i64,
    pub retrievability: f64,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    /// Number of scheduling results written back
    pub reviews: u32,
}

impl StoredCard {
    /// A card that has never been graded
    pub fn new(card_id: CardId, time_due: DateTime<Utc>) -> Self {
        Self {
            card_id,
            time_due,
            interval: 1,
            retrievability: 1.0,
            stability: None,
            difficulty: None,
            reviews: 0,
        }
    }

    /// Build the request the review session would send for `grade`
    pub fn request(&self, grade: &str, reviewed_at: DateTime<Utc>) -> ScheduleRequest {
        ScheduleRequest {
            card_id: self.card_id,
            current_time_due: self.time_due,
            current_interval: self.interval,
            current_retrievability: self.retrievability,
            current_stability: self.stability,
            current_difficulty: self.difficulty,
            grade: grade.to_string(),
            reviewed_at: Some(reviewed_at),
        }
    }

    fn apply(&mut self, result: &ScheduledCard) {
        self.time_due = result.new_time_due;
        self.interval = result.new_interval;
        self.retrievability = result.new_retrievability;
        if let CardPhase::Reviewed {
            stability,
            difficulty,
        } = result.phase()
        {
            self.stability = Some(stability);
            self.difficulty = Some(difficulty);
        }
        self.reviews += 1;
    }
}

/// In-memory card store for journey tests
///
/// # Example
///
/// ```rust,ignore
/// let mut store = TestCardStore::new();
/// store.seed_new_cards(10, now);
/// let results = store.review(&[(1, "pass")], now);
/// ```
#[derive(Debug, Default)]
pub struct TestCardStore {
    /// Scheduler used for every review
    pub scheduler: FSRSScheduler,
    cards: BTreeMap<CardId, StoredCard>,
    snapshot: Option<BTreeMap<CardId, StoredCard>>,
}

impl TestCardStore {
    /// Empty store with the default scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with a specific scheduler
    pub fn with_scheduler(scheduler: FSRSScheduler) -> Self {
        Self {
            scheduler,
            ..Default::default()
        }
    }

    /// Get a card
    pub fn get(&self, card_id: CardId) -> Option<&StoredCard> {
        self.cards.get(&card_id)
    }

    /// Insert or replace a card
    pub fn insert(&mut self, card: StoredCard) {
        self.cards.insert(card.card_id, card);
    }

    /// Number of cards
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards due at or before `now`
    pub fn due_cards(&self, now: DateTime<Utc>) -> Vec<CardId> {
        self.cards
            .values()
            .filter(|c| c.time_due <= now)
            .map(|c| c.card_id)
            .collect()
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Seed `count` new cards with ids starting at 1
    pub fn seed_new_cards(&mut self, count: usize, time_due: DateTime<Utc>) -> Vec<CardId> {
        let start = self.cards.keys().next_back().copied().unwrap_or(0) + 1;
        (start..start + count as CardId)
            .map(|id| {
                self.insert(StoredCard::new(id, time_due));
                id
            })
            .collect()
    }

    // ========================================================================
    // REVIEW METHODS
    // ========================================================================

    fn requests(&self, grades: &[(CardId, &str)], reviewed_at: DateTime<Utc>) -> Vec<ScheduleRequest> {
        grades
            .iter()
            .filter_map(|(id, grade)| self.cards.get(id).map(|c| c.request(grade, reviewed_at)))
            .collect()
    }

    /// Grade cards, committing every card that schedules successfully
    pub fn review(
        &mut self,
        grades: &[(CardId, &str)],
        reviewed_at: DateTime<Utc>,
    ) -> Vec<Result<ScheduledCard>> {
        let requests = self.requests(grades, reviewed_at);
        let results = self.scheduler.reschedule_cards(&requests, reviewed_at);

        for scheduled in results.iter().flatten() {
            if let Some(card) = self.cards.get_mut(&scheduled.card_id) {
                card.apply(scheduled);
            }
        }
        results
    }

    /// Grade cards in one transaction: nothing is written if any card fails
    pub fn review_atomic(
        &mut self,
        grades: &[(CardId, &str)],
        reviewed_at: DateTime<Utc>,
    ) -> std::result::Result<Vec<ScheduledCard>, SchedulingError> {
        let requests = self.requests(grades, reviewed_at);
        let scheduled = self.scheduler.reschedule_cards_atomic(&requests, reviewed_at)?;

        for result in &scheduled {
            if let Some(card) = self.cards.get_mut(&result.card_id) {
                card.apply(result);
            }
        }
        Ok(scheduled)
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Remember the current state
    pub fn take_snapshot(&mut self) {
        self.snapshot = Some(self.cards.clone());
    }

    /// Whether the store still matches the last snapshot
    pub fn matches_snapshot(&self) -> bool {
        self.snapshot.as_ref() == Some(&self.cards)
    }

    /// Return to the last snapshot
    pub fn restore_snapshot(&mut self) -> bool {
        match self.snapshot.clone() {
            Some(cards) => {
                self.cards = cards;
                true
            }
            None => false,
        }
    }
}
