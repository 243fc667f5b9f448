//! Card Module
//!
//! The data contract between the scheduler and the review session:
//! - Review grades
//! - Lifecycle phase (new vs reviewed)
//! - Per-card scheduling requests and results

mod grade;
mod request;

pub use grade::{Grade, ParseGradeError};
pub use request::{CardId, CardPhase, ScheduleRequest, ScheduledCard};
