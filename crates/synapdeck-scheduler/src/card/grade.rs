//! Review grades

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    /// Forgot the card
    Fail = 1,
    /// Recalled with serious effort
    Hard = 2,
    /// Recalled correctly
    Pass = 3,
    /// Recalled effortlessly. Part of the model; the review UI does not emit it yet.
    Easy = 4,
}

impl Grade {
    /// All grades, weakest first
    pub const ALL: [Grade; 4] = [Grade::Fail, Grade::Hard, Grade::Pass, Grade::Easy];

    /// Numeric rating (1-4)
    #[inline]
    pub fn rating(self) -> u8 {
        self as u8
    }

    #[inline]
    pub(crate) fn as_f64(self) -> f64 {
        self as u8 as f64
    }

    /// Zero-based index into the initial stability weights
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }

    /// Whether the card was recalled
    #[inline]
    pub fn is_success(self) -> bool {
        self != Grade::Fail
    }

    /// Build from a numeric rating (1-4)
    pub fn from_rating(rating: u8) -> Option<Self> {
        match rating {
            1 => Some(Grade::Fail),
            2 => Some(Grade::Hard),
            3 => Some(Grade::Pass),
            4 => Some(Grade::Easy),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Fail => "fail",
            Grade::Hard => "hard",
            Grade::Pass => "pass",
            Grade::Easy => "easy",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unrecognized grade string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized grade {0:?}")]
pub struct ParseGradeError(pub String);

impl FromStr for Grade {
    type Err = ParseGradeError;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(Grade::Fail),
            "hard" => Ok(Grade::Hard),
            "pass" => Ok(Grade::Pass),
            "easy" => Ok(Grade::Easy),
            _ => Err(ParseGradeError(s.to_string())),
        }
    }
}
