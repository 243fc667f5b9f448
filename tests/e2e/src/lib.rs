//! Synapdeck End-to-End Test Support
//!
//! - `harness`: an in-memory card store standing in for the review session's database
//! - `mocks`: factories for scheduling requests and review batches

pub mod harness;
pub mod mocks;
