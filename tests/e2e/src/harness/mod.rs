//! Test harness

mod card_store;

pub use card_store::{StoredCard, TestCardStore};
