//! Prophecy Bot - Chat questionnaire that ends in a prophecy.
//!
//! A user picks a category, answers its questions one at a time, and gets a
//! randomly chosen outcome for that category. Users and answers are
//! persisted through a fixed-size connection pool; per-chat progress lives
//! in memory.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
