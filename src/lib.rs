//! Telegram command bot: canned answers, weather and news lookups, and an
//! archive of everything it sends - Library exports for testing

pub mod config;
pub mod core;
pub mod error;
pub mod infrastructure;
pub mod telegram;
