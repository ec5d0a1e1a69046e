pub mod commands;
pub mod messages;
pub mod services;
pub mod traits;
