pub mod database;
pub mod entities;
pub mod providers;
pub mod repositories;
pub mod traits;
