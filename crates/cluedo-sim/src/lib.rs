pub mod analytics;
pub mod config;
pub mod logging;
pub mod notes;
pub mod tournament;
pub mod transcript;
