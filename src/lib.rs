pub mod app;
pub mod backend;
pub mod config;
pub mod counters;
pub mod display;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod startup;
pub mod state;
pub mod stats;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use tracker::Tracker;
