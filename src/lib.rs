pub mod core;
pub mod models;
pub mod stores;
pub mod metrics;
pub mod utils;
pub mod handlers;
