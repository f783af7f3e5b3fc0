// Startup logic for opening the record store

use crate::core::config::DatabaseConfig;
use crate::stores::user_store::UserStore;
use anyhow::{Context, Result};
use tracing::info;

/// Open the configured store with its schema materialized.
///
/// Runs once at process start, before the listener accepts requests.
pub fn open_user_store(config: &DatabaseConfig) -> Result<UserStore> {
    let store = match &config.path {
        Some(path) => UserStore::open(path)
            .context(format!("Failed to open database file: {}", path.display()))?,
        None => UserStore::open_in_memory().context("Failed to open in-memory database")?,
    };

    let existing = store.count().context("Failed to count existing users")?;
    info!(users = existing, "User store ready");

    Ok(store)
}
