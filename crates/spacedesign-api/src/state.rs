use std::sync::Arc;

use anyhow::anyhow;

use spacedesign_db::Database;

use crate::auth::Passwords;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub passwords: Passwords,
}

impl AppStateInner {
    pub fn new(db: Database) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            passwords: Passwords::new(argon2::Argon2::default())?,
        })
    }

    pub fn with_passwords(db: Database, passwords: Passwords) -> Self {
        Self { db, passwords }
    }
}

/// Run store (or hashing) work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal(anyhow!("spawn_blocking join error: {}", e)))?
}
