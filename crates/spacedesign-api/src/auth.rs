use anyhow::anyhow;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rand_core::OsRng;
use tracing::{error, info, warn};

use spacedesign_types::api::{ApiResponse, LoginRequest, NewUser};
use spacedesign_types::models::User;

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::state::{AppState, blocking};

/// Salted Argon2id hashing for stored credentials.
pub struct Passwords {
    argon2: Argon2<'static>,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one hash verification.
    dummy_hash: String,
}

impl Passwords {
    pub fn new(argon2: Argon2<'static>) -> anyhow::Result<Self> {
        let dummy_hash = hash_with(&argon2, "no-such-user-placeholder")?;
        Ok(Self { argon2, dummy_hash })
    }

    pub fn hash(&self, password: &str) -> anyhow::Result<String> {
        hash_with(&self.argon2, password)
    }

    /// `stored` is the PHC string of the account, or `None` if there is no
    /// such account. Returns true only for a matching password.
    pub fn verify(&self, password: &str, stored: Option<&str>) -> bool {
        let candidate = stored.unwrap_or(&self.dummy_hash);
        let parsed = match PasswordHash::new(candidate) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };

        let matches = self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        matches && stored.is_some()
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let user: User = blocking(&state, move |app| {
        // Cheap pre-check so a taken name does not pay for a hash.
        if app.db.get_user_by_username(&req.username)?.is_some() {
            return Err(username_taken(&req.username));
        }

        let password_hash = app.passwords.hash(&req.password)?;
        let row = app
            .db
            .create_user(
                &req.username,
                &password_hash,
                req.email.as_deref(),
                req.external_auth_id.as_deref(),
            )?
            .ok_or_else(|| username_taken(&req.username))?;
        Ok(row.into())
    })
    .await?;

    info!(user_id = user.id, username = %user.username, "User created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(user).with_message("User created successfully")),
    ))
}

fn username_taken(username: &str) -> ApiError {
    ApiError::Conflict(format!("Username '{}' is already taken", username))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user: User = blocking(&state, move |app| {
        let row = app.db.get_user_by_username(&req.username)?;
        let stored = row.as_ref().map(|r| r.password.as_str());

        if !app.passwords.verify(&req.password, stored) {
            warn!(username = %req.username, "Failed login attempt");
            return Err(ApiError::InvalidCredentials);
        }
        row.map(User::from).ok_or(ApiError::InvalidCredentials)
    })
    .await?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(ApiResponse::data(user).with_message("Login successful")))
}
