/// Authentication endpoints
///
/// - `POST /v1/auth/sign-in` - find or create the user for an email, get tokens
/// - `POST /v1/auth/refresh` - exchange a refresh token for an access token
///
/// Sign-in is where an email becomes a verified identity: every other route
/// trusts only the email inside a token issued here.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::jwt,
    models::user::{User, UserRole},
    services::identity,
    ServiceError,
};
use uuid::Uuid;
use validator::Validate;

/// Sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,

    /// Role for a first-time user; ignored for an existing one
    pub role: UserRole,
}

/// Sign-in response
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub user_id: Uuid,

    /// The stored user, which may differ from the request's name and role
    pub user: User,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

impl SignInRequest {
    /// Trims both fields and lowercases the email; runs before validation
    fn normalize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        self.name = self.name.trim().to_string();
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Signs a user in, creating the account on first use
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/sign-in
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "name": "Ada", "role": "employee" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
pub async fn sign_in(
    State(state): State<AppState>,
    Json(mut req): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    req.normalize();
    req.validate()?;

    let user_id = identity::get_or_create_user(state.store(), &req.email, &req.name, req.role).await?;

    let user = identity::get_user_profile(state.store(), user_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(user_id))?;

    let (access_token, refresh_token) = jwt::issue_token_pair(user.id, &user.email, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "Issued session tokens");

    Ok(Json(SignInResponse {
        user_id,
        user,
        access_token,
        refresh_token,
    }))
}

/// Issues a new access token from a valid refresh token
///
/// # Errors
///
/// - `401 Unauthorized`: refresh token invalid, expired or an access token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
