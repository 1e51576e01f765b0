/// User endpoints
///
/// - `GET /v1/users/me` - the caller's own record
/// - `GET /v1/users/lookup?email=` - find a user by email
/// - `GET /v1/users/:id` - find a user by id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{auth::middleware::AuthContext, models::user::User, services::identity};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub email: String,
}

/// Returns the caller's user record
///
/// # Errors
///
/// - `401 Unauthorized`: the token's user no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    identity::get_user_by_email(state.store(), &auth.email)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("caller is not a known user".to_string()))
}

pub async fn lookup_by_email(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<User>> {
    let email = query.email.trim().to_lowercase();

    identity::get_user_by_email(state.store(), &email)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no user with email {}", email)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    identity::get_user_profile(state.store(), user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {} does not exist", user_id)))
}
