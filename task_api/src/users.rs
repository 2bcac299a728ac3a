use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use crate::authentication::{self, CurrentUser};
use crate::entities::{
    AuthResponse, LoginRequest, NewUser, ProfileChanges, ProfileRequest, RegisterRequest, User,
};
use crate::error::{ApiError, INVALID_CREDENTIALS, SERVER_ERROR};
use crate::AppState;

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(message))
}

// blank strings in a profile update mean "leave it as it is"
fn supplied(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens
        .issue(user.id)
        .map_err(|error| ApiError::internal(SERVER_ERROR, error))?;

    Ok(AuthResponse::new(user, token))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;

    let name = required(request.name, "Please add a name!")?;
    let email = required(request.email, "Please add an email!")?;
    // passwords are taken verbatim, surrounding whitespace included
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("Please add a password!"))?;

    if state.users.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::validation("User already exists!"));
    }

    let password_hash = authentication::hash_password(password).await?;
    let user = state
        .users
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, "registered user");

    let response = auth_response(&state, &user)?.with_message("User registered successfully!");
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(credentials) = payload?;

    let Some(user) = state.users.find_user_by_email(credentials.email.trim()).await? else {
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS));
    };

    if !authentication::verify_password(credentials.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = user.id, "password mismatch");
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS));
    }

    Ok(Json(auth_response(&state, &user)?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;

    let password_hash = match request.password.filter(|p| !p.is_empty()) {
        Some(password) => Some(authentication::hash_password(password).await?),
        None => None,
    };

    let changes = ProfileChanges {
        name: supplied(request.name),
        password_hash,
    };

    let user = state
        .users
        .update_user(current.id, changes)
        .await
        .map_err(|error| ApiError::internal("Server error: Profile update failed", error))?
        .ok_or(ApiError::NotFound("User not found"))?;

    tracing::info!(user_id = user.id, "updated profile");

    Ok(Json(auth_response(&state, &user)?))
}
