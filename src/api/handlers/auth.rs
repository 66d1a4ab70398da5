use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::{LoginRequest, SignupRequest}, responses::MessageResponse};
use crate::api::extractors::{auth::SESSION_COOKIE, body::ApiJson};
use crate::domain::models::{auth::{AuthResponse, SignupResponse}, user::{User, UserProfile}};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::info;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Username and password are required".into()));
    }
    if payload.roles.is_empty() {
        return Err(AppError::Validation("At least one role is required".into()));
    }

    if state.user_repo.find_by_username(&payload.username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password).await?;
    let profile = UserProfile {
        email: payload.email,
        phone_number: payload.phone_number,
        description: payload.description,
        ..Default::default()
    };

    let user = User::new(payload.username, password_hash, payload.roles, profile);
    let created = state.user_repo.create(&user).await?;

    let token = state.auth_service.issue_session(&created.id)?;
    set_session_cookie(&state, &cookies, &token);

    info!("User signed up: {}", created.id);

    Ok((StatusCode::CREATED, Json(SignupResponse {
        id: created.id,
        username: created.username,
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::Validation("Invalid username or password".into());

    let user = state.user_repo.find_by_username(&payload.username).await?
        .ok_or_else(invalid)?;

    if !state.auth_service.verify_password(&payload.password, &user.password_hash).await? {
        return Err(invalid());
    }

    if !user.active {
        return Err(AppError::Forbidden("Account is deactivated".into()));
    }

    let token = state.auth_service.issue_session(&user.id)?;
    set_session_cookie(&state, &cookies, &token);

    info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        roles: user.roles,
    }))
}

pub async fn logout(cookies: Cookies) -> Result<impl IntoResponse, AppError> {
    let mut expired = Cookie::new(SESSION_COOKIE, "");
    expired.set_http_only(true);
    expired.set_path("/");
    expired.set_max_age(Duration::ZERO);
    cookies.add(expired);

    info!("User logged out");

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

fn set_session_cookie(state: &AppState, cookies: &Cookies, token: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(state.config.cookie_secure);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(state.auth_service.session_ttl().num_seconds()));
    cookies.add(cookie);
}
