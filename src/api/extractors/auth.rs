use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, error, Span};

pub const SESSION_COOKIE: &str = "jwt";

/// Resolves the `jwt` session cookie to a stored, active user.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or_else(|| {
                error!("CookieManagerLayer missing from the router");
                AppError::Internal
            })?;

        let token = cookies.get(SESSION_COOKIE)
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let claims = app_state.auth_service.verify_session(&token)?;

        let user = app_state.user_repo.find_by_id(&claims.sub).await?
            .ok_or(AppError::Unauthorized)?;

        if !user.active {
            debug!("Rejected session for inactive user {}", user.id);
            return Err(AppError::Forbidden("Account is deactivated".into()));
        }

        Span::current().record("user_id", user.id.as_str());

        Ok(AuthUser(user))
    }
}
