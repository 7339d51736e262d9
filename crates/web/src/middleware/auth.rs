//! Authentication extractors.
//!
//! Provides extractors for reading the signed-in account from the session.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAccount, session_keys};

/// Message returned by `GET /api/user` without a session.
pub const NOT_LOGGED_IN: &str = "Not logged in";

/// Extractor that requires a signed-in account.
///
/// API requests are rejected with 401; page requests redirect to `/login`.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAccount(account): RequireAccount) -> impl IntoResponse {
///     format!("Hello, {}!", account.display_name)
/// }
/// ```
pub struct RequireAccount(pub CurrentAccount);

/// Error returned when sign-in is required but missing.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, NOT_LOGGED_IN).into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAccount(account) = match OptionalAccount::from_request_parts(parts, state).await
        {
            Ok(account) => account,
            Err(never) => match never {},
        };

        account.map(Self).ok_or_else(|| {
            // Nested routers see a stripped path; decide on the full one
            let path = parts
                .extensions
                .get::<OriginalUri>()
                .map_or(parts.uri.path(), |original| original.0.path());
            if path.starts_with("/api/") {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the signed-in account.
pub struct OptionalAccount(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAccount
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(account))
    }
}

/// Store the signed-in account in the session.
///
/// The session id is cycled first so a pre-login id cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_ACCOUNT, account)
        .await
}

/// Remove the signed-in account from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_account(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;

    async fn whoami(RequireAccount(account): RequireAccount) -> String {
        account.username
    }

    fn app() -> Router {
        Router::new()
            .route("/me", get(whoami))
            .nest("/api", Router::new().route("/me", get(whoami)))
    }

    #[tokio::test]
    async fn test_nested_api_route_without_account_is_unauthorized() {
        let response = app()
            .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], NOT_LOGGED_IN.as_bytes());
    }

    #[tokio::test]
    async fn test_page_route_without_account_redirects_to_login() {
        let response = app()
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }
}
