//! Sign-in route handlers.
//!
//! Handles the OAuth flow with the configured identity provider:
//! - Login: Redirects to the provider's authorization page
//! - Callback: Validates state, exchanges the code and signs the account in
//! - Logout: Clears the account from the session

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use rand::{Rng, distr::Alphanumeric};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    OptionalAccount, RequireAccount, clear_current_account, set_current_account,
};
use crate::models::{CurrentAccount, session_keys};
use crate::services::identity::{AccountService, IdentityError};
use crate::state::AppState;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub account: Option<CurrentAccount>,
    pub sign_in_enabled: bool,
    pub error: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Human-readable message for a login error code.
fn login_error_message(code: &str) -> &'static str {
    match code {
        "denied" => "Sign-in was cancelled.",
        "invalid_state" | "missing_state" => "Your sign-in session expired. Please try again.",
        "unavailable" => "Sign-in is not available right now.",
        _ => "Sign-in failed. Please try again.",
    }
}

/// Display the login page.
///
/// # Route
///
/// `GET /login`
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAccount(account): OptionalAccount,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        account,
        sign_in_enabled: state.identity().is_some(),
        error: query
            .error
            .as_deref()
            .map(|code| login_error_message(code).to_string()),
    }
}

/// Start sign-in with Google.
///
/// # Route
///
/// `GET /api/auth/google`
pub async fn google_login(State(state): State<AppState>, session: Session) -> Result<Response> {
    let provider = state.identity().ok_or(IdentityError::NotConfigured)?;

    let oauth_state = generate_random_string(32);
    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Ok(Redirect::to("/login?error=session").into_response());
    }

    let auth_url = provider.authorization_url(&state.config().google_callback_url(), &oauth_state);
    Ok(Redirect::to(&auth_url).into_response())
}

/// Handle the Google OAuth callback.
///
/// # Route
///
/// `GET /api/auth/google/callback`
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(provider) = state.identity() else {
        return Redirect::to("/login?error=unavailable").into_response();
    };

    if let Some(error) = query.error {
        tracing::warn!("OAuth error from provider: {}", error);
        return Redirect::to("/login?error=denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/login?error=missing_code").into_response();
    };

    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/login?error=invalid_state").into_response();
    }

    let identity = match provider
        .exchange_code(&code, &state.config().google_callback_url())
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/login?error=token_exchange").into_response();
        }
    };

    let account = match AccountService::new(state.accounts()).sign_in(identity).await {
        Ok(account) => account,
        Err(e) => {
            tracing::error!("Failed to sign in account: {}", e);
            return Redirect::to("/login?error=account").into_response();
        }
    };

    if let Err(e) = set_current_account(&session, &CurrentAccount::from(&account)).await {
        tracing::error!("Failed to store account in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    set_sentry_user(&account.id, &account.username);
    tracing::info!(account_id = %account.id, "Account signed in");

    Redirect::to("/").into_response()
}

/// The signed-in account.
///
/// # Route
///
/// `GET /api/user`
pub async fn current_user(RequireAccount(account): RequireAccount) -> Json<CurrentAccount> {
    Json(account)
}

/// Sign out.
///
/// # Route
///
/// `POST /api/logout`
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_account(&session).await {
        tracing::error!("Failed to clear session: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Logout failed").into_response();
    }

    clear_sentry_user();
    Json(json!({ "message": "Logout successful" })).into_response()
}

/// Logout from the HTML navigation.
///
/// # Route
///
/// `POST /logout`
pub async fn logout_page(session: Session) -> Response {
    if let Err(e) = clear_current_account(&session).await {
        return AppError::Internal(format!("failed to clear session: {e}")).into_response();
    }

    clear_sentry_user();
    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_charset() {
        let value = generate_random_string(32);
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("denied"), "Sign-in was cancelled.");
        assert_eq!(
            login_error_message("anything"),
            "Sign-in failed. Please try again."
        );
    }
}
