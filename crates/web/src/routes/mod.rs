//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database ping)
//!
//! # Pages
//! GET  /                                - Home page with claim form
//! GET  /claim/check?username=           - Availability result on the home page
//! POST /claim                           - Claim a username
//! GET  /u/{username}                    - Profile: cloud, recent words, form
//! POST /u/{username}/words              - Submit three words (form)
//! GET  /login                           - Sign-in page
//! POST /logout                          - Sign out (form)
//!
//! # JSON API
//! GET  /api/check-username/{username}   - Availability
//! POST /api/profiles                    - Claim
//! GET  /api/users/{username}            - Profile
//! GET  /api/users/{username}/words      - Submissions, newest first
//! POST /api/users/{username}/words      - Submit three words
//! GET  /api/users/{username}/cloud      - Ranked word cloud
//! GET  /api/auth/google                 - Start Google sign-in
//! GET  /api/auth/google/callback        - Google OAuth callback
//! GET  /api/user                        - Signed-in account
//! POST /api/logout                      - Sign out
//! ```

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{api_rate_limiter, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Static assets directory, relative to the workspace root.
const STATIC_DIR: &str = "crates/web/static";

/// Whether `/api` gets the per-IP governor layer.
///
/// The governor needs a client address on every request, so it is only
/// enabled when serving with `ConnectInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiThrottle {
    Enabled,
    Disabled,
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/check-username/{username}", get(api::check_username))
        .route("/profiles", post(api::create_profile))
        .route("/users/{username}", get(api::get_profile))
        .route(
            "/users/{username}/words",
            get(api::list_words).post(api::submit_words),
        )
        .route("/users/{username}/cloud", get(api::word_cloud))
        .route("/auth/google", get(auth::google_login))
        .route("/auth/google/callback", get(auth::google_callback))
        .route("/user", get(auth::current_user))
        .route("/logout", post(auth::logout))
}

/// Create the page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/claim", post(pages::claim))
        .route("/claim/check", get(pages::check_availability))
        .route("/u/{username}", get(pages::profile))
        .route("/u/{username}/words", post(pages::submit_words))
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout_page))
}

/// Build the full application router.
///
/// The session layer is added by the caller, so tests can swap the store.
pub fn app(state: AppState, throttle: ApiThrottle) -> Router {
    let api = match throttle {
        ApiThrottle::Enabled => api_routes().layer(api_rate_limiter()),
        ApiThrottle::Disabled => api_routes(),
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(page_routes())
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(pages::fallback)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
