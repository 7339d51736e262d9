//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ThreeWordsConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tw_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with the `PostgreSQL` store.
///
/// The `tower_sessions.session` table is created by the migrations.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ThreeWordsConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer_for(PostgresStore::new(pool.clone()), config)
}

/// Apply the cookie settings to a session layer over any store.
#[must_use]
pub fn session_layer_for<S: SessionStore + Clone>(
    store: S,
    config: &ThreeWordsConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
