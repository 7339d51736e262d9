//! Three Words - describe someone in three words.
//!
//! This binary serves the public site and JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` for profiles, submissions, accounts and sessions
//! - Optional Google OAuth sign-in

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use threewords_web::config::ThreeWordsConfig;
use threewords_web::routes::{self, ApiThrottle};
use threewords_web::services::rate_limit::SubmissionLimiter;
use threewords_web::state::AppState;
use threewords_web::{db, middleware};

/// How often idle limiter entries are pruned.
const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Start Sentry when a DSN is configured. The guard flushes on drop.
fn init_sentry(config: &ThreeWordsConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the subscriber: `RUST_LOG` filter, stdout formatting, Sentry.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "threewords_web=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Periodically drop limiter entries whose window has passed.
fn spawn_limiter_pruning(limiter: Arc<dyn SubmissionLimiter>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.prune();
        }
    });
}

#[tokio::main]
async fn main() {
    let config = ThreeWordsConfig::from_env().expect("Failed to load configuration");

    // Sentry first so the tracing layer has a client to report to
    let _sentry_guard = init_sentry(&config);

    init_tracing();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // Schema is applied by `threewords-cli migrate`, never on startup

    if config.google.is_none() {
        tracing::info!(
            callback_url = %config.google_callback_url(),
            "Google OAuth credentials not configured; sign-in is disabled. \
             Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET and register this callback URL to enable it"
        );
    }

    let state = AppState::new(config.clone(), pool.clone());

    spawn_limiter_pruning(state.limiter_handle());

    let session_layer = middleware::create_session_layer(&pool, &config);

    let app = routes::app(state, ApiThrottle::Enabled)
        .layer(session_layer)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .expect("Failed to bind to address");
    tracing::info!(
        addr = %config.socket_addr(),
        base_url = %config.base_url,
        "threewords-web listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down, draining in-flight requests");
}
