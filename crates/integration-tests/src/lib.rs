//! Integration test harness for Three Words.
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`,
//! backed by the in-memory store and an in-memory session store. No
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p threewords-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use threewords_web::config::{SubmissionLimitConfig, ThreeWordsConfig};
use threewords_web::db::MemoryStore;
use threewords_web::middleware::{SESSION_COOKIE_NAME, session_layer_for};
use threewords_web::routes::{self, ApiThrottle};
use threewords_web::services::identity::IdentityProvider;
use threewords_web::state::{AppState, AppStateBuilder};

/// Public URL used in test configuration.
pub const BASE_URL: &str = "http://threewords.test";

/// Response bodies are small; anything larger is a bug.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for tests. Nothing here touches the environment.
#[must_use]
pub fn test_config() -> ThreeWordsConfig {
    ThreeWordsConfig {
        database_url: SecretString::from("postgres://unused@localhost/unused"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: BASE_URL.to_string(),
        google: None,
        submission_limit: SubmissionLimitConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// The application wired to in-memory storage, with a cookie jar holding
/// the session cookie across requests.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    session_cookie: Mutex<Option<String>>,
}

impl TestApp {
    /// Default application: no sign-in provider, default submission limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Application with sign-in through `provider`.
    #[must_use]
    pub fn with_identity(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with(|builder| builder.identity(provider))
    }

    /// Customize the state before the router is built.
    #[must_use]
    pub fn with(customize: impl FnOnce(AppStateBuilder) -> AppStateBuilder) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let state: AppState =
            customize(AppState::builder(config.clone()).memory_store(Arc::clone(&store))).build();

        let router = routes::app(state, ApiThrottle::Disabled).layer(session_layer_for(
            tower_sessions::MemoryStore::default(),
            &config,
        ));

        Self {
            router,
            store,
            session_cookie: Mutex::new(None),
        }
    }

    /// Send a request, attaching and capturing the session cookie.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        let cookie = self.session_cookie.lock().unwrap().clone();
        if let Some(cookie) = cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let Some(pair) = value.split(';').next() else {
                continue;
            };
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                *self.session_cookie.lock().unwrap() = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> TestResponse {
        self.post_json_from(uri, body, None).await
    }

    /// POST JSON, optionally as if forwarded for `client`.
    pub async fn post_json_from(
        &self,
        uri: &str,
        body: &Value,
        client: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(client) = client {
            builder = builder.header("x-forwarded-for", client);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// POST a URL-encoded form.
    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Claim `username` through the API and assert success.
    pub async fn claim(&self, username: &str) -> Value {
        let response = self
            .post_json("/api/profiles", &serde_json::json!({ "username": username }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.json()
    }

    /// Submit three words about `username` through the API.
    pub async fn submit(&self, username: &str, words: [&str; 3]) -> TestResponse {
        let [word1, word2, word3] = words;
        self.post_json(
            &format!("/api/users/{username}/words"),
            &serde_json::json!({ "word1": word1, "word2": word2, "word3": word3 }),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
