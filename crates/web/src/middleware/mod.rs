//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors), added in `main`
//! 2. Session layer (tower-sessions with `PostgreSQL` store), added in `main`
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers (CSP, frame and sniffing protection)
//! 6. Rate limiting (governor, `/api` routes only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAccount, RequireAccount, clear_current_account, set_current_account};
pub use rate_limit::{ClientIp, api_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer_for};
