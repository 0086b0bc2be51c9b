//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. CSP nonce (per-request nonce for inline scripts)
//! 5. Security headers (reads the nonce)
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Rate limiting on auth forms and the market API (route layers)

pub mod auth;
pub mod csp;
pub mod locale;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use locale::{Lang, set_locale};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
