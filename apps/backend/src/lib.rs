#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod upstream;

// Re-exports for public API
pub use auth::models::{LoginPayload, SessionIdentity};
pub use auth::session::SESSION_COOKIE_NAME;
pub use auth::signature::{login_signature, verify_login_signature};
pub use config::{AppConfig, PlanMap, ProfileConfig};
pub use error::AppError;
pub use extractors::CurrentIdentity;
pub use middleware::cors::cors_middleware;
pub use middleware::request_trace::RequestTrace;
pub use services::profile::ProfileView;
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;
pub use upstream::client::{HttpSubscriptionApi, SubscriptionApi};
