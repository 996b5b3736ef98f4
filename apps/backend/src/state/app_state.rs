use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::ProfileConfig;
use crate::state::security_config::SecurityConfig;
use crate::upstream::client::SubscriptionApi;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    /// Panel client; pluggable so tests can script upstream behavior.
    pub upstream: Arc<dyn SubscriptionApi>,
    /// Optional read replica of the bot database.
    pub cache: Option<DatabaseConnection>,
    pub profile: ProfileConfig,
}

impl AppState {
    pub fn new(
        security: SecurityConfig,
        upstream: Arc<dyn SubscriptionApi>,
        cache: Option<DatabaseConnection>,
        profile: ProfileConfig,
    ) -> Self {
        Self {
            security,
            upstream,
            cache,
            profile,
        }
    }

    /// State without a local cache, the common deployment shape.
    pub fn without_cache(
        security: SecurityConfig,
        upstream: Arc<dyn SubscriptionApi>,
        profile: ProfileConfig,
    ) -> Self {
        Self::new(security, upstream, None, profile)
    }
}
