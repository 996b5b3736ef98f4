use std::time::Duration;

/// Secrets and limits for the login callback.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Bot token the widget signature key is derived from.
    pub bot_token: String,
    /// Maximum accepted age of a callback's `auth_date`.
    pub auth_max_age: Duration,
}

impl SecurityConfig {
    pub fn new(bot_token: impl Into<String>, auth_max_age: Duration) -> Self {
        Self {
            bot_token: bot_token.into(),
            auth_max_age,
        }
    }

    pub fn for_tests(bot_token: impl Into<String>) -> Self {
        Self::new(bot_token, Duration::from_secs(86_400))
    }
}
