//! Environment-backed configuration for the gateway.
//!
//! Everything the process needs is read once at startup into [`AppConfig`];
//! handlers never touch the environment directly.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Squad-uuid to plan-tag mapping, supplied via `PLAN_SQUAD_MAP` as
/// comma-separated `<uuid>=<plan>` pairs.
#[derive(Debug, Clone, Default)]
pub struct PlanMap {
    entries: HashMap<String, String>,
}

impl PlanMap {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut entries = HashMap::new();
        for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (squad, plan) = pair.split_once('=').ok_or_else(|| {
                AppError::config(format!(
                    "PLAN_SQUAD_MAP entry '{pair}' is not of the form <uuid>=<plan>"
                ))
            })?;
            let squad = squad.trim();
            let plan = plan.trim();
            if squad.is_empty() || plan.is_empty() {
                return Err(AppError::config(format!(
                    "PLAN_SQUAD_MAP entry '{pair}' has an empty side"
                )));
            }
            entries.insert(squad.to_string(), plan.to_string());
        }
        Ok(Self { entries })
    }

    pub fn plan_for(&self, squad_uuid: &str) -> Option<&str> {
        self.entries.get(squad_uuid).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Settings consumed by the profile assembler.
#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    pub plans: PlanMap,
    pub subscription_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upstream_base_url: String,
    pub upstream_token: String,
    pub upstream_timeout: Duration,
    pub bot_token: String,
    pub session_secret: String,
    pub allowed_origins: Vec<String>,
    pub cookie_secure: bool,
    pub auth_max_age: Duration,
    pub profile: ProfileConfig,
    pub local_db_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("BACKEND_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()
            .map_err(|_| AppError::config("BACKEND_PORT must be a valid port number".to_string()))?;

        let upstream_base_url = must_var("UPSTREAM_BASE_URL")?;
        let upstream_token = must_var("UPSTREAM_TOKEN")?;
        let bot_token = must_var("TELEGRAM_BOT_TOKEN")?;
        let session_secret = must_var("SESSION_SECRET")?;
        // Cookie-key derivation needs at least 256 bits of input.
        if session_secret.len() < 32 {
            return Err(AppError::config(
                "SESSION_SECRET must be at least 32 bytes".to_string(),
            ));
        }

        let upstream_timeout = Duration::from_secs(parse_secs("UPSTREAM_TIMEOUT_SECS", 20)?);
        let auth_max_age = Duration::from_secs(parse_secs("AUTH_MAX_AGE_SECS", 86_400)?);

        let allowed_origins = parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default());

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let plans = match env::var("PLAN_SQUAD_MAP") {
            Ok(raw) => PlanMap::parse(&raw)?,
            Err(_) => PlanMap::default(),
        };

        let subscription_base_url = env::var("SUBSCRIPTION_BASE_URL")
            .ok()
            .map(|s| s.trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let local_db_path = env::var("LOCAL_DB_PATH").ok().filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            upstream_base_url: upstream_base_url.trim_end_matches('/').to_string(),
            upstream_token,
            upstream_timeout,
            bot_token,
            session_secret,
            allowed_origins,
            cookie_secure,
            auth_max_age,
            profile: ProfileConfig {
                plans,
                subscription_base_url,
            },
            local_db_path,
        })
    }
}

/// Parse and lightly validate allowed origins; empty input falls back to the
/// local dev front end.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec!["http://localhost:5173".to_string()]
    } else {
        origins
    }
}

fn parse_secs(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|_| AppError::config(format!("{name} must be a whole number of seconds"))),
        Err(_) => Ok(default),
    }
}

/// Get required environment variable or return error
fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::config(format!("Missing required env var: {name}")))
}
