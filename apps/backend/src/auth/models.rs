//! Identity types for the Telegram login widget flow.

use serde::{Deserialize, Serialize};

/// Callback payload posted by the front end after the login widget completes.
///
/// `hash` is the widget's HMAC over the remaining fields and is only ever
/// used as one-shot proof of the login event; it is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
    pub auth_date: i64,
    pub hash: String,
}

/// Identity claims kept in the session cookie after a verified login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionIdentity {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
}

impl From<&LoginPayload> for SessionIdentity {
    fn from(payload: &LoginPayload) -> Self {
        Self {
            telegram_id: payload.id,
            username: payload.username.clone(),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            photo_url: payload.photo_url.clone(),
        }
    }
}
