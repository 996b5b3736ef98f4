//! Verification of the Telegram login-widget signature.
//!
//! The widget signs a canonical `key=value` string (keys sorted, newline
//! separated, absent fields excluded) with HMAC-SHA-256, keyed by the raw
//! SHA-256 digest of the bot token. The comparison must be constant-time:
//! this is the only thing standing between an attacker-forged identity and
//! a session cookie.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::auth::models::LoginPayload;

type HmacSha256 = Hmac<Sha256>;

/// Canonical data-check string for a login payload, excluding `hash`.
///
/// Empty strings are excluded the same way absent fields are; the widget
/// never emits empty values, so treating them as absent keeps both sides
/// building the same string.
fn canonical_string(payload: &LoginPayload) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("auth_date", payload.auth_date.to_string()),
        ("id", payload.id.to_string()),
    ];

    let optional = [
        ("first_name", payload.first_name.as_deref()),
        ("last_name", payload.last_name.as_deref()),
        ("photo_url", payload.photo_url.as_deref()),
        ("username", payload.username.as_deref()),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            if !value.is_empty() {
                fields.push((key, value.to_string()));
            }
        }
    }

    fields.sort_by_key(|(key, _)| *key);
    fields
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn mac_for(payload: &LoginPayload, bot_token: &str) -> HmacSha256 {
    let secret_key = Sha256::digest(bot_token.as_bytes());
    let mut mac =
        HmacSha256::new_from_slice(&secret_key).expect("HMAC accepts keys of any length");
    mac.update(canonical_string(payload).as_bytes());
    mac
}

/// Hex signature the widget would produce for `payload` under `bot_token`.
/// Exposed so tests and tooling can mint valid callback payloads.
pub fn login_signature(payload: &LoginPayload, bot_token: &str) -> String {
    hex::encode(mac_for(payload, bot_token).finalize().into_bytes())
}

/// Returns true only if `payload.hash` is the correct widget signature.
/// Never errors; malformed hex is just a failed verification.
pub fn verify_login_signature(payload: &LoginPayload, bot_token: &str) -> bool {
    let supplied = match hex::decode(&payload.hash) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    mac_for(payload, bot_token).verify_slice(&supplied).is_ok()
}
