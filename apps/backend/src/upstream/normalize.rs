//! Normalization of panel response payloads.
//!
//! The panel is inconsistent across versions: payloads arrive flat or under
//! a `response` wrapper, identifier fields switch between camelCase and
//! snake_case, and the short identifier sometimes lives under a nested
//! `user` object. Every tolerated variant is resolved here, with a fixed
//! precedence order, so the rest of the crate only ever sees
//! [`UpstreamUser`] and [`Device`].

use serde_json::Value;

use crate::error::AppError;
use crate::upstream::models::{Device, SubscriptionStatus, UpstreamUser};

/// Unwrap a single `response` envelope if present.
pub fn unwrap_response(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("response") => {
            obj.remove("response").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn str_at<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn first_str(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| str_at(obj, key))
        .map(str::to_string)
}

fn first_i64(obj: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| obj.get(*key).and_then(Value::as_i64))
}

/// Short identifier, in precedence order: `shortUuid`, `short_uuid`, then
/// the same pair nested under `user`.
pub fn short_uuid(obj: &Value) -> Option<String> {
    first_str(obj, &["shortUuid", "short_uuid"]).or_else(|| {
        obj.get("user")
            .and_then(|user| first_str(user, &["shortUuid", "short_uuid"]))
    })
}

fn used_traffic_bytes(obj: &Value) -> Option<i64> {
    let nested = obj
        .get("userTraffic")
        .or_else(|| obj.get("user_traffic"))
        .and_then(|t| first_i64(t, &["usedTrafficBytes", "used_traffic_bytes"]));
    nested.or_else(|| first_i64(obj, &["usedTrafficBytes", "used_traffic_bytes"]))
}

/// Parse one user record out of a raw panel payload.
pub fn user_from_value(raw: Value) -> Result<UpstreamUser, AppError> {
    let body = unwrap_response(raw);
    if !body.is_object() {
        return Err(AppError::upstream_unavailable(
            "malformed user payload: expected a JSON object".to_string(),
        ));
    }

    // Some panel versions serialize the id as a string.
    let id = first_i64(&body, &["id"])
        .or_else(|| str_at(&body, "id").and_then(|s| s.parse().ok()))
        .ok_or_else(|| {
            AppError::upstream_unavailable("malformed user payload: missing numeric id".to_string())
        })?;

    let status = SubscriptionStatus::from_raw(str_at(&body, "status"));

    let active_internal_squads = body
        .get("activeInternalSquads")
        .or_else(|| body.get("active_internal_squads"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    Ok(UpstreamUser {
        id,
        username: first_str(&body, &["username"]),
        status,
        sub_revoked_at: first_str(&body, &["subRevokedAt", "sub_revoked_at", "revokedAt"]),
        expire_at: first_str(&body, &["expireAt", "expire_at"]),
        traffic_limit_bytes: first_i64(&body, &["trafficLimitBytes", "traffic_limit_bytes"]),
        traffic_used_bytes: used_traffic_bytes(&body),
        hwid_device_limit: first_i64(&body, &["hwidDeviceLimit", "hwid_device_limit"]),
        short_uuid: short_uuid(&body),
        subscription_url: first_str(&body, &["subscriptionUrl", "subscription_url"]),
        external_squad_uuid: first_str(&body, &["externalSquadUuid", "external_squad_uuid"]),
        active_internal_squads,
    })
}

/// Parse a device list out of a raw panel payload. Accepts a bare array or
/// an object with a `devices` array, with or without the `response` wrapper.
pub fn devices_from_value(raw: Value) -> Result<Vec<Device>, AppError> {
    let body = unwrap_response(raw);
    let list = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("devices") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(AppError::upstream_unavailable(
                    "malformed device payload: no devices array".to_string(),
                ))
            }
        },
        _ => {
            return Err(AppError::upstream_unavailable(
                "malformed device payload: expected array or object".to_string(),
            ))
        }
    };

    list.into_iter()
        .map(|item| {
            serde_json::from_value::<Device>(item).map_err(|e| {
                AppError::upstream_unavailable(format!("malformed device entry: {e}"))
            })
        })
        .collect()
}
