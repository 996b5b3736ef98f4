//! Canonical shapes the upstream panel responses are normalized into.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Subscription status as reported by the panel. Anything other than
/// `ACTIVE` (compared case-insensitively) denies access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Other(String),
}

impl SubscriptionStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("ACTIVE") => Self::Active,
            Some(s) => Self::Other(s.to_ascii_uppercase()),
            None => Self::Other(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Other(s) => s,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl Serialize for SubscriptionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One panel user record, already normalized: wrapper keys unwrapped and
/// field-name casing resolved by `upstream::normalize`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamUser {
    /// Panel-internal id used by the device routes.
    pub id: i64,
    pub username: Option<String>,
    pub status: SubscriptionStatus,
    pub sub_revoked_at: Option<String>,
    pub expire_at: Option<String>,
    pub traffic_limit_bytes: Option<i64>,
    pub traffic_used_bytes: Option<i64>,
    pub hwid_device_limit: Option<i64>,
    pub short_uuid: Option<String>,
    pub subscription_url: Option<String>,
    pub external_squad_uuid: Option<String>,
    pub active_internal_squads: Vec<Value>,
}

/// A hardware device registered upstream. Only `hwid` is interpreted;
/// everything else passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub hwid: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}
