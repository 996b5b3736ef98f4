//! Entitlement gating and assembly of the client-facing profile view.

use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::auth::models::SessionIdentity;
use crate::cache::payments;
use crate::config::ProfileConfig;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::upstream::models::UpstreamUser;

const SECONDS_PER_DAY: i64 = 86_400;

/// Stable response schema for `GET /api/me`. Every field serializes on
/// every response; optional values become `null`, never missing keys.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub status: String,
    pub plan: Option<String>,
    pub expire_at: Option<String>,
    pub days_left: Option<i64>,
    pub device_limit: Option<i64>,
    pub subscription_link: Option<String>,
    pub traffic_limit_bytes: Option<i64>,
    pub traffic_used_bytes: Option<i64>,
    pub internal_squads: Vec<Value>,
    pub payments: Vec<PaymentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub plan: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub paid_at: Option<String>,
}

impl From<payments::Model> for PaymentSummary {
    fn from(row: payments::Model) -> Self {
        Self {
            plan: row.plan,
            amount: row.amount,
            currency: row.currency,
            paid_at: row.paid_at,
        }
    }
}

/// Fetch the upstream record for one telegram id and apply the entitlement
/// gate: the user must exist, be ACTIVE, and not be revoked. Failures are
/// 403-class, distinct from the 401 the session extractor produces.
pub async fn require_entitled_user(
    state: &AppState,
    telegram_id: i64,
) -> Result<UpstreamUser, AppError> {
    let user = state
        .upstream
        .fetch_user_by_external_id(telegram_id)
        .await?
        .ok_or_else(AppError::subscription_not_found)?;

    if !user.status.is_active() || user.sub_revoked_at.is_some() {
        return Err(AppError::subscription_inactive());
    }

    Ok(user)
}

/// Whole days until `expire_at`, clamped at zero; `None` when absent or
/// unparseable (the raw value still echoes through `ProfileView.expire_at`).
pub fn days_left(expire_at: Option<&str>, now: OffsetDateTime) -> Option<i64> {
    let raw = expire_at?;
    let expires = match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(ts) => ts,
        Err(_) => {
            warn!(expire_at = raw, "unparseable expireAt from upstream");
            return None;
        }
    };
    let seconds = (expires - now).whole_seconds();
    Some((seconds / SECONDS_PER_DAY).max(0))
}

fn subscription_link(user: &UpstreamUser, config: &ProfileConfig) -> Option<String> {
    if let Some(url) = &user.subscription_url {
        return Some(url.clone());
    }
    match (&config.subscription_base_url, &user.short_uuid) {
        (Some(base), Some(short)) => Some(format!("{base}/{short}")),
        _ => None,
    }
}

pub fn assemble_profile(
    identity: &SessionIdentity,
    user: &UpstreamUser,
    payment_rows: Vec<payments::Model>,
    config: &ProfileConfig,
    now: OffsetDateTime,
) -> ProfileView {
    let plan = user
        .external_squad_uuid
        .as_deref()
        .and_then(|squad| config.plans.plan_for(squad))
        .map(str::to_string);

    ProfileView {
        telegram_id: identity.telegram_id,
        username: user.username.clone(),
        status: user.status.as_str().to_string(),
        plan,
        expire_at: user.expire_at.clone(),
        days_left: days_left(user.expire_at.as_deref(), now),
        device_limit: user.hwid_device_limit,
        subscription_link: subscription_link(user, config),
        traffic_limit_bytes: user.traffic_limit_bytes,
        traffic_used_bytes: user.traffic_used_bytes,
        internal_squads: user.active_internal_squads.clone(),
        payments: payment_rows.into_iter().map(PaymentSummary::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::{assemble_profile, days_left, ProfileView};
    use crate::auth::models::SessionIdentity;
    use crate::config::{PlanMap, ProfileConfig};
    use crate::upstream::models::{SubscriptionStatus, UpstreamUser};

    fn identity() -> SessionIdentity {
        SessionIdentity {
            telegram_id: 42,
            username: Some("alice".to_string()),
            first_name: None,
            last_name: None,
            photo_url: None,
        }
    }

    fn active_user() -> UpstreamUser {
        UpstreamUser {
            id: 7,
            username: Some("42".to_string()),
            status: SubscriptionStatus::Active,
            sub_revoked_at: None,
            expire_at: Some("2026-06-01T00:00:00Z".to_string()),
            traffic_limit_bytes: Some(100_000),
            traffic_used_bytes: Some(5_000),
            hwid_device_limit: Some(3),
            short_uuid: Some("abc123".to_string()),
            subscription_url: None,
            external_squad_uuid: Some("squad-lte".to_string()),
            active_internal_squads: vec![],
        }
    }

    fn config() -> ProfileConfig {
        ProfileConfig {
            plans: PlanMap::from_pairs(&[("squad-lte", "lte"), ("squad-wifi", "wifi")]),
            subscription_base_url: Some("https://sub.example".to_string()),
        }
    }

    #[test]
    fn days_left_floors_partial_days() {
        // 3 days 2 hours ahead floors to 3.
        let now = datetime!(2026-01-01 00:00:00 UTC);
        assert_eq!(
            days_left(Some("2026-01-04T02:00:00Z"), now),
            Some(3)
        );
    }

    #[test]
    fn days_left_clamps_past_dates_to_zero() {
        let now = datetime!(2026-01-10 00:00:00 UTC);
        assert_eq!(days_left(Some("2026-01-01T00:00:00Z"), now), Some(0));
    }

    #[test]
    fn days_left_absent_or_garbage_is_none() {
        let now = datetime!(2026-01-01 00:00:00 UTC);
        assert_eq!(days_left(None, now), None);
        assert_eq!(days_left(Some("not-a-date"), now), None);
    }

    #[test]
    fn plan_comes_from_the_configured_squad_map() {
        let now = datetime!(2026-01-01 00:00:00 UTC);
        let view = assemble_profile(&identity(), &active_user(), vec![], &config(), now);
        assert_eq!(view.plan.as_deref(), Some("lte"));

        let mut unmapped = active_user();
        unmapped.external_squad_uuid = Some("squad-unknown".to_string());
        let view = assemble_profile(&identity(), &unmapped, vec![], &config(), now);
        assert_eq!(view.plan, None);
    }

    #[test]
    fn subscription_link_prefers_upstream_url_then_constructs() {
        let now = datetime!(2026-01-01 00:00:00 UTC);

        let mut with_url = active_user();
        with_url.subscription_url = Some("https://panel.example/u/xyz".to_string());
        let view = assemble_profile(&identity(), &with_url, vec![], &config(), now);
        assert_eq!(
            view.subscription_link.as_deref(),
            Some("https://panel.example/u/xyz")
        );

        let view = assemble_profile(&identity(), &active_user(), vec![], &config(), now);
        assert_eq!(
            view.subscription_link.as_deref(),
            Some("https://sub.example/abc123")
        );

        let mut bare = active_user();
        bare.short_uuid = None;
        let view = assemble_profile(&identity(), &bare, vec![], &config(), now);
        assert_eq!(view.subscription_link, None);
    }

    fn assert_all_keys_present(view: &ProfileView) {
        let value = serde_json::to_value(view).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "telegram_id",
            "username",
            "status",
            "plan",
            "expire_at",
            "days_left",
            "device_limit",
            "subscription_link",
            "traffic_limit_bytes",
            "traffic_used_bytes",
            "internal_squads",
            "payments",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn schema_is_stable_across_sparse_upstream_payloads() {
        let now = datetime!(2026-01-01 00:00:00 UTC);

        // Full upstream data.
        assert_all_keys_present(&assemble_profile(
            &identity(),
            &active_user(),
            vec![],
            &config(),
            now,
        ));

        // Optional fields missing.
        let sparse = UpstreamUser {
            id: 8,
            username: None,
            status: SubscriptionStatus::Active,
            sub_revoked_at: None,
            expire_at: None,
            traffic_limit_bytes: None,
            traffic_used_bytes: None,
            hwid_device_limit: None,
            short_uuid: None,
            subscription_url: None,
            external_squad_uuid: None,
            active_internal_squads: vec![],
        };
        assert_all_keys_present(&assemble_profile(&identity(), &sparse, vec![], &config(), now));

        // Devices present but no subscription URL and no base configured.
        let mut no_link = active_user();
        no_link.subscription_url = None;
        let no_base = ProfileConfig {
            plans: PlanMap::default(),
            subscription_base_url: None,
        };
        assert_all_keys_present(&assemble_profile(&identity(), &no_link, vec![], &no_base, now));
    }
}
