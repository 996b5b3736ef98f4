//! Shared fixtures for the integration suites: a scripted upstream, an app
//! builder wired like production (session middleware + real routes), and
//! login helpers that mint valid widget payloads.

use std::sync::Arc;

use actix_http::Request;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use async_trait::async_trait;
use cabinet_backend::config::{PlanMap, ProfileConfig};
use cabinet_backend::routes;
use cabinet_backend::state::app_state::AppState;
use cabinet_backend::state::security_config::SecurityConfig;
use cabinet_backend::upstream::client::SubscriptionApi;
use cabinet_backend::upstream::models::{Device, SubscriptionStatus, UpstreamUser};
use cabinet_backend::{login_signature, AppError, LoginPayload, SESSION_COOKIE_NAME};
use parking_lot::Mutex;
use time::OffsetDateTime;

pub const BOT_TOKEN: &str = "123456:integration-test-bot-token";
pub const SESSION_SECRET: &str = "an-integration-test-secret-of-sufficient-length";

pub const LTE_SQUAD: &str = "squad-paid-lte";
pub const WIFI_SQUAD: &str = "squad-paid-wifi";

/// Scripted stand-in for the panel API.
pub struct MockUpstream {
    user: Mutex<Option<UpstreamUser>>,
    devices: Mutex<Vec<Device>>,
    fail_status: Mutex<Option<u16>>,
}

impl MockUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(None),
            devices: Mutex::new(Vec::new()),
            fail_status: Mutex::new(None),
        })
    }

    pub fn set_user(&self, user: Option<UpstreamUser>) {
        *self.user.lock() = user;
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock() = devices;
    }

    /// Make every user fetch fail with the given upstream status.
    pub fn fail_with_status(&self, status: u16) {
        *self.fail_status.lock() = Some(status);
    }
}

#[async_trait]
impl SubscriptionApi for MockUpstream {
    async fn fetch_user_by_external_id(
        &self,
        _external_id: i64,
    ) -> Result<Option<UpstreamUser>, AppError> {
        if let Some(status) = *self.fail_status.lock() {
            return Err(AppError::upstream(status, "scripted failure".to_string()));
        }
        Ok(self.user.lock().clone())
    }

    async fn list_devices(&self, _user_id: i64) -> Result<Vec<Device>, AppError> {
        Ok(self.devices.lock().clone())
    }

    async fn delete_device(&self, _user_id: i64, hwid: &str) -> Result<(), AppError> {
        self.devices.lock().retain(|d| d.hwid != hwid);
        Ok(())
    }
}

pub fn device(hwid: &str) -> Device {
    Device {
        hwid: hwid.to_string(),
        metadata: serde_json::Map::new(),
    }
}

/// An entitled panel user; tests tweak fields as needed.
pub fn active_user() -> UpstreamUser {
    UpstreamUser {
        id: 7,
        username: Some("42".to_string()),
        status: SubscriptionStatus::Active,
        sub_revoked_at: None,
        expire_at: Some("2030-01-01T00:00:00Z".to_string()),
        traffic_limit_bytes: Some(100_000),
        traffic_used_bytes: Some(5_000),
        hwid_device_limit: Some(3),
        short_uuid: Some("abc123".to_string()),
        subscription_url: None,
        external_squad_uuid: Some(LTE_SQUAD.to_string()),
        active_internal_squads: vec![],
    }
}

fn test_profile() -> ProfileConfig {
    ProfileConfig {
        plans: PlanMap::parse(&format!("{LTE_SQUAD}=lte,{WIFI_SQUAD}=wifi")).unwrap(),
        subscription_base_url: Some("https://sub.example".to_string()),
    }
}

pub fn test_state(upstream: Arc<dyn SubscriptionApi>) -> AppState {
    AppState::without_cache(SecurityConfig::for_tests(BOT_TOKEN), upstream, test_profile())
}

/// Like [`test_state`], but backed by a local payments database.
pub fn test_state_with_cache(
    upstream: Arc<dyn SubscriptionApi>,
    cache: sea_orm::DatabaseConnection,
) -> AppState {
    AppState::new(
        SecurityConfig::for_tests(BOT_TOKEN),
        upstream,
        Some(cache),
        test_profile(),
    )
}

/// Build a test service with the production routes and session middleware.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let key = Key::derive_from(SESSION_SECRET.as_bytes());
    test::init_service(
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key)
                    .cookie_name(SESSION_COOKIE_NAME.to_string())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

/// A callback payload the widget could have produced just now.
pub fn signed_login_payload(telegram_id: i64) -> LoginPayload {
    let mut payload = LoginPayload {
        id: telegram_id,
        username: Some("alice".to_string()),
        first_name: Some("Alice".to_string()),
        last_name: None,
        photo_url: None,
        auth_date: OffsetDateTime::now_utc().unix_timestamp(),
        hash: String::new(),
    };
    payload.hash = login_signature(&payload, BOT_TOKEN);
    payload
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .expect("response should carry the session cookie")
        .into_owned()
}

/// Run the callback flow and return the issued session cookie.
pub async fn login<S, B>(app: &S, telegram_id: i64) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/telegram/callback")
        .set_json(signed_login_payload(telegram_id))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status().as_u16(), 200, "login callback should succeed");
    session_cookie(&resp)
}
