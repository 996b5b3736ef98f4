//! Typed client for the subscription-management panel.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::upstream::models::{Device, UpstreamUser};
use crate::upstream::normalize;

/// The three panel operations the gateway consumes. Pluggable so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Look up a panel user by the external (telegram) id. Upstream 404 is
    /// `None`; any other non-2xx propagates as an upstream failure.
    async fn fetch_user_by_external_id(
        &self,
        external_id: i64,
    ) -> Result<Option<UpstreamUser>, AppError>;

    async fn list_devices(&self, user_id: i64) -> Result<Vec<Device>, AppError>;

    /// Delete one device. At-least-once semantics: callers must re-fetch
    /// the device list afterwards instead of trusting local state.
    async fn delete_device(&self, user_id: i64, hwid: &str) -> Result<(), AppError>;
}

/// reqwest-backed implementation talking to one panel base URL with a
/// bearer token. Every call is bounded by the configured request timeout.
pub struct HttpSubscriptionApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpSubscriptionApi {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build upstream client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.upstream_base_url.clone(),
            token: config.upstream_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        req.bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport_err)
    }
}

fn map_transport_err(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::upstream_unavailable("request timed out".to_string())
    } else {
        AppError::upstream_unavailable(e.to_string())
    }
}

/// Turn a non-2xx response into an upstream error carrying the status and
/// a truncated body excerpt for the logs.
async fn status_error(resp: reqwest::Response) -> AppError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    AppError::upstream(status, body_excerpt(body))
}

/// Bound the logged body excerpt. Walks back to a char boundary so a
/// multi-byte character straddling the limit never splits.
fn body_excerpt(mut body: String) -> String {
    const MAX_EXCERPT_BYTES: usize = 512;
    if body.len() > MAX_EXCERPT_BYTES {
        let mut end = MAX_EXCERPT_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

async fn json_body(resp: reqwest::Response) -> Result<Value, AppError> {
    resp.json::<Value>()
        .await
        .map_err(|e| AppError::upstream_unavailable(format!("invalid JSON body: {e}")))
}

#[async_trait]
impl SubscriptionApi for HttpSubscriptionApi {
    async fn fetch_user_by_external_id(
        &self,
        external_id: i64,
    ) -> Result<Option<UpstreamUser>, AppError> {
        let url = self.url(&format!("/api/users/by-username/{external_id}"));
        let resp = self.send(self.http.get(&url)).await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        let user = normalize::user_from_value(json_body(resp).await?)?;
        Ok(Some(user))
    }

    async fn list_devices(&self, user_id: i64) -> Result<Vec<Device>, AppError> {
        let url = self.url(&format!("/api/users/{user_id}/devices"));
        let resp = self.send(self.http.get(&url)).await?;

        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        normalize::devices_from_value(json_body(resp).await?)
    }

    async fn delete_device(&self, user_id: i64, hwid: &str) -> Result<(), AppError> {
        let url = self.url(&format!("/api/users/{user_id}/devices/{hwid}"));
        let resp = self.send(self.http.delete(&url)).await?;

        // A 404 means the device is already gone; the caller reconciles by
        // re-reading the list either way.
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(user_id, hwid, "delete target already absent upstream");
            return Ok(());
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }

        Ok(())
    }
}
