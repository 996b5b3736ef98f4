use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid login signature")]
    InvalidSignature,
    #[error("Subscription not found")]
    SubscriptionNotFound,
    #[error("Subscription inactive")]
    SubscriptionInactive,
    #[error("Upstream returned status {status}")]
    Upstream { status: u16, detail: String },
    #[error("Upstream unavailable: {detail}")]
    UpstreamUnavailable { detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: &'static str, detail: String },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    /// Helper method to extract error code from any error variant
    fn code(&self) -> String {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED".to_string(),
            AppError::InvalidSignature => "INVALID_SIGNATURE".to_string(),
            AppError::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND".to_string(),
            AppError::SubscriptionInactive => "SUBSCRIPTION_INACTIVE".to_string(),
            AppError::Upstream { .. } => "UPSTREAM_ERROR".to_string(),
            AppError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE".to_string(),
            AppError::BadRequest { code, .. } => code.to_string(),
            AppError::Db { .. } => "DB_ERROR".to_string(),
            AppError::Config { .. } => "CONFIG_ERROR".to_string(),
            AppError::Internal { .. } => "INTERNAL".to_string(),
        }
    }

    /// Client-facing detail. Upstream failures carry their full detail in
    /// logs only; the response body stays generic.
    fn client_detail(&self) -> String {
        match self {
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::InvalidSignature => "Invalid login signature".to_string(),
            AppError::SubscriptionNotFound => {
                "Subscription not found, please contact support".to_string()
            }
            AppError::SubscriptionInactive => "Subscription is not active".to_string(),
            AppError::Upstream { .. } | AppError::UpstreamUnavailable { .. } => {
                "Subscription service is temporarily unavailable".to_string()
            }
            AppError::BadRequest { detail, .. } => detail.clone(),
            AppError::Db { .. } | AppError::Config { .. } | AppError::Internal { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AppError::SubscriptionNotFound => StatusCode::FORBIDDEN,
            AppError::SubscriptionInactive => StatusCode::FORBIDDEN,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Db { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn invalid_signature() -> Self {
        Self::InvalidSignature
    }

    pub fn subscription_not_found() -> Self {
        Self::SubscriptionNotFound
    }

    pub fn subscription_inactive() -> Self {
        Self::SubscriptionInactive
    }

    pub fn upstream(status: u16, detail: String) -> Self {
        Self::Upstream { status, detail }
    }

    pub fn upstream_unavailable(detail: String) -> Self {
        Self::UpstreamUnavailable { detail }
    }

    pub fn bad_request(code: &'static str, detail: String) -> Self {
        Self::BadRequest { code, detail }
    }

    pub fn db(detail: String) -> Self {
        Self::Db { detail }
    }

    pub fn config(detail: String) -> Self {
        Self::Config { detail }
    }

    pub fn internal(detail: String) -> Self {
        Self::Internal { detail }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::db(format!("db error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code();

        match self {
            AppError::Upstream { status, detail } => {
                tracing::error!(status = *status, detail = %detail, "upstream request failed");
            }
            AppError::UpstreamUnavailable { detail } => {
                tracing::error!(detail = %detail, "upstream unreachable");
            }
            AppError::Db { detail } | AppError::Config { detail } | AppError::Internal { detail } => {
                tracing::error!(detail = %detail, code = %code, "request failed");
            }
            _ => {}
        }

        let problem_details = ProblemDetails {
            type_: format!("https://cabinet.example/errors/{}", code.to_uppercase()),
            title: Self::humanize_code(&code),
            status: status.as_u16(),
            detail: self.client_detail(),
            code,
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .json(problem_details)
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use actix_web::http::StatusCode;

    #[test]
    fn auth_and_entitlement_statuses_stay_distinct() {
        assert_eq!(AppError::unauthorized().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::invalid_signature().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::subscription_not_found().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::subscription_inactive().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let err = AppError::upstream(500, "boom".to_string());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let err = AppError::upstream_unavailable("timed out".to_string());
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
