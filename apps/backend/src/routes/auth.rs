use actix_session::Session;
use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::models::{LoginPayload, SessionIdentity};
use crate::auth::session;
use crate::auth::signature::verify_login_signature;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

/// Handle the Telegram login-widget callback: verify the payload signature
/// and freshness, then issue a session. Failed verification is logged as a
/// potential tampering attempt.
async fn telegram_callback(
    payload: web::Json<LoginPayload>,
    http_session: Session,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();

    if !verify_login_signature(&payload, &app_state.security.bot_token) {
        warn!(
            telegram_id = payload.id,
            "login callback failed signature verification"
        );
        return Err(AppError::invalid_signature());
    }

    let age = OffsetDateTime::now_utc().unix_timestamp() - payload.auth_date;
    if age > app_state.security.auth_max_age.as_secs() as i64 {
        warn!(telegram_id = payload.id, age, "login callback auth_date too old");
        return Err(AppError::invalid_signature());
    }

    // Fresh cookie on every login; only the identity claims are stored,
    // never the hash or auth_date.
    http_session.renew();
    session::store_identity(&http_session, &SessionIdentity::from(&payload))?;

    info!(telegram_id = payload.id, "login verified");
    Ok(HttpResponse::Ok().json(OkResponse { ok: true }))
}

/// Clear the session. Idempotent; succeeds with or without a session.
async fn logout(http_session: Session) -> Result<HttpResponse, AppError> {
    session::clear(&http_session);
    Ok(HttpResponse::Ok().json(OkResponse { ok: true }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/auth/telegram/callback").route(web::post().to(telegram_callback)),
    )
    .service(web::resource("/api/auth/logout").route(web::post().to(logout)));
}
