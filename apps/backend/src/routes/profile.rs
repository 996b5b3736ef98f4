use actix_web::{web, HttpResponse, Result};
use time::OffsetDateTime;

use crate::cache::payments;
use crate::error::AppError;
use crate::extractors::CurrentIdentity;
use crate::services::profile::{assemble_profile, require_entitled_user};
use crate::state::app_state::AppState;

/// `GET /api/me`: session → upstream fetch → entitlement gate → assembled
/// profile. Upstream calls run sequentially; a failure anywhere aborts the
/// whole request rather than returning a partial profile.
async fn me(
    identity: CurrentIdentity,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = require_entitled_user(&app_state, identity.telegram_id()).await?;

    let payment_rows = match &app_state.cache {
        Some(db) => payments::recent_for(db, identity.telegram_id()).await?,
        None => Vec::new(),
    };

    let view = assemble_profile(
        &identity.0,
        &user,
        payment_rows,
        &app_state.profile,
        OffsetDateTime::now_utc(),
    );
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/me").route(web::get().to(me)));
}
