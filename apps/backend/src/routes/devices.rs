use actix_web::{web, HttpResponse, Result};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::extractors::CurrentIdentity;
use crate::services::profile::require_entitled_user;
use crate::state::app_state::AppState;
use crate::upstream::models::Device;

#[derive(Debug, Serialize)]
struct DevicesResponse {
    devices: Vec<Device>,
}

async fn list_devices(
    identity: CurrentIdentity,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = require_entitled_user(&app_state, identity.telegram_id()).await?;
    let devices = app_state.upstream.list_devices(user.id).await?;
    Ok(HttpResponse::Ok().json(DevicesResponse { devices }))
}

/// Delete one device upstream, then re-read the list. Upstream is the sole
/// source of truth and the delete is at-least-once, so the response is
/// always a fresh read rather than local bookkeeping.
async fn delete_device(
    identity: CurrentIdentity,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let hwid = path.into_inner();
    let user = require_entitled_user(&app_state, identity.telegram_id()).await?;

    app_state.upstream.delete_device(user.id, &hwid).await?;
    info!(telegram_id = identity.telegram_id(), hwid = %hwid, "device deleted");

    let devices = app_state.upstream.list_devices(user.id).await?;
    Ok(HttpResponse::Ok().json(DevicesResponse { devices }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/devices").route(web::get().to(list_devices)))
        .service(web::resource("/api/devices/{hwid}").route(web::delete().to(delete_device)));
}
