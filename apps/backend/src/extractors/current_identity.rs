use actix_session::SessionExt;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::models::SessionIdentity;
use crate::auth::session;
use crate::error::AppError;

/// Verified identity extracted from the session cookie.
///
/// Handlers taking this parameter are authenticated by construction: a
/// missing or tampered cookie fails extraction with 401 before the handler
/// body runs. Entitlement (403-class) checks stay in the profile service.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub SessionIdentity);

impl CurrentIdentity {
    pub fn telegram_id(&self) -> i64 {
        self.0.telegram_id
    }
}

impl FromRequest for CurrentIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = session::current_identity(&req.get_session())
            .map(CurrentIdentity)
            .ok_or_else(AppError::unauthorized);
        ready(result)
    }
}
