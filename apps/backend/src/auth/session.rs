//! Session helpers over the actix-session cookie store.
//!
//! The session holds exactly one value: the verified [`SessionIdentity`].
//! Neither the login payload's `hash` nor its `auth_date` is stored; both
//! are one-shot proof of the login event, not ongoing credentials.

use actix_session::Session;

use crate::auth::models::SessionIdentity;
use crate::error::AppError;

const IDENTITY_KEY: &str = "identity";

/// Cookie name shared by the server setup and the integration tests.
pub const SESSION_COOKIE_NAME: &str = "cabinet_session";

pub fn store_identity(session: &Session, identity: &SessionIdentity) -> Result<(), AppError> {
    session
        .insert(IDENTITY_KEY, identity)
        .map_err(|e| AppError::internal(format!("failed to write session: {e}")))
}

/// Read the identity from the session; a missing, invalid, or tampered
/// cookie uniformly yields `None`.
pub fn current_identity(session: &Session) -> Option<SessionIdentity> {
    session.get::<SessionIdentity>(IDENTITY_KEY).ok().flatten()
}

/// Drop all session state. Idempotent.
pub fn clear(session: &Session) {
    session.purge();
}
