//! Endpoints for opening and closing a session.
//!
//! The identity provider signs the user in on the client. The client then
//! hands the resulting owner ID to the server, which keeps it in an encrypted
//! cookie so later requests can be attributed to that owner.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::PrivateCookieJar;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::cookie::{invalidate_owner_cookie, set_owner_cookie},
    record::OwnerId,
};

/// The state needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// How long a session lasts.
    pub cookie_duration: Duration,
    /// Whether the owner cookie is marked `Secure`.
    pub secure_cookies: bool,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_duration: state.cookie_duration,
            secure_cookies: state.secure_cookies,
        }
    }
}

/// The body of a request to open a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    /// The ID the identity provider gave the signed in user.
    pub owner_id: String,
}

/// A route handler that remembers the caller's owner ID in a cookie.
///
/// # Errors
/// Returns [Error::EmptyOwnerId] if the owner ID is blank.
pub async fn create_session_endpoint(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
    payload: Result<Json<NewSession>, JsonRejection>,
) -> Result<(StatusCode, PrivateCookieJar), Error> {
    let Json(session) = payload?;
    let owner_id = session.owner_id.trim();

    if owner_id.is_empty() {
        return Err(Error::EmptyOwnerId);
    }

    tracing::debug!("Opening session for {owner_id}");
    let jar = set_owner_cookie(
        jar,
        &OwnerId::new(owner_id),
        state.cookie_duration,
        state.secure_cookies,
    );

    Ok((StatusCode::NO_CONTENT, jar))
}

/// A route handler that forgets the caller's owner ID.
pub async fn delete_session_endpoint(
    State(state): State<SessionState>,
    jar: PrivateCookieJar,
) -> (StatusCode, PrivateCookieJar) {
    (
        StatusCode::NO_CONTENT,
        invalidate_owner_cookie(jar, state.secure_cookies),
    )
}
