//! Identifies who is making a request.
//!
//! Signing in itself is done by an external identity provider. This module
//! only remembers the resulting owner ID in an encrypted cookie and turns that
//! cookie back into a [Principal] on each request.

mod cookie;
mod principal;
mod session;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use principal::Principal;
pub use session::{NewSession, SessionState, create_session_endpoint, delete_session_endpoint};

#[cfg(test)]
pub(crate) use cookie::{COOKIE_OWNER_ID, set_owner_cookie};
