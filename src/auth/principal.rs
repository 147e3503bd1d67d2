use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{auth::cookie::get_owner_from_cookie, record::OwnerId};

/// Who is making a request.
///
/// Handlers can take a `Principal` argument to get the caller. A request
/// without a valid owner cookie is [Principal::Anonymous] rather than an
/// error, records made while signed out belong to [OwnerId::ANONYMOUS].
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    /// A caller whose identity was confirmed by the identity provider.
    Authenticated(OwnerId),
    /// A caller that has not signed in.
    Anonymous,
}

impl Principal {
    /// The owner ID to read and write records as.
    pub fn owner_id(&self) -> OwnerId {
        match self {
            Principal::Authenticated(owner_id) => owner_id.clone(),
            Principal::Anonymous => OwnerId::anonymous(),
        }
    }

    /// Whether the caller has signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }
}

impl From<Option<OwnerId>> for Principal {
    fn from(owner_id: Option<OwnerId>) -> Self {
        match owner_id {
            Some(owner_id) => Principal::Authenticated(owner_id),
            None => Principal::Anonymous,
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;

        Ok(get_owner_from_cookie(&jar).into())
    }
}
