//! [`Context`]-related definitions.

use axum::{async_trait, extract::FromRequestParts};
use http::request::Parts;
use service::domain::user;

use crate::{define_error, Error};

/// Identity of the authenticated `User` performing the request.
///
/// Authentication itself happens upstream: the gateway verifies the caller
/// and propagates its identity in the `X-User-Id` header.
#[derive(Clone, Copy, Debug)]
pub struct Context {
    /// ID of the authenticated `User`.
    pub user_id: user::Id,
}

define_error! {
    enum AuthError {
        #[code = "UNAUTHENTICATED"]
        #[status = UNAUTHORIZED]
        #[message = "`X-User-Id` header is missing or malformed"]
        Unauthenticated,
    }
}

#[async_trait]
impl<S: Sync> FromRequestParts<S> for Context {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .map(|user_id| Self { user_id })
            .ok_or_else(|| AuthError::Unauthenticated.into())
    }
}
