use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;

use crate::rbac::Role;

/// Header carrying the caller's role. Identity is taken as given; nothing here verifies it.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Actor
///
/// The role presented by the caller of a request, or `None` when no usable identity
/// was presented.
///
/// The extractor never rejects. Whether an absent actor is acceptable is a decision for
/// the lifecycle, which answers 401 only for the operations that are actually gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor(pub Option<Role>);

impl Actor {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn with_role(role: Role) -> Self {
        Self(Some(role))
    }

    pub fn role(self) -> Option<Role> {
        self.0
    }

    /// from_headers
    ///
    /// A missing header, a non-UTF-8 value or an unknown role name all resolve to an
    /// anonymous actor.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(raw) = headers.get(ACTOR_ROLE_HEADER) else {
            return Self::anonymous();
        };
        match raw.to_str().map(|value| value.trim().parse::<Role>()) {
            Ok(Ok(role)) => Self::with_role(role),
            Ok(Err(err)) => {
                tracing::debug!(%err, "ignoring unrecognised actor role");
                Self::anonymous()
            }
            Err(_) => {
                tracing::debug!("ignoring non-UTF-8 actor role header");
                Self::anonymous()
            }
        }
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor::from_headers(&parts.headers))
    }
}
