use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The privilege levels known to the CMS, declared from lowest to highest.
/// Serialized in kebab-case (`"viewer"`, `"editor"`, `"admin"`, `"super-admin"`),
/// which is also the form accepted in the `x-actor-role` header.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    SuperAdmin,
}

/// The static rank table. Index order is rank order.
const HIERARCHY: [Role; 4] = [Role::Viewer, Role::Editor, Role::Admin, Role::SuperAdmin];

impl Role {
    /// Every role, lowest rank first.
    pub const ALL: [Role; 4] = HIERARCHY;

    /// rank
    ///
    /// Position of the role in the hierarchy. All "at least this privileged"
    /// comparisons go through this number.
    pub fn rank(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Editor => 1,
            Role::Admin => 2,
            Role::SuperAdmin => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UnknownRole
///
/// Returned when a string does not name one of the four roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HIERARCHY
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// AuthzError
///
/// The deny half of an authorization decision. `Unauthenticated` means no identity
/// was presented at all; `Forbidden` means an identity was presented but is not in
/// the allowed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Role '{actor}' is not authorized. Required: {}", join_roles(.required))]
    Forbidden { actor: Role, required: Vec<Role> },
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// require_role
///
/// The single authorization gate. Every mutating or status-sensitive read calls this
/// before it touches the page collection.
///
/// Membership is checked against an explicit set rather than a minimum rank, so an
/// action can admit a set that is not a contiguous slice of the hierarchy.
pub fn require_role(actor: Option<Role>, allowed: &[Role]) -> Result<(), AuthzError> {
    let actor = actor.ok_or(AuthzError::Unauthenticated)?;
    if allowed.contains(&actor) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            actor,
            required: allowed.to_vec(),
        })
    }
}

/// True iff `actor` ranks at or above `min`.
pub fn has_min_role(actor: Role, min: Role) -> bool {
    actor.rank() >= min.rank()
}

/// roles_at_or_above
///
/// Every role whose rank is at least that of `min`, lowest first. Used to build the
/// allowed set for "this privilege level or higher" rules.
pub fn roles_at_or_above(min: Role) -> Vec<Role> {
    HIERARCHY
        .into_iter()
        .filter(|role| has_min_role(*role, min))
        .collect()
}
