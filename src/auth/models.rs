//! Auth models.

use std::str::FromStr;

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Staff token UUID
pub type StaffTokenUuid = TypedUuid<StaffTokenRecord>;

/// A stored staff credential. Only the SHA-256 hash of the raw token is kept.
#[derive(Debug, Clone)]
pub struct StaffTokenRecord {
    pub uuid: StaffTokenUuid,
    pub username: String,
    pub role: Role,
    pub token_hash: String,
    pub created_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// A freshly issued credential. The raw token is only available here, once.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub metadata: StaffTokenRecord,
}

/// Caller role as established by authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

/// Error parsing a role from its stored text form.
#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A verified caller identity, supplied to every write operation.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub staff: StaffTokenUuid,
    pub role: Role,
}

impl Session {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
