use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::access::errors::AccessError;
use crate::domain::access::errors::ApiaryIdError;
use crate::domain::access::errors::ApiaryNameError;
use crate::domain::access::errors::PermissionLevelError;
use crate::domain::user::models::UserId;

/// Apiary unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiaryId(pub Uuid);

impl ApiaryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an apiary ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ApiaryIdError> {
        Uuid::parse_str(s)
            .map(ApiaryId)
            .map_err(|e| ApiaryIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ApiaryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability a user holds on an apiary.
///
/// Totally ordered: `None < Read < Write < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PermissionLevel {
    None,
    Read,
    Write,
    Admin,
}

impl PermissionLevel {
    /// Level `user_id` holds on an apiary owned by `owner_id`, given the
    /// user's active grant on it. The owner is always `Admin`.
    pub fn held_by(
        user_id: &UserId,
        owner_id: &UserId,
        active_grant: Option<PermissionLevel>,
    ) -> PermissionLevel {
        if user_id == owner_id {
            PermissionLevel::Admin
        } else {
            active_grant.unwrap_or(PermissionLevel::None)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::None => "none",
            PermissionLevel::Read => "read",
            PermissionLevel::Write => "write",
            PermissionLevel::Admin => "admin",
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = PermissionLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PermissionLevel::None),
            "read" => Ok(PermissionLevel::Read),
            "write" => Ok(PermissionLevel::Write),
            "admin" => Ok(PermissionLevel::Admin),
            other => Err(PermissionLevelError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiaryName(String);

impl ApiaryName {
    const MAX_LENGTH: usize = 100;

    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, ApiaryNameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();
        if length == 0 {
            Err(ApiaryNameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(ApiaryNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The access-controlled resource. Only its identity and owner matter here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apiary {
    pub id: ApiaryId,
    pub owner_id: UserId,
    pub name: ApiaryName,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Explicit permission given to a non-owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub user_id: UserId,
    pub apiary_id: ApiaryId,
    pub level: PermissionLevel,
    pub granted_by: UserId,
    pub granted_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Ownership and the actor's level on one apiary, read while the apiary is
/// locked so that the grant change they admit is written under the same lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantAuthority {
    pub owner_id: UserId,
    pub actor_level: PermissionLevel,
}

impl GrantAuthority {
    /// Admit a change to the grant of `target_id`.
    ///
    /// # Errors
    /// * `Forbidden` - Actor is not `Admin`
    /// * `InvalidOperation` - Target is the owner
    pub fn admit_change(&self, target_id: &UserId) -> Result<(), AccessError> {
        if self.actor_level != PermissionLevel::Admin {
            return Err(AccessError::Forbidden);
        }
        if *target_id == self.owner_id {
            return Err(AccessError::InvalidOperation(
                "the owner's access cannot be changed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command to create an apiary owned by the caller.
#[derive(Debug, Clone)]
pub struct ProvisionApiaryCommand {
    pub name: ApiaryName,
    pub location: Option<String>,
}
