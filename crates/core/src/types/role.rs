//! User roles and the permission tiers they map to.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
///
/// The role determines the action/field permission matrix applied by the
/// server's authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access: enquiry triage, assignment, deletion, user management.
    Admin,
    /// May update the status of enquiries assigned to them.
    Staff,
    /// Authenticated read-only access to the dashboard.
    User,
}

impl Role {
    /// Whether accounts with this role may hold enquiry assignments.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::Admin | Self::Staff)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Staff => write!(f, "staff"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
