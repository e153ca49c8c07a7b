//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use enquiry_desk_core::{Email, Role, UserId};

/// A user account (domain type).
///
/// The password hash is deliberately not part of this type; repositories
/// return it separately on the login path only, so a `User` can never be
/// serialized with credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique).
    pub email: Email,
    /// Permission role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The acting user, as established from a verified bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// User's role at token issue time.
    pub role: Role,
}

/// A staff-or-admin user as shown in the assignment picker.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

impl From<User> for StaffMember {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            name: "Asha Staff".to_owned(),
            email: Email::parse("asha@example.com").unwrap(),
            role: Role::Staff,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serializes_camel_case_without_credentials() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["name"], "Asha Staff");
        assert_eq!(json["role"], "staff");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_staff_member_from_user() {
        let member = StaffMember::from(sample_user());
        assert_eq!(member.id, UserId::new(1));
        assert_eq!(member.role, Role::Staff);
    }
}
