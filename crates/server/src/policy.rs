//! Authorization policy for enquiry actions.
//!
//! The whole permission matrix lives here as pure functions: given the actor,
//! the action, and (for updates) the enquiry's current assignee and the shape
//! of the patch, decide whether the action is permitted and which fields it
//! may touch. Callers mutate only after a permit decision.

use thiserror::Error;

use enquiry_desk_core::{Role, UserId};

use crate::models::UpdateEnquiryPatch;

/// Policy failure signals.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// Role or ownership mismatch.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Assignment target is missing or has the wrong role.
    #[error("{0}")]
    InvalidAssignee(&'static str),
}

/// The authenticated actor a decision is made for.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Enquiry actions gated by role alone.
///
/// Creation is public and reading only needs authentication, so neither
/// appears here; everything below is admin-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Assign,
    Unassign,
    Delete,
    ListStaff,
}

impl AdminAction {
    const fn denial(self) -> &'static str {
        match self {
            Self::Assign => "Only admin can assign enquiries",
            Self::Unassign => "Only admin can unassign enquiries",
            Self::Delete => "Only admin can delete enquiries",
            Self::ListStaff => "Only admin can access staff list",
        }
    }
}

/// What an update decision permits the caller to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateGrant {
    /// Admin: status and assignee may both change.
    AllFields,
    /// Staff on their own enquiry: status only.
    StatusOnly,
}

/// Check an admin-only action.
///
/// # Errors
///
/// Returns `PolicyError::Forbidden` for any non-admin actor.
pub const fn authorize_admin(actor: &Actor, action: AdminAction) -> Result<(), PolicyError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Staff | Role::User => Err(PolicyError::Forbidden(action.denial())),
    }
}

/// Decide an update request.
///
/// Rules, first match wins:
/// - admin: all fields; assignee resolution is validated separately via
///   [`validate_assignee`].
/// - staff: only when the enquiry is currently assigned to them, and only the
///   status field; a patch that names `assignedTo` at all is rejected,
///   whatever its value.
/// - user (or anything else): rejected.
///
/// # Errors
///
/// Returns `PolicyError::Forbidden` describing the first violated rule.
pub const fn authorize_update(
    actor: &Actor,
    current_assignee: Option<UserId>,
    patch: &UpdateEnquiryPatch,
) -> Result<UpdateGrant, PolicyError> {
    match actor.role {
        Role::Admin => Ok(UpdateGrant::AllFields),
        Role::Staff => {
            let owns = match current_assignee {
                Some(id) => id.as_i32() == actor.id.as_i32(),
                None => false,
            };
            if !owns {
                return Err(PolicyError::Forbidden(
                    "You can only update enquiries assigned to you",
                ));
            }
            if patch.touches_assignee() {
                return Err(PolicyError::Forbidden(
                    "Staff cannot assign/unassign enquiries",
                ));
            }
            Ok(UpdateGrant::StatusOnly)
        }
        Role::User => Err(PolicyError::Forbidden("Insufficient permissions")),
    }
}

/// Validate an assignment target, for `assign` and for admin updates that
/// set `assignedTo`.
///
/// # Errors
///
/// Returns `PolicyError::InvalidAssignee` if the target user does not exist
/// or cannot hold assignments (role `user`).
pub const fn validate_assignee(target_role: Option<Role>) -> Result<(), PolicyError> {
    match target_role {
        None => Err(PolicyError::InvalidAssignee("Assigned user not found")),
        Some(role) if role.is_assignable() => Ok(()),
        Some(_) => Err(PolicyError::InvalidAssignee(
            "Cannot assign enquiry to regular user. Only staff or admin can be assigned.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enquiry_desk_core::EnquiryStatus;

    const ADMIN: Actor = Actor::new(UserId::new(1), Role::Admin);
    const STAFF: Actor = Actor::new(UserId::new(2), Role::Staff);
    const OTHER_STAFF: Actor = Actor::new(UserId::new(3), Role::Staff);
    const USER: Actor = Actor::new(UserId::new(4), Role::User);

    fn status_patch() -> UpdateEnquiryPatch {
        UpdateEnquiryPatch {
            status: Some(EnquiryStatus::Closed),
            assigned_to: None,
        }
    }

    fn assignee_patch(target: Option<UserId>) -> UpdateEnquiryPatch {
        UpdateEnquiryPatch {
            status: None,
            assigned_to: Some(target),
        }
    }

    // ------------------------------------------------------------------
    // Admin-only actions
    // ------------------------------------------------------------------

    #[test]
    fn admin_actions_permit_admin_only() {
        for action in [
            AdminAction::Assign,
            AdminAction::Unassign,
            AdminAction::Delete,
            AdminAction::ListStaff,
        ] {
            assert_eq!(authorize_admin(&ADMIN, action), Ok(()));
            assert!(matches!(
                authorize_admin(&STAFF, action),
                Err(PolicyError::Forbidden(_))
            ));
            assert!(matches!(
                authorize_admin(&USER, action),
                Err(PolicyError::Forbidden(_))
            ));
        }
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    #[test]
    fn admin_update_grants_all_fields() {
        let grant = authorize_update(&ADMIN, None, &assignee_patch(Some(UserId::new(2))));
        assert_eq!(grant, Ok(UpdateGrant::AllFields));

        // Regardless of who currently holds the enquiry.
        let grant = authorize_update(&ADMIN, Some(STAFF.id), &status_patch());
        assert_eq!(grant, Ok(UpdateGrant::AllFields));
    }

    #[test]
    fn staff_update_own_enquiry_is_status_only() {
        let grant = authorize_update(&STAFF, Some(STAFF.id), &status_patch());
        assert_eq!(grant, Ok(UpdateGrant::StatusOnly));
    }

    #[test]
    fn staff_update_foreign_enquiry_is_forbidden() {
        let result = authorize_update(&OTHER_STAFF, Some(STAFF.id), &status_patch());
        assert!(matches!(result, Err(PolicyError::Forbidden(_))));
    }

    #[test]
    fn staff_update_unassigned_enquiry_is_forbidden() {
        let result = authorize_update(&STAFF, None, &status_patch());
        assert!(matches!(result, Err(PolicyError::Forbidden(_))));
    }

    #[test]
    fn staff_patch_naming_assignee_is_forbidden_regardless_of_value() {
        // Even on their own enquiry, and even when the value is null or
        // their own id, presence of the field is rejected outright.
        for target in [None, Some(STAFF.id), Some(OTHER_STAFF.id)] {
            let result = authorize_update(&STAFF, Some(STAFF.id), &assignee_patch(target));
            assert!(matches!(result, Err(PolicyError::Forbidden(_))));
        }
    }

    #[test]
    fn user_update_is_forbidden() {
        let result = authorize_update(&USER, Some(USER.id), &status_patch());
        assert!(matches!(result, Err(PolicyError::Forbidden(_))));
    }

    // ------------------------------------------------------------------
    // Assignment target validation
    // ------------------------------------------------------------------

    #[test]
    fn assignee_must_exist() {
        assert!(matches!(
            validate_assignee(None),
            Err(PolicyError::InvalidAssignee(_))
        ));
    }

    #[test]
    fn assignee_staff_or_admin_is_accepted() {
        assert_eq!(validate_assignee(Some(Role::Staff)), Ok(()));
        assert_eq!(validate_assignee(Some(Role::Admin)), Ok(()));
    }

    #[test]
    fn assignee_regular_user_is_rejected() {
        assert!(matches!(
            validate_assignee(Some(Role::User)),
            Err(PolicyError::InvalidAssignee(_))
        ));
    }
}
