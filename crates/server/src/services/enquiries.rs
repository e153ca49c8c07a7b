//! Enquiry lifecycle service.
//!
//! Orchestrates create/read/update/delete/assign/unassign against the
//! repositories, consulting the authorization policy before any mutation.

use sqlx::PgPool;
use thiserror::Error;

use enquiry_desk_core::{EnquiryId, UserId};

use crate::db::RepositoryError;
use crate::db::enquiries::EnquiryRepository;
use crate::db::users::UserRepository;
use crate::models::{
    CreateEnquiryRequest, CurrentUser, Enquiry, ListFilter, Pagination, StaffMember,
    UpdateEnquiryPatch, ValidationError,
};
use crate::policy::{self, Actor, AdminAction, PolicyError, UpdateGrant};

/// Errors from enquiry lifecycle operations.
#[derive(Debug, Error)]
pub enum EnquiryError {
    /// The enquiry is absent or soft-deleted.
    #[error("Enquiry not found")]
    NotFound,

    /// The authorization policy denied the action.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// The input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Database operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A page of enquiries with its pagination envelope.
#[derive(Debug)]
pub struct EnquiryPage {
    pub enquiries: Vec<Enquiry>,
    pub pagination: Pagination,
}

/// Enquiry lifecycle service.
pub struct EnquiryService<'a> {
    enquiries: EnquiryRepository<'a>,
    users: UserRepository<'a>,
}

impl<'a> EnquiryService<'a> {
    /// Create a new enquiry service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            enquiries: EnquiryRepository::new(pool),
            users: UserRepository::new(pool),
        }
    }

    /// Create an enquiry from a public submission. No authentication.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Validation` for malformed input.
    pub async fn create(&self, request: CreateEnquiryRequest) -> Result<Enquiry, EnquiryError> {
        let input = request.validate()?;
        let enquiry = self.enquiries.create(&input).await?;
        Ok(enquiry)
    }

    /// List enquiries for any authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Repository` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<EnquiryPage, EnquiryError> {
        let (enquiries, total) = self.enquiries.list(filter).await?;
        Ok(EnquiryPage {
            enquiries,
            pagination: Pagination::new(filter, total),
        })
    }

    /// Fetch a single enquiry for any authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::NotFound` if absent or soft-deleted.
    pub async fn get(&self, id: EnquiryId) -> Result<Enquiry, EnquiryError> {
        self.enquiries.get(id).await?.ok_or(EnquiryError::NotFound)
    }

    /// Update an enquiry under the authorization policy.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::NotFound` if absent or soft-deleted,
    /// `EnquiryError::Policy` if the actor may not make this change.
    pub async fn update(
        &self,
        id: EnquiryId,
        patch: UpdateEnquiryPatch,
        actor: &CurrentUser,
    ) -> Result<Enquiry, EnquiryError> {
        let current = self.get(id).await?;
        let current_assignee = current.assigned_to.as_ref().map(|a| a.id);

        let actor = Actor::new(actor.id, actor.role);
        let grant = policy::authorize_update(&actor, current_assignee, &patch)?;

        let (status, assignee) = match grant {
            UpdateGrant::AllFields => {
                if let Some(Some(target)) = patch.assigned_to {
                    self.check_assignee(target).await?;
                }
                (patch.status, patch.assigned_to)
            }
            UpdateGrant::StatusOnly => (patch.status, None),
        };

        let updated = self
            .enquiries
            .update(id, status, assignee)
            .await
            .map_err(not_found_or)?;
        Ok(updated)
    }

    /// Soft-delete an enquiry. Admin only; non-reversible.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Policy` for non-admin actors and
    /// `EnquiryError::NotFound` if absent or already deleted.
    pub async fn delete(&self, id: EnquiryId, actor: &CurrentUser) -> Result<(), EnquiryError> {
        let actor = Actor::new(actor.id, actor.role);
        policy::authorize_admin(&actor, AdminAction::Delete)?;

        self.enquiries.soft_delete(id).await.map_err(not_found_or)
    }

    /// Assign an enquiry to a staff-or-admin user. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Policy` for non-admin actors or an invalid
    /// target, `EnquiryError::NotFound` if the enquiry is absent.
    pub async fn assign(
        &self,
        id: EnquiryId,
        target: UserId,
        actor: &CurrentUser,
    ) -> Result<Enquiry, EnquiryError> {
        let actor = Actor::new(actor.id, actor.role);
        policy::authorize_admin(&actor, AdminAction::Assign)?;

        // Surface a missing enquiry before blaming the target user.
        self.get(id).await?;
        self.check_assignee(target).await?;

        let updated = self
            .enquiries
            .set_assignee(id, Some(target))
            .await
            .map_err(not_found_or)?;
        Ok(updated)
    }

    /// Clear an enquiry's assignee. Admin only; succeeds even when the
    /// enquiry was not assigned.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Policy` for non-admin actors and
    /// `EnquiryError::NotFound` if the enquiry is absent.
    pub async fn unassign(
        &self,
        id: EnquiryId,
        actor: &CurrentUser,
    ) -> Result<Enquiry, EnquiryError> {
        let actor = Actor::new(actor.id, actor.role);
        policy::authorize_admin(&actor, AdminAction::Unassign)?;

        let updated = self
            .enquiries
            .set_assignee(id, None)
            .await
            .map_err(not_found_or)?;
        Ok(updated)
    }

    /// List users eligible for assignment. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `EnquiryError::Policy` for non-admin actors.
    pub async fn staff(&self, actor: &CurrentUser) -> Result<Vec<StaffMember>, EnquiryError> {
        let actor = Actor::new(actor.id, actor.role);
        policy::authorize_admin(&actor, AdminAction::ListStaff)?;

        let users = self.users.list_assignable().await?;
        Ok(users.into_iter().map(StaffMember::from).collect())
    }

    /// Resolve an assignment target and validate its role.
    async fn check_assignee(&self, target: UserId) -> Result<(), EnquiryError> {
        let target_role = self.users.get_by_id(target).await?.map(|u| u.role);
        policy::validate_assignee(target_role)?;
        Ok(())
    }
}

/// A repository miss on these paths means the enquiry is gone or deleted.
fn not_found_or(err: RepositoryError) -> EnquiryError {
    match err {
        RepositoryError::NotFound => EnquiryError::NotFound,
        other => EnquiryError::Repository(other),
    }
}
