//! Enquiry repository for database operations.
//!
//! Every read joins the assignee on demand and every statement excludes
//! soft-deleted rows; the only statement that touches `is_deleted` is the
//! soft delete itself.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use enquiry_desk_core::{Email, EnquiryId, EnquiryStatus, UserId};

use super::RepositoryError;
use crate::models::{Assignee, Enquiry, ListFilter, NewEnquiry};

/// Joined select list shared by every read path.
const ENQUIRY_SELECT: &str = "SELECT e.id, e.customer_name, e.email, e.phone, e.message, \
     e.status, e.assigned_to, u.name AS assignee_name, u.email AS assignee_email, \
     e.created_at, e.updated_at \
     FROM enquiry e \
     LEFT JOIN app_user u ON u.id = e.assigned_to";

/// Internal row type for enquiry queries.
///
/// The assignee columns default to `NULL` on statements that return the bare
/// `enquiry` table (INSERT ... RETURNING), where no join is possible.
#[derive(Debug, sqlx::FromRow)]
struct EnquiryRow {
    id: i32,
    customer_name: String,
    email: String,
    phone: String,
    message: String,
    status: EnquiryStatus,
    assigned_to: Option<i32>,
    #[sqlx(default)]
    assignee_name: Option<String>,
    #[sqlx(default)]
    assignee_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnquiryRow> for Enquiry {
    type Error = RepositoryError;

    fn try_from(row: EnquiryRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let assigned_to = match (row.assigned_to, row.assignee_name, row.assignee_email) {
            (Some(id), Some(name), Some(assignee_email)) => Some(Assignee {
                id: UserId::new(id),
                name,
                email: Email::parse(&assignee_email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid assignee email: {e}"))
                })?,
            }),
            _ => None,
        };

        Ok(Self {
            id: EnquiryId::new(row.id),
            customer_name: row.customer_name,
            email,
            phone: row.phone,
            message: row.message,
            status: row.status,
            assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Escape LIKE wildcards in user-supplied search text.
fn like_pattern(search: &str) -> String {
    let escaped: String = search
        .chars()
        .flat_map(|c| match c {
            '\\' | '%' | '_' => vec!['\\', c],
            other => vec![other],
        })
        .collect();
    format!("%{escaped}%")
}

/// Repository for enquiry database operations.
pub struct EnquiryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EnquiryRepository<'a> {
    /// Create a new enquiry repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new enquiry with default workflow state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewEnquiry) -> Result<Enquiry, RepositoryError> {
        let row = sqlx::query_as::<_, EnquiryRow>(
            "INSERT INTO enquiry (customer_name, email, phone, message) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, customer_name, email, phone, message, status, assigned_to, \
                       created_at, updated_at",
        )
        .bind(&input.customer_name)
        .bind(input.email.as_str())
        .bind(&input.phone)
        .bind(&input.message)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a non-deleted enquiry by ID, with the assignee resolved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: EnquiryId) -> Result<Option<Enquiry>, RepositoryError> {
        let row = sqlx::query_as::<_, EnquiryRow>(&format!(
            "{ENQUIRY_SELECT} WHERE e.id = $1 AND e.is_deleted = FALSE"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List non-deleted enquiries matching the filter, newest first.
    ///
    /// Returns the page of enquiries together with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, filter: &ListFilter) -> Result<(Vec<Enquiry>, i64), RepositoryError> {
        let pattern = filter.search.as_deref().map(like_pattern);

        let rows = sqlx::query_as::<_, EnquiryRow>(&format!(
            "{ENQUIRY_SELECT} \
             WHERE e.is_deleted = FALSE \
               AND ($1::enquiry_status IS NULL OR e.status = $1) \
               AND ($2::text IS NULL \
                    OR e.customer_name ILIKE $2 \
                    OR e.email ILIKE $2 \
                    OR e.message ILIKE $2) \
             ORDER BY e.created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.status)
        .bind(pattern.as_deref())
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enquiry e \
             WHERE e.is_deleted = FALSE \
               AND ($1::enquiry_status IS NULL OR e.status = $1) \
               AND ($2::text IS NULL \
                    OR e.customer_name ILIKE $2 \
                    OR e.email ILIKE $2 \
                    OR e.message ILIKE $2)",
        )
        .bind(filter.status)
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        let enquiries = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((enquiries, total))
    }

    /// Apply a permitted update to a non-deleted enquiry.
    ///
    /// `status` is written when present; the assignee is written only when
    /// the outer option is present, so `Some(None)` clears it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry is absent or
    /// soft-deleted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: EnquiryId,
        status: Option<EnquiryStatus>,
        assignee: Option<Option<UserId>>,
    ) -> Result<Enquiry, RepositoryError> {
        let result = sqlx::query(
            "UPDATE enquiry \
             SET status = COALESCE($2::enquiry_status, status), \
                 assigned_to = CASE WHEN $3::bool THEN $4::int ELSE assigned_to END \
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id.as_i32())
        .bind(status)
        .bind(assignee.is_some())
        .bind(assignee.flatten().map(|u| u.as_i32()))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set or clear the assignee of a non-deleted enquiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry is absent or
    /// soft-deleted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_assignee(
        &self,
        id: EnquiryId,
        assignee: Option<UserId>,
    ) -> Result<Enquiry, RepositoryError> {
        let result = sqlx::query(
            "UPDATE enquiry SET assigned_to = $2 WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(id.as_i32())
        .bind(assignee.map(|u| u.as_i32()))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete an enquiry. Non-reversible; there is no restore.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the enquiry is absent or
    /// already soft-deleted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn soft_delete(&self, id: EnquiryId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE enquiry SET is_deleted = TRUE WHERE id = $1 AND is_deleted = FALSE")
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
