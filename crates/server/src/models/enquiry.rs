//! Enquiry domain types and request shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use enquiry_desk_core::{Email, EnquiryId, EnquiryStatus, UserId};

use super::{ValidationError, required_text};

/// Maximum length of a customer name.
const MAX_CUSTOMER_NAME: usize = 100;
/// Maximum length of a phone number.
const MAX_PHONE: usize = 20;
/// Maximum length of an enquiry message.
const MAX_MESSAGE: usize = 1000;

/// Default page size for listings.
const DEFAULT_PAGE_SIZE: i64 = 10;
/// Hard cap on page size.
const MAX_PAGE_SIZE: i64 = 100;

/// The resolved assignee of an enquiry.
///
/// A non-owning projection of the referenced user, joined on demand.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// A customer enquiry (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    /// Unique enquiry ID.
    pub id: EnquiryId,
    /// Name the customer submitted.
    pub customer_name: String,
    /// Customer contact email.
    pub email: Email,
    /// Customer contact phone.
    pub phone: String,
    /// The enquiry text.
    pub message: String,
    /// Triage status.
    pub status: EnquiryStatus,
    /// Staff-or-admin user responsible for this enquiry, if any.
    pub assigned_to: Option<Assignee>,
    /// When the enquiry was submitted.
    pub created_at: DateTime<Utc>,
    /// When the enquiry was last changed.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an enquiry.
#[derive(Debug, Clone)]
pub struct NewEnquiry {
    pub customer_name: String,
    pub email: Email,
    pub phone: String,
    pub message: String,
}

/// Public enquiry submission body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateEnquiryRequest {
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl CreateEnquiryRequest {
    /// Validate field presence and length bounds, trimming each field.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first offending field.
    pub fn validate(self) -> Result<NewEnquiry, ValidationError> {
        let customer_name = required_text(&self.customer_name, "Customer name", MAX_CUSTOMER_NAME)?;
        let email = Email::parse(&self.email)?;
        let phone = required_text(&self.phone, "Phone number", MAX_PHONE)?;
        let message = required_text(&self.message, "Message", MAX_MESSAGE)?;

        Ok(NewEnquiry {
            customer_name,
            email,
            phone,
            message,
        })
    }
}

/// Partial update for an enquiry.
///
/// `assigned_to` distinguishes an absent key from an explicit `null`: staff
/// updates are rejected if the key is present at all, while an admin may send
/// `null` to clear the assignment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateEnquiryPatch {
    #[serde(default)]
    pub status: Option<EnquiryStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<UserId>>,
}

impl UpdateEnquiryPatch {
    /// Whether the patch names the assignee field, with any value.
    #[must_use]
    pub const fn touches_assignee(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none()
    }
}

/// Deserialize a field so that a present `null` becomes `Some(None)`.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<UserId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<UserId>::deserialize(deserializer).map(Some)
}

/// Raw listing query string, coerced in one place into a [`ListFilter`].
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListQuery {
    /// Normalize the query into a typed filter.
    ///
    /// Blank `status`/`search` values are treated as absent, matching the
    /// dashboard's habit of submitting empty form fields. Page numbers are
    /// clamped to sane bounds rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidStatus` for an unrecognized status.
    pub fn into_filter(self) -> Result<ListFilter, ValidationError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse().map_err(|_| ValidationError::InvalidStatus)?),
        };

        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        Ok(ListFilter {
            status,
            search,
            page,
            limit,
        })
    }
}

/// Typed, normalized listing filter.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub status: Option<EnquiryStatus>,
    pub search: Option<String>,
    /// 1-based page number.
    pub page: i64,
    /// Page size, capped.
    pub limit: i64,
}

impl ListFilter {
    /// Row offset for the current page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Pagination envelope returned alongside listings.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    /// Current 1-based page.
    pub current: i64,
    /// Total number of pages.
    pub pages: i64,
    /// Total matching records.
    pub total: i64,
}

impl Pagination {
    /// Build the envelope from a filter and total count.
    #[must_use]
    pub const fn new(filter: &ListFilter, total: i64) -> Self {
        Self {
            current: filter.page,
            pages: (total + filter.limit - 1) / filter.limit,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_request() -> CreateEnquiryRequest {
        CreateEnquiryRequest {
            customer_name: "John Doe".to_owned(),
            email: "john@example.com".to_owned(),
            phone: "1234567890".to_owned(),
            message: "Test".to_owned(),
        }
    }

    #[test]
    fn test_create_validates_and_normalizes() {
        let mut req = create_request();
        req.email = " John@Example.COM ".to_owned();
        req.customer_name = "  John Doe  ".to_owned();

        let new = req.validate().unwrap();
        assert_eq!(new.customer_name, "John Doe");
        assert_eq!(new.email.as_str(), "john@example.com");
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        let mut req = create_request();
        req.message = "   ".to_owned();
        assert!(matches!(
            req.validate(),
            Err(ValidationError::Required("Message"))
        ));
    }

    #[test]
    fn test_create_rejects_over_length() {
        let mut req = create_request();
        req.phone = "0".repeat(21);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::TooLong("Phone number", 20))
        ));

        let mut req = create_request();
        req.message = "m".repeat(1001);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::TooLong("Message", 1000))
        ));
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let absent: UpdateEnquiryPatch = serde_json::from_str(r#"{"status":"closed"}"#).unwrap();
        assert!(!absent.touches_assignee());
        assert_eq!(absent.status, Some(EnquiryStatus::Closed));

        let null: UpdateEnquiryPatch = serde_json::from_str(r#"{"assignedTo":null}"#).unwrap();
        assert!(null.touches_assignee());
        assert_eq!(null.assigned_to, Some(None));

        let set: UpdateEnquiryPatch = serde_json::from_str(r#"{"assignedTo":7}"#).unwrap();
        assert_eq!(set.assigned_to, Some(Some(UserId::new(7))));
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<UpdateEnquiryPatch, _> =
            serde_json::from_str(r#"{"isDeleted":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_list_query_blank_values_are_absent() {
        let query = ListQuery {
            status: Some("  ".to_owned()),
            search: Some(String::new()),
            page: None,
            limit: None,
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.status.is_none());
        assert!(filter.search.is_none());
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 10);
    }

    #[test]
    fn test_list_query_rejects_bad_status() {
        let query = ListQuery {
            status: Some("resolved".to_owned()),
            ..ListQuery::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(ValidationError::InvalidStatus)
        ));
    }

    #[test]
    fn test_list_query_clamps_bounds() {
        let query = ListQuery {
            page: Some(0),
            limit: Some(5000),
            ..ListQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_pagination_rounds_up() {
        let filter = ListFilter {
            status: None,
            search: None,
            page: 2,
            limit: 10,
        };
        let pagination = Pagination::new(&filter, 25);
        assert_eq!(pagination.current, 2);
        assert_eq!(pagination.pages, 3);
        assert_eq!(pagination.total, 25);
        assert_eq!(filter.offset(), 10);
    }

    #[test]
    fn test_enquiry_wire_shape() {
        let enquiry = Enquiry {
            id: EnquiryId::new(1),
            customer_name: "John Doe".to_owned(),
            email: Email::parse("john@example.com").unwrap(),
            phone: "1234567890".to_owned(),
            message: "Test".to_owned(),
            status: EnquiryStatus::New,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&enquiry).unwrap();
        assert_eq!(json["customerName"], "John Doe");
        assert_eq!(json["status"], "new");
        assert!(json["assignedTo"].is_null());
    }
}
