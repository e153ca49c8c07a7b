//! Enquiry workflow status.

use serde::{Deserialize, Serialize};

/// Where an enquiry sits in the triage workflow.
///
/// New enquiries start as [`EnquiryStatus::New`]; staff move them to
/// `InProgress` while working and `Closed` when resolved. Transitions are
/// unconstrained - an enquiry may be reopened by moving it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "enquiry_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    #[default]
    New,
    InProgress,
    Closed,
}

impl std::fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("invalid enquiry status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_new() {
        assert_eq!(EnquiryStatus::default(), EnquiryStatus::New);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&EnquiryStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let parsed: EnquiryStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, EnquiryStatus::Closed);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("resolved".parse::<EnquiryStatus>().is_err());
    }
}
