//! Inquiry and admin account models
//!
//! Enum values travel upper-case on the wire and in the database
//! (`IN_PROGRESS`). Parsing is case-insensitive.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error returned when a label does not name a known enum value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseLabelError {}

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == upper)
                    .ok_or_else(|| ParseLabelError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

label_enum! {
    /// Tone of the customer's message
    Sentiment, "sentiment" {
        Positive => "POSITIVE",
        Neutral => "NEUTRAL",
        Negative => "NEGATIVE",
    }
}

label_enum! {
    /// How urgent the classifier judged the message
    Urgency, "urgency" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

label_enum! {
    /// Triage ranking, derived once at creation
    Priority, "priority" {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

label_enum! {
    /// Workflow state. Any state may move to any other.
    InquiryStatus, "status" {
        Open => "OPEN",
        InProgress => "IN_PROGRESS",
        Closed => "CLOSED",
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Sentiment::Neutral
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

impl Default for InquiryStatus {
    fn default() -> Self {
        InquiryStatus::Open
    }
}

/// A stored customer inquiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub intent: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub priority: Priority,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new inquiry; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub message: String,
    pub intent: String,
    pub sentiment: Sentiment,
    pub urgency: Urgency,
    pub priority: Priority,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

impl NewInquiry {
    pub fn into_inquiry(self, id: i64) -> Inquiry {
        Inquiry {
            id,
            name: self.name,
            email: self.email,
            message: self.message,
            intent: self.intent,
            sentiment: self.sentiment,
            urgency: self.urgency,
            priority: self.priority,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Staff login account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dashboard counters. Each is computed independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub closed: i64,
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!(" High ".parse::<Urgency>().unwrap(), Urgency::High);
        assert_eq!(
            "in_progress".parse::<InquiryStatus>().unwrap(),
            InquiryStatus::InProgress
        );
        assert_eq!(
            "IN_PROGRESS".parse::<InquiryStatus>().unwrap(),
            InquiryStatus::InProgress
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "bogus".parse::<InquiryStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown status 'bogus'");
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Sentiment::default(), Sentiment::Neutral);
        assert_eq!(Urgency::default(), Urgency::Medium);
        assert_eq!(InquiryStatus::default(), InquiryStatus::Open);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&InquiryStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");

        let stats = DashboardStats {
            in_progress: 2,
            high_priority: 1,
            ..Default::default()
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["inProgress"], 2);
        assert_eq!(value["highPriority"], 1);
    }
}
