//! Session Request Models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduling ask from a mentee to a mentor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub date: String,
    pub time: String,
    pub doubt: String,
    pub student_number: String,
    pub status: RequestStatus,
    pub created_at: String,
}

/// Request lifecycle state. Accepted and rejected are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// What the owning mentor may do with a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Accept,
    Reject,
}

impl RequestAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(RequestAction::Accept),
            "reject" => Some(RequestAction::Reject),
            _ => None,
        }
    }

    pub fn target_status(&self) -> RequestStatus {
        match self {
            RequestAction::Accept => RequestStatus::Accepted,
            RequestAction::Reject => RequestStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RequestAction::Accept => "accept",
            RequestAction::Reject => "reject",
        }
    }
}

/// Request creation body (student identity comes from the token)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    /// Kept as a string so a malformed id yields a 400, not a
    /// deserialization error.
    pub mentor_id: String,
    pub date: String,
    pub time: String,
    pub doubt: String,
    pub student_number: String,
}

/// Mentor profile fields joined into a mentee's request listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub branch: String,
}

/// Mentee profile fields joined into a mentor's request listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub registration_number: String,
}

/// A request as seen by the mentee who sent it
#[derive(Debug, Serialize)]
pub struct MenteeRequestView {
    #[serde(flatten)]
    pub request: SessionRequest,
    pub mentor: MentorProfile,
}

/// A request as seen by the mentor it is addressed to
#[derive(Debug, Serialize)]
pub struct MentorRequestView {
    #[serde(flatten)]
    pub request: SessionRequest,
    pub student: StudentProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Accepted,
            RequestStatus::Rejected,
        ] {
            assert_eq!(RequestStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::from_str("cancelled"), None);
    }

    #[test]
    fn test_action_parsing_and_target() {
        assert_eq!(
            RequestAction::from_str("accept").map(|a| a.target_status()),
            Some(RequestStatus::Accepted)
        );
        assert_eq!(
            RequestAction::from_str("reject").map(|a| a.target_status()),
            Some(RequestStatus::Rejected)
        );
        assert_eq!(RequestAction::from_str("approve"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&RequestStatus::Accepted).unwrap();
        assert_eq!(json, r#""accepted""#);
    }
}
