//! Authentication Models
//! Mission: Define user, role and token claim structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account (mentor or mentee)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub branch: String,
    pub section: String,
    pub registration_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    pub created_at: String,
}

/// The two user roles. A mentor is requested/reviewed, a mentee
/// initiates requests and reviews.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "mentor")]
    Mentor,
    #[serde(rename = "mentee")]
    Mentee,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Mentor => "mentor",
            UserRole::Mentee => "mentee",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mentor" => Some(UserRole::Mentor),
            "mentee" => Some(UserRole::Mentee),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub exp: usize, // expiration timestamp
}

impl Claims {
    /// The subject parsed back to a user id. None means a malformed
    /// subject in a token that passed signature validation.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Signup request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub branch: String,
    pub section: String,
    pub registration_number: String,
    pub password: String,
    /// Validated by hand so an unknown role yields a 400, not a
    /// deserialization error.
    pub role: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub expires_in: usize, // seconds until expiration
    pub user: UserSummary,
}

/// Public user summary returned on login (sanitized)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

impl UserSummary {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_serialization() {
        let mentor = UserRole::Mentor;
        let json = serde_json::to_string(&mentor).unwrap();
        assert_eq!(json, r#""mentor""#);

        let mentee: UserRole = serde_json::from_str(r#""mentee""#).unwrap();
        assert_eq!(mentee, UserRole::Mentee);
    }

    #[test]
    fn test_user_role_string_conversion() {
        assert_eq!(UserRole::Mentor.as_str(), "mentor");
        assert_eq!(UserRole::Mentee.as_str(), "mentee");

        assert_eq!(UserRole::from_str("mentor"), Some(UserRole::Mentor));
        assert_eq!(UserRole::from_str("MENTEE"), Some(UserRole::Mentee));
        assert_eq!(UserRole::from_str("admin"), None);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            branch: "CSE".to_string(),
            section: "A".to_string(),
            registration_number: "RA001".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: UserRole::Mentor,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$10$secret"));
        assert!(json.contains("fullName"));
    }

    #[test]
    fn test_claims_user_id_roundtrip() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            email: "a@b.c".to_string(),
            role: UserRole::Mentee,
            full_name: "A B".to_string(),
            exp: 0,
        };
        assert_eq!(claims.user_id(), Some(id));

        let bad = Claims {
            sub: "not-a-uuid".to_string(),
            ..claims
        };
        assert_eq!(bad.user_id(), None);
    }
}
