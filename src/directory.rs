//! Mentor Directory
//! Mission: Public, password-stripped listing of mentors

use crate::auth::models::User;
use crate::error::ApiError;
use crate::routes::AppState;
use axum::{extract::State, Json};

/// List all mentors - GET /api/mentors
///
/// No pagination or server-side filtering; clients filter locally. The
/// password hash is excluded by `User`'s serialization, never by hand.
pub async fn list_mentors(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let mentors = state.users.list_mentors()?;
    Ok(Json(mentors))
}

#[cfg(test)]
mod tests {
    use crate::auth::models::UserRole;
    use crate::auth::user_store::{NewUser, UserStore};
    use tempfile::NamedTempFile;

    #[test]
    fn test_directory_never_exposes_password() {
        let temp = NamedTempFile::new().unwrap();
        let store = UserStore::new(temp.path().to_str().unwrap()).unwrap();

        store
            .create_user(
                NewUser {
                    full_name: "Mentor M".to_string(),
                    email: "mentor@example.com".to_string(),
                    branch: "ECE".to_string(),
                    section: "C".to_string(),
                    registration_number: "RA777".to_string(),
                    role: UserRole::Mentor,
                },
                "supersecret",
            )
            .unwrap();

        let mentors = store.list_mentors().unwrap();
        let json = serde_json::to_string(&mentors).unwrap();

        assert!(json.contains("mentor@example.com"));
        assert!(!json.to_lowercase().contains("password"));
        assert!(!json.contains("supersecret"));
    }
}
