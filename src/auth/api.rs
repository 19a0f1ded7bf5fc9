//! Authentication Endpoints
//! Mission: Provide signup and login for mentors and mentees

use crate::auth::models::{LoginRequest, LoginResponse, SignupRequest, UserRole, UserSummary};
use crate::auth::user_store::NewUser;
use crate::error::ApiError;
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Signup endpoint - POST /api/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (new_user, password) = parse_signup(payload)?;

    if state
        .users
        .find_by_email(&new_user.email, new_user.role)?
        .is_some()
    {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    state.users.create_user(new_user, &password)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() || payload.role.is_empty() {
        return Err(ApiError::validation(
            "Email, password, and role are required",
        ));
    }

    let role = UserRole::from_str(&payload.role)
        .ok_or_else(|| ApiError::validation("Invalid role specified"))?;

    // Unknown email and wrong password produce the same response
    let user = state
        .users
        .authenticate(payload.email.trim(), role, &payload.password)?
        .ok_or_else(|| {
            warn!("Failed login attempt: {}", payload.email);
            ApiError::auth("Invalid credentials")
        })?;

    let (token, expires_in) = state.jwt.generate_token(&user)?;

    info!("Login successful: {} ({})", user.email, user.role.as_str());

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        expires_in,
        user: UserSummary::from_user(&user),
    }))
}

/// Validate the signup body and split it into the user fields and the
/// plaintext password.
fn parse_signup(payload: SignupRequest) -> Result<(NewUser, String), ApiError> {
    let SignupRequest {
        full_name,
        email,
        branch,
        section,
        registration_number,
        password,
        role,
    } = payload;

    let required = [
        full_name.trim(),
        email.trim(),
        branch.trim(),
        section.trim(),
        registration_number.trim(),
        &password,
        role.trim(),
    ];
    if required.iter().any(|f| f.is_empty()) {
        return Err(ApiError::validation("All fields are required"));
    }

    let role =
        UserRole::from_str(&role).ok_or_else(|| ApiError::validation("Invalid role specified"))?;

    Ok((
        NewUser {
            full_name: full_name.trim().to_string(),
            email: email.trim().to_string(),
            branch: branch.trim().to_string(),
            section: section.trim().to_string(),
            registration_number: registration_number.trim().to_string(),
            role,
        },
        password,
    ))
}
