//! Session Request Endpoints
//! Mission: Create requests and let the owning mentor resolve them

use crate::auth::models::Claims;
use crate::error::ApiError;
use crate::requests::models::{
    CreateRequestBody, MenteeRequestView, MentorRequestView, RequestAction, SessionRequest,
};
use crate::requests::store::NewRequest;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Create a session request - POST /api/requests
pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.mentor_id.trim().is_empty()
        || payload.date.trim().is_empty()
        || payload.time.trim().is_empty()
        || payload.doubt.trim().is_empty()
        || payload.student_number.trim().is_empty()
    {
        return Err(ApiError::validation("All fields are required"));
    }

    let mentor_id = Uuid::parse_str(payload.mentor_id.trim())
        .map_err(|_| ApiError::validation("Invalid mentor ID format"))?;

    let student_id = claims
        .user_id()
        .ok_or_else(|| ApiError::auth("Invalid token subject"))?;

    let mentor = state
        .users
        .find_mentor(&mentor_id)?
        .ok_or_else(|| ApiError::not_found("Mentor not found"))?;

    let request = state.requests.create(NewRequest {
        mentor_id,
        student_id,
        date: payload.date.trim().to_string(),
        time: payload.time.trim().to_string(),
        doubt: payload.doubt.trim().to_string(),
        student_number: payload.student_number.trim().to_string(),
    })?;

    info!("Request {} created for mentor {}", request.id, mentor.id);

    // Best-effort notification, detached from the request lifecycle.
    // A send failure never rolls the request back.
    state.notifier.send_detached(
        mentor.email.clone(),
        format!("New Mentoring Request from {}", claims.full_name),
        format!(
            "<h3>New Mentoring Request from Mentorlink</h3>\
             <p><strong>From:</strong> {} ({})</p>\
             <p><strong>Student Number:</strong> {}</p>\
             <p><strong>Date:</strong> {}</p>\
             <p><strong>Time:</strong> {}</p>\
             <p><strong>Doubt/Topic:</strong></p>\
             <p>{}</p>",
            claims.full_name,
            claims.email,
            request.student_number,
            request.date,
            request.time,
            request.doubt
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Request submitted successfully",
            "request": request,
        })),
    ))
}

/// Accept or reject a request - PUT /api/requests/:request_id/:action
pub async fn update_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((request_id, action)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let action =
        RequestAction::from_str(&action).ok_or_else(|| ApiError::validation("Invalid action"))?;

    let request_id = Uuid::parse_str(&request_id)
        .map_err(|_| ApiError::validation("Invalid request ID format"))?;

    let actor_id = claims
        .user_id()
        .ok_or_else(|| ApiError::auth("Invalid token subject"))?;

    let mut request = state
        .requests
        .get(&request_id)?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    authorize_transition(&request, actor_id)?;

    let applied = state.requests.transition(&request_id, action.target_status())?;
    if !applied {
        // Lost a race with another transition after the ownership check
        return Err(ApiError::conflict("Request has already been resolved"));
    }

    request.status = action.target_status();

    info!(
        "Request {} {}ed by mentor {}",
        request.id,
        action.as_str(),
        actor_id
    );

    Ok(Json(json!({
        "message": format!("Request {}ed successfully", action.as_str()),
        "request": request,
    })))
}

/// List the authenticated mentee's requests - GET /api/mentee/requests
pub async fn mentee_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MenteeRequestView>>, ApiError> {
    let student_id = claims
        .user_id()
        .ok_or_else(|| ApiError::auth("Invalid token subject"))?;

    Ok(Json(state.requests.list_for_mentee(&student_id)?))
}

/// List the authenticated mentor's requests - GET /api/mentor/requests
pub async fn mentor_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MentorRequestView>>, ApiError> {
    let mentor_id = claims
        .user_id()
        .ok_or_else(|| ApiError::auth("Invalid token subject"))?;

    Ok(Json(state.requests.list_for_mentor(&mentor_id)?))
}

/// Only the mentor the request is addressed to may act on it. The
/// terminal-state check happens afterwards, inside the guarded UPDATE.
fn authorize_transition(request: &SessionRequest, actor_id: Uuid) -> Result<(), ApiError> {
    if request.mentor_id != actor_id {
        return Err(ApiError::forbidden("Unauthorized"));
    }
    Ok(())
}
