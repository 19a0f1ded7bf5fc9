//! Authentication Middleware
//! Mission: Gate protected endpoints behind bearer-token validation

use crate::auth::jwt::JwtHandler;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that validates the `Authorization: Bearer <token>` header and
/// injects the decoded claims into request extensions. Purely a gate: no
/// other side effects.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|t| t.to_string())
        .ok_or_else(|| ApiError::auth("Missing authorization token"))?;

    let claims = jwt_handler
        .validate_token(&token)
        .map_err(|_| ApiError::auth("Invalid or expired token"))?;

    // Handlers pick these up with Extension<Claims>
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
