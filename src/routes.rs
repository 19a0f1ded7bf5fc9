//! Router Assembly
//! Mission: Wire public and bearer-protected endpoints over shared state

use crate::auth::{self, auth_middleware, JwtHandler, UserStore};
use crate::directory;
use crate::notify::{self, Notifier};
use crate::requests::{self, RequestStore};
use crate::reviews::{self, ReviewStore};
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserStore>,
    pub requests: Arc<RequestStore>,
    pub reviews: Arc<ReviewStore>,
    pub jwt: Arc<JwtHandler>,
    pub notifier: Arc<Notifier>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    // Public routes: signup/login, directory, per-mentor reviews, health
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/signup", post(auth::api::signup))
        .route("/api/login", post(auth::api::login))
        .route("/api/mentors", get(directory::list_mentors))
        .route("/api/reviews/:mentor_id", get(reviews::list_reviews))
        .with_state(state.clone());

    // Everything else requires a valid bearer token
    let protected_routes = Router::new()
        .route("/api/send-query", post(notify::send_query))
        .route("/api/reviews", post(reviews::submit_review))
        .route("/api/mentee/requests", get(requests::api::mentee_requests))
        .route("/api/mentor/requests", get(requests::api::mentor_requests))
        .route("/api/requests", post(requests::api::create_request))
        .route(
            "/api/requests/:request_id/:action",
            put(requests::api::update_request),
        )
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
