//! Review Ledger
//! Mission: Append-only mentor ratings with strict range validation

use crate::auth::models::Claims;
use crate::error::ApiError;
use crate::routes::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// A rating left by a mentee for a mentor. Immutable once written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i64,
    pub description: String,
    pub created_at: String,
}

/// Reviewer display fields joined into listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerProfile {
    pub id: Uuid,
    pub full_name: String,
}

/// A review with its reviewer's name joined in
#[derive(Debug, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: ReviewerProfile,
}

/// Review submission body (reviewer identity comes from the token)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewBody {
    pub mentor_id: String,
    /// Raw JSON value so a non-numeric rating yields a 400, not a
    /// deserialization error.
    pub rating: Value,
    pub description: String,
}

/// Review storage with SQLite backend
pub struct ReviewStore {
    db_path: String,
}

impl ReviewStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reviews (
                id TEXT PRIMARY KEY,
                mentor_id TEXT NOT NULL,
                reviewer_id TEXT NOT NULL,
                rating INTEGER NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Append a review record
    pub fn insert(
        &self,
        mentor_id: Uuid,
        reviewer_id: Uuid,
        rating: i64,
        description: String,
    ) -> Result<Review> {
        let review = Review {
            id: Uuid::new_v4(),
            mentor_id,
            reviewer_id,
            rating,
            description,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO reviews (id, mentor_id, reviewer_id, rating, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.id.to_string(),
                review.mentor_id.to_string(),
                review.reviewer_id.to_string(),
                review.rating,
                review.description,
                review.created_at,
            ],
        )
        .context("Failed to insert review")?;

        Ok(review)
    }

    /// All reviews for a mentor, newest-first, reviewer name joined in
    pub fn list_for_mentor(&self, mentor_id: &Uuid) -> Result<Vec<ReviewView>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT r.id, r.mentor_id, r.reviewer_id, r.rating, r.description, r.created_at,
                    u.full_name
             FROM reviews r
             JOIN users u ON u.id = r.reviewer_id
             WHERE r.mentor_id = ?1
             ORDER BY r.created_at DESC, r.rowid DESC",
        )?;

        let views = stmt
            .query_map(params![mentor_id.to_string()], |row| {
                let review = review_from_row(row)?;
                let reviewer = ReviewerProfile {
                    id: review.reviewer_id,
                    full_name: row.get(6)?,
                };
                Ok(ReviewView { review, reviewer })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(views)
    }
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
    let parse_uuid = |idx: usize, s: String| {
        Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    };

    Ok(Review {
        id: parse_uuid(0, row.get(0)?)?,
        mentor_id: parse_uuid(1, row.get(1)?)?,
        reviewer_id: parse_uuid(2, row.get(2)?)?,
        rating: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

// ===== Route Handlers =====

/// Submit a review - POST /api/reviews
pub async fn submit_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitReviewBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.mentor_id.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }

    let rating = parse_rating(&payload.rating)
        .ok_or_else(|| ApiError::validation("Rating must be a number between 1 and 5"))?;

    let mentor_id = Uuid::parse_str(payload.mentor_id.trim())
        .map_err(|_| ApiError::validation("Invalid mentor ID format"))?;

    let reviewer_id = claims
        .user_id()
        .ok_or_else(|| ApiError::auth("Invalid token subject"))?;

    if state.users.find_mentor(&mentor_id)?.is_none() {
        return Err(ApiError::not_found("Mentor not found"));
    }

    let review = state.reviews.insert(
        mentor_id,
        reviewer_id,
        rating,
        payload.description.trim().to_string(),
    )?;

    info!("Review {} submitted for mentor {}", review.id, mentor_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review submitted successfully",
            "review": review,
        })),
    ))
}

/// List reviews for a mentor - GET /api/reviews/:mentor_id
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(mentor_id): Path<String>,
) -> Result<Json<Vec<ReviewView>>, ApiError> {
    let mentor_id = Uuid::parse_str(&mentor_id)
        .map_err(|_| ApiError::validation("Invalid mentor ID format"))?;

    Ok(Json(state.reviews.list_for_mentor(&mentor_id)?))
}

/// Accept only whole numbers in [1,5]; everything else (strings, floats
/// with a fraction, out-of-range values) is invalid.
fn parse_rating(value: &Value) -> Option<i64> {
    let rating = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        }
        _ => return None,
    };

    (1..=5).contains(&rating).then_some(rating)
}
