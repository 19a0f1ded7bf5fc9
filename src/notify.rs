//! Notifier
//! Mission: Best-effort email dispatch through an HTTP mail relay

use crate::auth::models::Claims;
use crate::error::ApiError;
use crate::routes::AppState;
use anyhow::{bail, Context, Result};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outbound email client. Posts JSON messages to a configured relay
/// endpoint; when no relay is configured all sends are skipped.
pub struct Notifier {
    client: reqwest::Client,
    relay_url: Option<String>,
    from: String,
}

impl Notifier {
    pub fn new(relay_url: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url,
            from,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.relay_url.is_some()
    }

    /// Send one email through the relay
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let Some(relay_url) = &self.relay_url else {
            bail!("mail relay not configured");
        };

        let message = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html,
        });

        let resp = self
            .client
            .post(relay_url)
            .json(&message)
            .send()
            .await
            .context("Failed to reach mail relay")?;

        if !resp.status().is_success() {
            bail!("mail relay returned {}", resp.status());
        }

        debug!("Mail dispatched to {}", to);
        Ok(())
    }

    /// Fire-and-forget send on a detached task. Failures are logged and
    /// never reach the caller; used after a store write commits so the
    /// triggering operation does not depend on mail transport.
    pub fn send_detached(self: &Arc<Self>, to: String, subject: String, html: String) {
        if !self.is_enabled() {
            debug!("Mail relay not configured, skipping notification to {}", to);
            return;
        }

        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = notifier.send(&to, &subject, &html).await {
                warn!("Failed to send notification to {}: {:#}", to, err);
            }
        });
    }
}

/// Query body for emailing a mentor directly
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendQueryBody {
    pub mentor_email: String,
    pub query: String,
}

/// Email a mentor - POST /api/send-query
///
/// Unlike request creation, the email is the whole operation here, so the
/// send is awaited and its failure surfaces to the caller.
pub async fn send_query(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendQueryBody>,
) -> Result<Json<Value>, ApiError> {
    if payload.mentor_email.trim().is_empty() || payload.query.trim().is_empty() {
        return Err(ApiError::validation("Mentor email and query are required"));
    }

    state
        .notifier
        .send(
            payload.mentor_email.trim(),
            &format!("New Query from {}", claims.full_name),
            &format!(
                "<h3>New Query from Mentorlink</h3>\
                 <p><strong>From:</strong> {} ({})</p>\
                 <p><strong>Query:</strong></p>\
                 <p>{}</p>",
                claims.full_name, claims.email, payload.query
            ),
        )
        .await
        .map_err(|err| {
            warn!("Query email to {} failed: {:#}", payload.mentor_email, err);
            ApiError::Internal(err.context("Failed to send query"))
        })?;

    Ok(Json(json!({ "message": "Query sent successfully" })))
}
