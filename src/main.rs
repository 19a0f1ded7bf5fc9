//! Mentorlink Backend
//! Mission: Mentorship matching - signup/login, mentor directory,
//! session requests and reviews over a SQLite store

mod auth;
mod config;
mod directory;
mod error;
mod notify;
mod requests;
mod reviews;
mod routes;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    auth::{JwtHandler, UserStore},
    config::Config,
    notify::Notifier,
    requests::RequestStore,
    reviews::ReviewStore,
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    info!("🚀 Starting Mentorlink backend");

    // All stores share one SQLite file; listings join across tables
    let users = Arc::new(UserStore::new(&config.database_path)?);
    let requests = Arc::new(RequestStore::new(&config.database_path)?);
    let reviews = Arc::new(ReviewStore::new(&config.database_path)?);
    info!("💾 Database ready at {}", config.database_path);

    let jwt = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    let notifier = Arc::new(Notifier::new(
        config.mail_relay_url.clone(),
        config.mail_from.clone(),
    ));
    if notifier.is_enabled() {
        info!("📧 Mail relay configured");
    } else {
        warn!("Mail relay not configured, email notifications disabled");
    }

    let state = AppState {
        users,
        requests,
        reviews,
        jwt,
        notifier,
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mentorlink=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
