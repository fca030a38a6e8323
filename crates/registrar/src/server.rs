//! HTTP scoring API.
//!
//! `POST /v1/reputation` scores a wallet from the configured feed, publishes
//! the profile to the registry, and returns both the profile and the
//! publication outcome. Publication failure is reported in-band with a 200;
//! only request validation and pipeline failures map to error statuses.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::publisher::ChainPublisher;
use metasense_core::{PublicationResult, UserProfile};
use metasense_engine::{assemble_profile, TransactionDataset};

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Path to the CSV transaction feed, read fresh per request.
    pub dataset_path: String,
    /// Registry publisher.
    pub publisher: Arc<ChainPublisher>,
}

#[derive(Debug, Deserialize)]
struct ReputationRequest {
    wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReputationResponse {
    user_profile: UserProfile,
    publication: PublicationResult,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/reputation", post(score_and_publish))
        .route("/v1/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the server until the process is stopped.
pub async fn serve(state: AppState, bind_addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Scoring API listening on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    // Health doubles as a feed check: an unreadable feed means requests
    // will fail, so report it here instead of a bare "ok".
    let dataset_path = state.dataset_path.clone();
    let loaded =
        tokio::task::spawn_blocking(move || TransactionDataset::from_csv_path(dataset_path)).await;

    match loaded {
        Ok(Ok(dataset)) => Json(json!({
            "status": "ok",
            "transactions": dataset.len(),
            "wallets": dataset.wallet_count(),
        })),
        Ok(Err(e)) => Json(json!({
            "status": "degraded",
            "error": e.to_string(),
        })),
        Err(e) => Json(json!({
            "status": "degraded",
            "error": e.to_string(),
        })),
    }
}

async fn score_and_publish(
    State(state): State<AppState>,
    Json(request): Json<ReputationRequest>,
) -> Result<Json<ReputationResponse>, (StatusCode, Json<serde_json::Value>)> {
    let wallet = match request.wallet_address.as_deref().map(str::trim) {
        Some(w) if !w.is_empty() => w.to_string(),
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "wallet_address is required",
            ));
        }
    };

    // The feed is re-read per request so scores always reflect the current
    // export. Loading is blocking file I/O, so it runs off the async runtime.
    let dataset_path = state.dataset_path.clone();
    let dataset = tokio::task::spawn_blocking(move || TransactionDataset::from_csv_path(dataset_path))
        .await
        .map_err(|e| {
            error!("Dataset load task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })?
        .map_err(|e| {
            error!("Failed to load transaction feed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to load transaction feed")
        })?;

    let records = dataset.for_wallet(&wallet);
    if records.is_empty() {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            "no transactions found for wallet",
        ));
    }

    let profile = assemble_profile(&wallet, &records, chrono::Utc::now()).map_err(|e| {
        error!("Scoring failed for {}: {}", wallet, e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "scoring failed")
    })?;

    let publication = state.publisher.publish(&profile).await;

    Ok(Json(ReputationResponse {
        user_profile: profile,
        publication,
    }))
}

fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "error": message })))
}
