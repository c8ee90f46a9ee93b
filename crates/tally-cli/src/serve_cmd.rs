//! `tally serve` command: the HTTP API over the progress engine.
//!
//! Thin dispatch only -- every route parses its body, hands a typed request
//! to the engine, and maps the engine's error taxonomy onto HTTP statuses:
//! invalid input 400, missing plan/group/item 404, storage failure 500.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use tally_core::{ProgressEngine, TrackError, UpdateOutcome, UpdateRequest};
use tally_store::document::Document;
use tally_store::store::DocumentStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<TrackError> for AppError {
    fn from(err: TrackError) -> Self {
        let status = match &err {
            TrackError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TrackError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub item_id: Option<String>,
    pub group: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkBody {
    pub progress_data: Option<Document>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router<S: DocumentStore + 'static>(engine: Arc<ProgressEngine<S>>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/progress", get(get_progress))
        .route("/api/progress/bulk", post(bulk_update))
        .route("/api/progress/reset", post(reset_progress))
        .route("/api/progress/{plan}", post(update_item))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve<S: DocumentStore + 'static>(
    engine: Arc<ProgressEngine<S>>,
    bind: &str,
    port: u16,
) -> Result<()> {
    let app = build_router(engine);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("tally serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("tally serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index<S: DocumentStore + 'static>(
    State(engine): State<Arc<ProgressEngine<S>>>,
) -> Result<axum::response::Response, AppError> {
    let doc = engine.snapshot().await?;

    let rows = if doc.summary.is_empty() {
        "<tr><td colspan=\"4\">No plans found.</td></tr>".to_string()
    } else {
        doc.summary
            .iter()
            .map(|(plan, s)| {
                format!(
                    "<tr><td>{plan}</td><td>{done}</td><td>{total}</td><td>{pct}%</td></tr>",
                    done = s.completed_items,
                    total = s.total_items,
                    pct = s.percentage,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>tally</title></head><body>\
<h1>tally</h1>\
<p><a href=\"/api/progress\">/api/progress</a></p>\
<table><tr><th>Plan</th><th>Done</th><th>Total</th><th>%</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn get_progress<S: DocumentStore + 'static>(
    State(engine): State<Arc<ProgressEngine<S>>>,
) -> Result<axum::response::Response, AppError> {
    let doc = engine.snapshot().await?;
    Ok(Json(doc).into_response())
}

async fn update_item<S: DocumentStore + 'static>(
    State(engine): State<Arc<ProgressEngine<S>>>,
    Path(plan): Path<String>,
    Json(body): Json<UpdateBody>,
) -> Result<axum::response::Response, AppError> {
    let item_id = body
        .item_id
        .ok_or_else(|| AppError::bad_request("itemId is required"))?;
    let completed = body
        .completed
        .ok_or_else(|| AppError::bad_request("completed is required"))?;

    let outcome = engine
        .set_item_completion(&UpdateRequest {
            plan,
            group: body.group,
            item_id,
            completed,
        })
        .await?;

    Ok(Json(UpdateResponse {
        success: true,
        outcome,
    })
    .into_response())
}

async fn bulk_update<S: DocumentStore + 'static>(
    State(engine): State<Arc<ProgressEngine<S>>>,
    Json(body): Json<BulkBody>,
) -> Result<axum::response::Response, AppError> {
    let doc = body
        .progress_data
        .ok_or_else(|| AppError::bad_request("progressData is required"))?;

    engine.bulk_replace(doc).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Progress data imported successfully",
    })
    .into_response())
}

async fn reset_progress<S: DocumentStore + 'static>(
    State(engine): State<Arc<ProgressEngine<S>>>,
) -> Result<axum::response::Response, AppError> {
    engine.reset_all().await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "All progress reset successfully",
    })
    .into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
