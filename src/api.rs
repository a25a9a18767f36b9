//! Dashboard API
//!
//! The presentation layer is an external collaborator; this module exposes
//! the sync engine and reconciler operations over a small JSON API for it to
//! consume.

use crate::reconciler::{InventoryUpdateRequest, StatusUpdateRequest, UpdateReconciler};
use crate::records::{
    classify_status, filter_records, format_display_date, AppointmentRecord, DashboardMetrics,
    DatasetState, StatusBadge,
};
use crate::sync::SyncEngine;
use crate::SERVICE_VERSION;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

type SharedState = Arc<ApiState>;

/// API state shared across handlers
pub struct ApiState {
    pub engine: Arc<SyncEngine>,
    pub reconciler: Arc<UpdateReconciler>,
}

/// API error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Generic update response
#[derive(Serialize)]
struct UpdateResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    #[serde(flatten)]
    state: DatasetState,
    metrics: DashboardMetrics,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    success: bool,
    error: Option<String>,
    last_updated_at: Option<chrono::DateTime<chrono::Utc>>,
    record_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateBody {
    donor_name: String,
    new_status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DonorQuery {
    #[serde(default)]
    search: String,
    #[serde(default = "default_status_filter")]
    status: String,
}

fn default_status_filter() -> String {
    "all".to_string()
}

/// Donor row enriched for display
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DonorRow {
    #[serde(flatten)]
    record: AppointmentRecord,
    display_date: String,
    badge: StatusBadge,
}

/// Create the dashboard API router
pub fn create_router(state: ApiState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(get_dashboard))
        .route("/donors", get(list_donors))
        .route("/refresh", post(trigger_refresh))
        .route("/donors/status", put(update_donor_status))
        .route("/inventory", put(update_inventory))
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Service liveness and engine status
async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let sync = state.engine.status();
    Json(serde_json::json!({
        "status": "ok",
        "version": SERVICE_VERSION,
        "syncRunning": sync.running,
        "pollIntervalMs": sync.poll_interval_ms,
        "isUpdatingStatus": state.reconciler.is_updating_status(),
        "isUpdatingInventory": state.reconciler.is_updating_inventory(),
    }))
}

/// Current dataset snapshot plus derived metrics
async fn get_dashboard(State(state): State<SharedState>) -> impl IntoResponse {
    let snapshot = state.engine.snapshot().await;
    let metrics = DashboardMetrics::from_state(&snapshot);
    Json(DashboardResponse {
        state: snapshot,
        metrics,
    })
}

/// Filtered donor rows enriched with display formatting
async fn list_donors(
    State(state): State<SharedState>,
    Query(query): Query<DonorQuery>,
) -> impl IntoResponse {
    let snapshot = state.engine.snapshot().await;
    let rows: Vec<DonorRow> = filter_records(&snapshot.donor_records, &query.search, &query.status)
        .into_iter()
        .map(|record| DonorRow {
            display_date: format_display_date(&record.appointment_date),
            badge: classify_status(&record.status),
            record: record.clone(),
        })
        .collect();
    Json(rows)
}

/// Manual resync trigger
async fn trigger_refresh(State(state): State<SharedState>) -> impl IntoResponse {
    state.engine.refresh().await;
    let snapshot = state.engine.snapshot().await;
    Json(RefreshResponse {
        success: snapshot.error.is_none(),
        error: snapshot.error,
        last_updated_at: snapshot.last_updated_at,
        record_count: snapshot.donor_records.len(),
    })
}

/// Donor status edit: resolve the sheet row from the donor name, run the
/// write flow, resync on success.
async fn update_donor_status(
    State(state): State<SharedState>,
    Json(body): Json<StatusUpdateBody>,
) -> impl IntoResponse {
    let snapshot = state.engine.snapshot().await;
    let Some(row_index) =
        UpdateReconciler::row_index_for(&snapshot.donor_records, &body.donor_name)
    else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Donor not found: {}", body.donor_name),
            }),
        )
            .into_response();
    };

    let request = StatusUpdateRequest {
        row_index,
        new_status: body.new_status.clone(),
        donor_name: body.donor_name.clone(),
    };

    let engine = state.engine.clone();
    let outcome = state
        .reconciler
        .update_donor_status(request, || async move { engine.refresh().await })
        .await;

    if outcome.success {
        Json(UpdateResponse {
            success: true,
            message: format!("{} status updated to {}", body.donor_name, body.new_status),
        })
        .into_response()
    } else {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: outcome.error.unwrap_or_else(|| "Update failed".to_string()),
            }),
        )
            .into_response()
    }
}

/// Inventory quantity edit
async fn update_inventory(
    State(state): State<SharedState>,
    Json(request): Json<InventoryUpdateRequest>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    let outcome = state
        .reconciler
        .update_inventory(request, || async move { engine.refresh().await })
        .await;

    if outcome.success {
        Json(UpdateResponse {
            success: true,
            message: "Inventory updated".to_string(),
        })
        .into_response()
    } else {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: outcome.error.unwrap_or_else(|| "Update failed".to_string()),
            }),
        )
            .into_response()
    }
}
