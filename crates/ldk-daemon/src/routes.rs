//! Axum router and all HTTP handlers for ldk-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and
//! attaches middleware layers. All handlers are `pub(crate)` so the
//! scenario tests in `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use ldk_orders::{AdvanceError, CreateError};
use ldk_receipts::RecordOutcome;

use crate::{
    api_types::{
        AdvanceRequest, AdvanceResponse, CreateOrderRequest, HealthResponse, OrderResponse,
        ReceiptResponse, RecordReceiptRequest, RefusedResponse, SessionRow, SessionsResponse,
        StatusSnapshot,
    },
    state::{uptime_secs, AppState},
    ws,
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/sessions", get(list_sessions))
        .route("/v1/ws", get(ws::ws_handler))
        .route("/v1/orders", post(create_order))
        .route("/v1/orders/:id", get(get_order))
        .route("/v1/orders/:id/advance", post(advance_order))
        .route("/v1/orders/:id/cancel", post(cancel_order))
        .route(
            "/v1/artifacts/:artifact_id/receipts/:recipient_id",
            get(get_receipt).post(record_receipt),
        )
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = StatusSnapshot {
        daemon_uptime_secs: uptime_secs(),
        connected_sessions: st.hub.session_count(),
        active_channels: st.hub.channel_count(),
        orders_tracked: st.store.order_count(),
        config_fingerprint: st.config.fingerprint(),
    };
    (StatusCode::OK, Json(snap))
}

// ---------------------------------------------------------------------------
// GET /v1/sessions
// ---------------------------------------------------------------------------

pub(crate) async fn list_sessions(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let sessions = st
        .hub
        .sessions()
        .into_iter()
        .map(|info| SessionRow {
            session_id: info.session_id.as_uuid(),
            recipient_id: info.recipient_id,
            subscribed_channels: info
                .subscribed_channels
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
        })
        .collect();
    (StatusCode::OK, Json(SessionsResponse { sessions }))
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

pub(crate) async fn create_order(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Response {
    match st.orders.create(&req.order_number, req.priority).await {
        Ok(order) => {
            info!(order_id = %order.id, order_number = %order.order_number, "orders/create");
            (StatusCode::CREATED, Json(OrderResponse::from(order))).into_response()
        }
        Err(CreateError::DuplicateOrderNumber(n)) => refused(
            StatusCode::CONFLICT,
            format!("order number {n} already exists"),
            "duplicate_order_number",
        ),
        Err(CreateError::Storage(msg)) => {
            refused(StatusCode::INTERNAL_SERVER_ERROR, msg, "storage")
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:id
// ---------------------------------------------------------------------------

pub(crate) async fn get_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match st.orders.get(id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(OrderResponse::from(order))).into_response(),
        Ok(None) => refused(
            StatusCode::NOT_FOUND,
            format!("unknown order {id}"),
            "unknown_order",
        ),
        Err(err) => refused(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "storage"),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/advance
// ---------------------------------------------------------------------------

pub(crate) async fn advance_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Response {
    match st.orders.advance(id, req.target_status).await {
        Ok(change) => {
            info!(order_id = %id, new = %change.new, "orders/advance");
            (
                StatusCode::OK,
                Json(AdvanceResponse {
                    order_id: change.order_id,
                    previous_status: change.previous,
                    new_status: change.new,
                }),
            )
                .into_response()
        }
        Err(err) => advance_refusal(err),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/cancel
// ---------------------------------------------------------------------------

pub(crate) async fn cancel_order(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match st.orders.cancel(id).await {
        Ok(change) => {
            info!(order_id = %id, "orders/cancel");
            (
                StatusCode::OK,
                Json(AdvanceResponse {
                    order_id: change.order_id,
                    previous_status: change.previous,
                    new_status: change.new,
                }),
            )
                .into_response()
        }
        Err(err) => advance_refusal(err),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/artifacts/:artifact_id/receipts/:recipient_id
// ---------------------------------------------------------------------------

pub(crate) async fn record_receipt(
    State(st): State<Arc<AppState>>,
    Path((artifact_id, recipient_id)): Path<(String, String)>,
    Json(req): Json<RecordReceiptRequest>,
) -> Response {
    let outcome = match st.receipts.record(&artifact_id, &recipient_id, req.action).await {
        Ok(outcome) => outcome,
        Err(err) => {
            return refused(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "storage")
        }
    };
    let status = match st.receipts.status_for(&artifact_id, &recipient_id).await {
        Ok(status) => status,
        Err(err) => {
            return refused(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "storage")
        }
    };
    (
        StatusCode::OK,
        Json(ReceiptResponse {
            artifact_id,
            recipient_id,
            status: status.to_string(),
            changed: matches!(outcome, RecordOutcome::Upgraded { .. }),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/artifacts/:artifact_id/receipts/:recipient_id
// ---------------------------------------------------------------------------

pub(crate) async fn get_receipt(
    State(st): State<Arc<AppState>>,
    Path((artifact_id, recipient_id)): Path<(String, String)>,
) -> Response {
    match st.receipts.status_for(&artifact_id, &recipient_id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(ReceiptResponse {
                artifact_id,
                recipient_id,
                status: status.to_string(),
                changed: false,
            }),
        )
            .into_response(),
        Err(err) => refused(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "storage"),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn refused(code: StatusCode, error: String, reason: &str) -> Response {
    (
        code,
        Json(RefusedResponse {
            error,
            reason: reason.to_string(),
        }),
    )
        .into_response()
}

fn advance_refusal(err: AdvanceError) -> Response {
    match &err {
        AdvanceError::InvalidTransition { .. } => {
            refused(StatusCode::CONFLICT, err.to_string(), "invalid_transition")
        }
        AdvanceError::TerminalState { .. } => {
            refused(StatusCode::CONFLICT, err.to_string(), "terminal_state")
        }
        AdvanceError::UnknownOrder { .. } => {
            refused(StatusCode::NOT_FOUND, err.to_string(), "unknown_order")
        }
        AdvanceError::Storage(_) => {
            refused(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), "storage")
        }
    }
}
