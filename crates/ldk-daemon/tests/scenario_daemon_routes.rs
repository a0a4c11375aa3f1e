//! In-process scenario tests for ldk-daemon HTTP endpoints.
//!
//! These tests spin up the Axum router **without** binding a TCP socket.
//! Each test calls `routes::build_router` and drives it via
//! `tower::ServiceExt::oneshot`; no network I/O required.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ldk_config::DaemonConfig;
use ldk_daemon::{routes, state};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a fresh in-process router backed by a clean AppState.
fn make_state() -> Arc<state::AppState> {
    state::AppState::new(DaemonConfig::default())
}

fn router_for(st: &Arc<state::AppState>) -> axum::Router {
    routes::build_router(Arc::clone(st))
}

/// Drive the router with a single request and return (status, body_bytes).
async fn call(router: axum::Router, req: Request<axum::body::Body>) -> (StatusCode, bytes::Bytes) {
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    (status, body)
}

fn parse_json(b: bytes::Bytes) -> serde_json::Value {
    serde_json::from_slice(&b).expect("body is not valid JSON")
}

fn get(uri: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

async fn create_order(st: &Arc<state::AppState>, number: &str) -> String {
    let (status, body) = call(
        router_for(st),
        post_json("/v1/orders", serde_json::json!({ "order_number": number })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse_json(body)["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let st = make_state();
    let (status, body) = call(router_for(&st), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "ldk-daemon");
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_reports_counts_and_config_fingerprint() {
    let st = make_state();
    let (status, body) = call(router_for(&st), get("/v1/status")).await;
    assert_eq!(status, StatusCode::OK);

    let json = parse_json(body);
    assert_eq!(json["connected_sessions"], 0);
    assert_eq!(json["active_channels"], 0);
    assert_eq!(json["orders_tracked"], 0);
    assert_eq!(
        json["config_fingerprint"].as_str().unwrap().len(),
        64,
        "sha-256 hex fingerprint"
    );
}

// ---------------------------------------------------------------------------
// GET /v1/sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sessions_list_is_empty_without_connections() {
    let st = make_state();
    let (status, body) = call(router_for(&st), get("/v1/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["sessions"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// POST /v1/orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_order_starts_ordered() {
    let st = make_state();
    let (status, body) = call(
        router_for(&st),
        post_json(
            "/v1/orders",
            serde_json::json!({ "order_number": "ORD-100", "priority": "urgent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let json = parse_json(body);
    assert_eq!(json["order_number"], "ORD-100");
    assert_eq!(json["status"], "ordered");
    assert_eq!(json["priority"], "urgent");
}

#[tokio::test]
async fn duplicate_order_number_is_409() {
    let st = make_state();
    let _ = create_order(&st, "ORD-100").await;

    let (status, body) = call(
        router_for(&st),
        post_json("/v1/orders", serde_json::json!({ "order_number": "ORD-100" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["reason"], "duplicate_order_number");
}

// ---------------------------------------------------------------------------
// GET /v1/orders/:id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_order_roundtrip_and_unknown_404() {
    let st = make_state();
    let id = create_order(&st, "ORD-100").await;

    let (status, body) = call(router_for(&st), get(&format!("/v1/orders/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["order_number"], "ORD-100");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = call(router_for(&st), get(&format!("/v1/orders/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["reason"], "unknown_order");
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/advance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn advance_succeeds_then_skip_is_409() {
    let st = make_state();
    let id = create_order(&st, "ORD-100").await;

    // ordered -> sample_collected succeeds.
    let (status, body) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{id}/advance"),
            serde_json::json!({ "target_status": "sample_collected" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["previous_status"], "ordered");
    assert_eq!(json["new_status"], "sample_collected");

    // Skipping sample_received is refused with 409.
    let (status, body) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{id}/advance"),
            serde_json::json!({ "target_status": "in_progress" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["reason"], "invalid_transition");

    // The immediate successor still works afterwards.
    let (status, _) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{id}/advance"),
            serde_json::json!({ "target_status": "sample_received" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delivered_order_refuses_advance_with_terminal_state() {
    let st = make_state();
    let id = create_order(&st, "ORD-100").await;

    for target in [
        "sample_collected",
        "sample_received",
        "in_progress",
        "result_entered",
        "verified",
        "report_generated",
        "delivered",
    ] {
        let (status, _) = call(
            router_for(&st),
            post_json(
                &format!("/v1/orders/{id}/advance"),
                serde_json::json!({ "target_status": target }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "step to {target}");
    }

    let (status, body) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{id}/advance"),
            serde_json::json!({ "target_status": "delivered" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["reason"], "terminal_state");
}

#[tokio::test]
async fn advance_unknown_order_is_404() {
    let st = make_state();
    let missing = uuid::Uuid::new_v4();
    let (status, body) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{missing}/advance"),
            serde_json::json!({ "target_status": "sample_collected" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse_json(body)["reason"], "unknown_order");
}

// ---------------------------------------------------------------------------
// POST /v1/orders/:id/cancel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_then_advance_is_terminal() {
    let st = make_state();
    let id = create_order(&st, "ORD-100").await;

    let (status, body) = call(
        router_for(&st),
        post_json(&format!("/v1/orders/{id}/cancel"), serde_json::json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["new_status"], "cancelled");

    let (status, body) = call(
        router_for(&st),
        post_json(
            &format!("/v1/orders/{id}/advance"),
            serde_json::json!({ "target_status": "sample_collected" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(parse_json(body)["reason"], "terminal_state");
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn receipt_record_upgrade_then_stale_noop() {
    let st = make_state();

    // No receipt yet.
    let (status, body) = call(router_for(&st), get("/v1/artifacts/A1/receipts/R1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse_json(body)["status"], "unsent");

    // First acknowledgment: viewed.
    let (status, body) = call(
        router_for(&st),
        post_json(
            "/v1/artifacts/A1/receipts/R1",
            serde_json::json!({ "action": "viewed" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["status"], "viewed");
    assert_eq!(json["changed"], true);

    // Late "sent" retry: silent no-op, maturity stays viewed.
    let (status, body) = call(
        router_for(&st),
        post_json(
            "/v1/artifacts/A1/receipts/R1",
            serde_json::json!({ "action": "sent" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = parse_json(body);
    assert_eq!(json["status"], "viewed");
    assert_eq!(json["changed"], false);
}

// ---------------------------------------------------------------------------
// Unknown routes return 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let st = make_state();
    let (status, _) = call(router_for(&st), get("/v1/does_not_exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
