use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use kitchen_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> (Router, ServerState) {
    let config = Config::with_overrides(0);
    let state = ServerState::initialize(&config);
    (build_app(state.clone()), state)
}

/// Read the next `data:` payload from an SSE body, skipping keep-alive comments
async fn next_data(body: &mut Body) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
            .await
            .expect("timed out waiting for SSE frame")
            .expect("stream ended")
            .expect("body error");
        let Ok(bytes) = frame.into_data() else { continue };
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        if let Some(line) = text.lines().find_map(|l| l.strip_prefix("data: ")) {
            return serde_json::from_str(line).unwrap();
        }
    }
}

async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice::<Value>(&bytes).unwrap()["data"].clone()
}

#[tokio::test]
async fn stream_starts_with_connected_then_delivers_events() {
    let (app, state) = app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/live-orders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let mut body = response.into_body();

    let connected = next_data(&mut body).await;
    assert_eq!(connected["event"], "connected");
    assert!(connected["ts"].as_i64().unwrap() > 0);
    assert_eq!(state.live.subscriber_count(), 1);

    let order = post(
        &app,
        "/api/orders",
        json!({"items": [{"title": "Burger", "qty": 2, "price": 6.5}]}),
    )
    .await;
    let created = next_data(&mut body).await;
    assert_eq!(created["event"], "order_created");
    assert_eq!(created["order"], order);

    let id = order["id"].as_i64().unwrap();
    post(&app, &format!("/api/orders/{id}/adjust-eta"), json!({"delta_minutes": -2})).await;
    let eta = next_data(&mut body).await;
    assert_eq!(eta["event"], "order_eta_updated");
    assert_eq!(eta["order_id"], id);

    post(&app, &format!("/api/orders/{id}/cancel"), json!({})).await;
    let cancelled = next_data(&mut body).await;
    assert_eq!(cancelled["event"], "order_cancelled");
    assert_eq!(cancelled["status"], "cancelled");

    drop(body);
    assert_eq!(state.live.subscriber_count(), 0);
}

#[tokio::test]
async fn every_stream_receives_the_same_event() {
    let (app, state) = app();

    let mut bodies = Vec::new();
    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::get("/api/live-orders").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let mut body = response.into_body();
        assert_eq!(next_data(&mut body).await["event"], "connected");
        bodies.push(body);
    }
    assert_eq!(state.live.subscriber_count(), 3);

    let order = post(&app, "/api/orders", json!({"items": [{"title": "Soup", "price": 3.0}]})).await;

    for body in &mut bodies {
        let event = next_data(body).await;
        assert_eq!(event["event"], "order_created");
        assert_eq!(event["order"]["id"], order["id"]);
    }
}

#[tokio::test]
async fn shutdown_ends_open_streams() {
    let (app, state) = app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/live-orders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let mut body = response.into_body();
    assert_eq!(next_data(&mut body).await["event"], "connected");

    state.live.shutdown();

    let end = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match body.frame().await {
                None => break,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("body error: {e}"),
            }
        }
    })
    .await;
    assert!(end.is_ok(), "stream should end after shutdown");
}
