//! Board reconciliation driven by raw SSE frames

use kitchen_client::stream::decode_message;
use kitchen_client::{AckStore, AlertState, KitchenBoard, SseDecoder};
use serde_json::json;
use shared::live::encode_frame;
use shared::{LiveOrderEvent, LiveOrderMessage};

const T0: i64 = 1_700_000_000_000;
const MINUTE: i64 = 60_000;

fn order_json(status: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "status": status,
        "created_at": T0,
        "updated_at": T0,
        "total": 13.0,
        "items": [{ "title": "Burger", "qty": 2, "price": 6.5 }],
    })
}

fn frame(payload: serde_json::Value) -> Vec<u8> {
    encode_frame(&payload.to_string()).into_bytes()
}

/// Feed one frame through the decoder and apply every message it yields
fn feed(decoder: &mut SseDecoder, board: &mut KitchenBoard, bytes: &[u8]) {
    for data in decoder.push(bytes) {
        if let Some(message) = decode_message(&data) {
            board.apply(&message.event);
        }
    }
}

#[test]
fn order_lifecycle_from_created_to_completed() {
    let mut decoder = SseDecoder::new();
    let mut board = KitchenBoard::new(AckStore::in_memory(48));
    assert!(board.is_empty());

    let connected = LiveOrderMessage::new(LiveOrderEvent::Connected, T0)
        .to_frame()
        .unwrap();
    feed(&mut decoder, &mut board, connected.as_bytes());
    assert!(board.is_empty());

    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_created", "ts": T0, "order": order_json("new") })),
    );
    assert_eq!(board.len(), 1);
    assert_eq!(board.orders()[0].id(), 42);
    assert_eq!(board.alert_state(), AlertState::Alarming);

    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_updated", "ts": T0, "order": order_json("preparing") })),
    );
    assert_eq!(board.len(), 1);
    assert_eq!(board.orders()[0].order.status.as_str(), "preparing");

    feed(
        &mut decoder,
        &mut board,
        &frame(json!({
            "event": "order_eta_updated",
            "ts": T0,
            "order_id": 42,
            "estimated_ready_at": T0 + 20 * MINUTE,
        })),
    );
    let entry = &board.orders()[0];
    assert_eq!(entry.order.estimated_ready_at, Some(T0 + 20 * MINUTE));
    assert_eq!(entry.order.status.as_str(), "preparing");
    assert_eq!(entry.order.items.len(), 1);
    assert_eq!(entry.order.total, 13.0);

    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_updated", "ts": T0, "order": order_json("completed") })),
    );
    assert!(board.is_empty());
    assert_eq!(board.alert_state(), AlertState::Silent);
}

#[test]
fn frames_split_mid_payload_are_reassembled() {
    let mut decoder = SseDecoder::new();
    let mut board = KitchenBoard::new(AckStore::in_memory(48));

    let bytes = frame(json!({ "event": "order_created", "ts": T0, "order": order_json("paid") }));
    let (head, tail) = bytes.split_at(bytes.len() / 2);
    feed(&mut decoder, &mut board, head);
    assert!(board.is_empty());
    feed(&mut decoder, &mut board, tail);
    assert_eq!(board.len(), 1);
}

#[test]
fn unknown_and_malformed_frames_do_not_disturb_board() {
    let mut decoder = SseDecoder::new();
    let mut board = KitchenBoard::new(AckStore::in_memory(48));
    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_created", "ts": T0, "order": order_json("new") })),
    );

    feed(&mut decoder, &mut board, b"data: {not json\n\n");
    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_refunded", "ts": T0, "order_id": 42 })),
    );
    feed(&mut decoder, &mut board, b": keep-alive\n\n");

    assert_eq!(board.len(), 1);
    assert_eq!(board.orders()[0].order.status.as_str(), "new");
}

#[test]
fn acknowledgments_persist_across_board_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acks.json");

    let mut decoder = SseDecoder::new();
    let mut board = KitchenBoard::new(AckStore::load(&path, 48, T0).unwrap());
    feed(
        &mut decoder,
        &mut board,
        &frame(json!({ "event": "order_created", "ts": T0, "order": order_json("new") })),
    );
    board.acknowledge(42, T0);
    assert_eq!(board.alert_state(), AlertState::Silent);

    // Fresh dashboard on the same device
    let mut reloaded = KitchenBoard::new(AckStore::load(&path, 48, T0 + MINUTE).unwrap());
    let order = serde_json::from_value(order_json("new")).unwrap();
    reloaded.load(vec![order]);
    assert!(reloaded.orders()[0].acknowledged);
    assert_eq!(reloaded.alert_state(), AlertState::Silent);
}
