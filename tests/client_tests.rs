#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
//! Integration-style client tests for the Connect Four client.
//!
//! Uses the shared `MockTransport` and `RecordingBoard` from `tests/common`
//! to script server events and verify what the session sends, renders and
//! closes.

mod common;

use std::sync::Arc;
use std::time::Duration;

use connect_four_client::{
    ClickTarget, ClientEvent, CloseCode, GameClient, GameClientError, GameConfig, InviteLinks,
    Role, Transport,
};

use common::{
    error_json, init_json, play_json, win_json, BoardCall, MockTransport, RecordingBoard,
    TransportLog,
};

// ════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════

/// Start a client for `query` with scripted server frames and no message delay.
fn start_client(
    query: &str,
    frames: &[String],
) -> (
    GameClient,
    tokio::sync::mpsc::Receiver<ClientEvent>,
    Arc<RecordingBoard>,
    TransportLog,
) {
    let (transport, log) = MockTransport::with_frames(frames);
    let board = RecordingBoard::new();
    let config = GameConfig::from_query(query).with_message_delay(Duration::ZERO);
    let (client, events) = GameClient::start(transport, config, Arc::clone(&board));
    (client, events, board, log)
}

/// Let the session drain queued frames and commands.
///
/// Every test runs on a paused clock, so this sleep only completes once the
/// session task has nothing left to do.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

async fn expect_connected(events: &mut tokio::sync::mpsc::Receiver<ClientEvent>) {
    let ev = events.recv().await.expect("expected Connected event");
    assert_eq!(ev, ClientEvent::Connected);
}

// ════════════════════════════════════════════════════════════════════
// Role announcement
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn creator_announces_bare_init() {
    let (mut client, mut events, _board, log) = start_client("", &[]);
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(log.sent(), vec![r#"{"type":"init"}"#.to_string()]);
    assert_eq!(client.role(), &Role::Create);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn joiner_announces_join_token() {
    let (mut client, mut events, _board, log) = start_client("?join=abc123", &[]);
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(
        log.sent(),
        vec![r#"{"type":"init","join":"abc123"}"#.to_string()]
    );
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn spectator_announces_watch_token() {
    let (mut client, mut events, _board, log) = start_client("?watch=xyz789", &[]);
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(
        log.sent(),
        vec![r#"{"type":"init","watch":"xyz789"}"#.to_string()]
    );
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn init_is_sent_once_even_with_traffic() {
    let frames = vec![init_json("j1", "w1"), play_json("red", 3, 0)];
    let (mut client, mut events, _board, log) = start_client("", &frames);
    expect_connected(&mut events).await;
    client.click(&ClickTarget::column("2")).unwrap();
    settle().await;

    let sent = log.sent();
    let inits = sent.iter().filter(|m| m.contains(r#""type":"init""#)).count();
    assert_eq!(inits, 1);
    assert_eq!(sent[0], r#"{"type":"init"}"#);
    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Click relay
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn click_on_cell_sends_play() {
    let (mut client, mut events, _board, log) = start_client("", &[]);
    expect_connected(&mut events).await;

    assert!(client.click(&ClickTarget::column("3")).unwrap());
    settle().await;

    assert_eq!(log.sent()[1], r#"{"type":"play","column":3}"#);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn click_on_decoration_sends_nothing() {
    let (mut client, mut events, _board, log) = start_client("?join=abc", &[]);
    expect_connected(&mut events).await;

    assert!(!client.click(&ClickTarget::decoration()).unwrap());
    assert!(!client.click(&ClickTarget::column("left")).unwrap());
    settle().await;

    assert_eq!(log.sent().len(), 1);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn spectator_clicks_never_send() {
    let (mut client, mut events, _board, log) = start_client("?watch=xyz789", &[]);
    expect_connected(&mut events).await;

    for target in [
        ClickTarget::column("0"),
        ClickTarget::column("3"),
        ClickTarget::column("6"),
        ClickTarget::decoration(),
    ] {
        assert!(!client.click(&target).unwrap());
    }
    settle().await;

    assert_eq!(
        log.sent(),
        vec![r#"{"type":"init","watch":"xyz789"}"#.to_string()]
    );
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn column_bounds_are_left_to_the_server() {
    let (mut client, mut events, _board, log) = start_client("", &[]);
    expect_connected(&mut events).await;

    assert!(client.click(&ClickTarget::column("42")).unwrap());
    assert!(client.click(&ClickTarget::column("-1")).unwrap());
    settle().await;

    assert_eq!(log.sent()[1], r#"{"type":"play","column":42}"#);
    assert_eq!(log.sent()[2], r#"{"type":"play","column":-1}"#);
    client.shutdown().await;
}

// ════════════════════════════════════════════════════════════════════
// Inbound dispatch
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn init_event_updates_invite_links_only() {
    let (mut client, mut events, board, log) = start_client("", &[init_json("j1", "w1")]);
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(
        board.calls(),
        vec![BoardCall::InviteLinks(InviteLinks {
            join_href: "?join=j1".into(),
            watch_href: "?watch=w1".into(),
        })]
    );
    assert_eq!(log.sent().len(), 1);
    assert!(log.closes().is_empty());
    assert!(client.is_connected());
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn play_events_render_in_arrival_order() {
    let frames = vec![
        play_json("red", 3, 0),
        play_json("yellow", 3, 1),
        play_json("red", 4, 0),
    ];
    let (mut client, mut events, board, _log) = start_client("", &frames);
    expect_connected(&mut events).await;
    settle().await;

    let expected: Vec<BoardCall> = [("red", 3, 0), ("yellow", 3, 1), ("red", 4, 0)]
        .into_iter()
        .map(|(player, column, row)| BoardCall::PlayMove {
            player: player.into(),
            column,
            row,
        })
        .collect();
    assert_eq!(board.calls(), expected);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn error_event_shows_message_and_keeps_playing() {
    let frames = vec![error_json("This slot is full."), play_json("red", 0, 0)];
    let (mut client, mut events, board, log) = start_client("", &frames);
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(
        board.calls(),
        vec![
            BoardCall::Message("This slot is full.".into()),
            BoardCall::PlayMove {
                player: "red".into(),
                column: 0,
                row: 0,
            },
        ]
    );
    assert!(log.closes().is_empty());
    assert!(client.is_connected());
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn win_event_announces_and_closes_once() {
    let frames = vec![
        play_json("red", 3, 0),
        win_json("red"),
        // Never processed: the session stops after the win.
        play_json("yellow", 2, 0),
    ];
    let (client, mut events, board, log) = start_client("", &frames);
    expect_connected(&mut events).await;

    let ev = events.recv().await.unwrap();
    assert_eq!(
        ev,
        ClientEvent::Disconnected {
            reason: Some("game over".into())
        }
    );
    assert!(events.recv().await.is_none());

    assert_eq!(log.closes(), vec![CloseCode::NORMAL]);
    assert_eq!(
        board.calls(),
        vec![
            BoardCall::PlayMove {
                player: "red".into(),
                column: 3,
                row: 0,
            },
            BoardCall::Message("Player red wins!".into()),
        ]
    );
    assert!(!client.is_connected());
    assert!(matches!(
        client.click(&ClickTarget::column("1")),
        Err(GameClientError::NotConnected)
    ));
}

#[tokio::test(start_paused = true)]
async fn win_message_is_deferred_but_close_is_not() {
    let (transport, log) = MockTransport::with_frames(&[win_json("yellow")]);
    let board = RecordingBoard::new();
    let (_client, mut events) =
        GameClient::start(transport, GameConfig::default(), Arc::clone(&board));

    expect_connected(&mut events).await;
    assert!(matches!(
        events.recv().await,
        Some(ClientEvent::Disconnected { .. })
    ));
    assert_eq!(log.closes(), vec![CloseCode::NORMAL]);
    assert!(board.calls().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        board.calls(),
        vec![BoardCall::Message("Player yellow wins!".into())]
    );
}

// ════════════════════════════════════════════════════════════════════
// Protocol faults
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn unknown_event_type_is_reported_and_skipped() {
    let frames = vec![
        r#"{"type":"resign","player":"red"}"#.to_string(),
        play_json("red", 3, 0),
    ];
    let (mut client, mut events, board, log) = start_client("", &frames);
    expect_connected(&mut events).await;

    match events.recv().await.unwrap() {
        ClientEvent::Fault { error } => assert!(error.contains("resign"), "{error}"),
        other => panic!("expected Fault, got {other:?}"),
    }
    settle().await;

    assert_eq!(
        board.calls(),
        vec![BoardCall::PlayMove {
            player: "red".into(),
            column: 3,
            row: 0,
        }]
    );
    assert!(events.try_recv().is_err());
    assert!(log.closes().is_empty());
    assert!(client.is_connected());

    // The connection still carries moves.
    assert!(client.click(&ClickTarget::column("4")).unwrap());
    settle().await;
    assert_eq!(log.sent()[1], r#"{"type":"play","column":4}"#);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn malformed_frame_is_reported_and_skipped() {
    let frames = vec!["{not json".to_string(), error_json("Not your turn.")];
    let (mut client, mut events, board, log) = start_client("", &frames);
    expect_connected(&mut events).await;

    assert!(matches!(
        events.recv().await,
        Some(ClientEvent::Fault { .. })
    ));
    settle().await;

    assert_eq!(board.calls(), vec![BoardCall::Message("Not your turn.".into())]);
    assert!(log.closes().is_empty());
    assert!(client.is_connected());
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn win_after_fault_still_closes() {
    let frames = vec![r#"{"type":"draw"}"#.to_string(), win_json("red")];
    let (_client, mut events, board, log) = start_client("", &frames);
    expect_connected(&mut events).await;

    assert!(matches!(
        events.recv().await,
        Some(ClientEvent::Fault { .. })
    ));
    assert_eq!(
        events.recv().await.unwrap(),
        ClientEvent::Disconnected {
            reason: Some("game over".into())
        }
    );
    assert_eq!(log.closes(), vec![CloseCode::NORMAL]);
    assert_eq!(board.calls(), vec![BoardCall::Message("Player red wins!".into())]);
}

// ════════════════════════════════════════════════════════════════════
// Transport lifecycle
// ════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn server_close_ends_session_without_reason() {
    let (transport, log) = MockTransport::new(vec![None]);
    let (client, mut events) = GameClient::start(
        transport,
        GameConfig::default(),
        RecordingBoard::new(),
    );
    expect_connected(&mut events).await;

    assert_eq!(
        events.recv().await.unwrap(),
        ClientEvent::Disconnected { reason: None }
    );
    assert!(log.closes().is_empty());
    assert!(!client.is_connected());
}

#[tokio::test(start_paused = true)]
async fn transport_error_ends_session_with_reason() {
    let (transport, _log) = MockTransport::new(vec![Some(Err(
        GameClientError::TransportReceive("connection reset".into()),
    ))]);
    let (_client, mut events) = GameClient::start(
        transport,
        GameConfig::default(),
        RecordingBoard::new(),
    );
    expect_connected(&mut events).await;

    match events.recv().await.unwrap() {
        ClientEvent::Disconnected { reason: Some(reason) } => {
            assert!(reason.contains("connection reset"), "{reason}");
        }
        other => panic!("expected Disconnected with reason, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_going_away() {
    let (mut client, mut events, _board, log) = start_client("", &[]);
    expect_connected(&mut events).await;

    client.shutdown().await;

    assert_eq!(log.closes(), vec![CloseCode::GOING_AWAY]);
    assert_eq!(
        events.recv().await.unwrap(),
        ClientEvent::Disconnected {
            reason: Some("client shut down".into())
        }
    );
    assert!(!client.is_connected());
    assert!(matches!(
        client.click(&ClickTarget::column("0")),
        Err(GameClientError::NotConnected)
    ));
}

#[tokio::test(start_paused = true)]
async fn boxed_transport_is_accepted() {
    let (transport, log) = MockTransport::with_frames(&[]);
    let boxed: Box<dyn Transport> = Box::new(transport);
    let (mut client, mut events) =
        GameClient::start(boxed, GameConfig::from_query("?join=j"), RecordingBoard::new());
    expect_connected(&mut events).await;
    settle().await;

    assert_eq!(log.sent(), vec![r#"{"type":"init","join":"j"}"#.to_string()]);
    client.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn debug_output_names_role() {
    let (mut client, mut events, _board, _log) = start_client("?watch=w", &[]);
    expect_connected(&mut events).await;

    let debug = format!("{client:?}");
    assert!(debug.contains("GameClient"));
    assert!(debug.contains("Watch"));
    client.shutdown().await;
}
