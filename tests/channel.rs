mod common;

use std::time::Duration;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::routing::get;
use tokio::sync::mpsc;
use tokio::time::timeout;

use feed_chat_client::common::{ChannelError, ChannelState, Origin, TransportError};
use feed_chat_client::network::{ChannelEvent, RealtimeChannel};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const STEP: Duration = Duration::from_secs(3);

async fn echo(mut socket: WebSocket) {
    while let Some(Ok(message)) = socket.recv().await {
        match message {
            WsMessage::Text(text) => {
                if socket.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => {
                let _ = socket.send(WsMessage::Close(None)).await;
                break;
            }
            _ => {}
        }
    }
}

async fn chat_url(router: Router) -> String {
    let addr = common::serve(router).await;
    format!("ws://{addr}/ws")
}

async fn echo_url() -> String {
    chat_url(Router::new().route(
        "/ws",
        get(|ws: WebSocketUpgrade| async move { ws.on_upgrade(echo) }),
    ))
    .await
}

async fn next(channel: &mut RealtimeChannel) -> ChannelEvent {
    timeout(STEP, channel.next_event())
        .await
        .expect("channel event in time")
        .expect("channel has a live connection")
}

async fn opened(url: String) -> RealtimeChannel {
    let mut channel = RealtimeChannel::new(url, CONNECT_TIMEOUT);
    channel.open();
    assert_eq!(next(&mut channel).await, ChannelEvent::Opened);
    channel
}

#[tokio::test]
async fn echo_round_trip_then_close() {
    let mut channel = opened(echo_url().await).await;
    assert_eq!(channel.state(), ChannelState::Open);

    assert_eq!(channel.send("hello"), Ok(1));
    assert_eq!(channel.transcript().len(), 1);
    assert_eq!(channel.transcript()[0].origin, Origin::Local);

    match next(&mut channel).await {
        ChannelEvent::Message(message) => {
            assert_eq!(message.origin, Origin::Remote);
            assert_eq!(message.text, "hello");
            assert_eq!(message.sequence, 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    channel.close().await;
    assert_eq!(channel.state(), ChannelState::Closed);
    assert!(channel.transcript().is_empty());
    assert_eq!(
        channel.send("anyone there?"),
        Err(ChannelError::NotConnected(ChannelState::Closed))
    );
}

#[tokio::test]
async fn open_is_idempotent_while_active() {
    let mut channel = RealtimeChannel::new(echo_url().await, CONNECT_TIMEOUT);
    channel.open();
    let session = channel.session_id();
    channel.open();
    assert_eq!(channel.state(), ChannelState::Connecting);
    assert_eq!(channel.session_id(), session);
    assert_eq!(
        channel.send("too early"),
        Err(ChannelError::NotConnected(ChannelState::Connecting))
    );

    assert_eq!(next(&mut channel).await, ChannelEvent::Opened);
    channel.open();
    assert_eq!(channel.state(), ChannelState::Open);
    assert_eq!(channel.session_id(), session);

    channel.close().await;
}

#[tokio::test]
async fn inbound_messages_keep_arrival_order() {
    let url = chat_url(Router::new().route(
        "/ws",
        get(|ws: WebSocketUpgrade| async move {
            ws.on_upgrade(|mut socket: WebSocket| async move {
                for text in ["one", "two", "three"] {
                    if socket.send(WsMessage::Text(text.to_string())).await.is_err() {
                        return;
                    }
                }
                echo(socket).await;
            })
        }),
    ))
    .await;
    let mut channel = opened(url).await;

    let mut received = Vec::new();
    for _ in 0..3 {
        match next(&mut channel).await {
            ChannelEvent::Message(message) => received.push((message.sequence, message.text)),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    assert_eq!(
        received,
        vec![
            (1, "one".to_string()),
            (2, "two".to_string()),
            (3, "three".to_string())
        ]
    );

    channel.close().await;
}

#[tokio::test]
async fn handshake_failure_marks_channel_failed() {
    let addr = common::closed_addr().await;
    let mut channel = RealtimeChannel::new(format!("ws://{addr}/ws"), CONNECT_TIMEOUT);
    let states = channel.subscribe();

    channel.open();
    assert_eq!(*states.borrow(), ChannelState::Connecting);
    assert!(matches!(
        next(&mut channel).await,
        ChannelEvent::Failed(TransportError::Handshake(_))
    ));
    assert_eq!(channel.state(), ChannelState::Failed);
    assert_eq!(*states.borrow(), ChannelState::Failed);
    assert_eq!(
        channel.send("hello"),
        Err(ChannelError::NotConnected(ChannelState::Failed))
    );

    // a failed channel needs an explicit reopen
    channel.open();
    assert_eq!(channel.state(), ChannelState::Connecting);
    channel.close().await;
    assert_eq!(channel.state(), ChannelState::Closed);
}

#[tokio::test]
async fn dropped_connection_fails_the_channel() {
    let url = chat_url(Router::new().route(
        "/ws",
        get(|ws: WebSocketUpgrade| async move {
            ws.on_upgrade(|mut socket: WebSocket| async move {
                // hang up without a close frame after the first message
                let _ = socket.recv().await;
            })
        }),
    ))
    .await;
    let mut channel = opened(url).await;

    assert_eq!(channel.send("bye"), Ok(1));
    assert!(matches!(
        next(&mut channel).await,
        ChannelEvent::Failed(TransportError::Connection(_))
    ));
    assert_eq!(channel.state(), ChannelState::Failed);
    assert_eq!(channel.transcript().len(), 1);
}

#[tokio::test]
async fn peer_close_ends_the_channel() {
    let url = chat_url(Router::new().route(
        "/ws",
        get(|ws: WebSocketUpgrade| async move {
            ws.on_upgrade(|mut socket: WebSocket| async move {
                let _ = socket.send(WsMessage::Close(None)).await;
                let _ = socket.recv().await;
            })
        }),
    ))
    .await;
    let mut channel = opened(url).await;

    assert_eq!(next(&mut channel).await, ChannelEvent::Closed);
    assert_eq!(channel.state(), ChannelState::Closed);
    assert_eq!(channel.next_event().await, None);
}

#[tokio::test]
async fn dropping_the_channel_releases_the_socket() {
    let (gone_tx, mut gone_rx) = mpsc::unbounded_channel::<()>();
    let url = chat_url(Router::new().route(
        "/ws",
        get(move |ws: WebSocketUpgrade| {
            let gone_tx = gone_tx.clone();
            async move {
                ws.on_upgrade(move |socket: WebSocket| async move {
                    echo(socket).await;
                    let _ = gone_tx.send(());
                })
            }
        }),
    ))
    .await;

    let channel = opened(url).await;
    drop(channel);

    timeout(STEP, gone_rx.recv())
        .await
        .expect("server saw the socket go away")
        .expect("notifier alive");
}
