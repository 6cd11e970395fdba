use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::common::TransportError;

/// How long to wait for the peer's close frame after sending ours.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub(crate) enum Outbound {
    Text(String),
    Close,
}

#[derive(Debug)]
pub(crate) enum TransportEvent {
    Opened,
    Received(String),
    /// Clean shutdown, initiated by either side.
    Closed,
    Failed(TransportError),
}

/// Owns one WebSocket for its whole life: connects, forwards outbound text
/// frames, reports inbound frames in arrival order, and closes the socket
/// when asked or when the outbound queue is dropped.
pub(crate) async fn run_socket(
    url: String,
    connect_timeout: Duration,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let socket = match timeout(connect_timeout, connect_async(url.as_str())).await {
        Ok(Ok((socket, _response))) => socket,
        Ok(Err(err)) => {
            let _ = events.send(TransportEvent::Failed(TransportError::Handshake(
                err.to_string(),
            )));
            return;
        }
        Err(_) => {
            let _ = events.send(TransportEvent::Failed(TransportError::HandshakeTimeout));
            return;
        }
    };

    log::info!("Chat socket connected to {url}");
    let _ = events.send(TransportEvent::Opened);
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            request = outbound.recv() => match request {
                Some(Outbound::Text(text)) => {
                    if let Err(err) = sink.send(Message::Text(text)).await {
                        let _ = events.send(TransportEvent::Failed(TransportError::Connection(
                            err.to_string(),
                        )));
                        return;
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(err) = sink.send(Message::Close(None)).await {
                        log::debug!("Close frame not delivered: {err}");
                    }
                    let _ = timeout(CLOSE_GRACE, async {
                        while let Some(Ok(message)) = stream.next().await {
                            if message.is_close() {
                                break;
                            }
                        }
                    })
                    .await;
                    log::info!("Chat socket to {url} closed");
                    let _ = events.send(TransportEvent::Closed);
                    return;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Received(text));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    let _ = events.send(TransportEvent::Received(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    log::info!("Chat socket closed by peer: {frame:?}");
                    let _ = events.send(TransportEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = events.send(TransportEvent::Failed(TransportError::Connection(
                        err.to_string(),
                    )));
                    return;
                }
                None => {
                    let _ = events.send(TransportEvent::Failed(TransportError::Connection(
                        "stream ended".to_string(),
                    )));
                    return;
                }
            },
        }
    }
}
