//! One WebSocket reader task, connect through teardown.
//!
//! The task reports every transport lifecycle change to the reducer via the
//! router, forwards inbound frames for classification, and answers the
//! heartbeat. Cancellation must unblock it promptly wherever it is
//! suspended — including mid-handshake.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::router::EventRouter;
use crate::state::{ConnectionScope, TransportChange};

/// Run one connection: handshake, read loop, teardown.
///
/// Never returns an error — every failure is reported as a
/// [`TransportChange`] and absorbed locally.
pub(crate) async fn run_connection(
    url: String,
    scope: ConnectionScope,
    router: EventRouter,
    heartbeat: Duration,
    cancel: CancellationToken,
) {
    router
        .notify_transport(scope.clone(), TransportChange::Connecting)
        .await;

    let ws = tokio::select! {
        () = cancel.cancelled() => {
            debug!(?scope, "connection cancelled before handshake");
            router.notify_transport(scope, TransportChange::Closed).await;
            return;
        }
        result = connect_async(url.as_str()) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                warn!(?scope, error = %e, "websocket connect failed");
                counter!("ws_connect_failures_total").increment(1);
                router.notify_transport(scope, TransportChange::Errored).await;
                return;
            }
        }
    };

    info!(?scope, "connection established");
    counter!("ws_connections_opened_total").increment(1);
    gauge!("ws_connections_active").increment(1.0);
    router
        .notify_transport(scope.clone(), TransportChange::Opened)
        .await;

    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut ping_interval = tokio::time::interval(heartbeat);
    // Skip the immediate first tick
    let _ = ping_interval.tick().await;

    let outcome = loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break TransportChange::Closed;
            }
            _ = ping_interval.tick() => {
                if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break TransportChange::Errored;
                }
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => router.route_frame(text.as_str()).await,
                Some(Ok(Message::Binary(data))) => {
                    // Some producers frame JSON as binary.
                    match std::str::from_utf8(&data) {
                        Ok(text) => router.route_frame(text).await,
                        Err(_) => debug!(?scope, len = data.len(), "dropping non-UTF8 binary frame"),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!(?scope, "peer closed connection");
                    break TransportChange::Closed;
                }
                // Pings are answered by the protocol layer on the next flush.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(?scope, error = %e, "websocket read failed");
                    break TransportChange::Errored;
                }
            }
        }
    };

    gauge!("ws_connections_active").decrement(1.0);
    router.notify_transport(scope, outcome).await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
