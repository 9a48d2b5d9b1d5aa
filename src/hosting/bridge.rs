use super::Arena;
use super::JoinQuery;
use crate::error::ApiError;
use crate::event::GameEvent;
use crate::operator::OperatorBus;
use crate::operator::OperatorEvent;
use crate::registry::Outbox;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::web;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

/// WebSocket ingress for the game channel:
/// `/ws/gomoku/{roomId}?playerId=...`. The actix session types stay in
/// this file; everything past the upgrade talks through the outbox.
pub async fn join(
    arena: web::Data<Arena>,
    path: web::Path<String>,
    query: web::Query<JoinQuery>,
    body: web::Payload,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let room = path.into_inner();
    let (response, session, stream) =
        actix_ws::handle(&req, body).map_err(|e| ApiError::Internal(e.to_string()))?;
    let (socket_id, outbox) = arena.attach_socket(&room, &query.player_id).await?;
    let heartbeat = arena.config.heartbeat;
    let arena = arena.into_inner();
    actix_web::rt::spawn(async move {
        pump(arena, socket_id, outbox, session, stream, heartbeat).await;
    });
    Ok(response)
}

/// One task per game socket: drains the outbox to the peer, feeds
/// inbound frames to the arena, and heartbeats on the side. Exits
/// clean on close, error, or a reaped outbox, and always detaches.
async fn pump(
    arena: Arc<Arena>,
    socket_id: String,
    outbox: Arc<Outbox>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
    heartbeat: Duration,
) {
    let mut beat = tokio::time::interval(heartbeat);
    beat.tick().await;
    'sesh: loop {
        tokio::select! {
            biased;
            payload = outbox.next() => match payload {
                Some(json) => if session.text(json).await.is_err() { break 'sesh },
                None => break 'sesh,
            },
            frame = stream.next() => match frame {
                Some(Ok(actix_ws::Message::Text(text))) => arena.inbound(&socket_id, &text).await,
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    arena.touch_socket(&socket_id).await;
                    if session.pong(&bytes).await.is_err() { break 'sesh }
                }
                Some(Ok(actix_ws::Message::Pong(_))) => arena.touch_socket(&socket_id).await,
                Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                Some(Err(_)) => break 'sesh,
                None => break 'sesh,
                _ => continue 'sesh,
            },
            _ = beat.tick() => {
                outbox.push(GameEvent::Ping.envelope(None, None), false);
                // protocol ping too: a silent but healthy client pongs
                // and stays off the reaper's stale list
                if session.ping(b"").await.is_err() { break 'sesh }
            }
        }
    }
    let _ = session.close(None).await;
    arena.detach_socket(&socket_id).await;
}

/// WebSocket ingress for the operator channel at `/admin`. Tracked in
/// the bus's own socket set, fully apart from game rooms.
pub async fn admin(
    bus: web::Data<OperatorBus>,
    body: web::Payload,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let (response, session, stream) =
        actix_ws::handle(&req, body).map_err(|e| ApiError::Internal(e.to_string()))?;
    let (socket_id, outbox) = bus.attach().await;
    let bus = bus.into_inner();
    actix_web::rt::spawn(async move {
        operate(bus, socket_id, outbox, session, stream).await;
    });
    Ok(response)
}

async fn operate(
    bus: Arc<OperatorBus>,
    socket_id: String,
    outbox: Arc<Outbox>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let mut beat = tokio::time::interval(Duration::from_secs(crate::HEARTBEAT_SECS));
    beat.tick().await;
    'sesh: loop {
        tokio::select! {
            biased;
            payload = outbox.next() => match payload {
                Some(json) => if session.text(json).await.is_err() { break 'sesh },
                None => break 'sesh,
            },
            frame = stream.next() => match frame {
                Some(Ok(actix_ws::Message::Text(text))) => {
                    let is_ping = serde_json::from_str::<serde_json::Value>(&text)
                        .ok()
                        .is_some_and(|v| v["type"] == "ping");
                    if is_ping {
                        outbox.push(OperatorEvent::Ping.envelope(), false);
                    }
                }
                Some(Ok(actix_ws::Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() { break 'sesh }
                }
                Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                Some(Err(_)) => break 'sesh,
                None => break 'sesh,
                _ => continue 'sesh,
            },
            _ = beat.tick() => {
                outbox.push(OperatorEvent::Ping.envelope(), false);
                if session.ping(b"").await.is_err() { break 'sesh }
            }
        }
    }
    let _ = session.close(None).await;
    bus.detach(&socket_id).await;
}
