// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live occupancy streaming.
//!
//! Every recorded or deleted check-in and every location write publishes a
//! fresh [`LocationSnapshot`]. Subscribers receive snapshots published after
//! they subscribed; there is no replay and no durability.
//!
//! # Transports
//!
//! - Server-sent events for all locations (staff dashboards)
//! - Server-sent events for one location (public kiosk displays), starting
//!   with the current snapshot
//! - A WebSocket carrying the same snapshots, optionally filtered by name

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{
        Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use checkin_api::{AuthorizationService, get_location_by_name};
use checkin_domain::{LocationSnapshot, normalize_location_name};
use futures::SinkExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::broadcast;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::error::HttpError;
use crate::extract::{Path, Query};
use crate::session::SessionActor;

/// Maximum number of snapshots buffered per subscriber.
/// A subscriber that falls further behind skips the oldest snapshots.
const EVENT_BUFFER_SIZE: usize = 256;

/// Messages sent over the live WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
    /// A location's occupancy changed.
    Snapshot(LocationSnapshot),
}

/// Broadcaster for location snapshots.
///
/// A thin wrapper around `tokio::sync::broadcast`; cloning shares the
/// channel.
#[derive(Clone)]
pub struct OccupancyBroadcaster {
    tx: broadcast::Sender<LocationSnapshot>,
}

impl OccupancyBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Publishes a snapshot to every current subscriber.
    ///
    /// Never blocks. With no subscribers the snapshot is dropped.
    pub fn publish(&self, snapshot: LocationSnapshot) {
        let name: String = snapshot.name.clone();
        match self.tx.send(snapshot) {
            Ok(receivers) => {
                debug!(location = %name, receivers, "Published location snapshot");
            }
            Err(_) => {
                debug!(location = %name, "No subscribers for location snapshot");
            }
        }
    }

    /// Raw receiver for every future snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationSnapshot> {
        self.tx.subscribe()
    }

    /// Endless stream of every future snapshot.
    ///
    /// A subscriber that lags behind skips the missed snapshots and keeps
    /// receiving.
    pub fn subscribe_all(&self) -> impl Stream<Item = LocationSnapshot> + Send + use<> {
        BroadcastStream::new(self.subscribe()).filter_map(|item| match item {
            Ok(snapshot) => Some(snapshot),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Live subscriber lagged; skipping snapshots");
                None
            }
        })
    }

    /// Endless stream of future snapshots for one normalized location name.
    pub fn subscribe_one(
        &self,
        normalized_name: String,
    ) -> impl Stream<Item = LocationSnapshot> + Send + use<> {
        self.subscribe_all()
            .filter(move |snapshot| snapshot.name == normalized_name)
    }

    #[cfg(test)]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for OccupancyBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn sse_event(snapshot: &LocationSnapshot) -> Option<Event> {
    Event::default()
        .event("snapshot")
        .json_data(snapshot)
        .map_err(|e| error!(error = %e, "Failed to serialize snapshot"))
        .ok()
}

fn into_sse<S>(snapshots: S) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = LocationSnapshot> + Send + 'static,
{
    let events = snapshots
        .filter_map(|snapshot| sse_event(&snapshot))
        .map(Ok::<Event, Infallible>);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handler for GET `/live/locations`.
///
/// Streams snapshots of every location to Admin and Manager actors.
pub async fn handle_live_all(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HttpError> {
    AuthorizationService::authorize_view_locations(&actor)?;
    info!(username = %actor.username, "Dashboard subscribed to live locations");
    Ok(into_sse(app_state.broadcaster.subscribe_all()))
}

/// Handler for GET `/live/locations/{name}`.
///
/// Public kiosk stream. Sends the current snapshot first, then every change.
pub async fn handle_live_one(
    AxumState(app_state): AxumState<AppState>,
    Path(name): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HttpError> {
    let normalized: String = normalize_location_name(&name);
    // Subscribe before reading so no change between the read and the
    // subscription is lost.
    let updates = app_state.broadcaster.subscribe_one(normalized.clone());

    let mut persistence = app_state.persistence.lock().await;
    let current: LocationSnapshot =
        get_location_by_name(&mut persistence, &app_state.config, &normalized)?;
    drop(persistence);

    info!(location = %normalized, "Kiosk subscribed to live location");
    Ok(into_sse(tokio_stream::once(current).chain(updates)))
}

/// Query parameters for the live WebSocket.
#[derive(Debug, Deserialize)]
pub struct LiveSocketQuery {
    /// Restricts the stream to one location.
    pub name: Option<String>,
}

/// Handler for GET `/ws/locations`.
///
/// Upgrades to a WebSocket that streams snapshots to authenticated actors.
/// The session is checked before the upgrade, so an anonymous request is
/// answered with 401 whether or not it asks to upgrade.
pub async fn handle_live_socket(
    SessionActor(actor): SessionActor,
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<LiveSocketQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let filter: Option<String> = query.name.as_deref().map(normalize_location_name);
    info!(username = %actor.username, filter = ?filter, "Live socket requested");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state.broadcaster, filter))
}

async fn handle_socket(
    socket: WebSocket,
    broadcaster: OccupancyBroadcaster,
    filter: Option<String>,
) {
    let (mut sender, mut receiver) = futures::StreamExt::split(socket);
    let mut snapshots = Box::pin(broadcaster.subscribe_all().filter(move |snapshot| {
        filter
            .as_deref()
            .is_none_or(|name| snapshot.name == name)
    }));

    let connected: LiveMessage = LiveMessage::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(snapshot) = snapshots.next().await {
            match serde_json::to_string(&LiveMessage::Snapshot(snapshot)) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live message");
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    debug!("Ignoring message from live client");
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    debug!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    debug!("Live socket closed");
}
