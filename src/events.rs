use crate::api::CreationObserver;
use crate::models::{CreationStatus, PlaylistId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistCreationStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "partial_error")]
    PartialError,
}

impl From<CreationStatus> for PlaylistCreationStatus {
    fn from(s: CreationStatus) -> Self {
        match s {
            CreationStatus::Success => PlaylistCreationStatus::Ok,
            CreationStatus::PartialFailure => PlaylistCreationStatus::PartialError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistKind {
    Spotify,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: PlaylistId,
    pub name: String,
    pub artists: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PlaylistKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistCreatedEvent {
    pub playlist: CreatedPlaylist,
    pub status: PlaylistCreationStatus,
    pub created_at: DateTime<Utc>,
}

impl PlaylistCreatedEvent {
    pub fn new(playlist_id: PlaylistId, name: &str, artists: &[String], status: CreationStatus) -> Self {
        Self {
            playlist: CreatedPlaylist {
                id: playlist_id,
                name: name.to_string(),
                artists: artists.to_vec(),
                kind: PlaylistKind::Spotify,
            },
            status: status.into(),
            created_at: Utc::now(),
        }
    }
}

/// Drops every event.
pub struct NoopObserver;

#[async_trait::async_trait]
impl CreationObserver for NoopObserver {
    async fn notify(&self, _event: &PlaylistCreatedEvent) {}
}

/// Writes every event as a JSON line to the log.
pub struct LoggingObserver;

#[async_trait::async_trait]
impl CreationObserver for LoggingObserver {
    async fn notify(&self, event: &PlaylistCreatedEvent) {
        match serde_json::to_string(event) {
            Ok(json) => info!(target: "playlist_events", "{}", json),
            Err(e) => warn!("could not serialize playlist created event for {}: {}", event.playlist.id, e),
        }
    }
}
