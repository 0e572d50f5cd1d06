use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Name, description and visibility of the playlist to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool { true }

/// Remote playlist id handed out by the playlist writer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetlistSong {
    pub title: String,
}

impl SetlistSong {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

/// One performance of an artist, songs in the order they were played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setlist {
    pub artist: String,
    /// Source reference (e.g. the setlist.fm page of the concert).
    pub url: String,
    pub songs: Vec<SetlistSong>,
}

impl Setlist {
    pub fn new(artist: impl Into<String>, songs: Vec<SetlistSong>, url: impl Into<String>) -> Self {
        Self { artist: artist.into(), url: url.into(), songs }
    }
}

/// Catalog reference of a track in the target music service (a URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedTrack {
    pub uri: String,
}

impl ResolvedTrack {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Result of resolving the song at position `rank` of a setlist.
#[derive(Debug)]
pub struct FetchOutcome {
    pub rank: usize,
    pub result: anyhow::Result<ResolvedTrack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationStatus {
    Success,
    PartialFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistCreationResult {
    pub playlist_id: PlaylistId,
    pub status: CreationStatus,
}

/// Request-scoped values forwarded untouched to every collaborator call.
///
/// The orchestration layer never reads it; clients use the bearer token and
/// may observe the cancellation token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub access_token: Option<String>,
    pub cancel: CancellationToken,
}

impl RequestContext {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            access_token,
            cancel: CancellationToken::new(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn bearer(&self) -> anyhow::Result<String> {
        match self.access_token.as_deref() {
            Some(t) if !t.is_empty() => Ok(format!("Bearer {}", t)),
            _ => Err(anyhow::anyhow!("no access token in request context")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_requires_non_empty_token() {
        assert!(RequestContext::anonymous().bearer().is_err());
        assert!(RequestContext::new(Some(String::new())).bearer().is_err());
        assert_eq!(RequestContext::new(Some("abc".into())).bearer().unwrap(), "Bearer abc");
    }

    #[test]
    fn creation_status_serializes_snake_case() {
        let s = serde_json::to_string(&CreationStatus::PartialFailure).unwrap();
        assert_eq!(s, "\"partial_failure\"");
    }
}
