pub mod mock;
pub mod setlistfm;
pub mod spotify;

use crate::events::PlaylistCreatedEvent;
use crate::models::{PlaylistDetails, PlaylistId, RequestContext, ResolvedTrack, Setlist};
use anyhow::{anyhow, Result};
use reqwest::{RequestBuilder, Response};

/// Source of live setlists (setlist.fm).
#[async_trait::async_trait]
pub trait SetlistProvider: Send + Sync {
    /// Return a setlist of `artist` with at least `min_songs` songs, or fail.
    /// Paging and rate limiting are the provider's business.
    async fn get_setlist(&self, ctx: &RequestContext, artist: &str, min_songs: usize) -> Result<Setlist>;
}

/// Maps a song title to a track of the target music service.
#[async_trait::async_trait]
pub trait SongResolver: Send + Sync {
    /// Return the best (first) match, or a not-found error.
    async fn resolve(&self, ctx: &RequestContext, artist: &str, title: &str) -> Result<ResolvedTrack>;
}

/// Remote playlist store.
#[async_trait::async_trait]
pub trait PlaylistWriter: Send + Sync {
    async fn create_playlist(&self, ctx: &RequestContext, details: &PlaylistDetails) -> Result<PlaylistId>;

    /// Append tracks in the given order. Implementations reject an empty list.
    async fn add_tracks(&self, ctx: &RequestContext, playlist_id: &PlaylistId, tracks: &[ResolvedTrack]) -> Result<()>;
}

/// Receives an event after a playlist was created with at least one artist.
#[async_trait::async_trait]
pub trait CreationObserver: Send + Sync {
    async fn notify(&self, event: &PlaylistCreatedEvent);
}

/// Send `req` unless the request context is cancelled first.
pub(crate) async fn send_cancellable(ctx: &RequestContext, req: RequestBuilder) -> Result<Response> {
    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => Err(anyhow!("request {} cancelled", ctx.request_id)),
        resp = req.send() => Ok(resp?),
    }
}
