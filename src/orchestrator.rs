use crate::api::{CreationObserver, PlaylistWriter};
use crate::assembler::SetlistAssembler;
use crate::error::{ArtistError, PlaylistError};
use crate::events::{NoopObserver, PlaylistCreatedEvent};
use crate::models::{CreationStatus, PlaylistCreationResult, PlaylistDetails, PlaylistId, RequestContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Map per-artist failure counts to an outcome. `None` means every artist failed.
pub fn classify_outcome(failures: usize, total: usize) -> Option<CreationStatus> {
    if failures >= total {
        None
    } else if failures == 0 {
        Some(CreationStatus::Success)
    } else {
        Some(CreationStatus::PartialFailure)
    }
}

/// Creates (or extends) a playlist and fills it artist by artist.
///
/// Artists are processed one at a time with `inter_artist_delay` between
/// them, which keeps the setlist lookups under the provider's rate limit.
pub struct PlaylistOrchestrator {
    writer: Arc<dyn PlaylistWriter>,
    assembler: SetlistAssembler,
    observer: Arc<dyn CreationObserver>,
    inter_artist_delay: Duration,
}

impl PlaylistOrchestrator {
    pub fn new(writer: Arc<dyn PlaylistWriter>, assembler: SetlistAssembler, inter_artist_delay: Duration) -> Self {
        Self {
            writer,
            assembler,
            observer: Arc::new(NoopObserver),
            inter_artist_delay,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CreationObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, playlist = %details.name))]
    pub async fn create_playlist_with_artists(
        &self,
        ctx: &RequestContext,
        details: &PlaylistDetails,
        artists: &[String],
    ) -> Result<PlaylistCreationResult, PlaylistError> {
        let playlist_id = self
            .writer
            .create_playlist(ctx, details)
            .await
            .map_err(PlaylistError::PlaylistCreationFailed)?;
        info!("Created playlist {} ({}) for {} artists", details.name, playlist_id, artists.len());

        let status = self.populate(ctx, playlist_id.clone(), artists).await?;

        let event = PlaylistCreatedEvent::new(playlist_id.clone(), &details.name, artists, status);
        self.observer.notify(&event).await;

        Ok(PlaylistCreationResult { playlist_id, status })
    }

    /// Add the setlists of `artists` to a playlist that already exists.
    /// No playlist is created and no creation event is emitted.
    #[tracing::instrument(skip_all, fields(request_id = %ctx.request_id, playlist = %playlist_id))]
    pub async fn add_artists_to_playlist(
        &self,
        ctx: &RequestContext,
        playlist_id: &PlaylistId,
        artists: &[String],
    ) -> Result<PlaylistCreationResult, PlaylistError> {
        let status = self.populate(ctx, playlist_id.clone(), artists).await?;
        Ok(PlaylistCreationResult { playlist_id: playlist_id.clone(), status })
    }

    /// Add artists one at a time, waiting `inter_artist_delay` between them.
    async fn populate(
        &self,
        ctx: &RequestContext,
        playlist_id: PlaylistId,
        artists: &[String],
    ) -> Result<CreationStatus, PlaylistError> {
        let mut failures: Vec<ArtistError> = Vec::new();
        for (i, artist) in artists.iter().enumerate() {
            if i > 0 && !self.inter_artist_delay.is_zero() {
                tokio::time::sleep(self.inter_artist_delay).await;
            }
            if let Err(e) = self.assembler.add_artist_to_playlist(ctx, &playlist_id, artist).await {
                warn!(
                    artist = %artist,
                    playlist = %playlist_id,
                    cause = e.kind(),
                    "could not add songs of {} to playlist {}: {}",
                    artist,
                    playlist_id,
                    e
                );
                failures.push(e);
            }
        }

        let status = match classify_outcome(failures.len(), artists.len()) {
            Some(status) => status,
            None => {
                error!("could not add any of artists {:?} to playlist {}", artists, playlist_id);
                return Err(PlaylistError::AllArtistsFailed { playlist_id, causes: failures });
            }
        };

        if status == CreationStatus::PartialFailure {
            let failed: Vec<&str> = failures.iter().map(|e| e.artist()).collect();
            warn!("Playlist {} is missing artists {:?}", playlist_id, failed);
        }
        Ok(status)
    }
}
