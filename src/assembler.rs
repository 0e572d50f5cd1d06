use crate::api::{PlaylistWriter, SetlistProvider, SongResolver};
use crate::error::ArtistError;
use crate::models::{FetchOutcome, PlaylistId, RequestContext, ResolvedTrack, SetlistSong};
use anyhow::anyhow;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Adds the songs of one artist's latest setlist to a playlist.
///
/// Every song is resolved in its own task; the resolved tracks are submitted
/// in setlist order whatever order the lookups complete in.
pub struct SetlistAssembler {
    setlists: Arc<dyn SetlistProvider>,
    resolver: Arc<dyn SongResolver>,
    writer: Arc<dyn PlaylistWriter>,
    min_songs: usize,
}

impl SetlistAssembler {
    pub fn new(
        setlists: Arc<dyn SetlistProvider>,
        resolver: Arc<dyn SongResolver>,
        writer: Arc<dyn PlaylistWriter>,
        min_songs: usize,
    ) -> Self {
        Self { setlists, resolver, writer, min_songs }
    }

    pub fn min_songs(&self) -> usize {
        self.min_songs
    }

    pub async fn add_artist_to_playlist(
        &self,
        ctx: &RequestContext,
        playlist_id: &PlaylistId,
        artist: &str,
    ) -> Result<(), ArtistError> {
        let setlist = self
            .setlists
            .get_setlist(ctx, artist, self.min_songs)
            .await
            .map_err(|source| ArtistError::SetlistUnavailable { artist: artist.to_string(), source })?;

        if setlist.songs.is_empty() {
            return Err(ArtistError::SetlistUnavailable {
                artist: artist.to_string(),
                source: anyhow!("setlist has no songs"),
            });
        }

        info!("Found setlist {} for artist {} ({} songs)", setlist.url, artist, setlist.songs.len());

        let slots = self.resolve_songs(ctx, artist, &setlist.songs).await;
        let tracks = ordered_tracks(artist, &setlist.songs, slots);

        if tracks.is_empty() {
            return Err(ArtistError::NoSongsResolved {
                artist: artist.to_string(),
                attempted: setlist.songs.len(),
            });
        }

        let count = tracks.len();
        self.writer
            .add_tracks(ctx, playlist_id, &tracks)
            .await
            .map_err(|source| ArtistError::TrackSubmissionFailed {
                artist: artist.to_string(),
                playlist_id: playlist_id.clone(),
                count,
                source,
            })?;

        info!("Added {}/{} songs of {} to playlist {}", count, setlist.songs.len(), artist, playlist_id);
        Ok(())
    }

    /// Fan out one lookup per song and wait for all of them.
    /// Slot `rank` holds the outcome of `songs[rank]`; a task that died leaves its slot empty.
    async fn resolve_songs(
        &self,
        ctx: &RequestContext,
        artist: &str,
        songs: &[SetlistSong],
    ) -> Vec<Option<FetchOutcome>> {
        let mut slots: Vec<Option<FetchOutcome>> = songs.iter().map(|_| None).collect();
        let mut tasks = JoinSet::new();

        for (rank, song) in songs.iter().enumerate() {
            let resolver = Arc::clone(&self.resolver);
            let ctx = ctx.clone();
            let artist = artist.to_string();
            let title = song.title.clone();
            tasks.spawn(async move {
                let result = resolver.resolve(&ctx, &artist, &title).await;
                FetchOutcome { rank, result }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    let rank = outcome.rank;
                    slots[rank] = Some(outcome);
                }
                Err(e) => warn!("song lookup task for artist {} did not finish: {}", artist, e),
            }
        }

        slots
    }
}

/// Keep the successful lookups, in setlist order. Failures are logged per song.
fn ordered_tracks(artist: &str, songs: &[SetlistSong], slots: Vec<Option<FetchOutcome>>) -> Vec<ResolvedTrack> {
    let mut tracks = Vec::with_capacity(slots.len());
    for (rank, slot) in slots.into_iter().enumerate() {
        let title = songs.get(rank).map(|s| s.title.as_str()).unwrap_or("");
        match slot {
            Some(FetchOutcome { result: Ok(track), .. }) => {
                debug!("Resolved {} - {} (#{}) to {}", artist, title, rank + 1, track.uri);
                tracks.push(track);
            }
            Some(FetchOutcome { result: Err(e), .. }) => {
                warn!("Skipping {} - {} (#{}): {}", artist, title, rank + 1, e);
            }
            None => {
                warn!("Skipping {} - {} (#{}): lookup task aborted", artist, title, rank + 1);
            }
        }
    }
    tracks
}
