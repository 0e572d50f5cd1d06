//! Failure taxonomy of playlist population.

use crate::models::PlaylistId;
use thiserror::Error;

/// Why a single artist could not be added. Recovered by the orchestrator.
#[derive(Error, Debug)]
pub enum ArtistError {
    /// Setlist lookup failed or returned an empty setlist
    #[error("no setlist found for artist {artist}: {source}")]
    SetlistUnavailable {
        artist: String,
        #[source]
        source: anyhow::Error,
    },

    /// Every song of the setlist failed to resolve
    #[error("no songs could be resolved for artist {artist} ({attempted} attempted)")]
    NoSongsResolved { artist: String, attempted: usize },

    /// The playlist writer rejected the resolved tracks
    #[error("could not add {count} tracks of artist {artist} to playlist {playlist_id}: {source}")]
    TrackSubmissionFailed {
        artist: String,
        playlist_id: PlaylistId,
        count: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ArtistError {
    pub fn artist(&self) -> &str {
        match self {
            ArtistError::SetlistUnavailable { artist, .. }
            | ArtistError::NoSongsResolved { artist, .. }
            | ArtistError::TrackSubmissionFailed { artist, .. } => artist,
        }
    }

    /// Short cause label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ArtistError::SetlistUnavailable { .. } => "setlist_unavailable",
            ArtistError::NoSongsResolved { .. } => "no_songs_resolved",
            ArtistError::TrackSubmissionFailed { .. } => "track_submission_failed",
        }
    }
}

/// Fatal outcomes of a playlist creation request.
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("could not create playlist: {0}")]
    PlaylistCreationFailed(#[source] anyhow::Error),

    /// Nothing was added. The created playlist is left in place.
    #[error("all artists failed to be added to playlist {playlist_id}")]
    AllArtistsFailed {
        playlist_id: PlaylistId,
        causes: Vec<ArtistError>,
    },
}
