use super::{PlaylistWriter, SetlistProvider, SongResolver};
use crate::models::{PlaylistDetails, PlaylistId, RequestContext, ResolvedTrack, Setlist, SetlistSong};
use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::info;

/// Offline stand-in for setlist.fm and Spotify used by `--dry-run`.
/// It logs operations and returns deterministic fake setlists, IDs and URIs.
pub struct MockProvider {
    songs_per_setlist: usize,
}

impl MockProvider {
    pub fn new(songs_per_setlist: usize) -> Self {
        Self { songs_per_setlist }
    }
}

#[async_trait]
impl SetlistProvider for MockProvider {
    async fn get_setlist(&self, _ctx: &RequestContext, artist: &str, min_songs: usize) -> Result<Setlist> {
        info!("MockProvider: get_setlist {} (min {})", artist, min_songs);
        if self.songs_per_setlist < min_songs {
            bail!("could not find setlist for artist {}", artist);
        }
        let songs = (1..=self.songs_per_setlist)
            .map(|n| SetlistSong::new(format!("{} song {}", artist, n)))
            .collect();
        Ok(Setlist::new(artist, songs, format!("mock://setlist/{}", artist)))
    }
}

#[async_trait]
impl SongResolver for MockProvider {
    async fn resolve(&self, _ctx: &RequestContext, artist: &str, title: &str) -> Result<ResolvedTrack> {
        info!("MockProvider: search {} - {}", title, artist);
        Ok(ResolvedTrack::new(format!("mock:track:{}:{}", artist, title)))
    }
}

#[async_trait]
impl PlaylistWriter for MockProvider {
    async fn create_playlist(&self, _ctx: &RequestContext, details: &PlaylistDetails) -> Result<PlaylistId> {
        info!("MockProvider: create_playlist {}", details.name);
        Ok(PlaylistId::new(format!("mock-playlist-{}", details.name)))
    }

    async fn add_tracks(&self, _ctx: &RequestContext, playlist_id: &PlaylistId, tracks: &[ResolvedTrack]) -> Result<()> {
        if tracks.is_empty() {
            bail!("no songs provided");
        }
        info!("MockProvider: add_tracks {} -> {} tracks", playlist_id, tracks.len());
        Ok(())
    }
}
