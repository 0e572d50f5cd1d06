#![allow(dead_code)]
//! In-memory collaborators shared by the orchestration tests.

use anyhow::{anyhow, bail, Result};
use setlist_playlist_builder::api::{CreationObserver, PlaylistWriter, SetlistProvider, SongResolver};
use setlist_playlist_builder::assembler::SetlistAssembler;
use setlist_playlist_builder::events::PlaylistCreatedEvent;
use setlist_playlist_builder::models::{PlaylistDetails, PlaylistId, RequestContext, ResolvedTrack, Setlist, SetlistSong};
use setlist_playlist_builder::orchestrator::PlaylistOrchestrator;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub enum FakeSetlist {
    Songs(Vec<&'static str>),
    Fail,
}

/// Setlists by artist; unknown artists fail. Records every lookup with its time.
pub struct FakeSetlists {
    setlists: HashMap<String, FakeSetlist>,
    pub calls: Mutex<Vec<(String, usize, Instant)>>,
}

impl FakeSetlists {
    pub fn new(entries: Vec<(&str, FakeSetlist)>) -> Self {
        Self {
            setlists: entries.into_iter().map(|(a, s)| (a.to_string(), s)).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, _, t)| *t).collect()
    }
}

#[async_trait::async_trait]
impl SetlistProvider for FakeSetlists {
    async fn get_setlist(&self, _ctx: &RequestContext, artist: &str, min_songs: usize) -> Result<Setlist> {
        self.calls.lock().unwrap().push((artist.to_string(), min_songs, Instant::now()));
        match self.setlists.get(artist) {
            Some(FakeSetlist::Songs(titles)) => Ok(Setlist::new(
                artist,
                titles.iter().map(|t| SetlistSong::new(*t)).collect(),
                format!("https://setlists.test/{}", artist),
            )),
            Some(FakeSetlist::Fail) | None => Err(anyhow!("could not find setlist for artist {}", artist)),
        }
    }
}

/// Resolves `title` to `uri:<title>` after an optional delay; titles listed
/// as failing return an error after their delay, titles listed as panicking
/// panic inside the resolution task.
pub struct FakeResolver {
    delays_ms: HashMap<String, u64>,
    failing: Vec<String>,
    panicking: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self {
            delays_ms: HashMap::new(),
            failing: Vec::new(),
            panicking: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn delay(mut self, title: &str, ms: u64) -> Self {
        self.delays_ms.insert(title.to_string(), ms);
        self
    }

    pub fn failing(mut self, title: &str) -> Self {
        self.failing.push(title.to_string());
        self
    }

    pub fn panicking(mut self, title: &str) -> Self {
        self.panicking.push(title.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SongResolver for FakeResolver {
    async fn resolve(&self, _ctx: &RequestContext, _artist: &str, title: &str) -> Result<ResolvedTrack> {
        self.calls.lock().unwrap().push(title.to_string());
        if let Some(ms) = self.delays_ms.get(title) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if self.panicking.iter().any(|p| p == title) {
            panic!("resolver blew up on {}", title);
        }
        if self.failing.iter().any(|f| f == title) {
            bail!("no songs found for song {}", title);
        }
        Ok(ResolvedTrack::new(format!("uri:{}", title)))
    }
}

pub struct FakeWriter {
    fail_create: bool,
    fail_add: bool,
    pub created: Mutex<Vec<PlaylistDetails>>,
    pub added: Mutex<Vec<(PlaylistId, Vec<String>)>>,
}

impl FakeWriter {
    pub fn new() -> Self {
        Self { fail_create: false, fail_add: false, created: Mutex::new(Vec::new()), added: Mutex::new(Vec::new()) }
    }

    pub fn failing_create() -> Self {
        Self { fail_create: true, ..Self::new() }
    }

    pub fn failing_add() -> Self {
        Self { fail_add: true, ..Self::new() }
    }

    pub fn added(&self) -> Vec<(PlaylistId, Vec<String>)> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PlaylistWriter for FakeWriter {
    async fn create_playlist(&self, _ctx: &RequestContext, details: &PlaylistDetails) -> Result<PlaylistId> {
        self.created.lock().unwrap().push(details.clone());
        if self.fail_create {
            bail!("create playlist failed: 500");
        }
        Ok(PlaylistId::new("pl-1"))
    }

    async fn add_tracks(&self, _ctx: &RequestContext, playlist_id: &PlaylistId, tracks: &[ResolvedTrack]) -> Result<()> {
        if tracks.is_empty() {
            bail!("no songs provided");
        }
        if self.fail_add {
            bail!("add tracks failed: 500");
        }
        self.added
            .lock()
            .unwrap()
            .push((playlist_id.clone(), tracks.iter().map(|t| t.uri.clone()).collect()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<PlaylistCreatedEvent>>,
}

#[async_trait::async_trait]
impl CreationObserver for RecordingObserver {
    async fn notify(&self, event: &PlaylistCreatedEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn details() -> PlaylistDetails {
    PlaylistDetails { name: "Festival".into(), description: "".into(), is_public: true }
}

pub fn artists(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn assembler(
    setlists: &Arc<FakeSetlists>,
    resolver: &Arc<FakeResolver>,
    writer: &Arc<FakeWriter>,
    min_songs: usize,
) -> SetlistAssembler {
    SetlistAssembler::new(setlists.clone(), resolver.clone(), writer.clone(), min_songs)
}

pub fn orchestrator(
    setlists: &Arc<FakeSetlists>,
    resolver: &Arc<FakeResolver>,
    writer: &Arc<FakeWriter>,
    delay: Duration,
) -> PlaylistOrchestrator {
    PlaylistOrchestrator::new(writer.clone(), assembler(setlists, resolver, writer, 4), delay)
}
