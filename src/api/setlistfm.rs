use super::{send_cancellable, SetlistProvider};
use crate::models::{RequestContext, Setlist, SetlistSong};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    setlist: Vec<ApiSetlist>,
}

#[derive(Debug, Deserialize)]
struct ApiSetlist {
    artist: ApiArtist,
    #[serde(default)]
    url: String,
    #[serde(default)]
    sets: ApiSets,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSets {
    #[serde(default)]
    set: Vec<ApiSet>,
}

#[derive(Debug, Deserialize)]
struct ApiSet {
    #[serde(default)]
    song: Vec<ApiSong>,
}

#[derive(Debug, Deserialize)]
struct ApiSong {
    name: String,
}

impl ApiSetlist {
    /// Songs of all sets (main set, encores) in the order they were played.
    fn songs(&self) -> Vec<SetlistSong> {
        self.sets
            .set
            .iter()
            .flat_map(|s| s.song.iter())
            .map(|s| SetlistSong::new(s.name.clone()))
            .collect()
    }
}

impl SearchResponse {
    fn first_with_min_songs(&self, min_songs: usize) -> Option<Setlist> {
        self.setlist.iter().find_map(|sl| {
            let songs = sl.songs();
            if songs.len() >= min_songs {
                Some(Setlist::new(sl.artist.name.clone(), songs, sl.url.clone()))
            } else {
                None
            }
        })
    }
}

/// setlist.fm search API client.
/// The API base may be overridden with SETLISTFM_API_BASE (useful for tests).
pub struct SetlistFmProvider {
    client: Client,
    api_key: String,
    api_base: String,
    max_pages: u32,
    next_page_delay: Duration,
}

impl SetlistFmProvider {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            api_base: Self::default_api_base(),
            max_pages: 1,
            next_page_delay: Duration::ZERO,
        }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Search up to `max_pages` result pages, waiting `delay` between pages.
    pub fn with_paging(mut self, max_pages: u32, delay: Duration) -> Self {
        self.max_pages = max_pages.max(1);
        self.next_page_delay = delay;
        self
    }

    fn default_api_base() -> String {
        env::var("SETLISTFM_API_BASE").unwrap_or_else(|_| "https://api.setlist.fm".into())
    }

    fn search_url(&self, artist: &str, page: u32) -> Result<url::Url> {
        let base = format!("{}/rest/1.0/search/setlists", self.api_base.trim_end_matches('/'));
        let page = page.to_string();
        url::Url::parse_with_params(&base, &[("artistName", artist), ("p", page.as_str())])
            .with_context(|| format!("building setlist search url from {}", base))
    }

    /// Ok(None) when the page holds no setlist with enough songs (or no results at all).
    async fn first_setlist_from_page(
        &self,
        ctx: &RequestContext,
        artist: &str,
        page: u32,
        min_songs: usize,
    ) -> Result<Option<Setlist>> {
        let url = self.search_url(artist, page)?;
        let req = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header(ACCEPT, "application/json");
        let resp = send_cancellable(ctx, req).await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!("setlist.fm has no results for {} on page {}", artist, page);
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(anyhow!("rate_limited: retry_after={:?}", retry_after));
        }
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("setlist search failed: {} => {}", status, txt));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .with_context(|| format!("decoding setlist search page {} for {}", page, artist))?;
        Ok(body.first_with_min_songs(min_songs))
    }
}

#[async_trait]
impl SetlistProvider for SetlistFmProvider {
    async fn get_setlist(&self, ctx: &RequestContext, artist: &str, min_songs: usize) -> Result<Setlist> {
        for page in 1..=self.max_pages {
            if page > 1 && !self.next_page_delay.is_zero() {
                tokio::time::sleep(self.next_page_delay).await;
            }
            match self.first_setlist_from_page(ctx, artist, page, min_songs).await? {
                Some(setlist) => return Ok(setlist),
                None => debug!("no setlist with {}+ songs for {} on page {}", min_songs, artist, page),
            }
        }
        warn!("could not find setlist for artist {} in {} pages", artist, self.max_pages);
        Err(anyhow!("could not find setlist for artist {}", artist))
    }
}
