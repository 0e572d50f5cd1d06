use super::{send_cancellable, PlaylistWriter, SongResolver};
use crate::models::{PlaylistDetails, PlaylistId, RequestContext, ResolvedTrack};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use std::env;
use std::time::Duration;

/// Spotify Web API client acting as song resolver and playlist writer.
/// The user's access token is read from the request context of every call.
/// The API base may be overridden with SPOTIFY_API_BASE (useful for tests).
pub struct SpotifyClient {
    client: Client,
    api_base: String,
}

impl SpotifyClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|_| Client::new());
        Self { client, api_base: Self::default_api_base() }
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn default_api_base() -> String {
        // include v1 path by default
        env::var("SPOTIFY_API_BASE")
            .unwrap_or_else(|_| "https://api.spotify.com/v1".into())
            .trim_end_matches('/')
            .to_string()
    }

    fn rate_limited(resp: &Response) -> anyhow::Error {
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        anyhow!("rate_limited: retry_after={:?}", retry_after)
    }

    async fn current_user_id(&self, ctx: &RequestContext, bearer: &str) -> Result<String> {
        let url = format!("{}/me", self.api_base);
        let req = self.client.get(&url).header(AUTHORIZATION, bearer);
        let resp = send_cancellable(ctx, req).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            warn!("Got 401 when fetching /me; access token rejected");
        }
        if !resp.status().is_success() {
            return Err(anyhow!("failed to fetch /me: {}", resp.status()));
        }
        let j: serde_json::Value = resp.json().await?;
        let id = j["id"].as_str().ok_or_else(|| anyhow!("no id"))?.to_string();
        Ok(id)
    }
}

#[async_trait]
impl SongResolver for SpotifyClient {
    async fn resolve(&self, ctx: &RequestContext, artist: &str, title: &str) -> Result<ResolvedTrack> {
        let bearer = ctx.bearer()?;
        let q = format!("artist:{} track:{}", artist, title);
        let url = format!(
            "{}/search?q={}&type=track&limit=1",
            self.api_base,
            urlencoding::encode(&q)
        );
        let req = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &bearer)
            .header(ACCEPT, "application/json");
        let resp = send_cancellable(ctx, req).await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Self::rate_limited(&resp));
        }
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("search failed for {} ({}): {} => {}", title, artist, status, txt));
        }
        let j: serde_json::Value = resp.json().await?;
        // The first result is the most trusted one
        if let Some(uri) = j["tracks"]["items"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(|first| first["uri"].as_str())
        {
            debug!("Spotify match for {} ({}): {}", title, artist, uri);
            return Ok(ResolvedTrack::new(uri));
        }
        Err(anyhow!("no songs found for song {} ({})", title, artist))
    }
}

#[async_trait]
impl PlaylistWriter for SpotifyClient {
    async fn create_playlist(&self, ctx: &RequestContext, details: &PlaylistDetails) -> Result<PlaylistId> {
        let bearer = ctx.bearer()?;
        let user_id = self.current_user_id(ctx, &bearer).await?;
        let url = format!(
            "{}/users/{}/playlists",
            self.api_base,
            url::form_urlencoded::byte_serialize(user_id.as_bytes()).collect::<String>()
        );
        let body = json!({
            "name": details.name,
            "description": details.description,
            "public": details.is_public,
        });
        let req = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &bearer)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        let resp = send_cancellable(ctx, req).await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Self::rate_limited(&resp));
        }
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("create playlist failed: {} => {}", status, txt));
        }
        let j: serde_json::Value = resp.json().await?;
        let id = j["id"].as_str().ok_or_else(|| anyhow!("no id"))?;
        Ok(PlaylistId::new(id))
    }

    async fn add_tracks(&self, ctx: &RequestContext, playlist_id: &PlaylistId, tracks: &[ResolvedTrack]) -> Result<()> {
        if tracks.is_empty() {
            bail!("no songs provided");
        }
        let bearer = ctx.bearer()?;
        let url = format!("{}/playlists/{}/tracks", self.api_base, playlist_id);
        let uris: Vec<&str> = tracks.iter().map(|t| t.uri.as_str()).collect();
        let body = json!({ "uris": uris });
        let req = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &bearer)
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        let resp = send_cancellable(ctx, req).await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Self::rate_limited(&resp));
        }
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("add tracks failed: {} => {}", status, txt));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_api_base_drops_trailing_slash() {
        env::set_var("SPOTIFY_API_BASE", "http://127.0.0.1:9999/v1/");
        let client = SpotifyClient::new(Duration::from_secs(1));
        env::remove_var("SPOTIFY_API_BASE");
        assert_eq!(client.api_base, "http://127.0.0.1:9999/v1");
    }
}
