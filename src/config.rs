use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Setlist selection / throttling
    #[serde(default = "default_min_songs")]
    pub min_songs_per_setlist: usize,
    #[serde(default = "default_inter_artist_delay")]
    pub inter_artist_delay_ms: u64,

    // setlist.fm client
    #[serde(default)]
    pub setlistfm_api_key: String,
    #[serde(default = "default_max_pages")]
    pub setlistfm_max_pages: u32,
    #[serde(default = "default_next_page_delay")]
    pub setlistfm_next_page_delay_ms: u64,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    // Input limits
    #[serde(default = "default_max_artists")]
    pub max_artists: usize,
    #[serde(default = "default_max_artist_name_length")]
    pub max_artist_name_length: usize,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_min_songs() -> usize { 4 }
fn default_inter_artist_delay() -> u64 { 550 }
fn default_max_pages() -> u32 { 3 }
fn default_next_page_delay() -> u64 { 550 }
fn default_http_timeout() -> u64 { 5 }
fn default_max_artists() -> usize { 5 }
fn default_max_artist_name_length() -> usize { 50 }
fn default_log_dir() -> PathBuf { "/var/log/setlist-playlist".into() }

impl Default for Config {
    fn default() -> Self {
        Self {
            min_songs_per_setlist: default_min_songs(),
            inter_artist_delay_ms: default_inter_artist_delay(),
            setlistfm_api_key: String::new(),
            setlistfm_max_pages: default_max_pages(),
            setlistfm_next_page_delay_ms: default_next_page_delay(),
            http_timeout_secs: default_http_timeout(),
            max_artists: default_max_artists(),
            max_artist_name_length: default_max_artist_name_length(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg.with_env_overrides())
    }

    /// Secrets may come from the environment instead of the config file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("SETLISTFM_API_KEY") {
            if !key.is_empty() {
                self.setlistfm_api_key = key;
            }
        }
        self
    }

    pub fn inter_artist_delay(&self) -> Duration {
        Duration::from_millis(self.inter_artist_delay_ms)
    }

    pub fn next_page_delay(&self) -> Duration {
        Duration::from_millis(self.setlistfm_next_page_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Reject artist lists the orchestrator should never be handed.
    pub fn validate_artists(&self, artists: &[String]) -> anyhow::Result<()> {
        if artists.is_empty() || artists.len() > self.max_artists {
            bail!("number of artists must be between 1 and {}", self.max_artists);
        }
        for artist in artists {
            let len = artist.chars().count();
            if len == 0 || len > self.max_artist_name_length {
                bail!(
                    "artist name '{}' length should be in interval [1, {}]",
                    artist,
                    self.max_artist_name_length
                );
            }
        }
        Ok(())
    }

    pub fn require_setlistfm_key(&self) -> anyhow::Result<&str> {
        if self.setlistfm_api_key.is_empty() {
            return Err(anyhow::anyhow!("setlistfm_api_key is not set"))
                .context("set it in the config file or via SETLISTFM_API_KEY");
        }
        Ok(&self.setlistfm_api_key)
    }
}
