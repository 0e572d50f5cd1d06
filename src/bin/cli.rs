use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib::api::mock::MockProvider;
use lib::api::setlistfm::SetlistFmProvider;
use lib::api::spotify::SpotifyClient;
use lib::api::{PlaylistWriter, SetlistProvider, SongResolver};
use lib::assembler::SetlistAssembler;
use lib::config::Config;
use lib::error::{ArtistError, PlaylistError};
use lib::events::LoggingObserver;
use lib::models::{CreationStatus, PlaylistCreationResult, PlaylistDetails, PlaylistId, RequestContext};
use lib::orchestrator::PlaylistOrchestrator;
use setlist_playlist_builder as lib;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "setlist-playlist-builder", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a playlist from the latest setlists of the given artists
    Create {
        /// Playlist name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Create a private playlist
        #[arg(long)]
        private: bool,

        /// Artist to add (repeatable, order is kept)
        #[arg(long = "artist", required = true)]
        artists: Vec<String>,

        /// Spotify access token (falls back to SPOTIFY_ACCESS_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Use the offline mock provider instead of setlist.fm and Spotify
        #[arg(long)]
        dry_run: bool,
    },
    /// Add the latest setlists of the given artists to an existing playlist
    Update {
        /// Id of the playlist to extend
        #[arg(long)]
        playlist: String,

        /// Artist to add (repeatable, order is kept)
        #[arg(long = "artist", required = true)]
        artists: Vec<String>,

        /// Spotify access token (falls back to SPOTIFY_ACCESS_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Use the offline mock provider instead of setlist.fm and Spotify
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate config file and exit
    ConfigValidate,
}

fn load_config(cli_path: Option<&Path>) -> Result<Config> {
    // Explicit --config overrides; otherwise use the system-wide file when
    // present and built-in defaults when not.
    match cli_path {
        Some(p) => Config::from_path(p).with_context(|| format!("loading config from {}", p.display())),
        None => {
            let etc_path = Path::new("/etc/setlist-playlist/config.toml");
            if etc_path.exists() {
                Config::from_path(etc_path).with_context(|| format!("loading config from {}", etc_path.display()))
            } else {
                Ok(Config::default().with_env_overrides())
            }
        }
    }
}

fn init_logging(cfg: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // log -> tracing bridge for the HTTP clients; stdout plus a daily-rotated
    // file in cfg.log_dir when that directory is writable.
    let _ = LogTracer::init();
    let (file_layer, guard) = match std::fs::create_dir_all(&cfg.log_dir) {
        Ok(()) => {
            let file_appender: RollingFileAppender =
                tracing_appender::rolling::daily(&cfg.log_dir, "setlist-playlist.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_writer(non_blocking)), Some(guard))
        }
        Err(e) => {
            eprintln!("logging to stdout only, cannot use {}: {}", cfg.log_dir.display(), e);
            (None, None)
        }
    };

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout));

    if let Err(e) = tracing_subscriber_global::set_global_default(subscriber) {
        eprintln!("failed to set global tracing subscriber: {}", e);
    }
    guard
}

fn build_orchestrator(cfg: &Config, dry_run: bool) -> Result<PlaylistOrchestrator> {
    let setlists: Arc<dyn SetlistProvider>;
    let resolver: Arc<dyn SongResolver>;
    let writer: Arc<dyn PlaylistWriter>;
    if dry_run {
        let mock = Arc::new(MockProvider::new(cfg.min_songs_per_setlist.max(1)));
        setlists = mock.clone();
        resolver = mock.clone();
        writer = mock;
    } else {
        let setlistfm = SetlistFmProvider::new(cfg.require_setlistfm_key()?.to_string(), cfg.http_timeout())
            .with_paging(cfg.setlistfm_max_pages, cfg.next_page_delay());
        let spotify = Arc::new(SpotifyClient::new(cfg.http_timeout()));
        setlists = Arc::new(setlistfm);
        resolver = spotify.clone();
        writer = spotify;
    }

    let assembler = SetlistAssembler::new(setlists, resolver, writer.clone(), cfg.min_songs_per_setlist);
    Ok(PlaylistOrchestrator::new(writer, assembler, cfg.inter_artist_delay()).with_observer(Arc::new(LoggingObserver)))
}

fn access_token(token: Option<String>, dry_run: bool) -> Result<Option<String>> {
    let token = token.or_else(|| std::env::var("SPOTIFY_ACCESS_TOKEN").ok());
    if token.is_none() && !dry_run {
        anyhow::bail!("no Spotify access token: pass --token or set SPOTIFY_ACCESS_TOKEN");
    }
    Ok(token)
}

fn print_result(result: &PlaylistCreationResult) {
    let status = match result.status {
        CreationStatus::Success => "success",
        CreationStatus::PartialFailure => "partial_failure",
    };
    println!("playlist: {}", result.playlist_id);
    println!("status: {}", status);
}

fn print_causes(causes: &[ArtistError]) {
    for cause in causes {
        eprintln!("- {}: {}", cause.artist(), cause);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ConfigValidate => {
            // load_config already parsed the file
            println!("OK");
        }
        Commands::Create { name, description, private, artists, token, dry_run } => {
            let _guard = init_logging(&cfg);
            cfg.validate_artists(&artists).context("validating artists")?;
            let token = access_token(token, dry_run)?;

            let orchestrator = build_orchestrator(&cfg, dry_run)?;
            let ctx = RequestContext::new(token);
            let details = PlaylistDetails { name, description, is_public: !private };

            match orchestrator.create_playlist_with_artists(&ctx, &details, &artists).await {
                Ok(result) => print_result(&result),
                Err(PlaylistError::AllArtistsFailed { playlist_id, causes }) => {
                    print_causes(&causes);
                    anyhow::bail!("no artist could be added; playlist {} was created but is empty", playlist_id);
                }
                Err(e) => return Err(e).context("creating playlist"),
            }
        }
        Commands::Update { playlist, artists, token, dry_run } => {
            let _guard = init_logging(&cfg);
            cfg.validate_artists(&artists).context("validating artists")?;
            let token = access_token(token, dry_run)?;

            let orchestrator = build_orchestrator(&cfg, dry_run)?;
            let ctx = RequestContext::new(token);
            let playlist_id = PlaylistId::new(playlist);

            match orchestrator.add_artists_to_playlist(&ctx, &playlist_id, &artists).await {
                Ok(result) => print_result(&result),
                Err(PlaylistError::AllArtistsFailed { causes, .. }) => {
                    print_causes(&causes);
                    anyhow::bail!("no artist could be added to playlist {}", playlist_id);
                }
                Err(e) => return Err(e).with_context(|| format!("updating playlist {}", playlist_id)),
            }
        }
    }

    Ok(())
}
