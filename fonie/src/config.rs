//! Command line and environment configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use serial_link::{Backoff, DEFAULT_BAUD_RATE, DEFAULT_PORT};
use spotify_client::{ClientCredentials, DEFAULT_CACHE_FILE};
use tag_player::logging::{validate_filter, LoggingMode, LOG_LEVEL_ENV, LOG_MODE_ENV};
use tag_player::DEFAULT_QUEUE_CAPACITY;
use tag_store::DEFAULT_MAPPINGS_FILE;

/// Fonie - RFID tag driven Spotify player
///
/// Reads tag events from a serial RFID reader and plays the album, playlist
/// or track bound to each tag.
#[derive(Parser, Debug)]
#[command(name = "fonie")]
#[command(about = "Plays Spotify music when an RFID tag is placed on the reader")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Serial device the reader is attached to
    #[arg(long, global = true, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Serial baud rate
    #[arg(long, global = true, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Tag mapping file
    #[arg(long, global = true, default_value = DEFAULT_MAPPINGS_FILE)]
    pub mappings: PathBuf,

    /// Spotify token cache file
    #[arg(long, global = true, default_value = DEFAULT_CACHE_FILE)]
    pub token_cache: PathBuf,

    /// Log filter: a level (error, warn, info, debug, trace) or directives
    /// such as `tag_player=debug,ureq=warn`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output mode (silent, development, debug)
    #[arg(long, global = true, default_value = "development")]
    pub log_mode: LoggingMode,

    /// Playback commands that may queue up behind a slow request
    #[arg(long, global = true, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Seconds to wait before reopening a lost serial link
    #[arg(long, global = true, default_value = "5")]
    pub link_backoff_secs: u64,

    /// Seconds to wait after a transient read error
    #[arg(long, global = true, default_value = "1")]
    pub glitch_backoff_secs: u64,

    /// Spotify application client id (needed to refresh tokens)
    #[arg(long, global = true, hide = true)]
    pub client_id: Option<String>,

    /// Spotify application client secret
    #[arg(long, global = true, hide = true)]
    pub client_secret: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Listen for tags and control playback (default)
    Run,
    /// Manage tag mappings
    Map {
        #[command(subcommand)]
        action: MapAction,
    },
    /// List Spotify output devices
    Devices,
    /// Search Spotify for tracks, albums and playlists to map
    Search {
        /// Search terms (at least two characters)
        query: Vec<String>,
    },
    /// Show what is playing right now
    Status,
    /// Delete the Spotify token cache
    Logout,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MapAction {
    /// Show all mappings
    List,
    /// Bind a tag to a Spotify URI
    Add {
        tag: String,
        uri: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        artist: String,
    },
    /// Forget a tag
    Remove { tag: String },
}

impl Args {
    /// Apply `FONIE_*` and `SPOTIFY_CLIENT_*` overrides read through `var`
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("FONIE_PORT") {
            self.port = port;
        }

        if let Some(baud) = var("FONIE_BAUD") {
            self.baud = baud.parse().context("Invalid FONIE_BAUD environment variable")?;
        }

        if let Some(mappings) = var("FONIE_MAPPINGS") {
            self.mappings = PathBuf::from(mappings);
        }

        if let Some(cache) = var("FONIE_TOKEN_CACHE") {
            self.token_cache = PathBuf::from(cache);
        }

        if let Some(level) = var(LOG_LEVEL_ENV) {
            self.log_level = Some(level);
        }

        if let Some(mode) = var(LOG_MODE_ENV) {
            self.log_mode = mode.parse().context("Invalid FONIE_LOG_MODE environment variable")?;
        }

        if let Some(capacity) = var("FONIE_QUEUE_CAPACITY") {
            self.queue_capacity = capacity
                .parse()
                .context("Invalid FONIE_QUEUE_CAPACITY environment variable")?;
        }

        if let Some(secs) = var("FONIE_LINK_BACKOFF_SECS") {
            self.link_backoff_secs = secs
                .parse()
                .context("Invalid FONIE_LINK_BACKOFF_SECS environment variable")?;
        }

        if let Some(secs) = var("FONIE_GLITCH_BACKOFF_SECS") {
            self.glitch_backoff_secs = secs
                .parse()
                .context("Invalid FONIE_GLITCH_BACKOFF_SECS environment variable")?;
        }

        if let Some(id) = var("SPOTIFY_CLIENT_ID") {
            self.client_id = Some(id);
        }

        if let Some(secret) = var("SPOTIFY_CLIENT_SECRET") {
            self.client_secret = Some(secret);
        }

        Ok(())
    }

    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(anyhow::anyhow!("Serial port must not be empty"));
        }

        if self.baud == 0 {
            return Err(anyhow::anyhow!("Baud rate must be positive"));
        }

        if self.queue_capacity == 0 {
            return Err(anyhow::anyhow!("Queue capacity must be at least 1"));
        }

        if self.link_backoff_secs == 0 {
            return Err(anyhow::anyhow!("Link backoff must be positive"));
        }

        if self.glitch_backoff_secs == 0 {
            return Err(anyhow::anyhow!("Glitch backoff must be positive"));
        }

        if self.client_id.is_some() != self.client_secret.is_some() {
            return Err(anyhow::anyhow!(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set together"
            ));
        }

        if let Some(level) = &self.log_level {
            validate_filter(level).context("Invalid log level")?;
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments and environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub port: String,
    pub baud_rate: u32,
    pub mappings: PathBuf,
    pub token_cache: PathBuf,
    pub credentials: Option<ClientCredentials>,
    pub log_level: Option<String>,
    pub log_mode: LoggingMode,
    pub queue_capacity: usize,
    pub backoff: Backoff,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let credentials = match (args.client_id, args.client_secret) {
            (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        Self {
            command: args.command.unwrap_or(Command::Run),
            port: args.port,
            baud_rate: args.baud,
            mappings: args.mappings,
            token_cache: args.token_cache,
            credentials,
            log_level: args.log_level,
            log_mode: args.log_mode,
            queue_capacity: args.queue_capacity,
            backoff: Backoff::new(
                Duration::from_secs(args.link_backoff_secs),
                Duration::from_secs(args.glitch_backoff_secs),
            ),
        }
    }
}

impl Config {
    /// Create configuration from command line arguments and environment variables
    pub fn from_env() -> Result<Self> {
        let mut args = Args::parse();
        args.apply_env(|key| std::env::var(key).ok())?;
        args.validate()?;
        Ok(Config::from(args))
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        info!("Configuration:");
        info!("  Serial port: {} @ {} baud", self.port, self.baud_rate);
        info!("  Mappings: {}", self.mappings.display());
        info!("  Token cache: {}", self.token_cache.display());
        info!("  Token refresh: {}", if self.credentials.is_some() { "enabled" } else { "disabled" });
        info!("  Queue capacity: {}", self.queue_capacity);
        info!(
            "  Backoff: {}s link lost, {}s glitch",
            self.backoff.link_lost.as_secs(),
            self.backoff.glitch.as_secs()
        );
    }
}
