use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub mod config;

use config::{Command, Config, MapAction};
use serial_link::{LineReader, SerialPortOpener};
use spotify_client::{is_searchable, SpotifyClient, TokenCache, MIN_QUERY_LEN};
use tag_player::logging::init_logging_with_default;
use tag_player::{PlaybackController, PlaybackDispatcher, TagPlayer};
use tag_store::{MappingStore, TagMapping};

/// Build a Spotify client backed by the token cache
fn spotify_client(config: &Config) -> SpotifyClient {
    let tokens = TokenCache::new(&config.token_cache, config.credentials.clone());
    if !tokens.is_authenticated() {
        warn!(
            "No Spotify token in {}; playback will fail until you log in",
            config.token_cache.display()
        );
    }
    SpotifyClient::new(Arc::new(tokens))
}

/// Listen for tags until the process is stopped
fn run_player(config: &Config) -> Result<()> {
    let controller = PlaybackController::new(spotify_client(config));
    let dispatcher = PlaybackDispatcher::spawn(controller, config.queue_capacity);
    let store = MappingStore::open(&config.mappings);

    match store.list() {
        Ok(mappings) => info!("{} tag mapping(s) in {}", mappings.len(), store.path().display()),
        Err(e) => warn!("Mapping file unreadable, tags will be unknown until fixed: {}", e),
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;

    let opener = SerialPortOpener::new(config.port.as_str(), config.baud_rate);
    let mut reader = LineReader::new(opener, config.backoff);

    // Poll so a stop request is noticed within one read timeout.
    let lines = std::iter::from_fn(|| {
        while running.load(Ordering::SeqCst) {
            if let Some(line) = reader.poll_line() {
                return Some(line);
            }
        }
        None
    });

    info!("Listening on {} at {} baud (Ctrl+C to stop)", config.port, config.baud_rate);
    let mut player = TagPlayer::new(store, dispatcher);
    player.run(lines);

    info!("Stopping, waiting for queued playback commands");
    player.into_sink().shutdown();
    Ok(())
}

fn run_map(config: &Config, action: &MapAction) -> Result<()> {
    let store = MappingStore::open(&config.mappings);

    match action {
        MapAction::List => {
            let mappings = store.list().context("Failed to read mappings")?;
            if mappings.is_empty() {
                println!("No mappings in {}", store.path().display());
            }
            for mapping in mappings {
                let added = mapping
                    .added_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:<16} {:<40} {} {} {}",
                    mapping.tag_id, mapping.resource_uri, mapping.display_name, mapping.artist, added
                );
            }
        }
        MapAction::Add {
            tag,
            uri,
            name,
            artist,
        } => {
            store
                .insert(&TagMapping::new(tag.as_str(), uri.as_str(), name.as_str(), artist.as_str()))
                .context("Failed to save mapping")?;
            println!("Mapped {} -> {}", tag, uri);
        }
        MapAction::Remove { tag } => {
            if store.remove(tag).context("Failed to update mappings")? {
                println!("Removed {}", tag);
            } else {
                println!("No mapping for {}", tag);
            }
        }
    }

    Ok(())
}

fn run_devices(config: &Config) -> Result<()> {
    let devices = spotify_client(config)
        .devices()
        .context("Failed to list Spotify devices")?;

    if devices.is_empty() {
        println!("No Spotify devices available. Open Spotify on a device and try again.");
    }
    for device in devices {
        let marker = if device.is_active { "*" } else { " " };
        println!("{} {:<24} {:<12} {}", marker, device.name, device.kind, device.id);
    }
    Ok(())
}

fn run_search(config: &Config, query: &str) -> Result<()> {
    if !is_searchable(query) {
        println!("Search needs at least {} characters", MIN_QUERY_LEN);
        return Ok(());
    }

    let results = spotify_client(config)
        .search(query)
        .context("Failed to search Spotify")?;

    if results.is_empty() {
        println!("Nothing found for '{}'", query.trim());
    }
    for item in results {
        println!("{:<9} {:<40} {:<30} {}", item.kind, item.name, item.artist, item.uri);
    }
    Ok(())
}

fn format_ms(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn run_status(config: &Config) -> Result<()> {
    let playback = spotify_client(config)
        .current_playback()
        .context("Failed to read Spotify playback state")?;

    match playback {
        None => println!("Nothing playing"),
        Some(now) => {
            let state = if now.is_playing { "Playing" } else { "Paused" };
            println!("{}: {} - {} ({})", state, now.track_name, now.artist, now.album);
            println!("{} / {}", format_ms(now.progress_ms), format_ms(now.duration_ms));
        }
    }
    Ok(())
}

fn run_logout(config: &Config) -> Result<()> {
    let removed = TokenCache::new(&config.token_cache, None)
        .clear()
        .context("Failed to remove token cache")?;

    if removed {
        println!("Removed {}", config.token_cache.display());
    } else {
        println!("No token cache at {}", config.token_cache.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to parse configuration")?;

    init_logging_with_default(config.log_mode, config.log_level.as_deref())
        .context("Failed to initialize logging")?;

    match &config.command {
        Command::Run => {
            config.print_summary();
            run_player(&config)
        }
        Command::Map { action } => run_map(&config, action),
        Command::Devices => run_devices(&config),
        Command::Search { query } => run_search(&config, &query.join(" ")),
        Command::Status => run_status(&config),
        Command::Logout => run_logout(&config),
    }
}
