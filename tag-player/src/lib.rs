//! Reconciliation core for a tag-driven music player
//!
//! Raw reader lines are decoded into [`PresenceEvent`]s, the
//! [`ReconciliationEngine`] decides what should be playing, and the resulting
//! [`PlaybackCommand`]s go to a [`CommandSink`], normally a
//! [`PlaybackDispatcher`] in front of a [`PlaybackController`].
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use tag_player::{PlaybackController, PlaybackDispatcher, ResolvedResource, TagPlayer};
//! # fn client() -> spotify_client::SpotifyClient { unimplemented!() }
//!
//! let mut mappings = HashMap::new();
//! mappings.insert("04A1B2C3".to_string(), ResolvedResource::new("spotify:album:1"));
//!
//! let dispatcher = PlaybackDispatcher::spawn(PlaybackController::new(client()), 16);
//! let mut player = TagPlayer::new(mappings, dispatcher);
//! player.handle_line(r#"{"event":"TAG_ON","uid":"04A1B2C3"}"#);
//! ```

pub mod controller;
pub mod decoder;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod logging;
pub mod lookup;
pub mod player;

pub use controller::{PlaybackController, PlaybackService};
pub use decoder::decode_line;
pub use dispatcher::{CommandSink, PlaybackDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use engine::{PlaybackCommand, ReconciliationEngine, SessionState};
pub use error::{DecodeError, ExternalServiceError};
pub use event::{PresenceEvent, TagId};
pub use logging::{init_logging, LoggingError, LoggingMode};
pub use lookup::{MappingLookup, ResolvedResource};
pub use player::TagPlayer;
