//! Persistent RFID tag → Spotify resource mappings
//!
//! Mappings live in a single pretty-printed JSON object keyed by tag id:
//!
//! ```json
//! {
//!   "04A1B2C3": {
//!     "uri": "spotify:album:1DFixLWuPkv3KT3TnV35m3",
//!     "name": "Abbey Road",
//!     "artist": "The Beatles",
//!     "added": "2024-03-09T18:22:41.123456"
//!   }
//! }
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tag_store::{MappingStore, TagMapping};
//!
//! let store = MappingStore::open("rfid_mappings.json");
//! store.insert(&TagMapping::new("04A1B2C3", "spotify:track:4uLU6hMCjMI75M1A2tKUQC", "Song", "Artist"))?;
//!
//! if let Some(mapping) = store.get("04A1B2C3")? {
//!     println!("{} -> {}", mapping.tag_id, mapping.resource_uri);
//! }
//! # Ok::<(), tag_store::StoreError>(())
//! ```

mod error;
mod mapping;
mod store;

pub use error::{Result, StoreError};
pub use mapping::TagMapping;
pub use store::{MappingStore, DEFAULT_MAPPINGS_FILE};
