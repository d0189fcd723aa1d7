//! The tag → resource mapping record

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single tag binding as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMapping {
    pub tag_id: String,
    pub resource_uri: String,
    pub display_name: String,
    pub artist: String,
    /// Local time the mapping was written; absent in hand-edited files
    pub added_at: Option<NaiveDateTime>,
}

impl TagMapping {
    /// Create a mapping stamped with the current local time
    pub fn new(
        tag_id: impl Into<String>,
        resource_uri: impl Into<String>,
        display_name: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            tag_id: tag_id.into().trim().to_string(),
            resource_uri: resource_uri.into().trim().to_string(),
            display_name: display_name.into().trim().to_string(),
            artist: artist.into().trim().to_string(),
            added_at: Some(Local::now().naive_local()),
        }
    }

    pub(crate) fn from_record(tag_id: String, record: MappingRecord) -> Self {
        Self {
            tag_id,
            resource_uri: record.uri,
            display_name: record.name,
            artist: record.artist,
            added_at: record.added,
        }
    }

    pub(crate) fn to_record(&self) -> MappingRecord {
        MappingRecord {
            uri: self.resource_uri.clone(),
            name: self.display_name.clone(),
            artist: self.artist.clone(),
            added: self.added_at,
        }
    }
}

/// On-disk shape of a mapping, keyed by tag id in the enclosing object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MappingRecord {
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<NaiveDateTime>,
}
