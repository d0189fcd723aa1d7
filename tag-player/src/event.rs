//! Presence events and tag identity

use std::fmt;

/// Identifier of a physical RFID tag as reported by the reader
///
/// Surrounding whitespace is stripped so that the same tag compares equal no
/// matter how the reader padded it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self(id.trim().to_string())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        TagId::new(s)
    }
}

impl From<String> for TagId {
    fn from(s: String) -> Self {
        TagId::new(s)
    }
}

/// A decoded notification from the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceEvent {
    /// A tag was placed on the reader
    TagPresent(TagId),
    /// A tag was taken off the reader
    TagAbsent(TagId),
    /// The reader finished booting
    ReaderReady,
}

impl PresenceEvent {
    /// The tag this event is about, if any
    pub fn tag(&self) -> Option<&TagId> {
        match self {
            PresenceEvent::TagPresent(tag) | PresenceEvent::TagAbsent(tag) => Some(tag),
            PresenceEvent::ReaderReady => None,
        }
    }
}

impl fmt::Display for PresenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenceEvent::TagPresent(tag) => write!(f, "TAG ON {}", tag),
            PresenceEvent::TagAbsent(tag) => write!(f, "TAG OFF {}", tag),
            PresenceEvent::ReaderReady => write!(f, "READY"),
        }
    }
}
