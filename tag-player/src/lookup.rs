//! Tag → resource resolution

use std::collections::HashMap;
use std::hash::BuildHasher;

use tag_store::MappingStore;

use crate::event::TagId;

/// What a tag resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub resource_uri: String,
    pub display_name: String,
    pub artist: String,
}

impl ResolvedResource {
    /// A resource with no display metadata
    pub fn new(resource_uri: impl Into<String>) -> Self {
        Self {
            resource_uri: resource_uri.into(),
            display_name: String::new(),
            artist: String::new(),
        }
    }
}

/// Resolves tags to playable resources
pub trait MappingLookup {
    /// `None` means the tag is unknown
    fn lookup(&self, tag: &TagId) -> Option<ResolvedResource>;
}

impl MappingLookup for MappingStore {
    fn lookup(&self, tag: &TagId) -> Option<ResolvedResource> {
        match self.get(tag.as_str()) {
            Ok(mapping) => mapping.map(|m| ResolvedResource {
                resource_uri: m.resource_uri,
                display_name: m.display_name,
                artist: m.artist,
            }),
            Err(e) => {
                // An unreadable store behaves like an empty one.
                tracing::error!("Mapping lookup for {} failed: {}", tag, e);
                None
            }
        }
    }
}

impl<S: BuildHasher> MappingLookup for HashMap<String, ResolvedResource, S> {
    fn lookup(&self, tag: &TagId) -> Option<ResolvedResource> {
        self.get(tag.as_str()).cloned()
    }
}
