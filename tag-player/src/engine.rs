//! Reconciliation engine
//!
//! Owns the single "active tag" and turns presence events into play/pause
//! decisions. The engine is deliberately conservative:
//!
//! - it never pauses on behalf of a tag that is not the active one, so stale
//!   or reordered removal frames are harmless;
//! - it never re-issues Play for the tag that is already active, so duplicate
//!   frames from a bouncing reader are harmless;
//! - switching to a tag that has no mapping still pauses the previous tag.
//!
//! The active tag follows physical presence, not confirmed playback. Whether
//! the resulting commands succeed has no effect on the state.

use std::fmt;

use crate::event::{PresenceEvent, TagId};
use crate::lookup::{MappingLookup, ResolvedResource};

/// A decision for the playback side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Start playing the resource bound to `tag`
    Play { tag: TagId, resource: ResolvedResource },
    /// Pause playback started for `tag`
    Pause { tag: TagId },
}

impl fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackCommand::Play { tag, resource } => {
                write!(f, "Play {} ({})", tag, resource.resource_uri)
            }
            PlaybackCommand::Pause { tag } => write!(f, "Pause {}", tag),
        }
    }
}

/// Observable state of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active(TagId),
}

/// Single-owner state machine over presence events
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    active: Option<TagId>,
}

impl ReconciliationEngine {
    /// A fresh engine with no active tag
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tag(&self) -> Option<&TagId> {
        self.active.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match &self.active {
            Some(tag) => SessionState::Active(tag.clone()),
            None => SessionState::Idle,
        }
    }

    /// Apply one event and return the commands it produces, in issue order
    pub fn handle(
        &mut self,
        event: &PresenceEvent,
        lookup: &dyn MappingLookup,
    ) -> Vec<PlaybackCommand> {
        match event {
            PresenceEvent::TagPresent(tag) => self.tag_present(tag, lookup),
            PresenceEvent::TagAbsent(tag) => self.tag_absent(tag),
            PresenceEvent::ReaderReady => {
                tracing::info!("Reader ready");
                Vec::new()
            }
        }
    }

    fn tag_present(&mut self, tag: &TagId, lookup: &dyn MappingLookup) -> Vec<PlaybackCommand> {
        if self.active.as_ref() == Some(tag) {
            tracing::debug!("Tag {} re-presented while active, ignoring", tag);
            return Vec::new();
        }

        let mut commands = Vec::with_capacity(2);
        if let Some(previous) = self.active.take() {
            tracing::debug!("Tag {} replaces active tag {}", tag, previous);
            commands.push(PlaybackCommand::Pause { tag: previous });
        }

        match lookup.lookup(tag) {
            Some(resource) => {
                tracing::info!(
                    "Tag {} -> {} {}",
                    tag,
                    resource.resource_uri,
                    describe(&resource)
                );
                self.active = Some(tag.clone());
                commands.push(PlaybackCommand::Play {
                    tag: tag.clone(),
                    resource,
                });
            }
            None => tracing::warn!("Unknown tag: {}", tag),
        }

        commands
    }

    fn tag_absent(&mut self, tag: &TagId) -> Vec<PlaybackCommand> {
        if self.active.as_ref() != Some(tag) {
            tracing::debug!("Ignoring removal of inactive tag {}", tag);
            return Vec::new();
        }

        self.active = None;
        vec![PlaybackCommand::Pause { tag: tag.clone() }]
    }
}

fn describe(resource: &ResolvedResource) -> String {
    match (resource.display_name.is_empty(), resource.artist.is_empty()) {
        (true, _) => String::new(),
        (false, true) => format!("\"{}\"", resource.display_name),
        (false, false) => format!("\"{}\" by {}", resource.display_name, resource.artist),
    }
}
