//! Property-based tests for the reconciliation engine

use proptest::prelude::*;
use std::collections::HashMap;

use tag_player::{
    PlaybackCommand, PresenceEvent, ReconciliationEngine, ResolvedResource, SessionState, TagId,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Tags "A".."C" are mapped, "X" and "Y" are not
fn mappings() -> HashMap<String, ResolvedResource> {
    ["A", "B", "C"]
        .iter()
        .map(|t| (t.to_string(), ResolvedResource::new(format!("spotify:track:{}", t))))
        .collect()
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["A", "B", "C", "X", "Y"]).prop_map(str::to_string)
}

fn event_strategy() -> impl Strategy<Value = PresenceEvent> {
    prop_oneof![
        4 => tag_strategy().prop_map(|t| PresenceEvent::TagPresent(TagId::new(t))),
        4 => tag_strategy().prop_map(|t| PresenceEvent::TagAbsent(TagId::new(t))),
        1 => Just(PresenceEvent::ReaderReady),
    ]
}

fn events_strategy() -> impl Strategy<Value = Vec<PresenceEvent>> {
    prop::collection::vec(event_strategy(), 0..64)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Commands form a strict Play/Pause alternation: no second Play while a
    /// tag is playing, and every Pause names the tag that is playing.
    #[test]
    fn prop_at_most_one_active(events in events_strategy()) {
        let lookup = mappings();
        let mut engine = ReconciliationEngine::new();
        let mut playing: Option<TagId> = None;

        for event in &events {
            for command in engine.handle(event, &lookup) {
                match command {
                    PlaybackCommand::Play { tag, .. } => {
                        prop_assert!(playing.is_none(), "Play {} while {:?} active", tag, playing);
                        playing = Some(tag);
                    }
                    PlaybackCommand::Pause { tag } => {
                        prop_assert_eq!(playing.take(), Some(tag));
                    }
                }
            }
            prop_assert_eq!(engine.active_tag(), playing.as_ref());
        }
    }

    /// Re-presenting the active tag never produces anything
    #[test]
    fn prop_re_presentation_is_idempotent(
        events in events_strategy(),
        repeats in 1usize..5,
    ) {
        let lookup = mappings();
        let mut engine = ReconciliationEngine::new();
        for event in &events {
            engine.handle(event, &lookup);
        }

        if let Some(active) = engine.active_tag().cloned() {
            for _ in 0..repeats {
                let commands = engine.handle(&PresenceEvent::TagPresent(active.clone()), &lookup);
                prop_assert!(commands.is_empty());
            }
            prop_assert_eq!(engine.state(), SessionState::Active(active));
        }
    }

    /// Removing any tag other than the active one changes nothing
    #[test]
    fn prop_stale_removal_is_ignored(
        events in events_strategy(),
        other in tag_strategy(),
    ) {
        let lookup = mappings();
        let mut engine = ReconciliationEngine::new();
        for event in &events {
            engine.handle(event, &lookup);
        }

        let before = engine.state();
        let other = TagId::new(other);
        if engine.active_tag() != Some(&other) {
            prop_assert!(engine.handle(&PresenceEvent::TagAbsent(other), &lookup).is_empty());
            prop_assert_eq!(engine.state(), before);
        }
    }

    /// Unmapped tags always leave the engine idle, pausing whatever was active
    #[test]
    fn prop_unknown_tag_ends_idle(
        events in events_strategy(),
        unknown in prop::sample::select(vec!["X", "Y"]),
    ) {
        let lookup = mappings();
        let mut engine = ReconciliationEngine::new();
        for event in &events {
            engine.handle(event, &lookup);
        }

        let previous = engine.active_tag().cloned();
        let commands = engine.handle(&PresenceEvent::TagPresent(unknown.into()), &lookup);

        let expected: Vec<PlaybackCommand> = previous
            .into_iter()
            .map(|tag| PlaybackCommand::Pause { tag })
            .collect();
        prop_assert_eq!(commands, expected);
        prop_assert_eq!(engine.state(), SessionState::Idle);
    }
}
