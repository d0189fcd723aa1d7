//! Line → event → command pipeline
//!
//! [`TagPlayer`] is the serialized entry point the read loop drives. It owns the
//! engine by value; every line passes through decode, transition and dispatch
//! before the next one is looked at.

use crate::decoder::decode_line;
use crate::dispatcher::CommandSink;
use crate::engine::ReconciliationEngine;
use crate::event::PresenceEvent;
use crate::lookup::MappingLookup;

pub struct TagPlayer<L, K> {
    engine: ReconciliationEngine,
    lookup: L,
    sink: K,
}

impl<L: MappingLookup, K: CommandSink> TagPlayer<L, K> {
    pub fn new(lookup: L, sink: K) -> Self {
        Self {
            engine: ReconciliationEngine::new(),
            lookup,
            sink,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consume the player, returning the sink (e.g. to shut a dispatcher down)
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Decode and apply one raw line.
    ///
    /// Returns the decoded event, or `None` if the line was discarded.
    pub fn handle_line(&mut self, line: &str) -> Option<PresenceEvent> {
        match decode_line(line) {
            Ok(event) => {
                tracing::debug!("Event: {}", event);
                self.handle_event(&event);
                Some(event)
            }
            Err(e) => {
                tracing::warn!("Discarding frame {:?}: {}", line, e);
                None
            }
        }
    }

    /// Apply one event and forward the resulting commands to the sink
    pub fn handle_event(&mut self, event: &PresenceEvent) {
        for command in self.engine.handle(event, &self.lookup) {
            if let Err(e) = self.sink.submit(command) {
                tracing::error!("Playback command not delivered: {}", e);
            }
        }
    }

    /// Drive the player from a line source until it is exhausted
    pub fn run<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        for line in lines {
            self.handle_line(&line);
        }
        tracing::info!("Line source exhausted");
    }
}
