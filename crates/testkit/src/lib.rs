#![warn(missing_docs)]
//! Headless testing surfaces: a capability recorder that records every callback
//! and a newline-delimited JSON sink for the recorded stream.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use vrkit_core::{
    Grabbable, InteractionContext, InteractionError, NodeId, Scene, Touchable, Triggerable,
};

/// Callback kinds a recorder can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `on_touch_start`
    TouchStart,
    /// `on_touch_stop`
    TouchStop,
    /// `on_trigger_down`
    TriggerDown,
    /// `on_trigger_up`
    TriggerUp,
    /// `on_grab_start`
    GrabStart,
    /// `on_grab_update`
    GrabUpdate,
    /// `on_grab_stop`
    GrabStop,
}

/// One captured callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the recorder's stream, starting at 0.
    pub seq: u64,
    /// Which callback fired.
    pub kind: EventKind,
    /// Node the callback fired for.
    pub node: NodeId,
    /// Controller that caused it.
    pub controller: u32,
}

#[derive(Debug, Default)]
struct Journal {
    events: Vec<EventRecord>,
    fail_on: Option<EventKind>,
}

/// Capability handler implementing all three capabilities. Clones share one
/// journal, so a test keeps a clone and registers the other on nodes.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    journal: Arc<Mutex<Journal>>,
}

impl RecordingHandler {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every callback of `kind` return an error after recording it.
    pub fn fail_on(&self, kind: EventKind) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.fail_on = Some(kind);
        }
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<EventRecord> {
        self.journal
            .lock()
            .map(|journal| journal.events.clone())
            .unwrap_or_default()
    }

    /// Kinds recorded for `node`, in order.
    pub fn kinds_for(&self, node: NodeId) -> Vec<EventKind> {
        self.events()
            .into_iter()
            .filter(|event| event.node == node)
            .map(|event| event.kind)
            .collect()
    }

    /// How many times `kind` fired, across all nodes.
    pub fn count(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|event| event.kind == kind).count()
    }

    /// Drop the recorded events.
    pub fn clear(&self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.events.clear();
        }
    }

    fn record(
        &self,
        kind: EventKind,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        let mut journal = match self.journal.lock() {
            Ok(journal) => journal,
            Err(poisoned) => poisoned.into_inner(),
        };
        let seq = journal.events.len() as u64;
        journal.events.push(EventRecord {
            seq,
            kind,
            node,
            controller: ctx.controller_index,
        });
        tracing::trace!(?kind, node = %node, "callback recorded");
        if journal.fail_on == Some(kind) {
            return Err(InteractionError::MissingComponent {
                node,
                component: "RecordingHandler",
            });
        }
        Ok(())
    }
}

impl Touchable for RecordingHandler {
    fn on_touch_start(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::TouchStart, node, ctx)
    }

    fn on_touch_stop(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::TouchStop, node, ctx)
    }
}

impl Triggerable for RecordingHandler {
    fn on_trigger_down(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::TriggerDown, node, ctx)
    }

    fn on_trigger_up(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::TriggerUp, node, ctx)
    }
}

impl Grabbable for RecordingHandler {
    fn on_grab_start(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::GrabStart, node, ctx)
    }

    fn on_grab_update(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::GrabUpdate, node, ctx)
    }

    fn on_grab_stop(
        &self,
        _scene: &mut Scene,
        node: NodeId,
        ctx: &InteractionContext,
    ) -> Result<(), InteractionError> {
        self.record(EventKind::GrabStop, node, ctx)
    }
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write<T: Serialize>(&mut self, event: &T) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }

    /// Append every event of a recorder.
    pub fn write_all(&mut self, events: &[EventRecord]) -> Result<()> {
        for event in events {
            self.write(event)?;
        }
        self.file.flush()?;
        Ok(())
    }
}

/// Read back a file written by [`JsonlSink`].
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<EventRecord>> {
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}
