//! Progress reporting channel.
//!
//! Operations report through an explicit `ProgressChannel` argument. Events are
//! observation-only: nothing in the engine reads them back or branches on them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::config::ProgressConfig;

/// Phase of an operation's progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressState {
    Start,
    Pending,
    End,
    Error,
}

/// A single progress notification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Name of the emitting operation (e.g. `booleanAdd`)
    pub method: String,
    pub message: String,
    /// 0..=100
    pub percent: f32,
    pub state: ProgressState,
    /// Correlation id shared by all events of one invocation
    pub function_id: u64,
}

/// Destination for progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Forwards events to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: ProgressEvent) {
        match event.state {
            ProgressState::Pending => log::trace!(
                "[{}#{}] {} ({:.0}%)", event.method, event.function_id, event.message, event.percent
            ),
            ProgressState::Start | ProgressState::End => log::debug!(
                "[{}#{}] {}", event.method, event.function_id, event.message
            ),
            ProgressState::Error => log::warn!(
                "[{}#{}] {}", event.method, event.function_id, event.message
            ),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted by one operation name.
    pub fn events_for(&self, method: &str) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.method == method)
            .collect()
    }

    /// Drain all recorded events.
    pub fn take(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Sends events over a tokio channel so a host loop can consume them.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver that drains it.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

/// Progress channel threaded through every operation.
pub struct ProgressChannel {
    sink: Arc<dyn ProgressSink>,
    config: ProgressConfig,
    next_id: AtomicU64,
}

impl ProgressChannel {
    /// Create a channel over the given sink with default cadence.
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self::with_config(sink, ProgressConfig::default())
    }

    pub fn with_config(sink: Arc<dyn ProgressSink>, config: ProgressConfig) -> Self {
        Self {
            sink,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    /// Channel that discards everything.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullSink))
    }

    /// Channel that writes events to the log.
    pub fn logging() -> Self {
        Self::new(Arc::new(LogSink))
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Fresh correlation id.
    pub fn generate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Emit a raw event.
    pub fn emit(&self, event: ProgressEvent) {
        self.sink.emit(event);
    }

    /// Start reporting for one invocation of `method`; emits the start marker.
    pub fn begin(&self, method: &'static str, message: impl Into<String>) -> Task<'_> {
        let task = Task {
            channel: self,
            method,
            function_id: self.generate_id(),
            unit: 0,
            processed: 0,
        };
        task.send(message.into(), 0.0, ProgressState::Start);
        task
    }
}

impl Default for ProgressChannel {
    fn default() -> Self {
        Self::silent()
    }
}

impl std::fmt::Debug for ProgressChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressChannel")
            .field("config", &self.config)
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

/// Progress handle for one operation invocation.
pub struct Task<'a> {
    channel: &'a ProgressChannel,
    method: &'static str,
    function_id: u64,
    unit: u64,
    processed: u64,
}

impl<'a> Task<'a> {
    /// Correlation id of this invocation.
    pub fn function_id(&self) -> u64 {
        self.function_id
    }

    /// Declare the amount of work for the next traversal and reset the counter.
    pub fn set_work(&mut self, total: u64) {
        self.unit = self.channel.config.tick_unit(total);
        self.processed = 0;
    }

    /// Count one unit of work, emitting a pending event on every tick boundary.
    #[inline]
    pub fn tick(&mut self, message: &str) {
        self.processed += 1;
        if self.unit != 0 && self.processed % self.unit == 0 {
            let percent = (self.processed / self.unit) as f32;
            self.send(message.to_owned(), percent.min(100.0), ProgressState::Pending);
        }
    }

    /// Emit a pending milestone with an explicit percentage.
    pub fn pending(&self, percent: f32, message: impl Into<String>) {
        self.send(message.into(), percent, ProgressState::Pending);
    }

    /// Emit the end marker.
    pub fn end(self, message: impl Into<String>) {
        self.send(message.into(), 100.0, ProgressState::End);
    }

    /// Emit the error marker.
    pub fn fail(self, message: impl Into<String>) {
        self.send(message.into(), 100.0, ProgressState::Error);
    }

    fn send(&self, message: String, percent: f32, state: ProgressState) {
        self.channel.emit(ProgressEvent {
            method: self.method.to_owned(),
            message,
            percent,
            state,
            function_id: self.function_id,
        });
    }
}
