//! Main-thread event bus.
//!
//! The listener thread must never touch host state. It pushes parsed events
//! into the bus through a [`BusSender`]; the host's main loop calls
//! [`InputEventBus::pump`] (or [`pump_timeout`](InputEventBus::pump_timeout))
//! each tick, which hands queued events, in arrival order, first to any
//! registered observer listeners and then to the sink (normally the
//! [`Dispatcher`](crate::dispatcher::Dispatcher)).
//!
//! Events already queued are always delivered; shutting the listener down does
//! not cancel them. One pump delivers at most [`InputEventBus::batch_limit`]
//! events so a busy producer cannot hold the host's tick; the rest wait for
//! the next pump.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::event::{InputEvent, InputKind};

/// Trait for reacting to marshaled input events on the main thread.
pub trait InputListener {
    fn on_input(&mut self, event: &InputEvent);
}

/// Determines which kinds of events an observer wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    ButtonsOnly,
    WheelsOnly,
    Custom(fn(&InputEvent) -> bool),
}

impl EventFilter {
    fn accepts(self, event: &InputEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::ButtonsOnly => event.kind.is_button(),
            EventFilter::WheelsOnly => matches!(event.kind, InputKind::WheelTurned { .. }),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
}

/// Cloneable, thread-safe handle for queueing events onto the bus.
#[derive(Clone, Debug)]
pub struct BusSender {
    tx: Sender<InputEvent>,
}

impl BusSender {
    /// Queue one event. Fails only once the bus has been dropped.
    pub fn send(&self, event: InputEvent) -> Result<(), InputEvent> {
        self.tx.send(event).map_err(|e| e.0)
    }
}

/// Default cap on events delivered by one pump.
pub const DEFAULT_BATCH_LIMIT: usize = 256;

pub struct InputEventBus {
    next_id: u64,
    batch_limit: usize,
    listeners: BTreeMap<u64, ListenerEntry>,
    tx: Sender<InputEvent>,
    rx: Receiver<InputEvent>,
}

impl Default for InputEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEventBus {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            next_id: 0,
            batch_limit: DEFAULT_BATCH_LIMIT,
            listeners: BTreeMap::new(),
            tx,
            rx,
        }
    }

    /// Cap the events delivered per pump. Zero is treated as one.
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.max(1);
        self
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    /// Handle for producers on other threads.
    pub fn sender(&self) -> BusSender {
        BusSender {
            tx: self.tx.clone(),
        }
    }

    /// Registers an observer with filtering. Observers see events before the sink.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    /// Emits one event to all active and matching observers, then to `sink`.
    fn emit(&mut self, event: &InputEvent, sink: &mut dyn InputListener) {
        for entry in self.listeners.values_mut() {
            if entry.enabled && entry.filter.accepts(event) {
                entry.listener.on_input(event);
            }
        }
        sink.on_input(event);
    }

    /// Deliver queued events without blocking, up to the batch limit.
    /// Returns how many ran.
    pub fn pump(&mut self, sink: &mut dyn InputListener) -> usize {
        self.drain(sink, self.batch_limit)
    }

    /// Wait up to `timeout` for the first event, then deliver what is queued,
    /// up to the batch limit in total.
    pub fn pump_timeout(&mut self, sink: &mut dyn InputListener, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.emit(&event, sink);
                1 + self.drain(sink, self.batch_limit - 1)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn drain(&mut self, sink: &mut dyn InputListener, limit: usize) -> usize {
        let mut delivered = 0;
        while delivered < limit {
            let Ok(event) = self.rx.try_recv() else {
                break;
            };
            self.emit(&event, sink);
            delivered += 1;
        }
        delivered
    }
}
