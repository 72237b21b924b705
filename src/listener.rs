//! Background listener thread.
//!
//! Reads tokens from a [`Device`], drops sentinels and malformed tokens,
//! stamps the rest with their arrival time and queues them on the main-thread
//! bus. The shutdown token ends the loop without being queued, so it never
//! reaches a profile. A closed device, a dropped bus or
//! [`ListenerHandle::shutdown`] also end it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info, trace};

use crate::config::TransportConfig;
use crate::device::Device;
use crate::error::TransportError;
use crate::event::{is_discarded, InputEvent};
use crate::eventbus::BusSender;

/// Why the listener thread stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ShutdownToken,
    Requested,
    DeviceClosed,
    BusClosed,
    DeviceError,
}

#[derive(Debug, Clone)]
struct Sentinels {
    unknown: String,
    shutdown: Option<String>,
}

pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<StopReason>,
}

impl ListenerHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Ask the thread to stop and wait for it.
    ///
    /// A source blocked in a read notices the request at its next timeout.
    pub fn shutdown(self) -> StopReason {
        self.stop.store(true, Ordering::Relaxed);
        self.join()
    }

    /// Wait for the thread to stop on its own.
    pub fn join(self) -> StopReason {
        self.thread.join().unwrap_or_else(|_| {
            error!("listener thread panicked");
            StopReason::DeviceError
        })
    }
}

/// Start the listener on its own thread.
pub fn spawn<D>(device: D, bus: BusSender, config: &TransportConfig) -> io::Result<ListenerHandle>
where
    D: Device + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let sentinels = Sentinels {
        unknown: config.unknown_token.clone(),
        shutdown: config.shutdown_token.clone(),
    };
    let flag = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name("token-listener".into())
        .spawn(move || run(device, bus, sentinels, flag))?;
    Ok(ListenerHandle { stop, thread })
}

fn run<D: Device>(
    mut device: D,
    bus: BusSender,
    sentinels: Sentinels,
    stop: Arc<AtomicBool>,
) -> StopReason {
    info!(device = device.id(), name = device.name(), "listener started");
    let reason = loop {
        if stop.load(Ordering::Relaxed) {
            break StopReason::Requested;
        }
        let token = match device.next_token() {
            Ok(Some(token)) => token,
            Ok(None) => continue,
            Err(TransportError::Closed) => break StopReason::DeviceClosed,
            Err(e) => {
                error!("listener stopped: {e}");
                break StopReason::DeviceError;
            }
        };
        if is_discarded(&token, &sentinels.unknown) {
            trace!(%token, "discarded");
            continue;
        }
        if sentinels.shutdown.as_deref() == Some(token.trim()) {
            break StopReason::ShutdownToken;
        }
        let Some(event) = InputEvent::parse(&token, Instant::now()) else {
            debug!(%token, "unrecognised token");
            continue;
        };
        if bus.send(event).is_err() {
            break StopReason::BusClosed;
        }
    };
    info!(?reason, "listener stopped");
    reason
}
