//! Clipboard bridge: captures a property path from the host.
//!
//! The capture button asks the host to copy the hovered property's data path
//! (via a key chord), then an external script dumps the clipboard into a
//! well-known file. [`ScriptBridge`] runs that script and polls the file on a
//! background thread so the host's main thread never waits on it; the result
//! comes back through a [`PendingCapture`] that profiles check on every tick.
//!
//! The capture file holds the property path on its first line and, optionally,
//! the property's current value on the second.

use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::config::ClipboardConfig;

/// Parsed content of the capture file.
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub path: String,
    /// Value reported alongside the path, if it parsed as a finite number.
    pub value: Option<f64>,
}

impl Capture {
    /// Parse capture-file text. Returns `None` if there is no path line.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let path = lines.next()?.to_string();
        let value = lines
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite());
        Some(Self { path, value })
    }
}

/// State of an outstanding capture.
#[derive(Debug, PartialEq)]
pub enum CaptureStatus {
    Pending,
    Ready(Capture),
    /// Poll budget exhausted, or the poller went away.
    Failed,
}

/// Receiving end of a capture running elsewhere. Dropping it cancels the poll.
#[derive(Debug)]
pub struct PendingCapture {
    rx: Receiver<Option<Capture>>,
    cancel: Arc<AtomicBool>,
}

impl PendingCapture {
    fn channel() -> (mpsc::Sender<Option<Capture>>, Arc<AtomicBool>, Self) {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let pending = Self {
            rx,
            cancel: Arc::clone(&cancel),
        };
        (tx, cancel, pending)
    }

    /// A capture that has already completed.
    pub fn ready(capture: Capture) -> Self {
        let (tx, _, pending) = Self::channel();
        let _ = tx.send(Some(capture));
        pending
    }

    /// A capture that has already failed.
    pub fn failed() -> Self {
        let (tx, _, pending) = Self::channel();
        let _ = tx.send(None);
        pending
    }

    /// Non-blocking check.
    pub fn poll(&mut self) -> CaptureStatus {
        match self.rx.try_recv() {
            Ok(Some(capture)) => CaptureStatus::Ready(capture),
            Ok(None) | Err(TryRecvError::Disconnected) => CaptureStatus::Failed,
            Err(TryRecvError::Empty) => CaptureStatus::Pending,
        }
    }
}

impl Drop for PendingCapture {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Starts property captures.
pub trait ClipboardBridge {
    fn request(&self) -> PendingCapture;
}

impl<F> ClipboardBridge for F
where
    F: Fn() -> PendingCapture,
{
    fn request(&self) -> PendingCapture {
        self()
    }
}

/// Runs the configured script and polls the capture file in the background.
#[derive(Debug, Clone)]
pub struct ScriptBridge {
    config: ClipboardConfig,
}

impl ScriptBridge {
    pub fn new(config: ClipboardConfig) -> Self {
        Self { config }
    }
}

impl ClipboardBridge for ScriptBridge {
    fn request(&self) -> PendingCapture {
        // A file left over from an earlier capture would be picked up immediately.
        match std::fs::remove_file(&self.config.capture_file) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                file = %self.config.capture_file.display(),
                "could not clear stale capture file: {e}"
            ),
        }

        let (tx, cancel, pending) = PendingCapture::channel();
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name("clipboard-bridge".into())
            .spawn(move || {
                let capture = run_capture(&config, &cancel);
                // The requester may have moved on; nothing to do then.
                let _ = tx.send(capture);
            });

        match spawned {
            Ok(_) => pending,
            Err(e) => {
                warn!("failed to start clipboard bridge thread: {e}");
                PendingCapture::failed()
            }
        }
    }
}

fn run_capture(config: &ClipboardConfig, cancel: &AtomicBool) -> Option<Capture> {
    if let Some(script) = &config.script {
        match Command::new(script).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(script = %script.display(), "clipboard script exited with {status}"),
            Err(e) => {
                warn!(script = %script.display(), "failed to run clipboard script: {e}");
                return None;
            }
        }
    }

    for attempt in 0..config.attempts {
        if cancel.load(Ordering::Relaxed) {
            debug!("clipboard capture cancelled");
            return None;
        }
        // An empty file may still be mid-write; keep polling.
        if let Some(capture) = std::fs::read_to_string(&config.capture_file)
            .ok()
            .and_then(|text| Capture::parse(&text))
        {
            debug!(attempt, ?capture, "capture file read");
            return Some(capture);
        }
        thread::sleep(config.interval());
    }

    debug!(attempts = config.attempts, "capture file never appeared");
    None
}
