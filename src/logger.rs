//! Logging setup and an event-tracing observer.
//!
//! Output respects `RUST_LOG`; without it the level passed to [`init`] applies
//! to this crate and everything else stays at `warn`.

use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::event::InputEvent;
use crate::eventbus::InputListener;

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tourbridge={default_level}")));

    let console = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(console).try_init();
}

/// Observer that traces every event delivered by the bus.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl InputListener for Logger {
    fn on_input(&mut self, event: &InputEvent) {
        debug!(token = %event.token, kind = ?event.kind, "input");
    }
}
