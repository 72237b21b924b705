//! Event dispatcher: the engine's entry point.
//!
//! [`Dispatcher::dispatch`] handles one event:
//! 1. adopt any finished clipboard capture,
//! 2. pick the active profile from the host context,
//! 3. feed button edges to `button_press` / `button_release`,
//! 4. route dial and wheel detents to `tall_dial` / `flat_wheel` / `mouse_wheel`,
//!    with `pressed` taken from the active profile's held-button set.
//!
//! The dispatcher is also an [`InputListener`], so it can be the sink of an
//! [`InputEventBus`](crate::eventbus::InputEventBus). As a listener it logs
//! failures and carries on.

use tracing::{debug, warn};

use crate::clipboard::ClipboardBridge;
use crate::config::BridgeConfig;
use crate::error::DispatchError;
use crate::event::{InputEvent, InputKind, Wheel};
use crate::eventbus::InputListener;
use crate::host::{Effector, HostStore};
use crate::profile::{ActionContext, ProfileKind, ProfileSelector};

pub struct Dispatcher<H, E> {
    host: H,
    effector: E,
    clipboard: Box<dyn ClipboardBridge>,
    selector: ProfileSelector,
}

impl<H: HostStore, E: Effector> Dispatcher<H, E> {
    pub fn new(
        config: &BridgeConfig,
        host: H,
        effector: E,
        clipboard: Box<dyn ClipboardBridge>,
    ) -> Self {
        Self {
            host,
            effector,
            clipboard,
            selector: ProfileSelector::new(config.profile.clone(), config.brush.clone()),
        }
    }

    /// Route one event through the active profile.
    pub fn dispatch(&mut self, event: &InputEvent) -> Result<(), DispatchError> {
        let Self {
            host,
            effector,
            clipboard,
            selector,
        } = self;

        selector.poll_captures(&*host);
        let profile = selector.select(&*host);
        let kind = profile.kind();
        let mut cx = ActionContext {
            host,
            effector,
            clipboard: &**clipboard,
            now: event.at,
        };

        match &event.kind {
            InputKind::ButtonPressed { control } => {
                debug!(profile = %kind, %control, "press");
                profile.button_press(&mut cx, control)
            }
            InputKind::ButtonReleased { control } => {
                debug!(profile = %kind, %control, "release");
                profile.button_release(&mut cx, control)
            }
            InputKind::WheelTurned { wheel, direction } => {
                let pressed = profile.button_state(wheel.name());
                debug!(profile = %kind, %wheel, ?direction, pressed, "turn");
                match wheel {
                    Wheel::TallDial => profile.tall_dial(&mut cx, pressed, *direction),
                    Wheel::FlatWheel => profile.flat_wheel(&mut cx, pressed, *direction),
                    Wheel::MouseWheel => profile.mouse_wheel(&mut cx, pressed, *direction),
                }
            }
        }
    }

    /// Adopt finished clipboard captures without an event. Call once per host tick.
    pub fn tick(&mut self) {
        self.selector.poll_captures(&self.host);
    }

    pub fn active_profile(&self) -> ProfileKind {
        self.selector.active()
    }

    pub fn selector(&self) -> &ProfileSelector {
        &self.selector
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn effector(&self) -> &E {
        &self.effector
    }

    pub fn into_parts(self) -> (H, E) {
        (self.host, self.effector)
    }
}

impl<H: HostStore, E: Effector> InputListener for Dispatcher<H, E> {
    fn on_input(&mut self, event: &InputEvent) {
        if let Err(e) = self.dispatch(event) {
            warn!(token = %event.token, "event dropped: {e}");
        }
    }
}
