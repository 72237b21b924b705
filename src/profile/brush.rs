use std::time::Instant;

use tracing::{debug, info};

use super::{pick, ActionContext, BaseProfile, Profile, ProfileKind};
use crate::config::{BrushConfig, ProfileConfig};
use crate::error::DispatchError;
use crate::event::Direction;
use crate::host::{BrushProperty, BrushRef, HostStore};

/// Profile used while the host exposes a brush.
///
/// Builds on its own [`BaseProfile`] (mode buttons, modifier keys, clipboard
/// capture and the mouse wheel behave the same) and overrides the dials.
///
/// Preset buttons distinguish a tap from a hold: the press recalls the preset
/// bound to `(mode, button)` right away; a release at least
/// [`BrushConfig::rebind_timeout`] after the press stores the active brush as
/// that preset.
#[derive(Debug)]
pub struct BrushProfile {
    base: BaseProfile,
    config: BrushConfig,
    brush: Option<BrushRef>,
    /// Press time of the preset button awaiting release. `None` when no rebind is pending.
    rebind_started: Option<Instant>,
}

impl BrushProfile {
    pub fn new(profile: ProfileConfig, config: BrushConfig) -> Self {
        Self {
            base: BaseProfile::new(profile),
            config,
            brush: None,
            rebind_started: None,
        }
    }

    /// Refresh the handle to the brush being edited.
    pub fn bind(&mut self, brush: BrushRef) {
        if self.brush.as_ref() != Some(&brush) {
            debug!(%brush, "brush profile bound");
            self.brush = Some(brush);
        }
    }

    pub fn brush(&self) -> Option<&BrushRef> {
        self.brush.as_ref()
    }

    pub fn base(&self) -> &BaseProfile {
        &self.base
    }

    pub fn rebind_pending(&self) -> bool {
        self.rebind_started.is_some()
    }

    fn bound(&self) -> Result<BrushRef, DispatchError> {
        self.brush.clone().ok_or(DispatchError::NoActiveBrush)
    }

    fn nudge(
        &self,
        host: &mut dyn HostStore,
        prop: BrushProperty,
        delta: f64,
    ) -> Result<(), DispatchError> {
        let brush = self.bound()?;
        let value = host.brush_value(&brush, prop)?;
        host.set_brush_value(&brush, prop, value + delta)?;
        Ok(())
    }

    fn recall_preset(&mut self, host: &mut dyn HostStore, button: &str) -> Result<(), DispatchError> {
        let mode = host.mode();
        if let Some(preset) = host.get_brush(&mode, button) {
            host.set_active_brush(&preset)?;
            debug!(%preset, %mode, button, "preset recalled");
            self.brush = Some(preset);
        }
        Ok(())
    }

    fn store_preset(&mut self, host: &mut dyn HostStore, button: &str) -> Result<(), DispatchError> {
        let active = host.active_brush().ok_or(DispatchError::NoActiveBrush)?;
        let mode = host.mode();
        let preset = host.overwrite_brush(&mode, button, &active)?;
        host.set_active_brush(&preset)?;
        info!(%preset, %mode, button, "preset stored");
        self.brush = Some(preset);
        Ok(())
    }
}

impl Profile for BrushProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::Brush
    }

    fn tall_dial(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        let delta = direction.factor() * pick(pressed, 2.0, 20.0);
        self.nudge(cx.host, BrushProperty::Size, delta)
    }

    fn flat_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        let delta = direction.factor() * pick(pressed, 0.008, 0.2);
        self.nudge(cx.host, BrushProperty::Strength, delta)?;
        self.nudge(cx.host, BrushProperty::Flow, delta)
    }

    fn mouse_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError> {
        self.base.mouse_wheel(cx, pressed, direction)
    }

    fn button_press(
        &mut self,
        cx: &mut ActionContext<'_>,
        control: &str,
    ) -> Result<(), DispatchError> {
        self.base.button_press(cx, control)?;

        if control == self.config.direction_button {
            let brush = self.bound()?;
            let inverted = cx.host.brush_direction(&brush)?;
            cx.host.set_brush_direction(&brush, !inverted)?;
        } else if self.config.is_preset_button(control) {
            self.rebind_started = Some(cx.now);
            self.recall_preset(cx.host, control)?;
        }
        Ok(())
    }

    fn button_release(
        &mut self,
        cx: &mut ActionContext<'_>,
        control: &str,
    ) -> Result<(), DispatchError> {
        let released = self.base.button_release(cx, control);
        // Not held here: the press (and any pending timer) belongs elsewhere.
        if let Err(DispatchError::InvalidState { .. }) = released {
            return released;
        }

        // The tracker has released the button even if the modifier key-up failed.
        if self.config.is_preset_button(control) {
            let held = self
                .rebind_started
                .take()
                .map(|started| cx.now.saturating_duration_since(started));
            match held {
                Some(held) if held >= self.config.rebind_timeout() => {
                    self.store_preset(cx.host, control)?;
                }
                _ => debug!(control, ?held, "preset tap"),
            }
        }
        released
    }

    fn button_state(&self, control: &str) -> bool {
        self.base.button_state(control)
    }

    fn poll_capture(&mut self, host: &dyn HostStore) {
        self.base.poll_capture(host);
    }
}
