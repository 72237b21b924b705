//! Behaviour profiles.
//!
//! A [`Profile`] turns one parsed event into one effect on the host. Two
//! variants exist:
//!
//! - [`BaseProfile`]: generic editing. Dials adjust a property captured through
//!   the clipboard bridge, the flat wheel scrubs the timeline, buttons cycle
//!   modes and hold keyboard modifiers.
//! - [`BrushProfile`]: active while the host exposes a brush. Dials and wheels
//!   adjust brush size/strength/flow and preset buttons recall or store brushes.
//!
//! Each variant owns its held-button set and velocity state. The
//! [`ProfileSelector`] picks one per event and never moves state between them,
//! so a button pressed under one profile and released under the other reports
//! [`DispatchError::InvalidState`].

mod base;
mod brush;
mod selector;

use std::fmt;
use std::time::Instant;

pub use base::{BaseProfile, TargetProperty};
pub use brush::BrushProfile;
pub use selector::ProfileSelector;

use crate::clipboard::ClipboardBridge;
use crate::error::DispatchError;
use crate::event::Direction;
use crate::host::{Effector, HostStore};

/// Which profile variant handled an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Base,
    Brush,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Base => f.write_str("base"),
            ProfileKind::Brush => f.write_str("brush"),
        }
    }
}

/// Collaborators a handler may touch while processing one event.
pub struct ActionContext<'a> {
    pub host: &'a mut dyn HostStore,
    pub effector: &'a mut dyn Effector,
    pub clipboard: &'a dyn ClipboardBridge,
    /// Arrival time of the event being handled.
    pub now: Instant,
}

/// Event-to-effect mapping for one application context.
///
/// `pressed` tells a dial/wheel handler whether the control itself is held,
/// which selects the fine variant of its adjustment.
pub trait Profile {
    fn kind(&self) -> ProfileKind;

    fn tall_dial(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError>;

    fn flat_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError>;

    fn mouse_wheel(
        &mut self,
        cx: &mut ActionContext<'_>,
        pressed: bool,
        direction: Direction,
    ) -> Result<(), DispatchError>;

    fn button_press(&mut self, cx: &mut ActionContext<'_>, control: &str)
        -> Result<(), DispatchError>;

    fn button_release(
        &mut self,
        cx: &mut ActionContext<'_>,
        control: &str,
    ) -> Result<(), DispatchError>;

    fn button_state(&self, control: &str) -> bool;

    /// Adopt a finished clipboard capture, if one is outstanding.
    fn poll_capture(&mut self, host: &dyn HostStore);
}

/// `fine` when the control is held, `coarse` otherwise.
#[inline]
pub(crate) fn pick(pressed: bool, fine: f64, coarse: f64) -> f64 {
    if pressed {
        fine
    } else {
        coarse
    }
}
