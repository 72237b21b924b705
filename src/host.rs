//! Interfaces to the host application and the key-injection facility.
//!
//! The engine never reaches into the host directly. Everything it reads or
//! writes goes through [`HostStore`], and every simulated keystroke goes
//! through [`Effector`]. Both are called only from the thread that pumps the
//! [`InputEventBus`](crate::eventbus::InputEventBus).
//!
//! [`sim::SimHost`](crate::sim::SimHost) and
//! [`sim::RecordingEffector`](crate::sim::RecordingEffector) are in-memory
//! implementations; [`XdotoolEffector`](crate::backends::xdotool::XdotoolEffector)
//! drives real key injection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EffectorError, HostError};

/// Resolved handle to a numeric property.
///
/// Obtained once from [`HostStore::resolve_property`] when a property path is
/// captured; later reads and writes go through the handle instead of
/// re-interpreting the path text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyRef {
    path: String,
}

impl PropertyRef {
    /// Hosts construct handles for paths they have validated.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Opaque handle to a brush-like object in the host.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BrushRef(pub String);

impl fmt::Display for BrushRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric brush properties adjusted by the brush profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BrushProperty {
    Size,
    Strength,
    Flow,
}

/// Mutable view of the host application's state.
pub trait HostStore {
    /// Current tool mode (e.g. `"SCULPT"`, `"OBJECT"`).
    fn mode(&self) -> String;

    /// Request a mode transition. The host may refuse.
    fn set_mode(&mut self, mode: &str) -> Result<(), HostError>;

    /// Validate a dotted property path and return a handle to it.
    fn resolve_property(&self, path: &str) -> Result<PropertyRef, HostError>;

    fn property(&self, prop: &PropertyRef) -> Result<f64, HostError>;

    fn set_property(&mut self, prop: &PropertyRef, value: f64) -> Result<(), HostError>;

    /// Current timeline frame.
    fn frame(&self) -> i64;

    fn set_frame(&mut self, frame: i64);

    /// Jump to the next (`forward`) or previous keyframe.
    fn jump_keyframe(&mut self, forward: bool) -> Result<(), HostError>;

    /// The brush-like object being edited, if the current tool exposes one.
    fn active_brush(&self) -> Option<BrushRef>;

    fn set_active_brush(&mut self, brush: &BrushRef) -> Result<(), HostError>;

    fn brush_value(&self, brush: &BrushRef, prop: BrushProperty) -> Result<f64, HostError>;

    fn set_brush_value(
        &mut self,
        brush: &BrushRef,
        prop: BrushProperty,
        value: f64,
    ) -> Result<(), HostError>;

    /// Orientation flag (add/subtract) of a brush.
    fn brush_direction(&self, brush: &BrushRef) -> Result<bool, HostError>;

    fn set_brush_direction(&mut self, brush: &BrushRef, inverted: bool) -> Result<(), HostError>;

    /// Preset stored for `(mode, button)`, if any.
    fn get_brush(&self, mode: &str, button: &str) -> Option<BrushRef>;

    /// Store a copy of `brush` as the preset for `(mode, button)`, replacing any
    /// previous one, and return the stored preset.
    fn overwrite_brush(
        &mut self,
        mode: &str,
        button: &str,
        brush: &BrushRef,
    ) -> Result<BrushRef, HostError>;
}

/// Fire-and-forget key simulation.
///
/// `keys` are key names understood by the backend (`"ctrl"`, `"grave"`); a
/// chord is a single `+`-joined combination (`"ctrl+alt+shift+c"`).
pub trait Effector {
    fn key_down(&mut self, keys: &[String]) -> Result<(), EffectorError>;
    fn key_up(&mut self, keys: &[String]) -> Result<(), EffectorError>;
    fn key_chord(&mut self, chord: &str) -> Result<(), EffectorError>;
}

impl<E: Effector + ?Sized> Effector for Box<E> {
    fn key_down(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        (**self).key_down(keys)
    }
    fn key_up(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        (**self).key_up(keys)
    }
    fn key_chord(&mut self, chord: &str) -> Result<(), EffectorError> {
        (**self).key_chord(chord)
    }
}
