//! Event tokens and their parsed form.
//!
//! The device firmware reports every change as a short textual token, one per
//! datagram, built from a control name plus exactly one suffix:
//!
//! - **Buttons:** `<Control>Press` / `<Control>Release` (e.g. `SideThumbPress`).
//! - **Dials and wheels:** `<Control><Direction>` where direction is one of
//!   `Right`, `Down`, `Up`, `Left` (e.g. `TallDialRight`, `MouseWheelUp`).
//!
//! ## Direction conventions
//! `Right` and `Down` map to [`Direction::Positive`] (`+1`), `Up` and `Left`
//! to [`Direction::Negative`] (`-1`).
//!
//! Tokens that match neither shape are not errors; [`InputKind::parse`] returns
//! `None` and callers drop them.

use std::fmt;
use std::time::Instant;

const PRESS_SUFFIX: &str = "Press";
const RELEASE_SUFFIX: &str = "Release";

/// Direction suffixes and their sign.
const DIRECTIONS: [(&str, Direction); 4] = [
    ("Right", Direction::Positive),
    ("Down", Direction::Positive),
    ("Up", Direction::Negative),
    ("Left", Direction::Negative),
];

/// Normalized ±1 encoding of a wheel or dial step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// `+1` or `-1`.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// [`sign`](Self::sign) as a float, for property arithmetic.
    #[inline]
    pub fn factor(self) -> f64 {
        self.sign() as f64
    }

    #[inline]
    pub fn is_forward(self) -> bool {
        self == Direction::Positive
    }
}

/// The three rotary controls on the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wheel {
    TallDial,
    FlatWheel,
    MouseWheel,
}

impl Wheel {
    /// Control name as it appears in tokens and in the held-button set.
    ///
    /// Pressing a wheel (`TallDialPress`) holds this name, which turns the
    /// wheel's own rotation into its "fine" variant.
    pub fn name(self) -> &'static str {
        match self {
            Wheel::TallDial => "TallDial",
            Wheel::FlatWheel => "FlatWheel",
            Wheel::MouseWheel => "MouseWheel",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "TallDial" => Some(Wheel::TallDial),
            "FlatWheel" => Some(Wheel::FlatWheel),
            "MouseWheel" => Some(Wheel::MouseWheel),
            _ => None,
        }
    }
}

impl fmt::Display for Wheel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed form of a single token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// A button (or pressable wheel) transitioned to pressed.
    ButtonPressed { control: String },

    /// A button (or pressable wheel) transitioned to released.
    ButtonReleased { control: String },

    /// A dial or wheel moved one detent.
    WheelTurned { wheel: Wheel, direction: Direction },
}

impl InputKind {
    /// Parse a raw token. Returns `None` for anything without a known suffix.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();

        if let Some(control) = token.strip_suffix(PRESS_SUFFIX) {
            return (!control.is_empty()).then(|| InputKind::ButtonPressed {
                control: control.to_string(),
            });
        }
        if let Some(control) = token.strip_suffix(RELEASE_SUFFIX) {
            return (!control.is_empty()).then(|| InputKind::ButtonReleased {
                control: control.to_string(),
            });
        }

        DIRECTIONS.iter().find_map(|&(suffix, direction)| {
            let wheel = Wheel::from_name(token.strip_suffix(suffix)?)?;
            Some(InputKind::WheelTurned { wheel, direction })
        })
    }

    /// Bare control name with the phase/direction suffix removed.
    pub fn control(&self) -> &str {
        match self {
            InputKind::ButtonPressed { control } | InputKind::ButtonReleased { control } => control,
            InputKind::WheelTurned { wheel, .. } => wheel.name(),
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(
            self,
            InputKind::ButtonPressed { .. } | InputKind::ButtonReleased { .. }
        )
    }
}

/// Timestamped input event, stamped on arrival by the listener thread.
#[derive(Clone, Debug)]
pub struct InputEvent {
    /// Arrival time (monotonic). Drives wheel velocity and the preset rebind timer.
    pub at: Instant,
    /// The token exactly as received.
    pub token: String,
    /// The parsed change.
    pub kind: InputKind,
}

impl InputEvent {
    /// Parse `token` and stamp it with `at`.
    pub fn parse(token: &str, at: Instant) -> Option<Self> {
        let kind = InputKind::parse(token)?;
        Some(Self {
            at,
            token: token.trim().to_string(),
            kind,
        })
    }
}

/// `true` for tokens that never reach the engine: blank ones and the
/// device's "unknown" sentinel.
pub fn is_discarded(token: &str, unknown: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token == unknown
}
