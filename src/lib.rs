//! Tourbridge: maps TourBox controller tokens onto editor actions.
//!
//! A hardware daemon sends one token per UDP datagram (`TallDialRight`,
//! `SideThumbPress`, ...). A [`listener`] thread parses them into
//! [`InputEvent`]s and queues them on an [`InputEventBus`]. The host's main
//! loop pumps the bus into a [`Dispatcher`], which routes each event through
//! the active behaviour [`profile`] against a [`HostStore`] and an
//! [`Effector`].
//!
//! ```no_run
//! use std::time::Duration;
//! use tourbridge::backends::virtual_input::VirtualDevice;
//! use tourbridge::sim::{RecordingEffector, SimHost};
//! use tourbridge::{listener, BridgeConfig, Dispatcher, InputEventBus, PendingCapture};
//!
//! let config = BridgeConfig::default();
//! let mut device = VirtualDevice::new("virtual:0", "demo");
//! device.press("SideThumb").release("SideThumb");
//!
//! let mut bus = InputEventBus::new();
//! let handle = listener::spawn(device, bus.sender(), &config.transport).unwrap();
//! let mut dispatcher = Dispatcher::new(
//!     &config,
//!     SimHost::new(),
//!     RecordingEffector::new(),
//!     Box::new(PendingCapture::failed),
//! );
//! handle.join();
//! bus.pump_timeout(&mut dispatcher, Duration::from_millis(10));
//! ```

pub mod backends;
pub mod buttons;
pub mod clipboard;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod host;
pub mod listener;
pub mod logger;
pub mod profile;
pub mod sim;
pub mod velocity;

pub use buttons::{ButtonStateTracker, PressPolicy};
pub use clipboard::{Capture, CaptureStatus, ClipboardBridge, PendingCapture, ScriptBridge};
pub use config::BridgeConfig;
pub use device::Device;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, EffectorError, HostError, TransportError};
pub use event::{Direction, InputEvent, InputKind, Wheel};
pub use eventbus::{BusSender, EventFilter, InputEventBus, InputListener};
pub use host::{BrushProperty, BrushRef, Effector, HostStore, PropertyRef};
pub use velocity::VelocityTracker;
