//! Concrete token sources and effectors.
//!
//! - [`udp::UdpDevice`] receives tokens from the hardware daemon over UDP.
//! - [`virtual_input::VirtualDevice`] replays scripted tokens for demos and tests.
//! - [`xdotool::XdotoolEffector`] injects key events through an external program.

pub mod udp;
pub mod virtual_input;
pub mod xdotool;
