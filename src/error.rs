//! Error types.
//!
//! Per-event failures ([`DispatchError`]) are logged by the dispatcher and never
//! stop the event loop. Transport failures ([`TransportError`]) end the listener
//! thread, and a bind failure is reported at startup.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised while routing a single event through a profile.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A release arrived for a control that is not currently held.
    #[error("release of `{control}` without a matching press")]
    InvalidState { control: String },

    /// A repeat press was rejected under [`PressPolicy::Strict`](crate::buttons::PressPolicy).
    #[error("`{control}` pressed while already held")]
    AlreadyHeld { control: String },

    /// The brush profile was asked to act without a bound brush.
    #[error("no active brush bound to the brush profile")]
    NoActiveBrush,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Effector(#[from] EffectorError),
}

/// Failure reported by a [`HostStore`](crate::host::HostStore).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("property path `{0}` does not resolve")]
    UnknownProperty(String),

    #[error("host rejected transition to mode `{0}`")]
    ModeRejected(String),

    #[error("unknown brush `{0}`")]
    UnknownBrush(String),

    #[error("no keyframe to jump to (forward: {forward})")]
    NoKeyframe { forward: bool },
}

/// Failure reported by an [`Effector`](crate::host::Effector).
#[derive(Debug, Error)]
pub enum EffectorError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Exit { program: String, status: String },
}

/// Failure of the datagram transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("receive failed: {0}")]
    Recv(#[source] io::Error),

    /// The source has no more tokens to deliver.
    #[error("event source closed")]
    Closed,
}

/// Failure loading a [`BridgeConfig`](crate::config::BridgeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure loading or saving a [`PresetStore`](crate::sim::PresetStore).
#[derive(Debug, Error)]
pub enum PresetStoreError {
    #[error("preset store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed preset store: {0}")]
    Json(#[from] serde_json::Error),
}
