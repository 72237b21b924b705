//! Serializable bridge configuration.
//!
//! Every field has a default, so an empty file (or no file) yields the stock
//! TourBox Elite layout on UDP port 21404. Sections map one-to-one onto the
//! components that consume them.
//!
//! ```toml
//! [transport]
//! bind = "127.0.0.1:21404"
//!
//! [profile]
//! mode_cycle = ["SCULPT", "TEXTURE_PAINT"]
//!
//! [brush]
//! rebind_timeout_ms = 750
//! ```

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::buttons::PressPolicy;
use crate::error::ConfigError;

/// Root of the TOML configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub transport: TransportConfig,
    pub profile: ProfileConfig,
    pub brush: BrushConfig,
    pub clipboard: ClipboardConfig,
    pub effector: EffectorConfig,
}

impl BridgeConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Datagram listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub bind: SocketAddr,
    /// Largest accepted datagram; longer payloads are truncated by the socket.
    pub max_datagram: usize,
    /// Token the firmware sends for unrecognized reports. Dropped on arrival.
    pub unknown_token: String,
    /// Token that tears the listener down after being forwarded.
    pub shutdown_token: Option<String>,
    /// How often the listener wakes to check its stop flag.
    pub read_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 21404)),
            max_datagram: 1024,
            unknown_token: "Unknown".into(),
            shutdown_token: Some("ButtonNearTallDialPress".into()),
            read_timeout_ms: 200,
        }
    }
}

impl TransportConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

/// Button roles shared by every profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Advances through `mode_cycle`.
    pub cycle_button: String,
    /// Ordered tool modes visited by `cycle_button`.
    pub mode_cycle: Vec<String>,
    /// Flips between the two `toggle_modes`.
    pub toggle_button: String,
    /// `[home, other]`: leaves any non-home mode for home, and home for other.
    pub toggle_modes: [String; 2],
    /// Buttons that hold keyboard modifiers down while pressed.
    pub modifier_keys: BTreeMap<String, Vec<String>>,
    /// Captures a property path through the clipboard bridge.
    pub capture_button: String,
    /// Chord sent to the host before running the clipboard bridge.
    pub capture_chord: String,
    /// Reject repeat presses of a held button instead of absorbing them.
    pub strict_presses: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        let modifier_keys = [
            ("SideThumb", "ctrl"),
            ("LongBarButton", "shift"),
            ("BottomRightClickerRight", "alt"),
            ("ButtonNearTallDial", "grave"),
        ]
        .into_iter()
        .map(|(button, key)| (button.to_string(), vec![key.to_string()]))
        .collect();

        Self {
            cycle_button: "LogoButtonRight".into(),
            mode_cycle: vec!["SCULPT".into(), "POSE".into(), "SCULPT_CURVES".into()],
            toggle_button: "LogoButtonLeft".into(),
            toggle_modes: ["OBJECT".into(), "EDIT".into()],
            modifier_keys,
            capture_button: "BottomRightClickerLeft".into(),
            capture_chord: "ctrl+alt+shift+c".into(),
            strict_presses: false,
        }
    }
}

impl ProfileConfig {
    pub fn press_policy(&self) -> PressPolicy {
        if self.strict_presses {
            PressPolicy::Strict
        } else {
            PressPolicy::Permissive
        }
    }
}

/// Brush-mode button roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Flips the brush orientation flag.
    pub direction_button: String,
    /// Tap recalls the preset bound to the button, hold stores the active brush.
    pub preset_buttons: Vec<String>,
    /// Minimum hold that counts as a store gesture.
    pub rebind_timeout_ms: u64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            direction_button: "ButtonNearTallDial".into(),
            preset_buttons: [
                "DpadLeft",
                "DpadRight",
                "DpadUp",
                "DpadDown",
                "BottomRightClickerLeft",
                "BottomRightClickerRight",
                "SideThumb",
                "LongBarButton",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            rebind_timeout_ms: 1000,
        }
    }
}

impl BrushConfig {
    pub fn rebind_timeout(&self) -> Duration {
        Duration::from_millis(self.rebind_timeout_ms)
    }

    pub fn is_preset_button(&self, control: &str) -> bool {
        self.preset_buttons.iter().any(|b| b == control)
    }
}

/// Clipboard bridge side channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Script that dumps the host clipboard into `capture_file`.
    pub script: Option<PathBuf>,
    pub capture_file: PathBuf,
    pub attempts: u32,
    pub interval_ms: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            script: None,
            capture_file: PathBuf::from("/tmp/xclip-workaround"),
            attempts: 20,
            interval_ms: 50,
        }
    }
}

impl ClipboardConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Key injection backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectorConfig {
    pub program: String,
}

impl Default for EffectorConfig {
    fn default() -> Self {
        Self {
            program: "xdotool".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = BridgeConfig::from_toml("").unwrap();
        assert_eq!(cfg.transport.bind.port(), 21404);
        assert_eq!(cfg.transport.max_datagram, 1024);
        assert_eq!(cfg.profile.mode_cycle, ["SCULPT", "POSE", "SCULPT_CURVES"]);
        assert_eq!(cfg.brush.preset_buttons.len(), 8);
        assert_eq!(cfg.brush.rebind_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.clipboard.attempts, 20);
        assert_eq!(cfg.profile.press_policy(), PressPolicy::Permissive);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = BridgeConfig::from_toml(
            r#"
            [profile]
            mode_cycle = ["TEXTURE_PAINT", "SCULPT"]
            strict_presses = true

            [brush]
            rebind_timeout_ms = 750
            "#,
        )
        .unwrap();
        assert_eq!(cfg.profile.mode_cycle, ["TEXTURE_PAINT", "SCULPT"]);
        assert_eq!(cfg.profile.press_policy(), PressPolicy::Strict);
        assert_eq!(cfg.profile.cycle_button, "LogoButtonRight");
        assert_eq!(cfg.brush.rebind_timeout(), Duration::from_millis(750));
        assert!(cfg.brush.is_preset_button("DpadUp"));
    }

    #[test]
    fn modifier_keys_table_overrides() {
        let cfg = BridgeConfig::from_toml(
            r#"
            [profile.modifier_keys]
            SideThumb = ["super", "shift"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.profile.modifier_keys.len(), 1);
        assert_eq!(cfg.profile.modifier_keys["SideThumb"], ["super", "shift"]);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transport]\nbind = \"127.0.0.1:9000\"").unwrap();
        let cfg = BridgeConfig::load(file.path()).unwrap();
        assert_eq!(cfg.transport.bind, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = BridgeConfig::load(Path::new("/nonexistent/tourbridge.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = BridgeConfig::from_toml("[transport\nbind = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
