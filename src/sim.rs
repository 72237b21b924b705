//! In-memory host and effector.
//!
//! [`SimHost`] stands in for the content-creation application: a flat table of
//! numeric properties, a timeline with keyframes, tool modes (some of which may
//! refuse entry), and brushes with per-`(mode, button)` presets. The preset
//! table is a [`PresetStore`] that round-trips through JSON so the dry-run
//! binary keeps bindings between runs.
//!
//! [`RecordingEffector`] records key commands instead of injecting them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EffectorError, HostError, PresetStoreError};
use crate::host::{BrushProperty, BrushRef, Effector, HostStore, PropertyRef};

/// Tool modes that expose a brush.
const PAINT_MODES: [&str; 5] = [
    "SCULPT",
    "SCULPT_CURVES",
    "TEXTURE_PAINT",
    "VERTEX_PAINT",
    "WEIGHT_PAINT",
];

/// Numeric state of one brush.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub size: f64,
    pub strength: f64,
    pub flow: f64,
    /// Orientation flag (subtract instead of add).
    pub inverted: bool,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 50.0,
            strength: 0.5,
            flow: 1.0,
            inverted: false,
        }
    }
}

/// Brushes plus `mode → button → preset` bindings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetStore {
    pub brushes: BTreeMap<String, BrushSettings>,
    pub bindings: BTreeMap<String, BTreeMap<String, BrushRef>>,
}

impl PresetStore {
    /// Load from JSON. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, PresetStoreError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(PresetStoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PresetStoreError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| PresetStoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn preset(&self, mode: &str, button: &str) -> Option<&BrushRef> {
        self.bindings.get(mode)?.get(button)
    }
}

/// In-memory [`HostStore`].
#[derive(Clone, Debug)]
pub struct SimHost {
    mode: String,
    rejected_modes: BTreeSet<String>,
    properties: BTreeMap<String, f64>,
    frame: i64,
    keyframes: BTreeSet<i64>,
    brush: Option<BrushRef>,
    store: PresetStore,
    overwrites: usize,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// Object mode, frame 1, no properties or brushes.
    pub fn new() -> Self {
        Self {
            mode: "OBJECT".into(),
            rejected_modes: BTreeSet::new(),
            properties: BTreeMap::new(),
            frame: 1,
            keyframes: BTreeSet::new(),
            brush: None,
            store: PresetStore::default(),
            overwrites: 0,
        }
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    /// Make [`HostStore::set_mode`] refuse `mode`.
    pub fn reject_mode(mut self, mode: &str) -> Self {
        self.rejected_modes.insert(mode.to_string());
        self
    }

    pub fn with_property(mut self, path: &str, value: f64) -> Self {
        self.properties.insert(path.to_string(), value);
        self
    }

    pub fn with_keyframes(mut self, frames: impl IntoIterator<Item = i64>) -> Self {
        self.keyframes.extend(frames);
        self
    }

    /// Add a brush and make it the active one.
    pub fn with_brush(mut self, name: &str, settings: BrushSettings) -> Self {
        self.store.brushes.insert(name.to_string(), settings);
        self.brush = Some(BrushRef(name.to_string()));
        self
    }

    pub fn with_store(mut self, store: PresetStore) -> Self {
        self.store = store;
        self
    }

    pub fn property_value(&self, path: &str) -> Option<f64> {
        self.properties.get(path).copied()
    }

    pub fn brush_settings(&self, brush: &BrushRef) -> Option<&BrushSettings> {
        self.store.brushes.get(&brush.0)
    }

    /// The brush selected for painting, regardless of mode.
    pub fn current_brush(&self) -> Option<&BrushRef> {
        self.brush.as_ref()
    }

    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    /// Number of [`HostStore::overwrite_brush`] calls so far.
    pub fn overwrite_count(&self) -> usize {
        self.overwrites
    }

    fn settings_mut(&mut self, brush: &BrushRef) -> Result<&mut BrushSettings, HostError> {
        self.store
            .brushes
            .get_mut(&brush.0)
            .ok_or_else(|| HostError::UnknownBrush(brush.0.clone()))
    }

    fn settings(&self, brush: &BrushRef) -> Result<&BrushSettings, HostError> {
        self.brush_settings(brush)
            .ok_or_else(|| HostError::UnknownBrush(brush.0.clone()))
    }
}

impl HostStore for SimHost {
    fn mode(&self) -> String {
        self.mode.clone()
    }

    fn set_mode(&mut self, mode: &str) -> Result<(), HostError> {
        if self.rejected_modes.contains(mode) {
            return Err(HostError::ModeRejected(mode.to_string()));
        }
        self.mode = mode.to_string();
        Ok(())
    }

    fn resolve_property(&self, path: &str) -> Result<PropertyRef, HostError> {
        if self.properties.contains_key(path) {
            Ok(PropertyRef::new(path))
        } else {
            Err(HostError::UnknownProperty(path.to_string()))
        }
    }

    fn property(&self, prop: &PropertyRef) -> Result<f64, HostError> {
        self.property_value(prop.path())
            .ok_or_else(|| HostError::UnknownProperty(prop.path().to_string()))
    }

    fn set_property(&mut self, prop: &PropertyRef, value: f64) -> Result<(), HostError> {
        match self.properties.get_mut(prop.path()) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(HostError::UnknownProperty(prop.path().to_string())),
        }
    }

    fn frame(&self) -> i64 {
        self.frame
    }

    fn set_frame(&mut self, frame: i64) {
        self.frame = frame;
    }

    fn jump_keyframe(&mut self, forward: bool) -> Result<(), HostError> {
        let target = if forward {
            self.keyframes.range(self.frame + 1..).next()
        } else {
            self.keyframes.range(..self.frame).next_back()
        };
        let frame = *target.ok_or(HostError::NoKeyframe { forward })?;
        self.frame = frame;
        Ok(())
    }

    fn active_brush(&self) -> Option<BrushRef> {
        if PAINT_MODES.contains(&self.mode.as_str()) {
            self.brush.clone()
        } else {
            None
        }
    }

    fn set_active_brush(&mut self, brush: &BrushRef) -> Result<(), HostError> {
        self.settings(brush)?;
        self.brush = Some(brush.clone());
        Ok(())
    }

    fn brush_value(&self, brush: &BrushRef, prop: BrushProperty) -> Result<f64, HostError> {
        let settings = self.settings(brush)?;
        Ok(match prop {
            BrushProperty::Size => settings.size,
            BrushProperty::Strength => settings.strength,
            BrushProperty::Flow => settings.flow,
        })
    }

    fn set_brush_value(
        &mut self,
        brush: &BrushRef,
        prop: BrushProperty,
        value: f64,
    ) -> Result<(), HostError> {
        let settings = self.settings_mut(brush)?;
        match prop {
            BrushProperty::Size => settings.size = value,
            BrushProperty::Strength => settings.strength = value,
            BrushProperty::Flow => settings.flow = value,
        }
        Ok(())
    }

    fn brush_direction(&self, brush: &BrushRef) -> Result<bool, HostError> {
        Ok(self.settings(brush)?.inverted)
    }

    fn set_brush_direction(&mut self, brush: &BrushRef, inverted: bool) -> Result<(), HostError> {
        self.settings_mut(brush)?.inverted = inverted;
        Ok(())
    }

    fn get_brush(&self, mode: &str, button: &str) -> Option<BrushRef> {
        self.store.preset(mode, button).cloned()
    }

    fn overwrite_brush(
        &mut self,
        mode: &str,
        button: &str,
        brush: &BrushRef,
    ) -> Result<BrushRef, HostError> {
        let settings = self.settings(brush)?.clone();
        let preset = BrushRef(format!("{button}.{mode}"));
        self.store.brushes.insert(preset.0.clone(), settings);
        self.store
            .bindings
            .entry(mode.to_string())
            .or_default()
            .insert(button.to_string(), preset.clone());
        self.overwrites += 1;
        Ok(preset)
    }
}

/// One recorded effector call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Down(Vec<String>),
    Up(Vec<String>),
    Chord(String),
}

/// [`Effector`] that only records what it was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RecordingEffector {
    pub commands: Vec<KeyCommand>,
}

impl RecordingEffector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effector for RecordingEffector {
    fn key_down(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        tracing::debug!(?keys, "key down");
        self.commands.push(KeyCommand::Down(keys.to_vec()));
        Ok(())
    }

    fn key_up(&mut self, keys: &[String]) -> Result<(), EffectorError> {
        tracing::debug!(?keys, "key up");
        self.commands.push(KeyCommand::Up(keys.to_vec()));
        Ok(())
    }

    fn key_chord(&mut self, chord: &str) -> Result<(), EffectorError> {
        tracing::debug!(chord, "key chord");
        self.commands.push(KeyCommand::Chord(chord.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_is_only_active_in_paint_modes() {
        let mut host = SimHost::new().with_brush("Draw", BrushSettings::default());
        assert_eq!(host.active_brush(), None);
        host.set_mode("SCULPT").unwrap();
        assert_eq!(host.active_brush(), Some(BrushRef("Draw".into())));
    }

    #[test]
    fn rejected_modes_leave_mode_unchanged() {
        let mut host = SimHost::new().reject_mode("POSE");
        assert_eq!(
            host.set_mode("POSE"),
            Err(HostError::ModeRejected("POSE".into()))
        );
        assert_eq!(host.mode(), "OBJECT");
    }

    #[test]
    fn keyframe_jumps_stop_at_ends() {
        let mut host = SimHost::new().with_keyframes([1, 10, 20]);
        host.jump_keyframe(true).unwrap();
        assert_eq!(host.frame(), 10);
        host.jump_keyframe(true).unwrap();
        host.jump_keyframe(false).unwrap();
        assert_eq!(host.frame(), 10);
        host.set_frame(25);
        assert!(host.jump_keyframe(true).is_err());
    }

    #[test]
    fn overwrite_copies_and_binds() {
        let mut host = SimHost::new()
            .with_mode("SCULPT")
            .with_brush("Clay", BrushSettings::default());
        let clay = BrushRef("Clay".into());
        let preset = host.overwrite_brush("SCULPT", "DpadUp", &clay).unwrap();
        assert_eq!(host.get_brush("SCULPT", "DpadUp"), Some(preset.clone()));
        assert_eq!(host.get_brush("OBJECT", "DpadUp"), None);
        assert_eq!(host.brush_settings(&preset), host.brush_settings(&clay));
        assert_eq!(host.overwrite_count(), 1);
    }

    #[test]
    fn preset_store_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets.json");

        let mut host = SimHost::new().with_brush("Clay", BrushSettings::default());
        host.overwrite_brush("SCULPT", "DpadLeft", &BrushRef("Clay".into()))
            .unwrap();
        host.store().save(&path).unwrap();

        let loaded = PresetStore::load(&path).unwrap();
        assert_eq!(&loaded, host.store());
        assert_eq!(
            loaded.preset("SCULPT", "DpadLeft"),
            Some(&BrushRef("DpadLeft.SCULPT".into()))
        );
    }

    #[test]
    fn missing_preset_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = PresetStore::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store, PresetStore::default());
    }
}
