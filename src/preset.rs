// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PresetConfig;
use crate::mapping::{self, GridKind, Mapping, MappingError, PipelineReport, VelocityLayerMap};
use crate::sound::SoundRecord;

/// The kind of preset being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetType {
    /// Sounds spread over the keyboard by pitch.
    Instrument,
    /// One-shot sounds on a pad grid.
    Pads,
    /// Loops on a pad grid.
    Loops,
}

impl PresetType {
    /// The grid kind for grid presets.
    pub fn grid_kind(&self) -> Option<GridKind> {
        match self {
            PresetType::Instrument => None,
            PresetType::Pads => Some(GridKind::Pads),
            PresetType::Loops => Some(GridKind::Loops),
        }
    }
}

impl fmt::Display for PresetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresetType::Instrument => "instrument",
            PresetType::Pads => "pads",
            PresetType::Loops => "loops",
        };
        f.write_str(name)
    }
}

/// A device parameter value supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(value) => write!(f, "{}", value),
            ParamValue::Float(value) => write!(f, "{}", value),
            ParamValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Per-sound parameters that replace the computed parameters of the same name.
pub type SoundOverrides = BTreeMap<String, ParamValue>;

/// A finished preset, ready for a serializer.
#[derive(Debug, Clone)]
pub struct Preset {
    name: String,
    preset_type: PresetType,
    sounds: Vec<SoundRecord>,
    layers: VelocityLayerMap,
    overrides: Vec<SoundOverrides>,
    report: PipelineReport,
}

impl Preset {
    /// Orders the mapped sounds and wraps them up as a preset. Instrument
    /// sounds are ordered by note and then layer, grid sounds by pad.
    pub fn assemble(name: &str, preset_type: PresetType, mapping: Mapping) -> Preset {
        let mut sounds = mapping.records;
        match preset_type {
            PresetType::Instrument => {
                sounds.sort_by_key(|sound| (sound.midi_note, sound.velocity_layer))
            }
            PresetType::Pads | PresetType::Loops => {
                sounds.sort_by_key(|sound| sound.pad.map(|pad| (pad.row, pad.column)))
            }
        }

        Preset {
            name: name.to_string(),
            preset_type,
            overrides: vec![SoundOverrides::new(); sounds.len()],
            sounds,
            layers: mapping.layers,
            report: mapping.report,
        }
    }

    /// Runs the mapping pipeline for the preset type and assembles the result.
    pub fn build(
        name: &str,
        preset_type: PresetType,
        records: &[SoundRecord],
        config: &PresetConfig,
    ) -> Result<Preset, MappingError> {
        let mapping = match preset_type.grid_kind() {
            Some(kind) => mapping::map_grid(records, config, kind)?,
            None => mapping::map_instrument(records, config)?,
        };
        Ok(Preset::assemble(name, preset_type, mapping))
    }

    /// Sets the per-sound overrides. There must be one set per sound, in
    /// sound order.
    pub fn with_overrides(mut self, overrides: Vec<SoundOverrides>) -> Result<Preset, MappingError> {
        if overrides.len() != self.sounds.len() {
            return Err(MappingError::OverrideCountMismatch {
                sounds: self.sounds.len(),
                overrides: overrides.len(),
            });
        }
        self.overrides = overrides;
        Ok(self)
    }

    /// Applies the same overrides to every sound.
    pub fn with_uniform_overrides(self, overrides: SoundOverrides) -> Preset {
        let count = self.sounds.len();
        Preset {
            overrides: vec![overrides; count],
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn preset_type(&self) -> PresetType {
        self.preset_type
    }

    pub fn sounds(&self) -> &[SoundRecord] {
        &self.sounds
    }

    pub fn layers(&self) -> &VelocityLayerMap {
        &self.layers
    }

    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    /// Iterates over each sound with its overrides.
    pub fn entries(&self) -> impl Iterator<Item = (&SoundRecord, &SoundOverrides)> {
        self.sounds.iter().zip(self.overrides.iter())
    }
}
