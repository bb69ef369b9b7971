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
//! The Source sampler preset format.

use std::path::PathBuf;

use super::{element, Device, ExportError, Params, PresetSerializer, XmlDocument};
use crate::preset::{ParamValue, Preset, PresetType, SoundOverrides};
use crate::sound::{pad_note, AssignedRange, SoundRecord};

const NUM_VOICES: &str = "16";

/// Writes Source `SourcePresetState` XML documents.
pub struct SourceSerializer;

impl SourceSerializer {
    /// The root note and key range of a sound.
    fn keys(preset: &Preset, index: usize, sound: &SoundRecord) -> Result<(u8, AssignedRange), ExportError> {
        match preset.preset_type() {
            PresetType::Instrument => {
                let note = sound.midi_note.ok_or(ExportError::MissingNote { id: sound.id })?;
                let range = sound.range.ok_or(ExportError::MissingRange { id: sound.id })?;
                Ok((note, range))
            }
            PresetType::Pads | PresetType::Loops => {
                let note = pad_note(index).ok_or(ExportError::PadOutOfRange { index })?;
                Ok((note, AssignedRange::new(note, note + 1)))
            }
        }
    }

    fn params(sound: &SoundRecord, root_note: u8, overrides: &SoundOverrides) -> Params {
        let mut params = Params::default();
        params.push("launchMode", 0i64);
        params.push("startPosition", sound.start_fraction());
        params.push("loopStartPosition", 0.3);
        params.push("loopEndPosition", 0.5);
        params.push("gain", -10.0);
        params.push("midiRootNote", i64::from(root_note));
        params.push("vel2CutoffAmt", 12.0);
        params.push("vel2GainAmt", 0.75);
        params.merge(overrides)
    }
}

fn parameter_type(value: &ParamValue) -> &'static str {
    match value {
        ParamValue::Int(_) => "int",
        ParamValue::Float(_) => "float",
        ParamValue::Text(_) => "string",
    }
}

/// Formats a float the way Source writes it, always with a decimal point.
fn format_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Float(value) if value.fract() == 0.0 => format!("{:.1}", value),
        other => other.to_string(),
    }
}

impl PresetSerializer for SourceSerializer {
    fn device(&self) -> Device {
        Device::Source
    }

    fn file_path(&self, preset: &Preset) -> PathBuf {
        PathBuf::from(format!("{}.xml", preset.name()))
    }

    fn serialize(&self, preset: &Preset) -> Result<String, ExportError> {
        let mut doc = XmlDocument::new()?;
        doc.start(element(
            "SourcePresetState",
            &[
                ("presetName", preset.name().to_string()),
                ("presetNumber", "0".to_string()),
                ("noteLayoutType", "0".to_string()),
            ],
        ))?;

        doc.start(element("Sampler", &[("NumVoices", NUM_VOICES.to_string())]))?;
        doc.empty(element(
            "ReverbParameters",
            &[
                ("reverb_roomSize", "0.0".to_string()),
                ("reverb_damping", "0.0".to_string()),
                ("reverb_wetLevel", "0.0".to_string()),
                ("reverb_dryLevel", "1.0".to_string()),
                ("reverb_width", "1.0".to_string()),
                ("reverb_freezeMode", "1.0".to_string()),
            ],
        ))?;
        doc.end("Sampler")?;

        doc.start(element("soundsInfo", &[]))?;
        for (index, (sound, overrides)) in preset.entries().enumerate() {
            let (root_note, range) = Self::keys(preset, index, sound)?;

            doc.start(element(
                "soundInfo",
                &[
                    ("soundId", sound.id.to_string()),
                    ("soundName", sound.name.clone()),
                    ("soundUser", sound.username.clone()),
                    ("soundLicense", sound.license.clone()),
                    ("soundOGGURL", sound.preview_url.clone()),
                    ("downloadProgress", "100".to_string()),
                    ("soundDurationInSeconds", sound.duration_seconds.to_string()),
                ],
            ))?;
            doc.empty(element("fsAnalysis", &[]))?;
            doc.start(element(
                "SamplerSound",
                &[
                    ("midiNotes", format!("{:#x}", range.bitmask())),
                    ("loadedPreviewVersion", "1".to_string()),
                    ("soundIdx", index.to_string()),
                ],
            ))?;
            for (name, value) in Self::params(sound, root_note, overrides).iter() {
                doc.empty(element(
                    "SamplerSoundParameter",
                    &[
                        ("parameter_type", parameter_type(value).to_string()),
                        ("parameter_name", name.clone()),
                        ("parameter_value", format_value(value)),
                    ],
                ))?;
            }
            doc.end("SamplerSound")?;
            doc.end("soundInfo")?;
        }
        doc.end("soundsInfo")?;
        doc.end("SourcePresetState")?;

        doc.finish()
    }
}
