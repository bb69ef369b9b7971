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
//! The 1010music Blackbox preset format.
//!
//! A preset is a folder holding `preset.xml` and the sound files. Grid
//! presets put one sample cell on each pad. Instrument presets put a single
//! multisample cell on the first pad and describe every sound as an asset
//! with its key and velocity range.

use std::path::PathBuf;

use tracing::debug;

use super::{element, Device, ExportError, Params, PresetSerializer, XmlDocument};
use crate::preset::{Preset, PresetType, SoundOverrides};
use crate::sound::{Pad, SoundRecord, MIDI_NOTE_COUNT};

/// The sample rate the Blackbox measures sample positions in.
pub const SAMPLE_RATE: f64 = 44100.0;

const SAMPLE_CELL: &str = "sample";
const ASSET_CELL: &str = "asset";

/// Writes Blackbox `preset.xml` documents.
pub struct BlackboxSerializer;

/// The velocity band of a layer when `layers` bands split the velocity
/// range evenly. Returns the lowest and highest velocity of the band.
pub fn velocity_band(layer: u8, layers: usize) -> (u8, u8) {
    let layers = layers.max(1);
    let layer = usize::from(layer).min(layers - 1);
    let span = usize::from(MIDI_NOTE_COUNT);
    let bottom = layer * span / layers;
    let top = (layer + 1) * span / layers - 1;
    (bottom as u8, top as u8)
}

fn seconds_to_samples(seconds: f64) -> i64 {
    (seconds * SAMPLE_RATE).round() as i64
}

impl BlackboxSerializer {
    /// The path of a sound file as seen from the SD card root.
    fn file_name(preset: &Preset, sound: &SoundRecord) -> String {
        format!(".\\{}\\{}", preset.name(), sound.file_name)
    }

    fn sample_params(sound: &SoundRecord, overrides: &SoundOverrides) -> Params {
        let mut params = Params::default();
        params.push("gaindb", 0i64);
        params.push("pitch", 0i64);
        params.push("samstart", seconds_to_samples(sound.start_time_seconds));
        params.push("samlen", seconds_to_samples(sound.duration_seconds));
        params.push("samtrigtype", 0i64);
        params.push("loopmode", 0i64);
        params.push("cellmode", 0i64);
        params.push("multisammode", 0i64);
        params.merge(overrides)
    }

    /// Writes a cell with its params. A `type` parameter sets the cell type.
    fn cell(
        doc: &mut XmlDocument,
        pad: Pad,
        layer: usize,
        filename: String,
        cell_type: &str,
        mut params: Params,
    ) -> Result<(), ExportError> {
        let cell_type = match params.take("type") {
            Some(value) => value.to_string(),
            None => cell_type.to_string(),
        };

        doc.start(element(
            "cell",
            &[
                ("row", pad.row.to_string()),
                ("column", pad.column.to_string()),
                ("layer", layer.to_string()),
                ("filename", filename),
                ("type", cell_type),
            ],
        ))?;
        let attributes: Vec<(&str, String)> = params
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_string()))
            .collect();
        doc.empty(element("params", &attributes))?;
        doc.end("cell")
    }

    fn write_grid(doc: &mut XmlDocument, preset: &Preset) -> Result<(), ExportError> {
        for (sound, overrides) in preset.entries() {
            let Some(pad) = sound.pad else {
                debug!(id = sound.id, "Skipping sound without a pad");
                continue;
            };
            Self::cell(
                doc,
                pad,
                0,
                Self::file_name(preset, sound),
                SAMPLE_CELL,
                Self::sample_params(sound, overrides),
            )?;
        }
        Ok(())
    }

    fn write_instrument(doc: &mut XmlDocument, preset: &Preset) -> Result<(), ExportError> {
        let origin = Pad { row: 0, column: 0 };
        let layers = preset.layers().count();

        let mut multisample = Params::default();
        multisample.push("gaindb", 0i64);
        multisample.push("multisammode", 1i64);
        multisample.push("cellmode", 0i64);
        Self::cell(doc, origin, 0, String::new(), SAMPLE_CELL, multisample)?;

        for (index, (sound, overrides)) in preset.entries().enumerate() {
            let note = sound.midi_note.ok_or(ExportError::MissingNote { id: sound.id })?;
            let range = sound.range.ok_or(ExportError::MissingRange { id: sound.id })?;
            let (Some(low), Some(high)) = (range.low(), range.high()) else {
                debug!(id = sound.id, note, "Skipping sound with an empty key range");
                continue;
            };
            let (velocity_low, velocity_high) = velocity_band(sound.velocity_layer, layers);

            let mut params = Params::default();
            params.push("rootnote", i64::from(note));
            params.push("keyrangebottom", i64::from(low));
            params.push("keyrangetop", i64::from(high));
            params.push("velrangebottom", i64::from(velocity_low));
            params.push("velrangetop", i64::from(velocity_high));
            params.push("asssrcrow", i64::from(origin.row));
            params.push("asssrccol", i64::from(origin.column));
            params.push("samstart", seconds_to_samples(sound.start_time_seconds));
            params.push("samlen", seconds_to_samples(sound.duration_seconds));

            Self::cell(
                doc,
                origin,
                index + 1,
                Self::file_name(preset, sound),
                ASSET_CELL,
                params.merge(overrides),
            )?;
        }
        Ok(())
    }
}

impl PresetSerializer for BlackboxSerializer {
    fn device(&self) -> Device {
        Device::Blackbox
    }

    fn file_path(&self, preset: &Preset) -> PathBuf {
        PathBuf::from(preset.name()).join("preset.xml")
    }

    fn serialize(&self, preset: &Preset) -> Result<String, ExportError> {
        let mut doc = XmlDocument::new()?;
        doc.start(element("document", &[("version", "1".to_string())]))?;
        doc.start(element("session", &[("version", "1".to_string())]))?;

        match preset.preset_type() {
            PresetType::Instrument => Self::write_instrument(&mut doc, preset)?,
            PresetType::Pads | PresetType::Loops => Self::write_grid(&mut doc, preset)?,
        }

        doc.end("session")?;
        doc.end("document")?;
        doc.finish()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use crate::config::PresetConfig;
    use crate::export::PresetSerializer;
    use crate::preset::{ParamValue, Preset, PresetType, SoundOverrides};
    use crate::testutil::{pad_candidate, tagged};

    use super::{velocity_band, BlackboxSerializer};

    #[test]
    fn velocity_bands() {
        assert_eq!((0, 127), velocity_band(0, 1));
        assert_eq!((0, 63), velocity_band(0, 2));
        assert_eq!((64, 127), velocity_band(1, 2));
        assert_eq!((0, 41), velocity_band(0, 3));
        assert_eq!((42, 84), velocity_band(1, 3));
        assert_eq!((85, 127), velocity_band(2, 3));
        assert_eq!((96, 127), velocity_band(3, 4));
        assert_eq!((0, 127), velocity_band(0, 0));
    }

    #[test]
    fn grid_cells() -> Result<(), Box<dyn Error>> {
        let records: Vec<_> = (0..6).map(|id| pad_candidate(id, 0.5)).collect();
        let config = PresetConfig::default().with_seed(11);
        let preset = Preset::build("Drums", PresetType::Pads, &records, &config)?;

        let xml = BlackboxSerializer.serialize(&preset)?;
        assert!(xml.contains("<session version=\"1\">"));
        assert_eq!(6, xml.matches("type=\"sample\"").count());
        assert!(xml.contains("row=\"0\" column=\"3\""));
        assert!(xml.contains("row=\"1\" column=\"1\""));
        assert!(xml.contains("filename=\".\\Drums\\"));
        // 0.01 s onset and 0.5 s length at 44.1 kHz.
        assert!(xml.contains("samstart=\"441\""));
        assert!(xml.contains("samlen=\"22050\""));
        Ok(())
    }

    #[test]
    fn loop_overrides_change_cells() -> Result<(), Box<dyn Error>> {
        let records: Vec<_> = (0..2).map(|id| pad_candidate(id, 4.0)).collect();
        let config = PresetConfig::default().with_seed(2);
        let preset = Preset::build("Loops", PresetType::Loops, &records, &config)?
            .with_uniform_overrides(SoundOverrides::from([
                ("type".to_string(), ParamValue::Text("sample".into())),
                ("samtrigtype".to_string(), ParamValue::Int(2)),
                ("loopmode".to_string(), ParamValue::Int(1)),
                ("cellmode".to_string(), ParamValue::Int(1)),
            ]));

        let xml = BlackboxSerializer.serialize(&preset)?;
        assert_eq!(2, xml.matches("samtrigtype=\"2\"").count());
        assert_eq!(2, xml.matches("loopmode=\"1\"").count());
        assert_eq!(2, xml.matches("cellmode=\"1\"").count());
        assert!(!xml.contains("loopmode=\"0\""));
        // The type override sets the cell type rather than a parameter.
        assert_eq!(2, xml.matches("type=\"sample\"").count());
        assert!(!xml.contains("<params type="));
        Ok(())
    }

    #[test]
    fn instrument_assets() -> Result<(), Box<dyn Error>> {
        let records = vec![
            tagged(1, 48, Some(60)),
            tagged(2, 48, Some(120)),
            tagged(3, 72, Some(60)),
            tagged(4, 72, Some(120)),
        ];
        let preset = Preset::build("Piano", PresetType::Instrument, &records, &PresetConfig::default())?;

        let xml = BlackboxSerializer.serialize(&preset)?;
        assert!(xml.contains("multisammode=\"1\""));
        assert_eq!(4, xml.matches("type=\"asset\"").count());
        assert!(xml.contains(
            "rootnote=\"48\" keyrangebottom=\"0\" keyrangetop=\"59\" velrangebottom=\"0\" velrangetop=\"63\""
        ));
        assert!(xml.contains(
            "rootnote=\"72\" keyrangebottom=\"60\" keyrangetop=\"127\" velrangebottom=\"64\" velrangetop=\"127\""
        ));
        Ok(())
    }

    #[test]
    fn device_path() -> Result<(), Box<dyn Error>> {
        let preset = Preset::build("Piano", PresetType::Instrument, &[], &PresetConfig::default())?;
        assert_eq!(
            std::path::PathBuf::from("Piano").join("preset.xml"),
            BlackboxSerializer.file_path(&preset)
        );
        Ok(())
    }
}
