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
use std::path::Path;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::sound::MAX_PADS;

/// Default number of sample slots on the target device.
pub const DEFAULT_MAX_SLOTS: usize = 128;

/// Default number of velocity layers kept per note.
pub const DEFAULT_MAX_VELOCITY_LAYERS: usize = 4;

/// The configuration for preset generation.
#[derive(Deserialize, Clone, Serialize, Debug)]
#[serde(default)]
pub struct PresetConfig {
    /// Maximum number of sounds the device can hold.
    max_slots: usize,

    /// Maximum number of velocity layers to keep.
    max_velocity_layers: usize,

    /// Which record wins when two share the same note and velocity.
    duplicate_policy: DuplicatePolicy,

    /// Which audio file the serializers reference for each sound.
    audio_source: AudioSource,

    /// Pad preset settings.
    pads: PadConfig,

    /// Name corrections for catalog sounds known to be mislabeled.
    name_corrections: Vec<NameCorrection>,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            max_slots: DEFAULT_MAX_SLOTS,
            max_velocity_layers: DEFAULT_MAX_VELOCITY_LAYERS,
            duplicate_policy: DuplicatePolicy::default(),
            audio_source: AudioSource::default(),
            pads: PadConfig::default(),
            name_corrections: default_name_corrections(),
        }
    }
}

fn default_name_corrections() -> Vec<NameCorrection> {
    vec![
        NameCorrection::new(65755, "A2", "A1"),
        NameCorrection::new(65754, "A#2", "A#1"),
        NameCorrection::new(65756, "B2", "B1"),
    ]
}

impl PresetConfig {
    /// Parse a preset configuration from a file.
    pub fn deserialize(path: &Path) -> Result<PresetConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<PresetConfig>()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pads.columns == 0 {
            return Err(ConfigError::PadColumns {
                columns: self.pads.columns,
            });
        }
        // Every pad needs its own note, which also keeps rows within a u8.
        if self.pads.count > MAX_PADS {
            return Err(ConfigError::PadCount {
                count: self.pads.count,
                max: MAX_PADS,
            });
        }
        Ok(())
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn max_velocity_layers(&self) -> usize {
        self.max_velocity_layers
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    pub fn audio_source(&self) -> AudioSource {
        self.audio_source
    }

    pub fn pads(&self) -> &PadConfig {
        &self.pads
    }

    pub fn name_corrections(&self) -> &[NameCorrection] {
        &self.name_corrections
    }

    /// Overrides the slot limit.
    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = max_slots;
        self
    }

    /// Overrides the velocity layer limit.
    pub fn with_max_velocity_layers(mut self, max_velocity_layers: usize) -> Self {
        self.max_velocity_layers = max_velocity_layers;
        self
    }

    /// Overrides the duplicate policy.
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    /// Overrides the random seed used to pick pad sounds.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.pads.seed = Some(seed);
        self
    }
}

/// Which of two records sharing a (note, velocity) key is kept.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first record in catalog order.
    #[default]
    KeepFirst,
    /// Keep the last record in catalog order.
    KeepLast,
}

/// The audio file a preset references for each sound.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// The OGG preview.
    #[default]
    Preview,
    /// The original upload, in its original format.
    Original,
    /// The original transcoded to WAV.
    Converted,
}

impl AudioSource {
    /// The file name for a sound with the given id and original file type.
    pub fn file_name(&self, id: u64, file_type: &str) -> String {
        match self {
            AudioSource::Preview => format!("{}.ogg", id),
            AudioSource::Original => format!("{}.{}", id, file_type),
            AudioSource::Converted => format!("{}.wav", id),
        }
    }
}

/// Settings for grid (pad and loop) presets.
#[derive(Deserialize, Clone, Serialize, Debug)]
#[serde(default)]
pub struct PadConfig {
    /// Number of pads to fill.
    pub count: usize,
    /// Number of columns in the pad grid.
    pub columns: u8,
    /// Longest sound, in seconds, considered for one-shot pads.
    pub max_pad_duration: f64,
    /// Longest sound, in seconds, considered for loop pads.
    pub max_loop_duration: f64,
    /// Seed for choosing sounds. Unseeded runs pick differently every time.
    pub seed: Option<u64>,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            count: 16,
            columns: 4,
            max_pad_duration: 0.5,
            max_loop_duration: 10.0,
            seed: None,
        }
    }
}

/// Replaces text in the name of one catalog sound before it is tokenized.
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq, Eq)]
pub struct NameCorrection {
    pub id: u64,
    pub from: String,
    pub to: String,
}

impl NameCorrection {
    pub fn new(id: u64, from: &str, to: &str) -> NameCorrection {
        NameCorrection {
            id,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs};

    use crate::config::ConfigError;

    use super::{AudioSource, DuplicatePolicy, PresetConfig};

    #[test]
    fn defaults() {
        let config = PresetConfig::default();
        assert_eq!(128, config.max_slots());
        assert_eq!(4, config.max_velocity_layers());
        assert_eq!(DuplicatePolicy::KeepFirst, config.duplicate_policy());
        assert_eq!(AudioSource::Preview, config.audio_source());
        assert_eq!(16, config.pads().count);
        assert_eq!(3, config.name_corrections().len());
    }

    #[test]
    fn partial_yaml() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("preset.yaml");
        fs::write(
            &path,
            r#"
max_slots: 64
duplicate_policy: keep_last
audio_source: converted
pads:
  count: 8
  seed: 42
name_corrections:
  - id: 1
    from: C5
    to: C4
"#,
        )?;

        let config = PresetConfig::deserialize(&path)?;
        assert_eq!(64, config.max_slots());
        assert_eq!(4, config.max_velocity_layers());
        assert_eq!(DuplicatePolicy::KeepLast, config.duplicate_policy());
        assert_eq!(AudioSource::Converted, config.audio_source());
        assert_eq!(8, config.pads().count);
        assert_eq!(4, config.pads().columns);
        assert_eq!(Some(42), config.pads().seed);
        assert_eq!(1, config.name_corrections().len());
        Ok(())
    }

    #[test]
    fn zero_columns_rejected() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("preset.yaml");
        fs::write(&path, "pads:\n  columns: 0\n")?;

        assert!(PresetConfig::deserialize(&path).is_err());
        Ok(())
    }

    #[test]
    fn too_many_pads_rejected() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("preset.yaml");
        fs::write(&path, "pads:\n  count: 100\n")?;

        assert!(matches!(
            PresetConfig::deserialize(&path),
            Err(ConfigError::PadCount { count: 100, max: 92 })
        ));

        fs::write(&path, "pads:\n  count: 92\n")?;
        assert_eq!(92, PresetConfig::deserialize(&path)?.pads().count);
        Ok(())
    }

    #[test]
    fn file_names() {
        assert_eq!("12.ogg", AudioSource::Preview.file_name(12, "flac"));
        assert_eq!("12.flac", AudioSource::Original.file_name(12, "flac"));
        assert_eq!("12.wav", AudioSource::Converted.file_name(12, "flac"));
    }

    #[test]
    fn builder_overrides() {
        let config = PresetConfig::default()
            .with_max_slots(8)
            .with_max_velocity_layers(1)
            .with_seed(7);
        assert_eq!(8, config.max_slots());
        assert_eq!(1, config.max_velocity_layers());
        assert_eq!(Some(7), config.pads().seed);
    }
}
