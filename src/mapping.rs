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
//! The note and velocity assignment engine.
//!
//! Sound records flow through extraction, velocity layer reduction,
//! duplicate and capacity resolution and finally key range allocation.
//! Each stage takes records and returns new ones.

use std::collections::BTreeSet;
use std::fmt;

use tracing::info;

use crate::config::PresetConfig;
use crate::sound::SoundRecord;

mod error;
pub mod extract;
pub mod grid;
pub mod ranges;
pub mod resolve;
pub mod velocity;

pub use error::MappingError;
pub use grid::GridKind;
pub use velocity::VelocityLayerMap;

/// What happened to the sounds on their way through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Sounds handed to the pipeline.
    pub found: usize,
    /// Sounds dropped because no note could be found.
    pub without_note: usize,
    /// Sounds dropped because their velocity was below the kept layers.
    pub below_velocity_cutoff: usize,
    /// Velocity layers in use.
    pub velocity_layers: usize,
    /// Sounds dropped as duplicates of another (note, velocity).
    pub redundant: usize,
    /// Notes dropped to fit the device.
    pub removed_notes: usize,
    /// Sounds dropped along with those notes.
    pub removed_sounds: usize,
    /// Sounds in the final mapping.
    pub selected: usize,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sounds found, {} without note, {} below velocity cutoff, {} redundant, \
             {} notes ({} sounds) over capacity, {} selected with {} velocity layers",
            self.found,
            self.without_note,
            self.below_velocity_cutoff,
            self.redundant,
            self.removed_notes,
            self.removed_sounds,
            self.selected,
            self.velocity_layers
        )
    }
}

/// The result of mapping a set of sounds.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub records: Vec<SoundRecord>,
    pub layers: VelocityLayerMap,
    pub report: PipelineReport,
}

/// Resolves notes and velocities for every record and drops the records
/// that have no note.
pub fn extract_notes(records: &[SoundRecord], config: &PresetConfig) -> Vec<SoundRecord> {
    records
        .iter()
        .map(|record| extract::extract(record, config.name_corrections()))
        .filter(|record| record.midi_note.is_some())
        .collect()
}

/// Maps sounds onto the keyboard for an instrument preset.
pub fn map_instrument(
    records: &[SoundRecord],
    config: &PresetConfig,
) -> Result<Mapping, MappingError> {
    let mut report = PipelineReport {
        found: records.len(),
        ..PipelineReport::default()
    };

    let extracted = extract_notes(records, config);
    report.without_note = records.len() - extracted.len();
    info!(
        found = report.found,
        with_note = extracted.len(),
        "Found {} sounds with a MIDI note",
        extracted.len()
    );

    let reduction = velocity::reduce_layers(&extracted, config.max_velocity_layers());
    report.below_velocity_cutoff = extracted.len() - reduction.records.len();
    report.velocity_layers = reduction.layers.count();

    let resolution = resolve::resolve(
        &reduction.records,
        config.max_slots(),
        reduction.layers.count(),
        config.duplicate_policy(),
    );
    report.redundant = resolution.redundant;
    report.removed_notes = resolution.removed_notes.len();
    report.removed_sounds = resolution.removed_sounds;

    // Layers of one note share its range.
    let distinct_notes: BTreeSet<u8> = resolution
        .records
        .iter()
        .filter_map(|record| record.midi_note)
        .collect();
    let records = if distinct_notes.len() < resolution.records.len() {
        ranges::allocate_shared_ranges(&resolution.records)?
    } else {
        ranges::allocate_ranges(&resolution.records)?
    };
    report.selected = records.len();
    info!(
        sounds = report.selected,
        layers = report.velocity_layers,
        "Mapped instrument sounds"
    );

    Ok(Mapping {
        records,
        layers: reduction.layers,
        report,
    })
}

/// Lays sounds out on a pad grid.
pub fn map_grid(
    records: &[SoundRecord],
    config: &PresetConfig,
    kind: GridKind,
) -> Result<Mapping, MappingError> {
    let records = grid::select_pads(records, config.pads(), kind)?;
    let report = PipelineReport {
        found: records.len(),
        velocity_layers: 1,
        selected: records.len(),
        ..PipelineReport::default()
    };

    Ok(Mapping {
        records,
        layers: VelocityLayerMap::default(),
        report,
    })
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use crate::config::PresetConfig;
    use crate::sound::AssignedRange;
    use crate::testutil::{notes, sound, tagged};

    use super::{map_instrument, MappingError};

    #[test]
    fn five_notes_end_to_end() -> Result<(), MappingError> {
        let records: Vec<_> = [36u8, 48, 60, 72, 84]
            .iter()
            .enumerate()
            .map(|(i, note)| tagged(i as u64, *note, None))
            .collect();

        let mapping = map_instrument(&records, &PresetConfig::default())?;
        assert_eq!(vec![36, 48, 60, 72, 84], notes(&mapping.records));
        assert_eq!(0, mapping.report.redundant);
        assert_eq!(0, mapping.report.removed_notes);
        assert_eq!(5, mapping.report.selected);

        let ranges: Vec<AssignedRange> = mapping.records.iter().filter_map(|r| r.range).collect();
        assert_eq!(5, ranges.len());
        let union: Vec<u8> = ranges.iter().flat_map(|range| range.notes()).collect();
        assert_eq!(128, union.len());
        assert_eq!(128, union.iter().collect::<HashSet<_>>().len());
        assert_eq!(AssignedRange::new(0, 42), ranges[0]);
        assert_eq!(AssignedRange::new(78, 128), ranges[4]);
        Ok(())
    }

    #[test]
    fn sounds_without_notes_are_dropped() -> Result<(), MappingError> {
        let records = vec![
            tagged(1, 60, None),
            sound(2, "ambience", &["rain"]),
            sound(3, "Piano A4", &["piano"]),
        ];

        let mapping = map_instrument(&records, &PresetConfig::default())?;
        assert_eq!(vec![60, 69], notes(&mapping.records));
        assert_eq!(1, mapping.report.without_note);
        Ok(())
    }

    #[test]
    fn empty_input_yields_no_ranges() -> Result<(), MappingError> {
        let records = vec![sound(1, "ambience", &[])];
        let mapping = map_instrument(&records, &PresetConfig::default())?;
        assert!(mapping.records.is_empty());
        Ok(())
    }

    #[test]
    fn rerunning_is_a_no_op() -> Result<(), MappingError> {
        let records = vec![
            tagged(1, 72, None),
            tagged(2, 40, None),
            tagged(3, 40, None),
            sound(4, "Cello C3", &[]),
            sound(5, "wind", &[]),
        ];
        let config = PresetConfig::default();

        let first = map_instrument(&records, &config)?;
        let second = map_instrument(&first.records, &config)?;
        assert_eq!(first.records, second.records);
        assert_eq!(0, second.report.redundant);
        assert_eq!(0, second.report.without_note);
        Ok(())
    }

    #[test]
    fn velocity_layers_share_ranges() -> Result<(), MappingError> {
        let records = vec![
            tagged(1, 48, Some(10)),
            tagged(2, 48, Some(70)),
            tagged(3, 48, Some(100)),
            tagged(4, 72, Some(70)),
            tagged(5, 72, Some(100)),
        ];
        let config = PresetConfig::default().with_max_velocity_layers(2);

        let mapping = map_instrument(&records, &config)?;
        assert_eq!(2, mapping.report.velocity_layers);
        assert_eq!(1, mapping.report.below_velocity_cutoff);

        let ids: Vec<u64> = mapping.records.iter().map(|r| r.id).collect();
        assert_eq!(vec![2, 3, 4, 5], ids);
        let layers: Vec<u8> = mapping.records.iter().map(|r| r.velocity_layer).collect();
        assert_eq!(vec![0, 1, 0, 1], layers);
        assert_eq!(Some(AssignedRange::new(0, 60)), mapping.records[0].range);
        assert_eq!(Some(AssignedRange::new(0, 60)), mapping.records[1].range);
        assert_eq!(Some(AssignedRange::new(60, 128)), mapping.records[3].range);
        Ok(())
    }

    #[test]
    fn missing_velocity_shares_a_note() -> Result<(), MappingError> {
        let records = vec![tagged(1, 60, None), tagged(2, 60, Some(100)), tagged(3, 72, None)];

        let mapping = map_instrument(&records, &PresetConfig::default())?;
        assert_eq!(3, mapping.records.len());
        assert_eq!(mapping.records[0].range, mapping.records[1].range);
        assert_eq!(Some(AssignedRange::new(0, 66)), mapping.records[0].range);
        Ok(())
    }

    #[test]
    fn capacity_with_layers() -> Result<(), MappingError> {
        let mut records = Vec::new();
        for (i, note) in [36u8, 48, 60, 72].iter().enumerate() {
            records.push(tagged(i as u64 * 2, *note, Some(60)));
            records.push(tagged(i as u64 * 2 + 1, *note, Some(120)));
        }
        let config = PresetConfig::default().with_max_slots(4);

        let mapping = map_instrument(&records, &config)?;
        assert_eq!(2, mapping.report.removed_notes);
        assert_eq!(4, mapping.report.removed_sounds);
        assert_eq!(4, mapping.records.len());
        Ok(())
    }
}
