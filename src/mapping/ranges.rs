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
//! Key range allocation for instrument presets.
//!
//! Neighbouring notes split the keys between them at the floor of their
//! midpoint: the lower note plays the keys below it and the higher note plays
//! the rest. With an odd gap the boundary key goes to the higher note even
//! though it is closer to the lower one.

use std::collections::BTreeMap;

use tracing::debug;

use super::error::MappingError;
use crate::sound::{AssignedRange, SoundRecord, MIDI_NOTE_COUNT};

/// Checks that the ranges cover every MIDI note exactly once.
fn check_coverage<'a>(ranges: impl IntoIterator<Item = &'a AssignedRange>) -> Result<(), MappingError> {
    let mut covered = [0u8; MIDI_NOTE_COUNT as usize];
    for range in ranges {
        for note in range.notes() {
            let count = &mut covered[usize::from(note)];
            if *count > 0 {
                return Err(MappingError::OverlappingRange { note });
            }
            *count += 1;
        }
    }

    let total = covered.iter().filter(|count| **count > 0).count();
    if total != usize::from(MIDI_NOTE_COUNT) {
        return Err(MappingError::IncompleteCoverage { covered: total });
    }
    Ok(())
}

/// Gives each record the span of keys it plays. The records must have one
/// distinct note each; they are returned sorted by note.
///
/// The boundary between two neighbouring notes is the floor of their
/// midpoint. The first range starts at 0 and the last one ends at 127.
pub fn allocate_ranges(records: &[SoundRecord]) -> Result<Vec<SoundRecord>, MappingError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let mut sorted: Vec<(u8, &SoundRecord)> = records
        .iter()
        .map(|record| {
            record
                .midi_note
                .map(|note| (note, record))
                .ok_or(MappingError::MissingNote { id: record.id })
        })
        .collect::<Result<_, _>>()?;
    sorted.sort_by_key(|(note, _)| *note);

    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(MappingError::OverlappingRange { note: pair[0].0 });
    }

    let mut allocated = Vec::with_capacity(sorted.len());
    let mut start = 0u8;
    for (index, (note, record)) in sorted.iter().enumerate() {
        let end = match sorted.get(index + 1) {
            Some((next, _)) => note + (next - note) / 2,
            None => MIDI_NOTE_COUNT,
        };
        let range = AssignedRange::new(start, end);
        debug!(id = record.id, note, range = %range, "Allocated key range");

        allocated.push(SoundRecord {
            range: Some(range),
            ..(*record).clone()
        });
        start = end;
    }

    check_coverage(allocated.iter().filter_map(|record| record.range.as_ref()))?;
    Ok(allocated)
}

/// Allocates ranges when several velocity layers share a note. One record
/// per note, the one in the highest layer, decides the ranges and every
/// layer of that note then shares its range. Input order is preserved.
pub fn allocate_shared_ranges(records: &[SoundRecord]) -> Result<Vec<SoundRecord>, MappingError> {
    let mut representatives: BTreeMap<u8, &SoundRecord> = BTreeMap::new();
    for record in records {
        let note = record
            .midi_note
            .ok_or(MappingError::MissingNote { id: record.id })?;
        let current = representatives.entry(note).or_insert(record);
        if (record.velocity_layer, record.velocity_or_zero())
            > (current.velocity_layer, current.velocity_or_zero())
        {
            *current = record;
        }
    }

    let representatives: Vec<SoundRecord> = representatives.into_values().cloned().collect();
    let ranges: BTreeMap<u8, AssignedRange> = allocate_ranges(&representatives)?
        .into_iter()
        .filter_map(|record| Some((record.midi_note?, record.range?)))
        .collect();

    Ok(records
        .iter()
        .map(|record| SoundRecord {
            range: record.midi_note.and_then(|note| ranges.get(&note).copied()),
            ..record.clone()
        })
        .collect())
}
