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
//! Duplicate removal and capacity trimming.

use std::collections::{BTreeSet, HashSet};

use tracing::info;

use crate::config::DuplicatePolicy;
use crate::sound::SoundRecord;

/// The outcome of resolving duplicates and capacity.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub records: Vec<SoundRecord>,
    /// Records dropped because another record had the same note and velocity.
    pub redundant: usize,
    /// Notes dropped to fit the device.
    pub removed_notes: Vec<u8>,
    /// Records dropped along with those notes.
    pub removed_sounds: usize,
}

/// Drops records that share a (note, velocity) key with another record.
/// The policy decides whether the first or the last one in input order
/// survives; input order is otherwise preserved.
pub fn remove_duplicates(records: &[SoundRecord], policy: DuplicatePolicy) -> Vec<SoundRecord> {
    let mut seen: HashSet<(Option<u8>, u8)> = HashSet::new();
    let keep = |record: &&SoundRecord| seen.insert((record.midi_note, record.velocity_or_zero()));

    match policy {
        DuplicatePolicy::KeepFirst => records.iter().filter(keep).cloned().collect(),
        DuplicatePolicy::KeepLast => {
            let mut kept: Vec<SoundRecord> = records.iter().rev().filter(keep).cloned().collect();
            kept.reverse();
            kept
        }
    }
}

/// The number of distinct notes that fit in `max_slots` slots when each
/// note takes `n_layers` slots.
pub fn notes_to_keep(max_slots: usize, n_layers: usize) -> Option<usize> {
    (n_layers > 0).then(|| max_slots.div_ceil(n_layers))
}

/// Picks `removal_count` indices spread evenly over `0..len`.
pub fn removal_indices(len: usize, removal_count: usize) -> BTreeSet<usize> {
    if removal_count == 0 || len == 0 {
        return BTreeSet::new();
    }
    if removal_count >= len {
        return (0..len).collect();
    }

    (0..removal_count)
        .map(|index| ((index * len) as f64 / removal_count as f64).round() as usize)
        .map(|index| index.min(len - 1))
        .collect()
}

/// Drops whole notes, every layer at once, until the distinct notes fit in
/// `max_slots`. Removed notes are spread evenly over the sorted note list so
/// the keyboard stays covered. Returns the surviving records and the removed
/// notes.
pub fn trim_to_capacity(
    records: &[SoundRecord],
    max_slots: usize,
    n_layers: usize,
) -> (Vec<SoundRecord>, Vec<u8>) {
    let all_notes: Vec<u8> = records
        .iter()
        .filter_map(|record| record.midi_note)
        .collect::<BTreeSet<u8>>()
        .into_iter()
        .collect();

    let Some(keep) = notes_to_keep(max_slots, n_layers) else {
        return (records.to_vec(), Vec::new());
    };
    if keep >= all_notes.len() {
        return (records.to_vec(), Vec::new());
    }

    let removed: Vec<u8> = removal_indices(all_notes.len(), all_notes.len() - keep)
        .into_iter()
        .map(|index| all_notes[index])
        .collect();

    let kept = records
        .iter()
        .filter(|record| !record.midi_note.is_some_and(|note| removed.contains(&note)))
        .cloned()
        .collect();
    (kept, removed)
}

/// Removes duplicates and then trims to the device's capacity.
pub fn resolve(
    records: &[SoundRecord],
    max_slots: usize,
    n_layers: usize,
    policy: DuplicatePolicy,
) -> Resolution {
    let deduplicated = remove_duplicates(records, policy);
    let redundant = records.len() - deduplicated.len();
    info!(removed = redundant, "Removed {} redundant notes", redundant);

    let (trimmed, removed_notes) = trim_to_capacity(&deduplicated, max_slots, n_layers);
    let removed_sounds = deduplicated.len() - trimmed.len();
    if !removed_notes.is_empty() {
        info!(
            sounds = removed_sounds,
            notes = ?removed_notes,
            "Removing {} sounds ({} notes) because exceeding max",
            removed_sounds,
            removed_notes.len()
        );
    }

    Resolution {
        records: trimmed,
        redundant,
        removed_notes,
        removed_sounds,
    }
}
