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
use std::fmt;

use serde::Serialize;

use crate::catalog::CatalogSound;
use crate::config::AudioSource;

/// Number of keys on the MIDI keyboard.
pub const MIDI_NOTE_COUNT: u8 = 128;

/// The note the first pad of a grid preset is played from.
pub const FIRST_PAD_NOTE: u8 = 36;

/// The most pads a grid preset can hold with one note per pad.
pub const MAX_PADS: usize = (MIDI_NOTE_COUNT - FIRST_PAD_NOTE) as usize;

/// The note played by the pad with the given index, if it has one.
pub fn pad_note(index: usize) -> Option<u8> {
    u8::try_from(index)
        .ok()
        .and_then(|index| FIRST_PAD_NOTE.checked_add(index))
        .filter(|note| *note < MIDI_NOTE_COUNT)
}

/// A contiguous span of MIDI notes played by a single sound.
/// The span is half-open: `start` is included, `end` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AssignedRange {
    start: u8,
    end: u8,
}

impl AssignedRange {
    /// Creates a new range covering `start..end`.
    pub fn new(start: u8, end: u8) -> AssignedRange {
        AssignedRange {
            start,
            end: end.max(start),
        }
    }

    /// The lowest note in the range, if the range is not empty.
    pub fn low(&self) -> Option<u8> {
        (!self.is_empty()).then_some(self.start)
    }

    /// The highest note in the range, if the range is not empty.
    pub fn high(&self) -> Option<u8> {
        (!self.is_empty()).then(|| self.end - 1)
    }

    pub fn len(&self) -> usize {
        usize::from(self.end - self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, note: u8) -> bool {
        (self.start..self.end).contains(&note)
    }

    /// Iterates over the notes in the range in ascending order.
    pub fn notes(&self) -> impl Iterator<Item = u8> {
        self.start..self.end
    }

    /// The range as a 128 bit mask where bit `n` is set when note `n` is covered.
    pub fn bitmask(&self) -> u128 {
        self.notes().fold(0u128, |mask, note| mask | (1u128 << note))
    }
}

impl fmt::Display for AssignedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low(), self.high()) {
            (Some(low), Some(high)) => write!(f, "{}..={}", low, high),
            _ => write!(f, "(empty)"),
        }
    }
}

/// A grid position on a pad based device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pad {
    pub row: u8,
    pub column: u8,
}

/// A single catalog sound as it flows through the mapping pipeline.
///
/// Records are values: each stage returns new records with fields filled in
/// rather than mutating shared ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundRecord {
    pub id: u64,
    pub name: String,
    pub tags: Vec<String>,
    pub description: String,
    pub duration_seconds: f64,
    pub start_time_seconds: f64,
    /// Whether the catalog provided an onset estimate for this sound.
    pub has_onset: bool,
    pub license: String,
    pub username: String,
    pub preview_url: String,
    pub file_type: String,
    pub filesize: u64,
    /// The file name serializers reference for this sound's audio.
    pub file_name: String,
    pub midi_note: Option<u8>,
    pub midi_velocity: Option<u8>,
    pub velocity_layer: u8,
    pub range: Option<AssignedRange>,
    pub pad: Option<Pad>,
}

impl SoundRecord {
    /// Creates a record from a fetched catalog sound.
    pub fn from_catalog(sound: &CatalogSound, audio_source: AudioSource) -> SoundRecord {
        SoundRecord {
            id: sound.id,
            name: sound.name.clone(),
            tags: sound.tags.clone(),
            description: sound.description.clone(),
            duration_seconds: sound.duration,
            start_time_seconds: sound.start_time(),
            has_onset: sound.onset_times.is_some(),
            license: sound.license.clone(),
            username: sound.username.clone(),
            preview_url: sound.preview_url.clone(),
            file_type: sound.file_type.clone(),
            filesize: sound.filesize,
            file_name: audio_source.file_name(sound.id, &sound.file_type),
            midi_note: None,
            midi_velocity: None,
            velocity_layer: 0,
            range: None,
            pad: None,
        }
    }

    /// Onset offset as a fraction of the sound's duration.
    pub fn start_fraction(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.start_time_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// The velocity used for layering and de-duplication, absent counts as 0.
    pub fn velocity_or_zero(&self) -> u8 {
        self.midi_velocity.unwrap_or(0)
    }
}

impl fmt::Display for SoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)?;
        if let Some(note) = self.midi_note {
            write!(f, " note={}", note)?;
        }
        if let Some(velocity) = self.midi_velocity {
            write!(f, " velocity={}", velocity)?;
        }
        if let Some(range) = &self.range {
            write!(f, " range={}", range)?;
        }
        if let Some(pad) = &self.pad {
            write!(f, " pad={},{}", pad.row, pad.column)?;
        }
        Ok(())
    }
}
