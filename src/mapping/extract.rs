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
//! Note and velocity extraction from catalog metadata.
//!
//! Catalog annotations are inconsistent, so the note is looked up through an
//! ordered chain of strategies. The first strategy that yields a valid MIDI
//! note wins and later strategies are not consulted.

use std::borrow::Cow;

use midly::num::u7;
use tracing::debug;

use crate::config::NameCorrection;
use crate::notes::parse_note_name;
use crate::sound::SoundRecord;

const MIDI_NOTE_TAG: &str = "midi-note-";
const MIDI_VELOCITY_TAG: &str = "midi-velocity-";
const DESCRIPTION_MARKER: &str = "midi note::";

/// The metadata a note strategy looks at.
pub struct NoteSource<'a> {
    pub tags: &'a [String],
    pub description: &'a str,
    /// The display name with any name corrections applied.
    pub name: Cow<'a, str>,
}

impl<'a> NoteSource<'a> {
    /// Builds the note source for a record, applying the corrections that
    /// match its id.
    pub fn new(record: &'a SoundRecord, corrections: &[NameCorrection]) -> NoteSource<'a> {
        let mut name = Cow::Borrowed(record.name.as_str());
        for correction in corrections.iter().filter(|c| c.id == record.id) {
            name = Cow::Owned(name.replace(&correction.from, &correction.to));
        }

        NoteSource {
            tags: &record.tags,
            description: &record.description,
            name,
        }
    }
}

/// A single way of finding a note in a sound's metadata.
pub type NoteStrategy = fn(&NoteSource<'_>) -> Option<u8>;

/// The note strategies, in priority order.
pub const NOTE_STRATEGIES: [(&str, NoteStrategy); 4] = [
    ("midi-note tag", note_from_midi_tag),
    ("description marker", note_from_description),
    ("tag note name", note_from_tag_names),
    ("name token", note_from_name_tokens),
];

/// Narrows a candidate value to the MIDI note range.
fn midi_value(value: i32) -> Option<u8> {
    u8::try_from(value)
        .ok()
        .and_then(u7::try_from)
        .map(|value| value.as_int())
}

/// Parses the integer following `prefix` in a tag such as `midi-note-60`.
fn tagged_value(tag: &str, prefix: &str) -> Option<u8> {
    let (_, value) = tag.split_once(prefix)?;
    value.trim().parse::<i32>().ok().and_then(midi_value)
}

/// A note name parsed into the MIDI range.
fn named_note(text: &str) -> Option<u8> {
    parse_note_name(text).ok().and_then(midi_value)
}

/// A `midi-note-<n>` tag.
pub fn note_from_midi_tag(source: &NoteSource<'_>) -> Option<u8> {
    source
        .tags
        .iter()
        .find_map(|tag| tagged_value(tag, MIDI_NOTE_TAG))
}

/// A `midi note::<n>` marker in the description, read up to the end of its line.
pub fn note_from_description(source: &NoteSource<'_>) -> Option<u8> {
    let (_, rest) = source.description.split_once(DESCRIPTION_MARKER)?;
    let line = rest.lines().next().unwrap_or_default();
    line.trim().parse::<i32>().ok().and_then(midi_value)
}

/// The first tag that is itself a note name.
pub fn note_from_tag_names(source: &NoteSource<'_>) -> Option<u8> {
    source.tags.iter().find_map(|tag| named_note(tag))
}

/// The first token of the display name that is a note name. Names are split
/// on whitespace after turning `-`, `_` and `.` into spaces.
pub fn note_from_name_tokens(source: &NoteSource<'_>) -> Option<u8> {
    let name = source.name.replace(['-', '_', '.'], " ");
    name.split_whitespace().find_map(named_note)
}

/// Finds the MIDI note for a record, if any strategy yields one.
pub fn midi_note(record: &SoundRecord, corrections: &[NameCorrection]) -> Option<u8> {
    let source = NoteSource::new(record, corrections);
    NOTE_STRATEGIES.iter().find_map(|(label, strategy)| {
        let note = strategy(&source)?;
        debug!(id = record.id, note, strategy = *label, "Resolved MIDI note");
        Some(note)
    })
}

/// Finds the MIDI velocity for a record from a `midi-velocity-<n>` tag.
pub fn midi_velocity(record: &SoundRecord) -> Option<u8> {
    record
        .tags
        .iter()
        .find_map(|tag| tagged_value(tag, MIDI_VELOCITY_TAG))
}

/// Returns the record with its note and velocity resolved from its metadata.
pub fn extract(record: &SoundRecord, corrections: &[NameCorrection]) -> SoundRecord {
    SoundRecord {
        midi_note: midi_note(record, corrections),
        midi_velocity: midi_velocity(record),
        ..record.clone()
    }
}

#[cfg(test)]
mod test {
    use crate::config::NameCorrection;
    use crate::testutil::sound;

    use super::{
        extract, midi_note, midi_velocity, note_from_description, note_from_midi_tag,
        note_from_name_tokens, note_from_tag_names, NoteSource,
    };

    #[test]
    fn midi_note_tag_wins() {
        let record = sound(1, "Piano C4", &["piano", "D4", "midi-note-48"]);
        assert_eq!(Some(48), midi_note(&record, &[]));
    }

    #[test]
    fn strategies_in_priority_order() {
        let mut record = sound(1, "Piano C4", &["piano", "D4", "midi-note-48"]);
        record.description = "Sampled softly.\nmidi note::67".to_string();
        assert_eq!(Some(48), midi_note(&record, &[]));

        record.tags.retain(|tag| tag != "midi-note-48");
        assert_eq!(Some(67), midi_note(&record, &[]));

        record.description.clear();
        assert_eq!(Some(62), midi_note(&record, &[]));

        record.tags.retain(|tag| tag != "D4");
        assert_eq!(Some(60), midi_note(&record, &[]));

        record.name = "Piano".to_string();
        assert_eq!(None, midi_note(&record, &[]));
    }

    #[test]
    fn description_marker() {
        let mut record = sound(1, "Piano C4", &["piano"]);
        record.description = "Recorded in a hall.\nmidi note::67\nvelocity::high".to_string();
        assert_eq!(Some(67), midi_note(&record, &[]));
        assert_eq!(
            Some(67),
            note_from_description(&NoteSource::new(&record, &[]))
        );
    }

    #[test]
    fn bad_description_marker_falls_through() {
        let mut record = sound(1, "Piano C4", &["piano"]);
        record.description = "midi note::sixty\n".to_string();
        assert_eq!(None, note_from_description(&NoteSource::new(&record, &[])));
        assert_eq!(Some(60), midi_note(&record, &[]));
    }

    #[test]
    fn tag_note_names_before_name_tokens() {
        let record = sound(1, "Guitar E2", &["guitar", "A3"]);
        assert_eq!(Some(57), midi_note(&record, &[]));
    }

    #[test]
    fn name_tokens() {
        let record = sound(1, "violin_pizz-F#3.wav", &["violin"]);
        assert_eq!(Some(54), midi_note(&record, &[]));

        let record = sound(1, "flute.Bb5.long", &[]);
        assert_eq!(Some(82), note_from_name_tokens(&NoteSource::new(&record, &[])));
    }

    #[test]
    fn no_note() {
        let mut record = sound(1, "rain on a window", &["field-recording", "rain"]);
        record.description = "Recorded at night.".to_string();
        assert_eq!(None, midi_note(&record, &[]));
    }

    #[test]
    fn out_of_range_candidates_are_skipped() {
        let record = sound(1, "Bell C4", &["midi-note-200", "A10", "G3"]);
        let source = NoteSource::new(&record, &[]);
        assert_eq!(None, note_from_midi_tag(&source));
        assert_eq!(Some(55), note_from_tag_names(&source));
        assert_eq!(Some(55), midi_note(&record, &[]));
    }

    #[test]
    fn malformed_midi_note_tag_is_skipped() {
        let record = sound(1, "Bell", &["midi-note-x", "midi-note-62"]);
        assert_eq!(Some(62), midi_note(&record, &[]));
    }

    #[test]
    fn name_corrections_apply_by_id() {
        let corrections = vec![NameCorrection::new(65755, "A2", "A1")];

        let record = sound(65755, "Cello A2 pizz", &[]);
        assert_eq!(Some(33), midi_note(&record, &corrections));

        let record = sound(65000, "Cello A2 pizz", &[]);
        assert_eq!(Some(45), midi_note(&record, &corrections));
    }

    #[test]
    fn velocity_tag() {
        let record = sound(1, "x", &["midi-velocity-100", "midi-velocity-20"]);
        assert_eq!(Some(100), midi_velocity(&record));
        assert_eq!(None, midi_velocity(&sound(1, "x", &["loud"])));
        assert_eq!(Some(80), midi_velocity(&sound(1, "x", &["midi-velocity-200", "midi-velocity-80"])));
        assert_eq!(None, midi_velocity(&sound(1, "x", &["midi-velocity-x"])));
    }

    #[test]
    fn extract_is_pure() {
        let record = sound(1, "Piano", &["midi-note-60", "midi-velocity-90"]);
        let extracted = extract(&record, &[]);

        assert_eq!(Some(60), extracted.midi_note);
        assert_eq!(Some(90), extracted.midi_velocity);
        assert_eq!(None, record.midi_note);
        assert_eq!(record.id, extracted.id);
    }
}
