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

//! Sound record builders for tests.

use crate::sound::SoundRecord;

/// Creates an unannotated record with the given name and tags.
pub fn sound(id: u64, name: &str, tags: &[&str]) -> SoundRecord {
    SoundRecord {
        id,
        name: name.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        description: String::new(),
        duration_seconds: 1.0,
        start_time_seconds: 0.0,
        has_onset: false,
        license: "http://creativecommons.org/publicdomain/zero/1.0/".to_string(),
        username: "tester".to_string(),
        preview_url: format!("https://example.com/previews/{}.ogg", id),
        file_type: "wav".to_string(),
        filesize: 1024,
        file_name: format!("{}.ogg", id),
        midi_note: None,
        midi_velocity: None,
        velocity_layer: 0,
        range: None,
        pad: None,
    }
}

/// Creates a record tagged with a MIDI note and, optionally, a velocity.
pub fn tagged(id: u64, note: u8, velocity: Option<u8>) -> SoundRecord {
    let mut tags = vec![format!("midi-note-{}", note)];
    if let Some(velocity) = velocity {
        tags.push(format!("midi-velocity-{}", velocity));
    }
    let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
    sound(id, &format!("sound {}", id), &tags)
}

/// Creates a record whose note and velocity are already resolved.
pub fn resolved(id: u64, note: u8, velocity: Option<u8>) -> SoundRecord {
    let mut record = tagged(id, note, velocity);
    record.midi_note = Some(note);
    record.midi_velocity = velocity;
    record
}

/// Creates a pad candidate with an onset estimate.
pub fn pad_candidate(id: u64, duration_seconds: f64) -> SoundRecord {
    let mut record = sound(id, &format!("hit {}", id), &["percussion"]);
    record.duration_seconds = duration_seconds;
    record.start_time_seconds = 0.01;
    record.has_onset = true;
    record
}

/// The MIDI notes of the given records, in order.
pub fn notes(records: &[SoundRecord]) -> Vec<u8> {
    records.iter().filter_map(|record| record.midi_note).collect()
}
