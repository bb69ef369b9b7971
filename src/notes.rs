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
//! Note name parsing.
//!
//! Note names have the form `<letter><accidental?><octave>`, e.g. `C#4`. The
//! letter is case-insensitive, the accidental is `#` (sharp) or `b`/`!` (flat)
//! and the octave is a signed integer. Middle C (`C4`) is MIDI note 60.

/// Error returned when a string is not a valid note name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteNameError {
    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),
}

/// Semitone offset of a natural note letter from C.
fn semitone(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Semitone adjustment for an accidental character.
fn accidental(symbol: char) -> Option<i32> {
    match symbol {
        '#' => Some(1),
        'b' | '!' => Some(-1),
        _ => None,
    }
}

/// Converts a note name to its MIDI note number.
///
/// The result is not clamped to the MIDI range: `C-2` yields -12 and `G9`
/// yields 127, `A10` yields 141. Callers validate the range when they need to.
pub fn parse_note_name(text: &str) -> Result<i32, NoteNameError> {
    let invalid = || NoteNameError::InvalidNoteName(text.to_string());

    let mut chars = text.chars().peekable();
    let pitch = chars.next().and_then(semitone).ok_or_else(invalid)?;
    let offset = match chars.peek().copied().and_then(accidental) {
        Some(offset) => {
            chars.next();
            offset
        }
        None => 0,
    };

    let octave_text: String = chars.collect();
    let digits = octave_text
        .strip_prefix(['+', '-'])
        .unwrap_or(&octave_text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let octave: i32 = octave_text
        .strip_prefix('+')
        .unwrap_or(&octave_text)
        .parse()
        .map_err(|_| invalid())?;

    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|n| n.checked_add(pitch + offset))
        .ok_or_else(invalid)
}
