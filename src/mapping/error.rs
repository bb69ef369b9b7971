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

/// Errors raised while assigning sounds to notes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("note {note} would be covered by more than one sound")]
    OverlappingRange { note: u8 },

    #[error("note ranges cover {covered} of 128 notes")]
    IncompleteCoverage { covered: usize },

    #[error("sound {id} has no MIDI note")]
    MissingNote { id: u64 },

    #[error("{count} pads requested, at most {max} fit on the keyboard")]
    TooManyPads { count: usize, max: usize },

    #[error("pad {index} has no place on the grid")]
    PadOutOfRange { index: usize },

    #[error("got {overrides} override sets for {sounds} sounds")]
    OverrideCountMismatch { sounds: usize, overrides: usize },
}
